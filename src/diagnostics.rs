use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{TeamId, WorkerId};

/// Severità di un avviso diagnostico.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Error,
    Warning,
    Info,
}

/// Categoria macchina-leggibile di un avviso.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// Copertura mancante o parziale di un turno.
    Copertura,
    /// Ore assegnate oltre il monte ore contrattuale.
    OreEccedenti,
    /// Collaboratore selezionato fuori dal proprio nucleo primario.
    Trasferimento,
    /// Riposi saltati o assegnati in numero inferiore al richiesto.
    Riposi,
    /// Resto di ore non convertibile in giornate o mezze giornate.
    Quota,
    /// Elementi di una bozza esterna scartati o segnalati.
    Bozza,
    /// Guasto a monte (snapshot o collaboratore esterno).
    Upstream,
}

/// Avviso strutturato prodotto dagli algoritmi; mai un errore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub severita: WarningSeverity,
    pub categoria: WarningCategory,
    pub messaggio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nucleo_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboratore_id: Option<WorkerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
}

impl Warning {
    pub fn errore<M: Into<String>>(categoria: WarningCategory, messaggio: M) -> Self {
        Self {
            severita: WarningSeverity::Error,
            categoria,
            messaggio: messaggio.into(),
            nucleo_id: None,
            collaboratore_id: None,
            data: None,
        }
    }

    pub fn avviso<M: Into<String>>(categoria: WarningCategory, messaggio: M) -> Self {
        Self {
            severita: WarningSeverity::Warning,
            categoria,
            messaggio: messaggio.into(),
            nucleo_id: None,
            collaboratore_id: None,
            data: None,
        }
    }

    pub fn info<M: Into<String>>(categoria: WarningCategory, messaggio: M) -> Self {
        Self {
            severita: WarningSeverity::Info,
            categoria,
            messaggio: messaggio.into(),
            nucleo_id: None,
            collaboratore_id: None,
            data: None,
        }
    }
}

/// Raccoglitore di avvisi condiviso da un'intera passata.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn extend<I: IntoIterator<Item = Warning>>(&mut self, iter: I) {
        self.warnings.extend(iter);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| w.severita == WarningSeverity::Error)
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}
