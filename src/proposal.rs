use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::conflict;
use crate::constraints;
use crate::context::ContextSnapshot;
use crate::diagnostics::{Warning, WarningCategory};
use crate::error::EngineError;
use crate::gatekeeper::{self, RequestKind};
use crate::model::{RestKind, Severity, TeamId, WorkerId};
use crate::timeutil::TimeRange;

/// Turno proposto in una bozza esterna.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftShift {
    pub nucleo_id: TeamId,
    pub collaboratore_id: WorkerId,
    pub data: NaiveDate,
    pub ora_inizio: NaiveTime,
    pub ora_fine: NaiveTime,
    #[serde(default)]
    pub confidenza: Option<f64>,
}

/// Riposo proposto in una bozza esterna.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftRestAssignment {
    pub collaboratore_id: WorkerId,
    pub nucleo_id: TeamId,
    pub data: NaiveDate,
    pub tipo: RestKind,
}

/// Bozza completa come arriva dal collaboratore esterno.
///
/// Mai fidarsi: ogni elemento ripassa dai validatori prima di emergere.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftPlan {
    #[serde(default)]
    pub turni: Vec<DraftShift>,
    #[serde(default)]
    pub assegnazioni: Vec<DraftRestAssignment>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub overall_confidence: Option<f64>,
}

/// Sorgente di bozze, iniettata dal chiamante all'ingresso del motore.
pub trait DraftSource {
    fn fetch_draft(&self, ctx: &ContextSnapshot) -> Result<DraftPlan>;
}

/// Sorgente che legge una bozza JSON da file.
pub struct FileDraftSource {
    path: PathBuf,
}

impl FileDraftSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl DraftSource for FileDraftSource {
    fn fetch_draft(&self, _ctx: &ContextSnapshot) -> Result<DraftPlan> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("reading draft file {}", self.path.display()))?;
        let plan: DraftPlan = serde_json::from_str(&contents)
            .with_context(|| format!("parsing draft JSON {}", self.path.display()))?;
        Ok(plan)
    }
}

/// Turno di bozza respinto, con tutte le ragioni accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedShift {
    pub turno: DraftShift,
    pub ragioni: Vec<String>,
}

/// Riposo di bozza respinto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRest {
    pub riposo: DraftRestAssignment,
    pub ragione: String,
}

/// Esito della validazione di una bozza: accettati e respinti, mai entrambi
/// per lo stesso elemento.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftValidation {
    pub turni_accettati: Vec<DraftShift>,
    pub turni_respinti: Vec<RejectedShift>,
    pub riposi_accettati: Vec<DraftRestAssignment>,
    pub riposi_respinti: Vec<RejectedRest>,
    pub warnings: Vec<Warning>,
}

impl DraftValidation {
    pub fn all_accepted(&self) -> bool {
        self.turni_respinti.is_empty() && self.riposi_respinti.is_empty()
    }
}

/// Preleva una bozza dalla sorgente e la valida contro lo snapshot.
pub fn valida_da_sorgente(
    ctx: &ContextSnapshot,
    source: &dyn DraftSource,
) -> Result<DraftValidation> {
    let bozza = source.fetch_draft(ctx)?;
    Ok(valida_bozza(ctx, &bozza)?)
}

/// Rivalida ogni elemento della bozza: conflitti e vincoli per i turni,
/// controllo di copertura per i riposi.
pub fn valida_bozza(
    ctx: &ContextSnapshot,
    bozza: &DraftPlan,
) -> Result<DraftValidation, EngineError> {
    let mut out = DraftValidation::default();

    for w in &bozza.warnings {
        out.warnings
            .push(Warning::info(WarningCategory::Bozza, w.clone()));
    }
    if let Some(c) = bozza.overall_confidence {
        if !(0.0..=1.0).contains(&c) {
            out.warnings.push(Warning::avviso(
                WarningCategory::Bozza,
                format!("confidenza complessiva fuori intervallo: {c}"),
            ));
        }
    }

    for t in &bozza.turni {
        match validate_draft_shift(ctx, t, &out.turni_accettati, &mut out.warnings)? {
            Ok(()) => out.turni_accettati.push(t.clone()),
            Err(ragioni) => out.turni_respinti.push(RejectedShift {
                turno: t.clone(),
                ragioni,
            }),
        }
    }

    for r in &bozza.assegnazioni {
        match validate_draft_rest(ctx, r)? {
            Ok(()) => out.riposi_accettati.push(r.clone()),
            Err(ragione) => out.riposi_respinti.push(RejectedRest {
                riposo: r.clone(),
                ragione,
            }),
        }
    }

    if !out.all_accepted() {
        out.warnings.push(Warning::avviso(
            WarningCategory::Bozza,
            format!(
                "bozza parzialmente respinta: {} turni e {} riposi scartati",
                out.turni_respinti.len(),
                out.riposi_respinti.len()
            ),
        ));
    }

    Ok(out)
}

type ShiftVerdict = std::result::Result<(), Vec<String>>;
type RestVerdict = std::result::Result<(), String>;

fn validate_draft_shift(
    ctx: &ContextSnapshot,
    t: &DraftShift,
    accettati: &[DraftShift],
    warnings: &mut Vec<Warning>,
) -> Result<ShiftVerdict, EngineError> {
    let mut ragioni = Vec::new();

    let range = match TimeRange::new(t.ora_inizio, t.ora_fine) {
        Ok(r) => r,
        Err(_) => return Ok(Err(vec!["fascia oraria non valida".to_string()])),
    };
    if ctx.find_team(&t.nucleo_id).is_none() {
        ragioni.push(format!("nucleo sconosciuto: {}", t.nucleo_id.as_str()));
    }
    if ctx.find_worker(&t.collaboratore_id).is_none() {
        ragioni.push(format!(
            "collaboratore sconosciuto: {}",
            t.collaboratore_id.as_str()
        ));
    }
    if !ragioni.is_empty() {
        return Ok(Err(ragioni));
    }

    let report = conflict::detect_conflicts(ctx, &t.nucleo_id, t.data, &range, None)?;
    for c in report
        .conflitti
        .iter()
        .filter(|c| c.collaboratore_id == t.collaboratore_id)
    {
        ragioni.push(c.descrizione.clone());
    }

    let outcome = constraints::validate_assignment(ctx, &t.collaboratore_id, t.data, &range)?;
    for v in &outcome.violazioni {
        match v.severita {
            Severity::Hard => ragioni.push(v.descrizione.clone()),
            Severity::Soft => {
                let mut w = Warning::avviso(
                    WarningCategory::Bozza,
                    format!("turno in bozza con vincolo in avviso: {}", v.descrizione),
                );
                w.collaboratore_id = Some(t.collaboratore_id.clone());
                w.data = Some(t.data);
                warnings.push(w);
            }
        }
    }

    let sovrapposto = accettati.iter().any(|a| {
        a.collaboratore_id == t.collaboratore_id
            && a.data == t.data
            && TimeRange::new(a.ora_inizio, a.ora_fine)
                .map(|ar| ar.overlaps(&range))
                .unwrap_or(false)
    });
    if sovrapposto {
        ragioni.push("sovrapposto a un altro turno della bozza".to_string());
    }

    if ragioni.is_empty() {
        Ok(Ok(()))
    } else {
        Ok(Err(ragioni))
    }
}

fn validate_draft_rest(ctx: &ContextSnapshot, r: &DraftRestAssignment) -> Result<RestVerdict, EngineError> {
    if ctx.find_team(&r.nucleo_id).is_none() {
        return Ok(Err(format!("nucleo sconosciuto: {}", r.nucleo_id.as_str())));
    }
    if ctx.find_worker(&r.collaboratore_id).is_none() {
        return Ok(Err(format!(
            "collaboratore sconosciuto: {}",
            r.collaboratore_id.as_str()
        )));
    }

    let esito = gatekeeper::check_slot_availability(
        ctx,
        &r.nucleo_id,
        r.data,
        &r.collaboratore_id,
        RequestKind::Riposo,
    )?;
    if esito.disponibile {
        Ok(Ok(()))
    } else {
        Ok(Err(esito
            .motivo
            .unwrap_or_else(|| "copertura insufficiente".to_string())))
    }
}
