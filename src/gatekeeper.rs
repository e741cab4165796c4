use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::{self, AvailabilityRecord};
use crate::context::{ContextSnapshot, RuntimeHours};
use crate::error::EngineError;
use crate::model::{TeamId, WorkerId};
use crate::staffing;
use crate::timeutil;

/// Tipo di richiesta sottoposta al controllo di copertura.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Riposo,
    Ferie,
    Permesso,
    Indisponibilita,
}

impl RequestKind {
    pub fn descrizione(&self) -> &'static str {
        match self {
            RequestKind::Riposo => "riposo",
            RequestKind::Ferie => "ferie",
            RequestKind::Permesso => "permesso",
            RequestKind::Indisponibilita => "indisponibilità",
        }
    }
}

/// Dettagli numerici allegati a un blocco di copertura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailabilityDetails {
    pub copertura_minima: u32,
    pub copertura_attuale: u32,
    pub copertura_se_approvato: u32,
    /// Membri disponibili di almeno due nuclei che potrebbero in linea di
    /// principio coprire; la riassegnazione resta una decisione umana.
    pub altri_disponibili: Vec<WorkerId>,
}

/// Esito del controllo "ultimo uomo rimasto" su un singolo giorno.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub disponibile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dettagli: Option<SlotAvailabilityDetails>,
}

/// Esito su una richiesta multi-giorno: ogni giorno riportato, basta un
/// giorno bloccato per respingere l'intera richiesta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiSlotAvailability {
    pub disponibile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
    pub esiti_giorno: Vec<DayOutcome>,
}

/// Esito del controllo per una singola data della richiesta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutcome {
    pub data: NaiveDate,
    pub esito: SlotAvailability,
}

/// Decide se concedere la richiesta senza far scendere il nucleo sotto il
/// proprio minimo di copertura.
///
/// Il controllo non riassegna mai nessuno: quando blocca, elenca i membri
/// multi-nucleo disponibili come pura indicazione per chi approva.
pub fn check_slot_availability(
    ctx: &ContextSnapshot,
    nucleo_id: &TeamId,
    data: NaiveDate,
    collaboratore_id: &WorkerId,
    tipo: RequestKind,
) -> Result<SlotAvailability, EngineError> {
    let team = ctx.require_team(nucleo_id)?;
    ctx.require_worker(collaboratore_id)?;

    let schedule = staffing::resolve_schedule(ctx, team, data);
    let runtime = RuntimeHours::seeded_from(ctx);
    let records = availability::compute_availability(ctx, team, data, schedule.ore, &runtime);

    let requester = records
        .iter()
        .find(|r| &r.collaboratore_id == collaboratore_id);

    let requester = match requester {
        None => {
            // Richiedente esterno al nucleo: nessun impatto sulla copertura.
            return Ok(SlotAvailability {
                disponibile: true,
                motivo: Some("il collaboratore non è membro del nucleo".to_string()),
                dettagli: None,
            });
        }
        Some(r) => r,
    };

    if !requester.disponibile {
        let motivo = requester
            .motivo
            .clone()
            .unwrap_or_else(|| "indisponibile".to_string());
        return Ok(SlotAvailability {
            disponibile: true,
            motivo: Some(format!("già indisponibile ({motivo})")),
            dettagli: None,
        });
    }

    let attuale = availability::available_count(&records) as u32;
    let se_approvato = attuale.saturating_sub(1);
    let minima = team.personale_minimo;

    if se_approvato >= minima {
        return Ok(SlotAvailability {
            disponibile: true,
            motivo: None,
            dettagli: None,
        });
    }

    let altri = cover_candidates(ctx, &records, collaboratore_id);
    Ok(SlotAvailability {
        disponibile: false,
        motivo: Some(format!(
            "richiesta di {} bloccata: il nucleo scenderebbe a {} disponibili, sotto il minimo di {}",
            tipo.descrizione(),
            se_approvato,
            minima
        )),
        dettagli: Some(SlotAvailabilityDetails {
            copertura_minima: minima,
            copertura_attuale: attuale,
            copertura_se_approvato: se_approvato,
            altri_disponibili: altri,
        }),
    })
}

/// Riesegue il controllo su ogni data della richiesta, estremi inclusi.
pub fn check_multi_slot_availability(
    ctx: &ContextSnapshot,
    nucleo_id: &TeamId,
    data_inizio: NaiveDate,
    data_fine: NaiveDate,
    collaboratore_id: &WorkerId,
    tipo: RequestKind,
) -> Result<MultiSlotAvailability, EngineError> {
    if data_fine < data_inizio {
        return Err(EngineError::InvalidDateRange);
    }

    let mut esiti = Vec::new();
    let mut motivo = None;
    for data in timeutil::giorni_inclusi(data_inizio, data_fine) {
        let esito = check_slot_availability(ctx, nucleo_id, data, collaboratore_id, tipo)?;
        if !esito.disponibile && motivo.is_none() {
            motivo = Some(format!(
                "giorno {} bloccato: {}",
                timeutil::data_breve(data),
                esito.motivo.clone().unwrap_or_default()
            ));
        }
        esiti.push(DayOutcome { data, esito });
    }

    Ok(MultiSlotAvailability {
        disponibile: motivo.is_none(),
        motivo,
        esiti_giorno: esiti,
    })
}

/// Disponibili multi-nucleo diversi dal richiedente, in ordine di membri.
fn cover_candidates(
    ctx: &ContextSnapshot,
    records: &[AvailabilityRecord],
    richiedente: &WorkerId,
) -> Vec<WorkerId> {
    records
        .iter()
        .filter(|r| r.disponibile && &r.collaboratore_id != richiedente)
        .filter(|r| {
            ctx.find_worker(&r.collaboratore_id)
                .map_or(false, |w| w.nuclei.len() >= 2)
        })
        .map(|r| r.collaboratore_id.clone())
        .collect()
}
