use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::{ContextSnapshot, RuntimeHours};
use crate::model::{PreferenceLevel, RestDayAssignment, Team, Worker, WorkerId};
use crate::timeutil;

/// Esito di disponibilità di un collaboratore per uno slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub collaboratore_id: WorkerId,
    pub disponibile: bool,
    pub ore_residue: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferenza: Option<PreferenceLevel>,
}

/// Disponibilità di tutti i membri del nucleo per lo slot indicato.
///
/// Le cause di indisponibilità si valutano in quest'ordine, e la prima vera
/// chiude il caso: riposo assegnato sul giorno, assenza approvata sulla data,
/// ore residue sotto la durata del turno, preferenza di non disponibilità.
pub fn compute_availability(
    ctx: &ContextSnapshot,
    team: &Team,
    data: NaiveDate,
    ore_turno: f64,
    runtime: &RuntimeHours,
) -> Vec<AvailabilityRecord> {
    compute_availability_overlaid(ctx, team, data, ore_turno, runtime, &[])
}

/// Come [`compute_availability`], con in più riposi non ancora persistiti da
/// sovrapporre allo snapshot (usato dal fold multi-collaboratore dei riposi).
pub fn compute_availability_overlaid(
    ctx: &ContextSnapshot,
    team: &Team,
    data: NaiveDate,
    ore_turno: f64,
    runtime: &RuntimeHours,
    riposi_extra: &[RestDayAssignment],
) -> Vec<AvailabilityRecord> {
    ctx.members_of(team)
        .map(|w| worker_availability(ctx, w, data, ore_turno, runtime, riposi_extra))
        .collect()
}

fn worker_availability(
    ctx: &ContextSnapshot,
    worker: &Worker,
    data: NaiveDate,
    ore_turno: f64,
    runtime: &RuntimeHours,
    riposi_extra: &[RestDayAssignment],
) -> AvailabilityRecord {
    let giorno = timeutil::weekday_number(data);
    let ore_residue = runtime.residual_hours(worker);

    let riposo = ctx
        .rests_on_weekday(&worker.id, giorno)
        .map(|r| r.tipo)
        .chain(
            riposi_extra
                .iter()
                .filter(|r| r.collaboratore_id == worker.id && r.giorno_settimana == giorno)
                .map(|r| r.tipo),
        )
        .next();
    if let Some(tipo) = riposo {
        return unavailable(
            worker,
            ore_residue,
            format!("riposo assegnato: {}", tipo.descrizione()),
        );
    }

    if let Some(leave) = ctx.leave_on(&worker.id, data) {
        return unavailable(
            worker,
            ore_residue,
            format!("assenza approvata: {}", leave.tipo.descrizione()),
        );
    }

    if ore_residue < ore_turno {
        return unavailable(worker, ore_residue, "ore residue insufficienti".to_string());
    }

    if ctx.unavailable_on(&worker.id, data) {
        return unavailable(
            worker,
            ore_residue,
            "non disponibile per preferenza".to_string(),
        );
    }

    AvailabilityRecord {
        collaboratore_id: worker.id.clone(),
        disponibile: true,
        ore_residue,
        motivo: None,
        preferenza: ctx.positive_preference_on(&worker.id, data),
    }
}

fn unavailable(worker: &Worker, ore_residue: f64, motivo: String) -> AvailabilityRecord {
    AvailabilityRecord {
        collaboratore_id: worker.id.clone(),
        disponibile: false,
        ore_residue,
        motivo: Some(motivo),
        preferenza: None,
    }
}

/// Conteggio dei disponibili in un insieme di esiti.
pub fn available_count(records: &[AvailabilityRecord]) -> usize {
    records.iter().filter(|r| r.disponibile).count()
}
