use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::ContextSnapshot;
use crate::error::EngineError;
use crate::model::{ConstraintRule, ConstraintTemplate, Severity, Worker, WorkerId};
use crate::timeutil::{self, TimeRange};

/// Violazione rilevata, con la severità del vincolo che l'ha prodotta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub vincolo_id: String,
    pub nome: String,
    pub severita: Severity,
    pub descrizione: String,
}

/// Esito della validazione: le violazioni SOFT avvisano, le HARD bloccano.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub violazioni: Vec<ConstraintViolation>,
}

impl ValidationOutcome {
    pub fn has_hard_violation(&self) -> bool {
        self.violazioni.iter().any(|v| v.severita == Severity::Hard)
    }

    pub fn soft_violations(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violazioni.iter().filter(|v| v.severita == Severity::Soft)
    }
}

/// Valida l'assegnazione proposta contro i vincoli attivi per il collaboratore.
pub fn validate_assignment(
    ctx: &ContextSnapshot,
    collaboratore_id: &WorkerId,
    data: NaiveDate,
    range: &TimeRange,
) -> Result<ValidationOutcome, EngineError> {
    let worker = ctx.require_worker(collaboratore_id)?;
    Ok(validate_for_worker(ctx, worker, data, range))
}

/// Variante senza ricerca per id, per i chiamanti che hanno già il riferimento.
pub fn validate_for_worker(
    ctx: &ContextSnapshot,
    worker: &Worker,
    data: NaiveDate,
    range: &TimeRange,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for v in &ctx.vincoli {
        if !applies_to(v, worker) {
            continue;
        }
        match v.regola {
            ConstraintRule::WeeklyHourCap { max_ore } => {
                check_weekly_cap(ctx, worker, data, range, v, max_ore, &mut outcome);
            }
            ConstraintRule::MinimumRest { ore } => {
                check_minimum_rest(ctx, worker, data, range, v, ore, &mut outcome);
            }
        }
    }

    outcome
}

/// Un vincolo vale se globale o se scoped a un nucleo di appartenenza.
fn applies_to(v: &ConstraintTemplate, worker: &Worker) -> bool {
    match &v.nucleo_id {
        None => true,
        Some(id) => worker.nuclei.contains(id),
    }
}

/// Minuti già assegnati nella settimana con lunedì iniziale, più la proposta.
fn check_weekly_cap(
    ctx: &ContextSnapshot,
    worker: &Worker,
    data: NaiveDate,
    range: &TimeRange,
    vincolo: &ConstraintTemplate,
    max_ore: f64,
    outcome: &mut ValidationOutcome,
) {
    let lunedi = timeutil::monday_of(data);
    let existing: i64 = ctx
        .active_assignments_for(&worker.id)
        .filter(|a| {
            let offset = (a.data - lunedi).num_days();
            (0..7).contains(&offset)
        })
        .map(|a| a.duration_minutes())
        .sum();

    let totale = existing + range.duration_minutes();
    let massimo = (max_ore * 60.0).round() as i64;
    if totale > massimo {
        outcome.violazioni.push(ConstraintViolation {
            vincolo_id: vincolo.id.clone(),
            nome: vincolo.nome.clone(),
            severita: vincolo.severita,
            descrizione: format!(
                "ore settimanali {:.1} oltre il massimo di {:.1}",
                totale as f64 / 60.0,
                max_ore
            ),
        });
    }
}

/// Riposo tra la fine dell'ultimo turno di ieri e l'inizio proposto.
/// Nessun turno ieri = vincolo soddisfatto.
fn check_minimum_rest(
    ctx: &ContextSnapshot,
    worker: &Worker,
    data: NaiveDate,
    range: &TimeRange,
    vincolo: &ConstraintTemplate,
    ore: f64,
    outcome: &mut ValidationOutcome,
) {
    let ieri = match data.pred_opt() {
        Some(d) => d,
        None => return,
    };

    let ultimo = ctx
        .active_assignments_for(&worker.id)
        .filter(|a| a.data == ieri)
        .max_by_key(|a| a.ora_fine);
    let ultimo = match ultimo {
        Some(a) => a,
        None => return,
    };

    let fine_ieri = timeutil::minutes_from_midnight(ultimo.ora_fine);
    let inizio_oggi = timeutil::minutes_from_midnight(range.inizio);
    let riposo = (24 * 60 - fine_ieri) + inizio_oggi;

    let minimo = (ore * 60.0).round() as u32;
    if riposo < minimo {
        outcome.violazioni.push(ConstraintViolation {
            vincolo_id: vincolo.id.clone(),
            nome: vincolo.nome.clone(),
            severita: vincolo.severita,
            descrizione: format!(
                "riposo di {:.1} ore sotto il minimo di {:.1}",
                f64::from(riposo) / 60.0,
                ore
            ),
        });
    }
}
