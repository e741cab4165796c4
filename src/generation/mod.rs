mod stats;

pub use stats::{CoverageStats, WorkerLoad, WorkloadDistribution};

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability;
use crate::constraints;
use crate::context::{ContextSnapshot, RuntimeHours};
use crate::diagnostics::{Diagnostics, Warning, WarningCategory};
use crate::error::EngineError;
use crate::model::{
    CoverageStatus, GeneratedShift, PreferenceLevel, Severity, ShiftCandidate, Team, WorkerId,
};
use crate::scoring;
use crate::staffing;
use crate::timeutil;

/// Risultato completo della generazione settimanale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub turni: Vec<GeneratedShift>,
    pub coverage_stats: CoverageStats,
    pub workload_distribution: WorkloadDistribution,
    pub warnings: Vec<Warning>,
    pub confidence_average: f64,
}

impl GenerationResult {
    /// Contratto verso i servizi chiamanti per i guasti a monte: zero turni
    /// e un solo avviso esplicativo. Il motore non ritenta mai.
    pub fn failed<M: Into<String>>(messaggio: M) -> Self {
        Self {
            turni: Vec::new(),
            coverage_stats: CoverageStats::empty(),
            workload_distribution: WorkloadDistribution::empty(),
            warnings: vec![Warning::errore(WarningCategory::Upstream, messaggio)],
            confidence_average: 0.0,
        }
    }
}

/// Passata deterministica data × nucleo sull'intera settimana.
///
/// Pura funzione dello snapshot: a parità di input l'output è identico byte
/// per byte. Le ore accumulate dai selezionati riducono i residui visti dai
/// giorni successivi della stessa passata.
pub fn generate_week_shifts(ctx: &ContextSnapshot) -> Result<GenerationResult, EngineError> {
    if ctx.week_end < ctx.week_start {
        return Err(EngineError::InvalidWeek("weekEnd precedes weekStart"));
    }

    let mut runtime = RuntimeHours::seeded_from(ctx);
    let mut diag = Diagnostics::new();
    let mut turni = Vec::new();

    for data in ctx.week_days() {
        for team in &ctx.nuclei {
            turni.push(build_shift(ctx, team, data, &mut runtime, &mut diag));
        }
    }

    let coverage_stats = stats::coverage_stats(&turni);
    let workload_distribution = stats::workload_distribution(ctx, &runtime);
    for load in &workload_distribution.per_collaboratore {
        if load.ore_assegnate > load.ore_contrattuali {
            let mut w = Warning::avviso(
                WarningCategory::OreEccedenti,
                format!(
                    "{}: {:.1} ore assegnate su {:.1} contrattuali",
                    load.nome, load.ore_assegnate, load.ore_contrattuali
                ),
            );
            w.collaboratore_id = Some(load.collaboratore_id.clone());
            diag.push(w);
        }
    }
    let confidence_average = stats::confidence_average(&turni);

    #[cfg(feature = "logging")]
    tracing::debug!(
        turni = turni.len(),
        scoperti = coverage_stats.scoperti,
        "passata di generazione completata"
    );

    Ok(GenerationResult {
        turni,
        coverage_stats,
        workload_distribution,
        warnings: diag.into_vec(),
        confidence_average,
    })
}

/// Costruisce il turno di un nucleo su una data, registrando ore e impegni.
fn build_shift(
    ctx: &ContextSnapshot,
    team: &Team,
    data: NaiveDate,
    runtime: &mut RuntimeHours,
    diag: &mut Diagnostics,
) -> GeneratedShift {
    let required = staffing::required_staff(ctx, team, data);
    let schedule = staffing::resolve_schedule(ctx, team, data);
    let range = schedule.time_range();

    let mut records = availability::compute_availability(ctx, team, data, schedule.ore, runtime);

    let mut note_soft: HashMap<WorkerId, String> = HashMap::new();
    for r in records.iter_mut() {
        if !r.disponibile {
            continue;
        }
        if runtime.already_booked(&r.collaboratore_id, data, &range) {
            r.disponibile = false;
            r.motivo = Some("già selezionato su una fascia sovrapposta".to_string());
            r.preferenza = None;
            continue;
        }
        let worker = match ctx.find_worker(&r.collaboratore_id) {
            Some(w) => w,
            None => continue,
        };
        let outcome = constraints::validate_for_worker(ctx, worker, data, &range);
        if outcome.has_hard_violation() {
            let hard = outcome
                .violazioni
                .iter()
                .find(|v| v.severita == Severity::Hard);
            r.disponibile = false;
            r.motivo = hard.map(|v| format!("vincolo violato: {}", v.descrizione));
            r.preferenza = None;
        } else if let Some(v) = outcome.soft_violations().next() {
            note_soft.insert(
                r.collaboratore_id.clone(),
                format!("vincolo in avviso: {}", v.descrizione),
            );
        }
    }

    let mut candidati = scoring::rank_and_select(ctx, &team.id, records, required);
    for c in candidati.iter_mut() {
        if let Some(nota) = note_soft.remove(&c.collaboratore_id) {
            c.nota = Some(nota);
        }
    }

    let selezionati = candidati.iter().filter(|c| c.selezionato).count() as u32;
    let copertura = if selezionati >= required {
        CoverageStatus::Ok
    } else if selezionati > 0 {
        CoverageStatus::Partial
    } else {
        CoverageStatus::Uncovered
    };

    let warning = match copertura {
        CoverageStatus::Ok => None,
        CoverageStatus::Partial => {
            let msg = format!(
                "copertura parziale per {} il {}: {} su {}",
                team.nome,
                timeutil::data_breve(data),
                selezionati,
                required
            );
            let mut w = Warning::avviso(WarningCategory::Copertura, msg.clone());
            w.nucleo_id = Some(team.id.clone());
            w.data = Some(data);
            diag.push(w);
            Some(msg)
        }
        CoverageStatus::Uncovered => {
            let msg = format!(
                "turno scoperto per {} il {}: nessun disponibile su {} richiesti",
                team.nome,
                timeutil::data_breve(data),
                required
            );
            let mut w = Warning::errore(WarningCategory::Copertura, msg.clone());
            w.nucleo_id = Some(team.id.clone());
            w.data = Some(data);
            diag.push(w);
            Some(msg)
        }
    };

    let mut qualche_preferito = false;
    let mut qualche_trasferito = false;
    for c in candidati.iter().filter(|c| c.selezionato) {
        runtime.record_selection(&c.collaboratore_id, data, range, schedule.ore);
        if c.preferenza == Some(PreferenceLevel::Preferita) {
            qualche_preferito = true;
        }
        if let Some(origine) = &c.nucleo_provenienza {
            qualche_trasferito = true;
            let nome = worker_name(ctx, &c.collaboratore_id);
            let nome_origine = ctx
                .find_team(origine)
                .map(|t| t.nome.clone())
                .unwrap_or_else(|| origine.as_str().to_string());
            let mut w = Warning::info(
                WarningCategory::Trasferimento,
                format!(
                    "{} impiegato su {} provenendo dal nucleo {}",
                    nome, team.nome, nome_origine
                ),
            );
            w.nucleo_id = Some(team.id.clone());
            w.collaboratore_id = Some(c.collaboratore_id.clone());
            w.data = Some(data);
            diag.push(w);
        }
    }

    let base = match copertura {
        CoverageStatus::Ok => 0.9,
        CoverageStatus::Partial => 0.6,
        CoverageStatus::Uncovered => 0.3,
    };
    let mut confidenza = base;
    if qualche_preferito {
        confidenza += 0.05;
    }
    if qualche_trasferito {
        confidenza -= 0.05;
    }

    let reasoning = build_reasoning(ctx, data, required, copertura, &candidati);

    GeneratedShift {
        nucleo_id: team.id.clone(),
        data,
        ora_inizio: schedule.inizio,
        ora_fine: schedule.fine,
        num_collaboratori_richiesti: required,
        candidati,
        copertura,
        confidenza,
        reasoning,
        warning,
    }
}

/// Motivazione leggibile per l'amministratore, in ordine di graduatoria.
fn build_reasoning(
    ctx: &ContextSnapshot,
    data: NaiveDate,
    required: u32,
    copertura: CoverageStatus,
    candidati: &[ShiftCandidate],
) -> String {
    let giorno = timeutil::weekday_number(data);
    let selezionati: Vec<&ShiftCandidate> = candidati.iter().filter(|c| c.selezionato).collect();

    let mut out = format!(
        "{} {}: richiesti {}, selezionati {} su {} candidati.",
        timeutil::nome_giorno(giorno),
        timeutil::data_breve(data),
        required,
        selezionati.len(),
        candidati.len()
    );

    match copertura {
        CoverageStatus::Ok => {}
        CoverageStatus::Partial => out.push_str(" Copertura parziale."),
        CoverageStatus::Uncovered => out.push_str(" Nessun collaboratore disponibile."),
    }

    let preferiti: Vec<String> = selezionati
        .iter()
        .filter(|c| c.preferenza == Some(PreferenceLevel::Preferita))
        .map(|c| worker_name(ctx, &c.collaboratore_id))
        .collect();
    if !preferiti.is_empty() {
        out.push_str(&format!(" Preferenze rispettate: {}.", preferiti.join(", ")));
    }

    let trasferiti: Vec<String> = selezionati
        .iter()
        .filter_map(|c| {
            c.nucleo_provenienza.as_ref().map(|origine| {
                let nome_origine = ctx
                    .find_team(origine)
                    .map(|t| t.nome.clone())
                    .unwrap_or_else(|| origine.as_str().to_string());
                format!("{} (da {})", worker_name(ctx, &c.collaboratore_id), nome_origine)
            })
        })
        .collect();
    if !trasferiti.is_empty() {
        out.push_str(&format!(" Da altri nuclei: {}.", trasferiti.join(", ")));
    }

    out
}

fn worker_name(ctx: &ContextSnapshot, id: &WorkerId) -> String {
    ctx.find_worker(id)
        .map(|w| w.nome.clone())
        .unwrap_or_else(|| id.as_str().to_string())
}
