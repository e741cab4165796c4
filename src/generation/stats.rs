use serde::{Deserialize, Serialize};

use crate::context::{ContextSnapshot, RuntimeHours};
use crate::model::{CoverageStatus, GeneratedShift, WorkerId};

/// Statistiche aggregate di copertura della settimana.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub totale: u32,
    pub coperti: u32,
    pub parziali: u32,
    pub scoperti: u32,
    pub percentuale: f64,
}

impl CoverageStats {
    pub fn empty() -> Self {
        Self {
            totale: 0,
            coperti: 0,
            parziali: 0,
            scoperti: 0,
            percentuale: 0.0,
        }
    }
}

/// Carico di un collaboratore a fine passata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerLoad {
    pub collaboratore_id: WorkerId,
    pub nome: String,
    pub ore_contrattuali: f64,
    pub ore_assegnate: f64,
    /// Percentuale di utilizzo del monte ore contrattuale.
    pub utilizzo: f64,
}

/// Distribuzione del carico con indice di equità in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadDistribution {
    pub per_collaboratore: Vec<WorkerLoad>,
    pub equita_score: f64,
}

impl WorkloadDistribution {
    pub fn empty() -> Self {
        Self {
            per_collaboratore: Vec::new(),
            equita_score: 1.0,
        }
    }
}

/// Conteggi di copertura; la percentuale conta solo i turni pienamente coperti.
pub fn coverage_stats(turni: &[GeneratedShift]) -> CoverageStats {
    let mut stats = CoverageStats::empty();
    for t in turni {
        stats.totale += 1;
        match t.copertura {
            CoverageStatus::Ok => stats.coperti += 1,
            CoverageStatus::Partial => stats.parziali += 1,
            CoverageStatus::Uncovered => stats.scoperti += 1,
        }
    }
    if stats.totale > 0 {
        stats.percentuale = f64::from(stats.coperti) / f64::from(stats.totale) * 100.0;
    }
    stats
}

/// Utilizzo per collaboratore nell'ordine dello snapshot, con equità.
pub fn workload_distribution(ctx: &ContextSnapshot, runtime: &RuntimeHours) -> WorkloadDistribution {
    let per_collaboratore: Vec<WorkerLoad> = ctx
        .collaboratori
        .iter()
        .map(|w| {
            let ore_assegnate = runtime.assigned_hours(&w.id);
            let utilizzo = if w.ore_settimanali > 0.0 {
                ore_assegnate / w.ore_settimanali * 100.0
            } else {
                0.0
            };
            WorkerLoad {
                collaboratore_id: w.id.clone(),
                nome: w.nome.clone(),
                ore_contrattuali: w.ore_settimanali,
                ore_assegnate,
                utilizzo,
            }
        })
        .collect();

    let utilizzi: Vec<f64> = per_collaboratore.iter().map(|l| l.utilizzo).collect();
    WorkloadDistribution {
        per_collaboratore,
        equita_score: equity_score(&utilizzi),
    }
}

/// `max(0, 1 − σ/100)` con σ deviazione standard di popolazione degli
/// utilizzi percentuali. Insieme vuoto = equità piena.
fn equity_score(utilizzi: &[f64]) -> f64 {
    if utilizzi.is_empty() {
        return 1.0;
    }
    let n = utilizzi.len() as f64;
    let media = utilizzi.iter().sum::<f64>() / n;
    let varianza = utilizzi.iter().map(|u| (u - media).powi(2)).sum::<f64>() / n;
    (1.0 - varianza.sqrt() / 100.0).max(0.0)
}

/// Media delle confidenze; zero turni = 0.0.
pub fn confidence_average(turni: &[GeneratedShift]) -> f64 {
    if turni.is_empty() {
        return 0.0;
    }
    turni.iter().map(|t| t.confidenza).sum::<f64>() / turni.len() as f64
}
