use std::cmp::Ordering;

use crate::availability::AvailabilityRecord;
use crate::context::ContextSnapshot;
use crate::model::{PreferenceLevel, ShiftCandidate, TeamId};

/// Graduatoria e selezione dei primi `required` disponibili.
///
/// L'ordinamento segue le regole, non il punteggio numerico: disponibili
/// prima degli indisponibili, poi preferenza Preferita, poi ore residue
/// decrescenti, poi nucleo primario coincidente con quello del turno. È un
/// ordinamento stabile: a parità vince l'ordine dei membri nello snapshot.
/// La lista restituita è completa, indisponibili (annotati) inclusi.
pub fn rank_and_select(
    ctx: &ContextSnapshot,
    nucleo_id: &TeamId,
    mut records: Vec<AvailabilityRecord>,
    required: u32,
) -> Vec<ShiftCandidate> {
    records.sort_by(|a, b| {
        b.disponibile
            .cmp(&a.disponibile)
            .then_with(|| is_preferred(b).cmp(&is_preferred(a)))
            .then_with(|| {
                b.ore_residue
                    .partial_cmp(&a.ore_residue)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| {
                primary_team_matches(ctx, b, nucleo_id)
                    .cmp(&primary_team_matches(ctx, a, nucleo_id))
            })
    });

    let mut selected = 0u32;
    records
        .into_iter()
        .map(|r| {
            let selezionato = r.disponibile && selected < required;
            if selezionato {
                selected += 1;
            }
            let punteggio = display_score(&r);
            let nucleo_provenienza = relocation_source(ctx, &r, nucleo_id);
            ShiftCandidate {
                collaboratore_id: r.collaboratore_id,
                disponibile: r.disponibile,
                ore_residue: r.ore_residue,
                preferenza: r.preferenza,
                nucleo_provenienza,
                punteggio,
                selezionato,
                nota: r.motivo,
            }
        })
        .collect()
}

fn is_preferred(r: &AvailabilityRecord) -> bool {
    r.preferenza == Some(PreferenceLevel::Preferita)
}

fn primary_team_matches(ctx: &ContextSnapshot, r: &AvailabilityRecord, nucleo_id: &TeamId) -> bool {
    ctx.find_worker(&r.collaboratore_id)
        .and_then(|w| w.nucleo_primario.as_ref())
        .map_or(false, |p| p == nucleo_id)
}

/// Nucleo primario di provenienza quando differisce dal nucleo del turno.
fn relocation_source(
    ctx: &ContextSnapshot,
    r: &AvailabilityRecord,
    nucleo_id: &TeamId,
) -> Option<TeamId> {
    ctx.find_worker(&r.collaboratore_id)
        .and_then(|w| w.nucleo_primario.as_ref())
        .filter(|p| *p != nucleo_id)
        .cloned()
}

/// Punteggio solo espositivo; il residuo è stretto in [0, 40] perché un
/// residuo negativo non deve mai pesare.
fn display_score(r: &AvailabilityRecord) -> f64 {
    let disponibile = if r.disponibile { 100.0 } else { 0.0 };
    let preferito = if is_preferred(r) { 50.0 } else { 0.0 };
    disponibile + preferito + r.ore_residue.clamp(0.0, 40.0)
}
