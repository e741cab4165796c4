use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::context::ContextSnapshot;
use crate::error::EngineError;
use crate::model::{PreferenceLevel, TeamId, WorkerId};
use crate::timeutil::{self, TimeRange};

/// Entità con cui una proposta entra in conflitto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictEntity {
    Turno,
    Preferenza,
    Assenza,
}

/// Singolo conflitto rilevato, con descrizione leggibile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub collaboratore_id: WorkerId,
    pub entita: ConflictEntity,
    pub descrizione: String,
}

/// Esito completo della scansione conflitti.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflitti: Vec<ScheduleConflict>,
}

impl ConflictReport {
    pub fn has_conflicts(&self) -> bool {
        !self.conflitti.is_empty()
    }
}

/// Membro del nucleo libero per lo slot, con punteggio di preferenza.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCollaborator {
    pub collaboratore_id: WorkerId,
    pub punteggio: u32,
}

/// Conflitti della fascia proposta con gli impegni dei membri del nucleo.
///
/// I controlli non si interrompono al primo esito: ogni turno sovrapposto,
/// ogni preferenza positiva con fascia sovrapposta e ogni assenza sulla data
/// viene accumulata. Le sovrapposizioni sono semiaperte.
pub fn detect_conflicts(
    ctx: &ContextSnapshot,
    nucleo_id: &TeamId,
    data: NaiveDate,
    range: &TimeRange,
    escluso: Option<&WorkerId>,
) -> Result<ConflictReport, EngineError> {
    let team = ctx.require_team(nucleo_id)?;

    let mut report = ConflictReport::default();
    for member in &team.membri {
        if escluso == Some(member) {
            continue;
        }
        report
            .conflitti
            .extend(member_conflicts(ctx, member, data, range));
    }
    Ok(report)
}

/// Conflitti del singolo membro con lo slot proposto.
fn member_conflicts(
    ctx: &ContextSnapshot,
    member: &WorkerId,
    data: NaiveDate,
    range: &TimeRange,
) -> Vec<ScheduleConflict> {
    let mut out = Vec::new();

    for a in ctx.active_assignments_for(member) {
        if a.data == data && a.time_range().overlaps(range) {
            out.push(ScheduleConflict {
                collaboratore_id: member.clone(),
                entita: ConflictEntity::Turno,
                descrizione: format!(
                    "turno esistente {}-{} il {}",
                    a.ora_inizio.format("%H:%M"),
                    a.ora_fine.format("%H:%M"),
                    timeutil::data_breve(a.data)
                ),
            });
        }
    }

    // Una preferenza positiva blocca solo se porta una fascia esplicita
    // sovrapposta; quella sulla sola data resta un segnale per la graduatoria.
    for p in ctx.preferences_on(member, data) {
        if p.tipo == PreferenceLevel::NonDisponibile {
            continue;
        }
        if let Some(pr) = p.time_range() {
            if pr.overlaps(range) {
                out.push(ScheduleConflict {
                    collaboratore_id: member.clone(),
                    entita: ConflictEntity::Preferenza,
                    descrizione: format!(
                        "preferenza {} nella fascia {}-{}",
                        p.tipo.descrizione(),
                        pr.inizio.format("%H:%M"),
                        pr.fine.format("%H:%M")
                    ),
                });
            }
        }
    }

    if let Some(l) = ctx.leave_on(member, data) {
        out.push(ScheduleConflict {
            collaboratore_id: member.clone(),
            entita: ConflictEntity::Assenza,
            descrizione: format!(
                "assenza approvata ({}) il {}",
                l.tipo.descrizione(),
                timeutil::data_breve(data)
            ),
        });
    }

    out
}

/// Membri del nucleo senza conflitti diretti sullo slot, ordinati per
/// punteggio di preferenza decrescente (pareggi nell'ordine dei membri).
pub fn find_available_collaborators(
    ctx: &ContextSnapshot,
    nucleo_id: &TeamId,
    data: NaiveDate,
    range: &TimeRange,
) -> Result<Vec<RankedCollaborator>, EngineError> {
    let team = ctx.require_team(nucleo_id)?;

    let mut out: Vec<RankedCollaborator> = team
        .membri
        .iter()
        .filter(|m| member_conflicts(ctx, m, data, range).is_empty())
        .map(|m| RankedCollaborator {
            collaboratore_id: m.clone(),
            punteggio: preference_score(ctx, m, data),
        })
        .collect();
    out.sort_by(|a, b| b.punteggio.cmp(&a.punteggio));
    Ok(out)
}

/// Punteggio 10-90 dalla preferenza del membro sulla data.
fn preference_score(ctx: &ContextSnapshot, member: &WorkerId, data: NaiveDate) -> u32 {
    if ctx.unavailable_on(member, data) {
        return 10;
    }
    match ctx.positive_preference_on(member, data) {
        Some(PreferenceLevel::Preferita) => 90,
        Some(PreferenceLevel::Disponibile) => 70,
        _ => 50,
    }
}
