use chrono::{NaiveDate, NaiveTime};

use crate::context::ContextSnapshot;
use crate::model::{HistoricalPattern, Team};
use crate::timeutil::{self, TimeRange};

/// Orario risolto per il turno di un nucleo in una data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftSchedule {
    pub inizio: NaiveTime,
    pub fine: NaiveTime,
    /// Ore lavorative conteggiate sul monte ore del collaboratore.
    pub ore: f64,
}

impl ShiftSchedule {
    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            inizio: self.inizio,
            fine: self.fine,
        }
    }
}

/// Personale richiesto per nucleo e data.
///
/// Parte dal minimo configurato; ogni criticità continuativa applicabile
/// somma il personale extra e moltiplica (arrotondando per eccesso), poi ogni
/// periodo critico sovrapposto alza al proprio minimo e moltiplica. Il
/// risultato si ferma al massimo configurato e non scende mai sotto 1.
pub fn required_staff(ctx: &ContextSnapshot, team: &Team, data: NaiveDate) -> u32 {
    let giorno = timeutil::weekday_number(data);

    let mut req = team.personale_minimo;
    for c in &ctx.criticita_continuative {
        if !c.applies_to(giorno, &team.id) {
            continue;
        }
        // Moltiplicatori sotto 1.0 sono tollerati come no-op.
        let molt = c.moltiplicatore.max(1.0);
        req = (f64::from(req + c.staff_extra) * molt).ceil() as u32;
    }
    for p in &ctx.periodi_critici {
        if !p.covers(data, &team.id) {
            continue;
        }
        let base = req.max(p.staff_minimo.unwrap_or(0));
        let molt = p.moltiplicatore.max(1.0);
        req = (f64::from(base) * molt).ceil() as u32;
    }

    if let Some(max) = team.personale_massimo {
        req = req.min(max);
    }
    req.max(1)
}

/// Orario del turno: override del giorno, poi pattern storico, poi default.
pub fn resolve_schedule(ctx: &ContextSnapshot, team: &Team, data: NaiveDate) -> ShiftSchedule {
    let giorno = timeutil::weekday_number(data);

    if let Some(o) = team.orari_giorno.iter().find(|o| o.giorno == giorno) {
        let range = TimeRange {
            inizio: o.inizio,
            fine: o.fine,
        };
        return ShiftSchedule {
            inizio: o.inizio,
            fine: o.fine,
            ore: range.ore(),
        };
    }

    if let Some(p) = best_pattern(ctx, team, giorno) {
        let range = TimeRange {
            inizio: p.ora_inizio,
            fine: p.ora_fine,
        };
        return ShiftSchedule {
            inizio: p.ora_inizio,
            fine: p.ora_fine,
            ore: range.ore(),
        };
    }

    // Giornata standard 09:00-18:00, conteggiata come 8 ore lavorative.
    ShiftSchedule {
        inizio: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        fine: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        ore: 8.0,
    }
}

/// Pattern più frequente per nucleo e giorno; a parità vince l'inizio più
/// mattiniero, poi l'ordine di snapshot.
fn best_pattern<'a>(
    ctx: &'a ContextSnapshot,
    team: &Team,
    giorno: u8,
) -> Option<&'a HistoricalPattern> {
    let mut best: Option<&HistoricalPattern> = None;
    for p in ctx
        .pattern_storici
        .iter()
        .filter(|p| p.nucleo_id == team.id && p.giorno_settimana == giorno)
    {
        best = match best {
            None => Some(p),
            Some(b) => {
                if p.occorrenze > b.occorrenze
                    || (p.occorrenze == b.occorrenze && p.ora_inizio < b.ora_inizio)
                {
                    Some(p)
                } else {
                    Some(b)
                }
            }
        };
    }
    best
}
