use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability;
use crate::context::{ContextSnapshot, RuntimeHours};
use crate::diagnostics::{Warning, WarningCategory};
use crate::error::EngineError;
use crate::model::{GeneratedRestDay, RestDayAssignment, RestKind, Worker, WorkerId};
use crate::staffing;
use crate::timeutil;

/// Quota settimanale di riposo richiesta per un collaboratore.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum RestQuota {
    #[serde(rename = "giorni_interi")]
    GiorniInteri { quantita: u32 },
    #[serde(rename = "mezze_giornate")]
    MezzeGiornate { quantita: u32 },
    #[serde(rename = "ore")]
    Ore { quantita: f64 },
}

/// Esito dell'assegnazione riposi per un collaboratore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestAssignmentResult {
    pub riposi: Vec<GeneratedRestDay>,
    pub warnings: Vec<Warning>,
    pub success: bool,
    pub reasoning: String,
}

impl RestAssignmentResult {
    /// Contratto di guasto a monte: nessun riposo, un solo avviso.
    pub fn failed<M: Into<String>>(messaggio: M) -> Self {
        Self {
            riposi: Vec::new(),
            warnings: vec![Warning::errore(WarningCategory::Upstream, messaggio)],
            success: false,
            reasoning: String::new(),
        }
    }
}

/// Richiesta di riposo dentro un lotto multi-collaboratore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestRequest {
    pub collaboratore_id: WorkerId,
    pub quota: RestQuota,
}

/// Esito complessivo di un lotto: un esito per richiesta, nell'ordine dato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiRestResult {
    pub esiti: Vec<RestAssignmentResult>,
    pub success: bool,
    pub reasoning: String,
}

/// Punteggio di un giorno della settimana per il collaboratore.
#[derive(Debug, Clone)]
struct DayScore {
    giorno: u8,
    data: NaiveDate,
    punteggio: f64,
    would_uncover: bool,
}

/// Assegna la quota di riposo sui giorni migliori della settimana senza far
/// scendere nessun nucleo del collaboratore sotto il proprio minimo.
pub fn assign_riposi_automatici(
    ctx: &ContextSnapshot,
    collaboratore_id: &WorkerId,
    quota: RestQuota,
) -> Result<RestAssignmentResult, EngineError> {
    let worker = ctx.require_worker(collaboratore_id)?;
    let (esito, _) = assign_with_overlay(ctx, worker, quota, &[])?;
    Ok(esito)
}

/// Lotto sequenziale: ogni collaboratore vede i riposi concessi a chi lo
/// precede tramite l'accumulatore esplicito, mai tramite stato condiviso.
pub fn assign_riposi_multipli(
    ctx: &ContextSnapshot,
    richieste: &[RestRequest],
) -> Result<MultiRestResult, EngineError> {
    let mut accumulato: Vec<RestDayAssignment> = Vec::new();
    let mut esiti = Vec::new();

    for r in richieste {
        let worker = ctx.require_worker(&r.collaboratore_id)?;
        let (esito, concessi) = assign_with_overlay(ctx, worker, r.quota, &accumulato)?;
        accumulato.extend(concessi);
        esiti.push(esito);
    }

    let success = esiti.iter().all(|e| e.success);
    let reasoning = esiti
        .iter()
        .map(|e| e.reasoning.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    #[cfg(feature = "logging")]
    tracing::debug!(richieste = richieste.len(), success, "lotto riposi completato");

    Ok(MultiRestResult {
        esiti,
        success,
        reasoning,
    })
}

fn assign_with_overlay(
    ctx: &ContextSnapshot,
    worker: &Worker,
    quota: RestQuota,
    riposi_extra: &[RestDayAssignment],
) -> Result<(RestAssignmentResult, Vec<RestDayAssignment>), EngineError> {
    let mut warnings = Vec::new();
    let slots = convert_quota(quota, &mut warnings)?;

    let mut giorni = score_days(ctx, worker, riposi_extra);
    giorni.sort_by(|a, b| {
        b.punteggio
            .partial_cmp(&a.punteggio)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut riposi: Vec<GeneratedRestDay> = Vec::new();
    let mut evitati: Vec<String> = Vec::new();
    let mut prossimo = 0usize;

    for giorno in &giorni {
        if prossimo >= slots.len() {
            break;
        }
        let tipo = slots[prossimo];
        if has_conflicting_rest(ctx, &worker.id, riposi_extra, &riposi, giorno.giorno, tipo) {
            continue;
        }
        if giorno.would_uncover {
            let mut w = Warning::avviso(
                WarningCategory::Riposi,
                format!(
                    "giorno {} saltato: la copertura di un nucleo scenderebbe sotto il minimo",
                    timeutil::nome_giorno(giorno.giorno)
                ),
            );
            w.collaboratore_id = Some(worker.id.clone());
            w.data = Some(giorno.data);
            warnings.push(w);
            evitati.push(format!(
                "{} (copertura a rischio)",
                timeutil::nome_giorno(giorno.giorno)
            ));
            continue;
        }

        riposi.push(GeneratedRestDay {
            collaboratore_id: worker.id.clone(),
            giorno_settimana: giorno.giorno,
            data: giorno.data,
            tipo,
            confidenza: giorno.punteggio.clamp(30.0, 100.0) / 100.0,
        });
        prossimo += 1;
    }

    if riposi.len() < slots.len() {
        let mut w = Warning::avviso(
            WarningCategory::Riposi,
            format!("assegnati {} riposi su {} richiesti", riposi.len(), slots.len()),
        );
        w.collaboratore_id = Some(worker.id.clone());
        warnings.push(w);
    }

    let success = riposi.len() == slots.len();
    let reasoning = build_reasoning(worker, &riposi, &evitati, slots.len());
    let concessi: Vec<RestDayAssignment> = riposi
        .iter()
        .map(|r| RestDayAssignment {
            collaboratore_id: r.collaboratore_id.clone(),
            giorno_settimana: r.giorno_settimana,
            tipo: r.tipo,
        })
        .collect();

    Ok((
        RestAssignmentResult {
            riposi,
            warnings,
            success,
            reasoning,
        },
        concessi,
    ))
}

/// Converte la quota in una sequenza di riposi: prima giornate intere da 8
/// ore, poi mezze giornate da 4 (mattina); il resto viene solo segnalato.
fn convert_quota(quota: RestQuota, warnings: &mut Vec<Warning>) -> Result<Vec<RestKind>, EngineError> {
    match quota {
        RestQuota::GiorniInteri { quantita } => {
            if quantita == 0 {
                return Err(EngineError::InvalidQuota("quantity must be positive"));
            }
            Ok(vec![RestKind::GiornoIntero; quantita as usize])
        }
        RestQuota::MezzeGiornate { quantita } => {
            if quantita == 0 {
                return Err(EngineError::InvalidQuota("quantity must be positive"));
            }
            Ok(vec![RestKind::MezzaGiornataMattina; quantita as usize])
        }
        RestQuota::Ore { quantita } => {
            if !quantita.is_finite() || quantita <= 0.0 {
                return Err(EngineError::InvalidQuota("hours must be positive"));
            }
            let interi = (quantita / 8.0).floor() as usize;
            let resto = quantita - interi as f64 * 8.0;
            let mezze = (resto / 4.0).floor() as usize;
            let avanzo = resto - mezze as f64 * 4.0;

            let mut slots = vec![RestKind::GiornoIntero; interi];
            slots.extend(vec![RestKind::MezzaGiornataMattina; mezze]);
            if avanzo > 1e-9 {
                warnings.push(Warning::avviso(
                    WarningCategory::Quota,
                    format!("resto di quota non convertibile: {avanzo:.1} ore"),
                ));
            }
            Ok(slots)
        }
    }
}

/// Punteggia i giorni 1-7 della settimana per il collaboratore.
fn score_days(
    ctx: &ContextSnapshot,
    worker: &Worker,
    riposi_extra: &[RestDayAssignment],
) -> Vec<DayScore> {
    let runtime = RuntimeHours::seeded_from(ctx);
    let mut out = Vec::new();

    let mut data = ctx.week_start;
    for giorno in 1u8..=7 {
        if data > ctx.week_end {
            break;
        }

        let mut punteggio = 100.0;

        for c in &ctx.criticita_continuative {
            if c.giorno_settimana != giorno {
                continue;
            }
            let applicabile = match &c.nucleo_id {
                None => true,
                Some(id) => worker.nuclei.contains(id),
            };
            if !applicabile {
                continue;
            }
            let molt = c.moltiplicatore.max(1.0);
            punteggio -= 15.0 * f64::from(c.staff_extra) + 20.0 * (molt - 1.0);
        }

        let assenze_altrui = ctx
            .richieste_approvate
            .iter()
            .filter(|l| l.collaboratore_id != worker.id && l.covers(data))
            .count();
        punteggio -= 10.0 * assenze_altrui as f64;

        let mut would_uncover = false;
        for team in ctx.nuclei.iter().filter(|t| worker.nuclei.contains(&t.id)) {
            let schedule = staffing::resolve_schedule(ctx, team, data);
            let records = availability::compute_availability_overlaid(
                ctx,
                team,
                data,
                schedule.ore,
                &runtime,
                riposi_extra,
            );
            let richiedente_disponibile = records
                .iter()
                .find(|r| r.collaboratore_id == worker.id)
                .map_or(false, |r| r.disponibile);
            let disponibili = availability::available_count(&records) as u32;
            let dopo = if richiedente_disponibile {
                disponibili.saturating_sub(1)
            } else {
                disponibili
            };
            if dopo < team.personale_minimo {
                would_uncover = true;
                punteggio -= 50.0;
            }
        }

        if below_average_rest_count(ctx, riposi_extra, giorno) {
            punteggio += 10.0;
        }
        if timeutil::is_weekend(giorno) {
            punteggio += 5.0;
        }

        out.push(DayScore {
            giorno,
            data,
            punteggio,
            would_uncover,
        });

        match data.succ_opt() {
            Some(d) => data = d,
            None => break,
        }
    }

    out
}

/// Vero se il giorno porta meno riposi già assegnati della media settimanale.
fn below_average_rest_count(
    ctx: &ContextSnapshot,
    riposi_extra: &[RestDayAssignment],
    giorno: u8,
) -> bool {
    let totale = ctx.riposi.len() + riposi_extra.len();
    let del_giorno = ctx
        .riposi
        .iter()
        .chain(riposi_extra.iter())
        .filter(|r| r.giorno_settimana == giorno)
        .count();
    (del_giorno as f64) < (totale as f64 / 7.0)
}

fn has_conflicting_rest(
    ctx: &ContextSnapshot,
    worker: &WorkerId,
    riposi_extra: &[RestDayAssignment],
    placed: &[GeneratedRestDay],
    giorno: u8,
    tipo: RestKind,
) -> bool {
    ctx.rests_on_weekday(worker, giorno)
        .any(|r| r.tipo.conflicts_with(&tipo))
        || riposi_extra.iter().any(|r| {
            &r.collaboratore_id == worker
                && r.giorno_settimana == giorno
                && r.tipo.conflicts_with(&tipo)
        })
        || placed
            .iter()
            .any(|p| p.giorno_settimana == giorno && p.tipo.conflicts_with(&tipo))
}

/// Riepilogo leggibile: giorni scelti, giorni evitati e quota incompleta.
fn build_reasoning(
    worker: &Worker,
    riposi: &[GeneratedRestDay],
    evitati: &[String],
    richiesti: usize,
) -> String {
    let scelti: Vec<String> = riposi
        .iter()
        .map(|r| {
            format!(
                "{} {} ({})",
                timeutil::nome_giorno(r.giorno_settimana),
                timeutil::data_breve(r.data),
                r.tipo.descrizione()
            )
        })
        .collect();

    let mut out = if scelti.is_empty() {
        format!("Riposi per {}: nessun giorno assegnabile.", worker.nome)
    } else {
        format!("Riposi per {}: {}.", worker.nome, scelti.join(", "))
    };

    if !evitati.is_empty() {
        out.push_str(&format!(" Evitati per copertura: {}.", evitati.join(", ")));
    }
    if riposi.len() < richiesti {
        out.push_str(&format!(" Quota incompleta: {} su {}.", riposi.len(), richiesti));
    }

    out
}
