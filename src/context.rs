use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{
    ApprovedLeave, ConstraintRule, ConstraintTemplate, ExistingShiftAssignment, HistoricalPattern,
    OneOffCriticalPeriod, Preference, PreferenceLevel, RecurringCriticality, RestDayAssignment,
    Team, TeamId, Worker, WorkerId,
};
use crate::timeutil::{self, TimeRange};

/// Fotografia immutabile di tutto ciò che serve a una singola computazione.
///
/// Il motore non muta mai lo snapshot: produce solo proposte. Chi lo assembla
/// (persistenza, API) può farlo in parallelo; una volta costruito è sola lettura.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSnapshot {
    pub collaboratori: Vec<Worker>,
    pub nuclei: Vec<Team>,
    #[serde(rename = "criticitaContinuative", default)]
    pub criticita_continuative: Vec<RecurringCriticality>,
    #[serde(rename = "periodiCritici", default)]
    pub periodi_critici: Vec<OneOffCriticalPeriod>,
    #[serde(default)]
    pub riposi: Vec<RestDayAssignment>,
    #[serde(default)]
    pub preferenze: Vec<Preference>,
    #[serde(rename = "richiesteApprovate", default)]
    pub richieste_approvate: Vec<ApprovedLeave>,
    #[serde(rename = "turniEsistenti", default)]
    pub turni_esistenti: Vec<ExistingShiftAssignment>,
    #[serde(rename = "patternStorici", default)]
    pub pattern_storici: Vec<HistoricalPattern>,
    /// Vincoli di lavoro attivi; vuoto = nessun controllo ore/riposo.
    #[serde(default)]
    pub vincoli: Vec<ConstraintTemplate>,
    #[serde(rename = "weekStart")]
    pub week_start: NaiveDate,
    #[serde(rename = "weekEnd")]
    pub week_end: NaiveDate,
}

impl ContextSnapshot {
    /// Controlli strutturali al caricamento. Uno snapshot malformato non
    /// entra mai negli algoritmi.
    pub fn validate(&self) -> Result<()> {
        if self.week_end < self.week_start {
            bail!(
                "weekEnd {} precedes weekStart {}",
                self.week_end,
                self.week_start
            );
        }
        if self.week_start.weekday() != Weekday::Mon {
            bail!("weekStart {} is not a Monday", self.week_start);
        }

        let mut worker_ids: HashSet<&str> = HashSet::new();
        for w in &self.collaboratori {
            if w.id.as_str().is_empty() {
                bail!("worker id must not be empty");
            }
            if !worker_ids.insert(w.id.as_str()) {
                bail!("duplicate worker id: {}", w.id.as_str());
            }
            if !w.ore_settimanali.is_finite() || w.ore_settimanali < 0.0 {
                bail!("worker {}: invalid weekly hours", w.id.as_str());
            }
            if !w.ore_assegnate.is_finite() || w.ore_assegnate < 0.0 {
                bail!("worker {}: invalid assigned hours", w.id.as_str());
            }
        }

        let mut team_ids: HashSet<&str> = HashSet::new();
        for t in &self.nuclei {
            if t.id.as_str().is_empty() {
                bail!("team id must not be empty");
            }
            if !team_ids.insert(t.id.as_str()) {
                bail!("duplicate team id: {}", t.id.as_str());
            }
            if let Some(max) = t.personale_massimo {
                if max < t.personale_minimo {
                    bail!("team {}: maximum staff below minimum", t.id.as_str());
                }
            }
            let mut seen_members: HashSet<&str> = HashSet::new();
            for m in &t.membri {
                if !worker_ids.contains(m.as_str()) {
                    bail!("team {}: unknown member {}", t.id.as_str(), m.as_str());
                }
                if !seen_members.insert(m.as_str()) {
                    bail!("team {}: duplicate member {}", t.id.as_str(), m.as_str());
                }
            }
            for o in &t.orari_giorno {
                if !(1..=7).contains(&o.giorno) {
                    bail!("team {}: schedule weekday out of 1-7", t.id.as_str());
                }
                if o.fine <= o.inizio {
                    bail!("team {}: schedule end not after start", t.id.as_str());
                }
            }
        }

        for w in &self.collaboratori {
            for n in &w.nuclei {
                if !team_ids.contains(n.as_str()) {
                    bail!("worker {}: unknown team {}", w.id.as_str(), n.as_str());
                }
            }
            if let Some(p) = &w.nucleo_primario {
                if !team_ids.contains(p.as_str()) {
                    bail!(
                        "worker {}: unknown primary team {}",
                        w.id.as_str(),
                        p.as_str()
                    );
                }
            }
        }

        for c in &self.criticita_continuative {
            if !(1..=7).contains(&c.giorno_settimana) {
                bail!("recurring criticality weekday out of 1-7");
            }
            if !c.moltiplicatore.is_finite() || c.moltiplicatore <= 0.0 {
                bail!("recurring criticality multiplier must be positive");
            }
            if let Some(n) = &c.nucleo_id {
                if !team_ids.contains(n.as_str()) {
                    bail!("recurring criticality: unknown team {}", n.as_str());
                }
            }
        }

        for p in &self.periodi_critici {
            if p.data_fine < p.data_inizio {
                bail!("critical period end precedes start");
            }
            match (p.ora_inizio, p.ora_fine) {
                (Some(i), Some(f)) if f <= i => bail!("critical period time end not after start"),
                (Some(_), None) | (None, Some(_)) => {
                    bail!("critical period must carry both time bounds or neither")
                }
                _ => {}
            }
            if !p.moltiplicatore.is_finite() || p.moltiplicatore <= 0.0 {
                bail!("critical period multiplier must be positive");
            }
            if let Some(n) = &p.nucleo_id {
                if !team_ids.contains(n.as_str()) {
                    bail!("critical period: unknown team {}", n.as_str());
                }
            }
        }

        for r in &self.riposi {
            if !(1..=7).contains(&r.giorno_settimana) {
                bail!("rest assignment weekday out of 1-7");
            }
            if !worker_ids.contains(r.collaboratore_id.as_str()) {
                bail!(
                    "rest assignment: unknown worker {}",
                    r.collaboratore_id.as_str()
                );
            }
        }

        for p in &self.preferenze {
            if !worker_ids.contains(p.collaboratore_id.as_str()) {
                bail!("preference: unknown worker {}", p.collaboratore_id.as_str());
            }
            match (p.ora_inizio, p.ora_fine) {
                (Some(i), Some(f)) if f <= i => bail!("preference time end not after start"),
                (Some(_), None) | (None, Some(_)) => {
                    bail!("preference must carry both time bounds or neither")
                }
                _ => {}
            }
        }

        for l in &self.richieste_approvate {
            if !worker_ids.contains(l.collaboratore_id.as_str()) {
                bail!("leave: unknown worker {}", l.collaboratore_id.as_str());
            }
            if l.data_fine < l.data_inizio {
                bail!("leave end precedes start");
            }
        }

        for a in &self.turni_esistenti {
            if !worker_ids.contains(a.collaboratore_id.as_str()) {
                bail!("assignment: unknown worker {}", a.collaboratore_id.as_str());
            }
            if let Some(n) = &a.nucleo_id {
                if !team_ids.contains(n.as_str()) {
                    bail!("assignment: unknown team {}", n.as_str());
                }
            }
            if a.ora_fine <= a.ora_inizio {
                bail!("assignment end not after start");
            }
            if let Some(c) = a.confidenza {
                if !(0.0..=1.0).contains(&c) {
                    bail!("assignment confidence out of [0,1]");
                }
            }
        }

        for p in &self.pattern_storici {
            if !team_ids.contains(p.nucleo_id.as_str()) {
                bail!("pattern: unknown team {}", p.nucleo_id.as_str());
            }
            if !(1..=7).contains(&p.giorno_settimana) {
                bail!("pattern weekday out of 1-7");
            }
            if p.ora_fine <= p.ora_inizio {
                bail!("pattern end not after start");
            }
            if p.occorrenze == 0 {
                bail!("pattern occurrence count must be >= 1");
            }
        }

        for v in &self.vincoli {
            if v.id.is_empty() {
                bail!("constraint id must not be empty");
            }
            match v.regola {
                ConstraintRule::WeeklyHourCap { max_ore } => {
                    if !max_ore.is_finite() || max_ore <= 0.0 {
                        bail!("constraint {}: invalid weekly hour cap", v.id);
                    }
                }
                ConstraintRule::MinimumRest { ore } => {
                    if !ore.is_finite() || ore <= 0.0 {
                        bail!("constraint {}: invalid minimum rest", v.id);
                    }
                }
            }
            if let Some(n) = &v.nucleo_id {
                if !team_ids.contains(n.as_str()) {
                    bail!("constraint {}: unknown team {}", v.id, n.as_str());
                }
            }
        }

        Ok(())
    }

    pub fn find_worker(&self, id: &WorkerId) -> Option<&Worker> {
        self.collaboratori.iter().find(|w| &w.id == id)
    }

    pub fn find_team(&self, id: &TeamId) -> Option<&Team> {
        self.nuclei.iter().find(|t| &t.id == id)
    }

    pub fn require_worker(&self, id: &WorkerId) -> Result<&Worker, EngineError> {
        self.find_worker(id)
            .ok_or_else(|| EngineError::UnknownWorker(id.as_str().to_owned()))
    }

    pub fn require_team(&self, id: &TeamId) -> Result<&Team, EngineError> {
        self.find_team(id)
            .ok_or_else(|| EngineError::UnknownTeam(id.as_str().to_owned()))
    }

    /// Membri del nucleo nell'ordine dello snapshot (i pareggi si rompono qui).
    pub fn members_of<'a>(&'a self, team: &'a Team) -> impl Iterator<Item = &'a Worker> + 'a {
        team.membri.iter().filter_map(move |id| self.find_worker(id))
    }

    /// Turni non annullati del collaboratore.
    pub fn active_assignments_for<'a>(
        &'a self,
        worker: &'a WorkerId,
    ) -> impl Iterator<Item = &'a ExistingShiftAssignment> + 'a {
        self.turni_esistenti
            .iter()
            .filter(move |a| &a.collaboratore_id == worker && a.is_active())
    }

    pub fn preferences_on<'a>(
        &'a self,
        worker: &'a WorkerId,
        data: NaiveDate,
    ) -> impl Iterator<Item = &'a Preference> + 'a {
        self.preferenze
            .iter()
            .filter(move |p| &p.collaboratore_id == worker && p.data == data)
    }

    pub fn unavailable_on(&self, worker: &WorkerId, data: NaiveDate) -> bool {
        self.preferences_on(worker, data)
            .any(|p| p.tipo == PreferenceLevel::NonDisponibile)
    }

    /// Preferenza positiva da allegare alla graduatoria: Preferita vince.
    pub fn positive_preference_on(
        &self,
        worker: &WorkerId,
        data: NaiveDate,
    ) -> Option<PreferenceLevel> {
        let mut found = None;
        for p in self.preferences_on(worker, data) {
            match p.tipo {
                PreferenceLevel::Preferita => return Some(PreferenceLevel::Preferita),
                PreferenceLevel::Disponibile => found = Some(PreferenceLevel::Disponibile),
                PreferenceLevel::NonDisponibile => {}
            }
        }
        found
    }

    pub fn leave_on(&self, worker: &WorkerId, data: NaiveDate) -> Option<&ApprovedLeave> {
        self.richieste_approvate
            .iter()
            .find(|l| &l.collaboratore_id == worker && l.covers(data))
    }

    pub fn rests_on_weekday<'a>(
        &'a self,
        worker: &'a WorkerId,
        giorno: u8,
    ) -> impl Iterator<Item = &'a RestDayAssignment> + 'a {
        self.riposi
            .iter()
            .filter(move |r| &r.collaboratore_id == worker && r.giorno_settimana == giorno)
    }

    /// Date della settimana richiesta, estremi inclusi.
    pub fn week_days(&self) -> Vec<NaiveDate> {
        timeutil::giorni_inclusi(self.week_start, self.week_end)
    }
}

/// Ore e impegni accumulati durante una sola invocazione del motore.
///
/// Vive sullo stack della chiamata e viene scartato al ritorno: mai stato
/// condiviso tra invocazioni (il motore resta rientrante).
#[derive(Debug, Clone)]
pub struct RuntimeHours {
    ore: HashMap<WorkerId, f64>,
    impegni: Vec<(WorkerId, NaiveDate, TimeRange)>,
}

impl RuntimeHours {
    /// Parte dalle ore già assegnate registrate nello snapshot.
    pub fn seeded_from(snapshot: &ContextSnapshot) -> Self {
        let ore = snapshot
            .collaboratori
            .iter()
            .map(|w| (w.id.clone(), w.ore_assegnate))
            .collect();
        Self {
            ore,
            impegni: Vec::new(),
        }
    }

    pub fn assigned_hours(&self, id: &WorkerId) -> f64 {
        self.ore.get(id).copied().unwrap_or(0.0)
    }

    pub fn residual_hours(&self, worker: &Worker) -> f64 {
        worker.ore_settimanali - self.assigned_hours(&worker.id)
    }

    /// Vero se il collaboratore è già stato selezionato in questa passata per
    /// una fascia sovrapposta nella stessa data.
    pub fn already_booked(&self, id: &WorkerId, data: NaiveDate, range: &TimeRange) -> bool {
        self.impegni
            .iter()
            .any(|(w, d, r)| w == id && *d == data && r.overlaps(range))
    }

    /// Registra una selezione: ore accumulate e fascia occupata.
    pub fn record_selection(&mut self, id: &WorkerId, data: NaiveDate, range: TimeRange, ore: f64) {
        *self.ore.entry(id.clone()).or_insert(0.0) += ore;
        self.impegni.push((id.clone(), data, range));
    }
}
