use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timeutil::TimeRange;

/// Identificatore forte per un collaboratore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(String);

impl WorkerId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    /// Per importatori e test; il motore non conia mai identificatori.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identificatore forte per un nucleo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(String);

impl TeamId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Collaboratore con monte ore settimanale e appartenenze ai nuclei.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: WorkerId,
    pub nome: String,
    pub ore_settimanali: f64,
    /// Ore già assegnate nella settimana corrente al momento dello snapshot.
    #[serde(default)]
    pub ore_assegnate: f64,
    #[serde(default)]
    pub nuclei: Vec<TeamId>,
    #[serde(default)]
    pub nucleo_primario: Option<TeamId>,
}

impl Worker {
    pub fn new<N: Into<String>>(id: WorkerId, nome: N, ore_settimanali: f64) -> Self {
        Self {
            id,
            nome: nome.into(),
            ore_settimanali,
            ore_assegnate: 0.0,
            nuclei: Vec::new(),
            nucleo_primario: None,
        }
    }
}

/// Orario specifico di un giorno della settimana (1–7, lunedì = 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayScheduleOverride {
    pub giorno: u8,
    pub inizio: NaiveTime,
    pub fine: NaiveTime,
}

/// Nucleo: unità di copertura con personale minimo ed eventuale massimo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub nome: String,
    pub personale_minimo: u32,
    #[serde(default)]
    pub personale_massimo: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orari_giorno: Vec<DayScheduleOverride>,
    /// Membri in ordine di snapshot; l'ordine rompe i pareggi in graduatoria.
    #[serde(default)]
    pub membri: Vec<WorkerId>,
}

impl Team {
    pub fn new<N: Into<String>>(id: TeamId, nome: N, personale_minimo: u32) -> Self {
        Self {
            id,
            nome: nome.into(),
            personale_minimo,
            personale_massimo: None,
            orari_giorno: Vec::new(),
            membri: Vec::new(),
        }
    }
}

fn default_moltiplicatore() -> f64 {
    1.0
}

/// Criticità continuativa su un giorno della settimana.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringCriticality {
    pub giorno_settimana: u8,
    #[serde(default)]
    pub staff_extra: u32,
    #[serde(default = "default_moltiplicatore")]
    pub moltiplicatore: f64,
    /// Assente = vale per tutti i nuclei.
    #[serde(default)]
    pub nucleo_id: Option<TeamId>,
}

impl RecurringCriticality {
    pub fn applies_to(&self, giorno: u8, nucleo: &TeamId) -> bool {
        self.giorno_settimana == giorno && self.nucleo_id.as_ref().map_or(true, |id| id == nucleo)
    }
}

/// Periodo critico una tantum su un intervallo di date incluse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneOffCriticalPeriod {
    pub data_inizio: NaiveDate,
    pub data_fine: NaiveDate,
    #[serde(default)]
    pub ora_inizio: Option<NaiveTime>,
    #[serde(default)]
    pub ora_fine: Option<NaiveTime>,
    #[serde(default)]
    pub staff_minimo: Option<u32>,
    #[serde(default = "default_moltiplicatore")]
    pub moltiplicatore: f64,
    #[serde(default)]
    pub nucleo_id: Option<TeamId>,
}

impl OneOffCriticalPeriod {
    pub fn new(data_inizio: NaiveDate, data_fine: NaiveDate) -> Result<Self, String> {
        if data_fine < data_inizio {
            return Err("critical period end must not precede start".to_string());
        }
        Ok(Self {
            data_inizio,
            data_fine,
            ora_inizio: None,
            ora_fine: None,
            staff_minimo: None,
            moltiplicatore: 1.0,
            nucleo_id: None,
        })
    }

    pub fn covers(&self, data: NaiveDate, nucleo: &TeamId) -> bool {
        self.data_inizio <= data
            && data <= self.data_fine
            && self.nucleo_id.as_ref().map_or(true, |id| id == nucleo)
    }
}

/// Severità di un vincolo di lavoro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hard,
    Soft,
}

/// Corpo macchina-leggibile di un vincolo, decodificato al caricamento.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo")]
pub enum ConstraintRule {
    /// Massimo di ore lavorabili nella settimana lunedì–domenica.
    #[serde(rename = "max_ore_settimanali")]
    WeeklyHourCap { max_ore: f64 },
    /// Riposo minimo tra la fine di un turno e l'inizio del successivo.
    #[serde(rename = "riposo_minimo")]
    MinimumRest { ore: f64 },
}

/// Vincolo HARD o SOFT, globale o limitato a un nucleo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintTemplate {
    pub id: String,
    pub nome: String,
    pub severita: Severity,
    pub regola: ConstraintRule,
    #[serde(default)]
    pub nucleo_id: Option<TeamId>,
}

impl ConstraintTemplate {
    pub fn applies_to(&self, nucleo: &TeamId) -> bool {
        self.nucleo_id.as_ref().map_or(true, |id| id == nucleo)
    }

    /// Coppia di vincoli globali standard per snapshot senza tabella propria.
    pub fn predefiniti() -> Vec<Self> {
        vec![
            Self {
                id: "max-ore-40".to_string(),
                nome: "Massimo 40 ore settimanali".to_string(),
                severita: Severity::Hard,
                regola: ConstraintRule::WeeklyHourCap { max_ore: 40.0 },
                nucleo_id: None,
            },
            Self {
                id: "riposo-11h".to_string(),
                nome: "Riposo minimo di 11 ore".to_string(),
                severita: Severity::Hard,
                regola: ConstraintRule::MinimumRest { ore: 11.0 },
                nucleo_id: None,
            },
        ]
    }
}

/// Livello di preferenza espresso da un collaboratore per una data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceLevel {
    Preferita,
    Disponibile,
    NonDisponibile,
}

impl PreferenceLevel {
    pub fn descrizione(&self) -> &'static str {
        match self {
            PreferenceLevel::Preferita => "preferita",
            PreferenceLevel::Disponibile => "disponibile",
            PreferenceLevel::NonDisponibile => "non disponibile",
        }
    }
}

/// Preferenza per una data, con fascia oraria facoltativa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub collaboratore_id: WorkerId,
    pub data: NaiveDate,
    #[serde(default)]
    pub ora_inizio: Option<NaiveTime>,
    #[serde(default)]
    pub ora_fine: Option<NaiveTime>,
    pub tipo: PreferenceLevel,
}

impl Preference {
    /// Fascia oraria esplicita, se entrambi gli estremi sono presenti e ordinati.
    pub fn time_range(&self) -> Option<TimeRange> {
        match (self.ora_inizio, self.ora_fine) {
            (Some(inizio), Some(fine)) => TimeRange::new(inizio, fine).ok(),
            _ => None,
        }
    }
}

/// Tipo di assenza approvata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveKind {
    Ferie,
    Permesso,
    Riposo,
}

impl LeaveKind {
    pub fn descrizione(&self) -> &'static str {
        match self {
            LeaveKind::Ferie => "ferie",
            LeaveKind::Permesso => "permesso",
            LeaveKind::Riposo => "riposo",
        }
    }
}

/// Assenza approvata su un intervallo di date incluse. Prevale sulle preferenze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedLeave {
    pub collaboratore_id: WorkerId,
    pub data_inizio: NaiveDate,
    pub data_fine: NaiveDate,
    pub tipo: LeaveKind,
}

impl ApprovedLeave {
    pub fn new(
        collaboratore_id: WorkerId,
        data_inizio: NaiveDate,
        data_fine: NaiveDate,
        tipo: LeaveKind,
    ) -> Result<Self, String> {
        if data_fine < data_inizio {
            return Err("leave end must not precede start".to_string());
        }
        Ok(Self {
            collaboratore_id,
            data_inizio,
            data_fine,
            tipo,
        })
    }

    pub fn covers(&self, data: NaiveDate) -> bool {
        self.data_inizio <= data && data <= self.data_fine
    }
}

/// Tipo di riposo assegnato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestKind {
    GiornoIntero,
    MezzaGiornataMattina,
    MezzaGiornataPomeriggio,
}

impl RestKind {
    pub fn ore(&self) -> f64 {
        match self {
            RestKind::GiornoIntero => 8.0,
            RestKind::MezzaGiornataMattina | RestKind::MezzaGiornataPomeriggio => 4.0,
        }
    }

    /// Due riposi sullo stesso giorno si escludono se coprono la stessa metà.
    pub fn conflicts_with(&self, other: &RestKind) -> bool {
        matches!(self, RestKind::GiornoIntero)
            || matches!(other, RestKind::GiornoIntero)
            || self == other
    }

    pub fn descrizione(&self) -> &'static str {
        match self {
            RestKind::GiornoIntero => "giorno intero",
            RestKind::MezzaGiornataMattina => "mezza giornata (mattina)",
            RestKind::MezzaGiornataPomeriggio => "mezza giornata (pomeriggio)",
        }
    }
}

/// Riposo già assegnato a un collaboratore su un giorno della settimana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestDayAssignment {
    pub collaboratore_id: WorkerId,
    pub giorno_settimana: u8,
    pub tipo: RestKind,
}

/// Stato di un turno esistente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Confermato,
    Proposto,
    Annullato,
}

/// Turno già presente a calendario per un collaboratore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingShiftAssignment {
    pub id: String,
    pub collaboratore_id: WorkerId,
    #[serde(default)]
    pub nucleo_id: Option<TeamId>,
    pub data: NaiveDate,
    pub ora_inizio: NaiveTime,
    pub ora_fine: NaiveTime,
    pub stato: AssignmentStatus,
    #[serde(default)]
    pub generato_auto: bool,
    #[serde(default)]
    pub confidenza: Option<f64>,
}

impl ExistingShiftAssignment {
    pub fn new<I: Into<String>>(
        id: I,
        collaboratore_id: WorkerId,
        data: NaiveDate,
        ora_inizio: NaiveTime,
        ora_fine: NaiveTime,
    ) -> Result<Self, String> {
        if ora_fine <= ora_inizio {
            return Err("assignment end must be strictly after start".to_string());
        }
        Ok(Self {
            id: id.into(),
            collaboratore_id,
            nucleo_id: None,
            data,
            ora_inizio,
            ora_fine,
            stato: AssignmentStatus::Confermato,
            generato_auto: false,
            confidenza: None,
        })
    }

    /// Un turno annullato non conta in nessun controllo.
    pub fn is_active(&self) -> bool {
        self.stato != AssignmentStatus::Annullato
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            inizio: self.ora_inizio,
            fine: self.ora_fine,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        self.time_range().duration_minutes()
    }
}

/// Orario tipico osservato per nucleo e giorno della settimana.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalPattern {
    pub nucleo_id: TeamId,
    pub giorno_settimana: u8,
    pub ora_inizio: NaiveTime,
    pub ora_fine: NaiveTime,
    #[serde(default = "default_occorrenze")]
    pub occorrenze: u32,
}

fn default_occorrenze() -> u32 {
    1
}

/// Esito di copertura di un turno generato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "parziale")]
    Partial,
    #[serde(rename = "scoperta")]
    Uncovered,
}

impl CoverageStatus {
    pub fn descrizione(&self) -> &'static str {
        match self {
            CoverageStatus::Ok => "ok",
            CoverageStatus::Partial => "parziale",
            CoverageStatus::Uncovered => "scoperta",
        }
    }
}

/// Candidato valutato per un turno, nell'ordine di graduatoria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftCandidate {
    pub collaboratore_id: WorkerId,
    pub disponibile: bool,
    pub ore_residue: f64,
    #[serde(default)]
    pub preferenza: Option<PreferenceLevel>,
    /// Nucleo primario di provenienza quando diverso dal nucleo del turno.
    #[serde(default)]
    pub nucleo_provenienza: Option<TeamId>,
    pub punteggio: f64,
    pub selezionato: bool,
    #[serde(default)]
    pub nota: Option<String>,
}

/// Turno proposto dal motore per nucleo e data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedShift {
    pub nucleo_id: TeamId,
    pub data: NaiveDate,
    pub ora_inizio: NaiveTime,
    pub ora_fine: NaiveTime,
    pub num_collaboratori_richiesti: u32,
    pub candidati: Vec<ShiftCandidate>,
    pub copertura: CoverageStatus,
    pub confidenza: f64,
    pub reasoning: String,
    #[serde(default)]
    pub warning: Option<String>,
}

impl GeneratedShift {
    pub fn selezionati(&self) -> impl Iterator<Item = &ShiftCandidate> {
        self.candidati.iter().filter(|c| c.selezionato)
    }

    pub fn time_range(&self) -> TimeRange {
        TimeRange {
            inizio: self.ora_inizio,
            fine: self.ora_fine,
        }
    }
}

/// Riposo proposto dal motore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRestDay {
    pub collaboratore_id: WorkerId,
    pub giorno_settimana: u8,
    pub data: NaiveDate,
    pub tipo: RestKind,
    pub confidenza: f64,
}
