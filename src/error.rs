use thiserror::Error;

/// Errori del motore per stati davvero inattesi.
///
/// Esiti di business (violazioni, conflitti, richieste bloccate, turni
/// scoperti) non passano di qui: sono dati strutturati nei risultati.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("unknown team: {0}")]
    UnknownTeam(String),
    #[error("unknown worker: {0}")]
    UnknownWorker(String),
    #[error("invalid date range: end must not precede start")]
    InvalidDateRange,
    #[error("invalid week: {0}")]
    InvalidWeek(&'static str),
    #[error("invalid rest quota: {0}")]
    InvalidQuota(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
