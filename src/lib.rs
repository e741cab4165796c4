#![forbid(unsafe_code)]
//! Turnario — motore puro di pianificazione turni e riposi per nuclei (senza BD).
//!
//! - Snapshot immutabile in ingresso, proposte in uscita; mai mutazioni dirette.
//! - Generazione settimanale deterministica data × nucleo.
//! - Vincoli HARD/SOFT, conflitti, controllo di copertura "ultimo uomo rimasto".
//! - Date e orari naive; il fuso orario è un problema del chiamante.

pub mod availability;
pub mod conflict;
pub mod constraints;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod gatekeeper;
pub mod generation;
pub mod io;
pub mod model;
pub mod proposal;
pub mod restdays;
pub mod scoring;
pub mod staffing;
pub mod storage;
pub mod timeutil;

pub use availability::{compute_availability, compute_availability_overlaid, AvailabilityRecord};
pub use conflict::{
    detect_conflicts, find_available_collaborators, ConflictEntity, ConflictReport,
    RankedCollaborator, ScheduleConflict,
};
pub use constraints::{validate_assignment, ConstraintViolation, ValidationOutcome};
pub use context::{ContextSnapshot, RuntimeHours};
pub use diagnostics::{Diagnostics, Warning, WarningCategory, WarningSeverity};
pub use error::EngineError;
pub use gatekeeper::{
    check_multi_slot_availability, check_slot_availability, DayOutcome, MultiSlotAvailability,
    RequestKind, SlotAvailability, SlotAvailabilityDetails,
};
pub use generation::{
    generate_week_shifts, CoverageStats, GenerationResult, WorkerLoad, WorkloadDistribution,
};
pub use model::{
    ApprovedLeave, AssignmentStatus, ConstraintRule, ConstraintTemplate, CoverageStatus,
    DayScheduleOverride, ExistingShiftAssignment, GeneratedRestDay, GeneratedShift,
    HistoricalPattern, LeaveKind, OneOffCriticalPeriod, Preference, PreferenceLevel,
    RecurringCriticality, RestDayAssignment, RestKind, Severity, ShiftCandidate, Team, TeamId,
    Worker, WorkerId,
};
pub use proposal::{
    valida_bozza, valida_da_sorgente, DraftPlan, DraftRestAssignment, DraftShift, DraftSource,
    DraftValidation, FileDraftSource, RejectedRest, RejectedShift,
};
pub use restdays::{
    assign_riposi_automatici, assign_riposi_multipli, MultiRestResult, RestAssignmentResult,
    RestQuota, RestRequest,
};
pub use scoring::rank_and_select;
pub use staffing::{required_staff, resolve_schedule, ShiftSchedule};
pub use storage::{JsonStorage, Storage};
pub use timeutil::TimeRange;
