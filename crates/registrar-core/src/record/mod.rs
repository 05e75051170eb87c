//! Persistent records and the commit/resume logic built on them.
//!
//! # Module Structure
//!
//! - `model`: `StudentRecord`, `AdmissionRecord`, `Supervisor`, statistics
//! - `repository`: Store traits
//! - `resolver`: `RecordResolver`, commit planning and resume classification
//! - `roster`: Bulk import and export collaborators

mod model;
mod repository;
mod resolver;
mod roster;

pub use model::{
    AdmissionRecord, PENDING_REVIEW, StudentRecord, StudentStatistics, Supervisor,
};
pub use repository::{
    AdmissionRepository, SettingsRepository, StudentRepository, SupervisorRepository,
};
pub use resolver::{
    CommitAction, CommitOutcome, CommitTarget, RecordResolver, Resume, StudentCommit,
};
pub use roster::{AssetStore, ImportReport, RosterImporter, StudentExporter};
