//! Repository traits for the relational store.

use async_trait::async_trait;

use super::model::{AdmissionRecord, StudentRecord, StudentStatistics, Supervisor};
use super::resolver::{CommitOutcome, StudentCommit};
use crate::error::Result;
use crate::field::FieldMap;
use crate::transport::SubjectId;

/// Student rows.
///
/// Uniqueness of identity and slot must be enforced at write time; a violation
/// is reported as `RegistrarError::Conflict` with the store's own message.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// First row whose full name matches exactly.
    async fn find_by_name(&self, full_name: &str) -> Result<Option<StudentRecord>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<StudentRecord>>;

    /// Whether a row other than `excluding` already holds `slot`.
    async fn slot_in_use(&self, slot: i64, excluding: Option<i64>) -> Result<bool>;

    /// Writes a submitted form.
    ///
    /// The shell lookup and the write run in one transaction, so two users
    /// can never claim the same shell.
    async fn commit(&self, commit: StudentCommit) -> Result<CommitOutcome>;

    /// Inserts a name-only shell.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Shell inserted
    /// - `Ok(false)`: A row with this name already exists, nothing written
    async fn insert_shell(&self, full_name: &str) -> Result<bool>;

    /// Flips the view permission of the first row named `full_name`.
    ///
    /// Returns the new permission, or `None` when no row matches.
    async fn toggle_view_permission(&self, full_name: &str) -> Result<Option<bool>>;

    async fn statistics(&self) -> Result<StudentStatistics>;

    /// All rows in id order.
    async fn list_all(&self) -> Result<Vec<StudentRecord>>;
}

/// Admission applications. Append-only.
#[async_trait]
pub trait AdmissionRepository: Send + Sync {
    /// Inserts an application with pending review status and returns its id.
    async fn insert(&self, identity: SubjectId, fields: &FieldMap) -> Result<i64>;

    async fn list_all(&self) -> Result<Vec<AdmissionRecord>>;
}

/// Key/value settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Supervisor accounts.
#[async_trait]
pub trait SupervisorRepository: Send + Sync {
    /// Returns `false` when the identity is already registered.
    async fn add(&self, supervisor: &Supervisor) -> Result<bool>;

    /// Returns `false` when no supervisor has this identity.
    async fn remove(&self, identity: SubjectId) -> Result<bool>;

    async fn list_all(&self) -> Result<Vec<Supervisor>>;
}
