//! Record resolution: resume-by-name lookup and the commit decision.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::StudentRecord;
use super::repository::StudentRepository;
use crate::error::Result;
use crate::field::FieldMap;
use crate::session::{RecordOrigin, Session};
use crate::transport::SubjectId;

/// Which row a submitted student form is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitTarget {
    /// The session edits a record already linked to a user.
    Linked(i64),
    /// Claim a shell with the same name if one exists, otherwise insert.
    ClaimOrInsert,
}

/// A submitted student form, ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentCommit {
    pub identity: SubjectId,
    pub fields: FieldMap,
    pub target: CommitTarget,
}

/// The write a store performs for a [`StudentCommit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitAction {
    /// Overwrite a linked record in place.
    Update(i64),
    /// Overwrite a shell and attach the committing identity.
    Claim(i64),
    /// Insert a new row carrying the committing identity.
    Insert,
}

impl CommitAction {
    /// Decides the write for `target`.
    ///
    /// `shell` is the id of the first row with the submitted name and no
    /// identity, looked up inside the same transaction as the write.
    pub fn plan(target: CommitTarget, shell: Option<i64>) -> Self {
        match (target, shell) {
            (CommitTarget::Linked(id), _) => CommitAction::Update(id),
            (CommitTarget::ClaimOrInsert, Some(id)) => CommitAction::Claim(id),
            (CommitTarget::ClaimOrInsert, None) => CommitAction::Insert,
        }
    }

    /// Whether the action needs the shell lookup at all.
    pub fn needs_shell_lookup(target: CommitTarget) -> bool {
        matches!(target, CommitTarget::ClaimOrInsert)
    }
}

/// Result of a successful student commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Created(i64),
    Updated(i64),
}

/// Result of a resume-by-name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    NotFound,
    /// Unlinked, or missing at least one required field.
    Incomplete(StudentRecord),
    /// Complete, but the administration hid it from its owner.
    Denied(StudentRecord),
    Complete(StudentRecord),
}

impl Resume {
    pub fn classify(record: Option<StudentRecord>) -> Self {
        match record {
            None => Resume::NotFound,
            Some(record) if !record.is_complete() => Resume::Incomplete(record),
            Some(record) if !record.can_view_data => Resume::Denied(record),
            Some(record) => Resume::Complete(record),
        }
    }
}

impl From<&StudentRecord> for RecordOrigin {
    fn from(record: &StudentRecord) -> Self {
        RecordOrigin {
            record_id: record.id,
            linked: record.identity.is_some(),
        }
    }
}

/// Store-facing half of the conversation engine.
pub struct RecordResolver {
    students: Arc<dyn StudentRepository>,
}

impl RecordResolver {
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }

    /// Looks up `full_name` and classifies the match.
    pub async fn resume(&self, full_name: &str) -> Result<Resume> {
        let record = self.students.find_by_name(full_name).await?;
        let resume = Resume::classify(record);
        tracing::debug!(
            "[Resolver] Resume lookup for '{}': {}",
            full_name,
            match &resume {
                Resume::NotFound => "not found",
                Resume::Incomplete(_) => "incomplete",
                Resume::Denied(_) => "denied",
                Resume::Complete(_) => "complete",
            }
        );
        Ok(resume)
    }

    /// Whether `slot` is free for the session seeded from `origin`.
    ///
    /// The record the session came from does not collide with itself.
    pub async fn slot_available(&self, slot: i64, origin: Option<RecordOrigin>) -> Result<bool> {
        let excluding = origin.map(|o| o.record_id);
        Ok(!self.students.slot_in_use(slot, excluding).await?)
    }

    pub async fn record_for_edit(&self, record_id: i64) -> Result<Option<StudentRecord>> {
        self.students.find_by_id(record_id).await
    }

    /// Commits the accumulated student form of `session`.
    pub async fn commit_student(&self, session: &Session) -> Result<CommitOutcome> {
        let target = match session.origin {
            Some(RecordOrigin {
                record_id,
                linked: true,
            }) => CommitTarget::Linked(record_id),
            _ => CommitTarget::ClaimOrInsert,
        };

        let outcome = self
            .students
            .commit(StudentCommit {
                identity: session.subject,
                fields: session.fields.clone(),
                target,
            })
            .await?;

        tracing::info!(
            "[Resolver] Student form of {} committed: {:?}",
            session.subject,
            outcome
        );
        Ok(outcome)
    }
}
