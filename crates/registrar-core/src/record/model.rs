//! Persistent record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::Form;
use crate::field::FieldMap;
use crate::transport::SubjectId;

/// Review status given to every new admission application.
pub const PENDING_REVIEW: &str = "قيد المراجعة";

/// A stored student row.
///
/// A row whose `fields` hold only the name is a claimable shell created by
/// bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    pub identity: Option<SubjectId>,
    /// Every non-null form column, the name included.
    pub fields: FieldMap,
    pub can_view_data: bool,
    /// Reserved; no flow reads or writes it yet.
    pub is_form_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRecord {
    pub fn full_name(&self) -> &str {
        self.fields.full_name().unwrap_or_default()
    }

    /// Linked to a user and holding every required field.
    pub fn is_complete(&self) -> bool {
        self.identity.is_some()
            && self
                .fields
                .missing(Form::Student.required_fields())
                .next()
                .is_none()
    }
}

/// A stored admission application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionRecord {
    pub id: i64,
    pub identity: Option<SubjectId>,
    pub fields: FieldMap,
    pub review_status: String,
    pub created_at: DateTime<Utc>,
}

/// A privileged account managed from the admin menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supervisor {
    pub identity: SubjectId,
    pub username: Option<String>,
    pub full_name: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Aggregate counts shown on the admin statistics screen.
///
/// Group keys are `None` for rows where the column is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentStatistics {
    pub total: u64,
    pub by_grade: Vec<(Option<String>, u64)>,
    pub by_section: Vec<(Option<String>, u64)>,
}
