//! Session domain model.

use serde::{Deserialize, Serialize};

use crate::conversation::Form;
use crate::field::{FieldKey, FieldMap};
use crate::transport::SubjectId;

/// Position inside one of the two forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "field", rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for the value of a field in the linear chain.
    Collect(FieldKey),
    /// Review screen shown, waiting for edit or submit.
    Review,
    /// Waiting for the key of the field to edit.
    EditField,
    /// Waiting for the new value of the given field.
    EditValue(FieldKey),
}

/// Position inside the administrative menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminState {
    AwaitingPassword,
    Menu,
    ToggleViewName,
    Supervisors,
    AddSupervisorIdentity,
    AddSupervisorUsername,
    AddSupervisorFullName,
    AddSupervisorPassword,
    RemoveSupervisorIdentity,
}

/// Where a conversation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ConversationState {
    Form { form: Form, phase: Phase },
    SearchName,
    ContactAdmin,
    AwaitingUpload,
    Admin(AdminState),
}

impl ConversationState {
    pub fn collect(form: Form, field: FieldKey) -> Self {
        Self::Form {
            form,
            phase: Phase::Collect(field),
        }
    }

    pub fn review(form: Form) -> Self {
        Self::Form {
            form,
            phase: Phase::Review,
        }
    }
}

/// The stored record a session was seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOrigin {
    pub record_id: i64,
    /// Whether the record already carries an external identity. Linked
    /// records are committed by updating them in place.
    pub linked: bool,
}

/// Supervisor fields collected across the add-supervisor prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorDraft {
    pub identity: Option<SubjectId>,
    pub username: Option<String>,
    pub full_name: Option<String>,
}

/// An in-progress conversation of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject: SubjectId,
    pub state: ConversationState,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<RecordOrigin>,
    #[serde(default)]
    pub supervisor_draft: SupervisorDraft,
}

impl Session {
    /// Creates an empty session in `state`.
    pub fn new(subject: SubjectId, state: ConversationState) -> Self {
        Self {
            subject,
            state,
            fields: FieldMap::new(),
            origin: None,
            supervisor_draft: SupervisorDraft::default(),
        }
    }

    /// Creates a session that continues from stored data.
    pub fn seeded(
        subject: SubjectId,
        state: ConversationState,
        fields: FieldMap,
        origin: RecordOrigin,
    ) -> Self {
        Self {
            subject,
            state,
            fields,
            origin: Some(origin),
            supervisor_draft: SupervisorDraft::default(),
        }
    }

    /// Returns the same session moved to `state`.
    pub fn with_state(mut self, state: ConversationState) -> Self {
        self.state = state;
        self
    }
}
