//! Inbound events and outbound messages exchanged with the messaging transport.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::conversation::Form;

/// External user identity as assigned by the messaging transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file sent by the user, not yet downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Transport-side identifier used to fetch the bytes.
    pub file_id: String,
    /// Original file name when the transport provides one.
    pub file_name: Option<String>,
}

impl Attachment {
    pub fn new(file_id: impl Into<String>, file_name: Option<String>) -> Self {
        Self {
            file_id: file_id.into(),
            file_name,
        }
    }

    /// Lower-cased extension of the file name, `jpg` for nameless photos.
    pub fn extension(&self) -> String {
        self.file_name
            .as_deref()
            .and_then(|name| std::path::Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_else(|| "jpg".to_string())
    }
}

/// An inline button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    EditForm(Form),
    SubmitForm(Form),
    /// Offered after a search miss.
    RegisterNew,
    /// Offered on a complete record view; carries the record id.
    EditRecord(i64),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::EditForm(Form::Student) => f.write_str("edit_form"),
            Action::EditForm(Form::Admission) => f.write_str("edit_admission_form"),
            Action::SubmitForm(Form::Student) => f.write_str("submit_form"),
            Action::SubmitForm(Form::Admission) => f.write_str("submit_admission_form"),
            Action::RegisterNew => f.write_str("register_new_student"),
            Action::EditRecord(id) => write!(f, "update_student_{}", id),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit_form" => Ok(Action::EditForm(Form::Student)),
            "edit_admission_form" => Ok(Action::EditForm(Form::Admission)),
            "submit_form" => Ok(Action::SubmitForm(Form::Student)),
            "submit_admission_form" => Ok(Action::SubmitForm(Form::Admission)),
            "register_new_student" => Ok(Action::RegisterNew),
            other => other
                .strip_prefix("update_student_")
                .and_then(|id| id.parse().ok())
                .map(Action::EditRecord)
                .ok_or_else(|| format!("unknown action '{}'", other)),
        }
    }
}

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Photo(Attachment),
    Document(Attachment),
    Action(Action),
}

/// One inbound event from one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub subject: SubjectId,
    /// Display name of the sender, used in greetings and relayed messages.
    pub display_name: String,
    pub payload: Payload,
}

impl InboundEvent {
    pub fn text(subject: SubjectId, display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            subject,
            display_name: display_name.into(),
            payload: Payload::Text(text.into()),
        }
    }
}

/// A labelled inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Choices attached to an outbound text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choices {
    #[default]
    None,
    /// Reply keyboard; pressing a key sends its label as text.
    Keyboard(Vec<String>),
    /// Inline buttons; pressing one sends an [`Action`].
    Buttons(Vec<Button>),
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text { body: String, choices: Choices },
    Document { path: PathBuf, caption: String },
}

impl Outbound {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text {
            body: body.into(),
            choices: Choices::None,
        }
    }

    pub fn with_keyboard(body: impl Into<String>, keys: Vec<String>) -> Self {
        let choices = if keys.is_empty() {
            Choices::None
        } else {
            Choices::Keyboard(keys)
        };
        Self::Text {
            body: body.into(),
            choices,
        }
    }

    pub fn with_buttons(body: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self::Text {
            body: body.into(),
            choices: Choices::Buttons(buttons),
        }
    }

    /// Text body, or the caption of a document.
    pub fn body(&self) -> &str {
        match self {
            Outbound::Text { body, .. } => body,
            Outbound::Document { caption, .. } => caption,
        }
    }
}
