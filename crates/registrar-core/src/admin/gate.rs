//! Settings-backed checks consulted at flow entry points.

use std::str::FromStr;
use std::sync::Arc;

use strum::{AsRefStr, Display, EnumString};

use crate::error::Result;
use crate::record::SettingsRepository;

/// Settings key of the form open/closed flag.
pub const FORM_STATUS_KEY: &str = "form_status";

/// Whether new registrations and applications are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FormStatus {
    Open,
    Closed,
}

impl FormStatus {
    pub fn toggled(self) -> Self {
        match self {
            FormStatus::Open => FormStatus::Closed,
            FormStatus::Closed => FormStatus::Open,
        }
    }

    /// Verb used in the admin acknowledgement.
    pub fn verb(self) -> &'static str {
        match self {
            FormStatus::Open => "فتح",
            FormStatus::Closed => "إغلاق",
        }
    }
}

/// Form gate and admin password check.
///
/// The settings accessor is injected so the engine never reads global state.
pub struct AdminGate {
    settings: Arc<dyn SettingsRepository>,
    password: String,
}

impl AdminGate {
    pub fn new(settings: Arc<dyn SettingsRepository>, password: impl Into<String>) -> Self {
        Self {
            settings,
            password: password.into(),
        }
    }

    /// Current form status. Only an explicit `closed` closes the forms.
    pub async fn form_status(&self) -> Result<FormStatus> {
        let value = self.settings.get(FORM_STATUS_KEY).await?;
        Ok(value
            .as_deref()
            .and_then(|v| FormStatus::from_str(v).ok())
            .unwrap_or(FormStatus::Open))
    }

    pub async fn form_open(&self) -> Result<bool> {
        Ok(self.form_status().await? == FormStatus::Open)
    }

    /// Flips the form status and returns the new one.
    pub async fn toggle_form(&self) -> Result<FormStatus> {
        let next = self.form_status().await?.toggled();
        self.settings.set(FORM_STATUS_KEY, next.as_ref()).await?;
        tracing::info!("[AdminGate] Form status set to {}", next);
        Ok(next)
    }

    /// Compares a freshly typed password with the configured secret.
    pub fn verify_password(&self, candidate: &str) -> bool {
        !self.password.is_empty() && candidate == self.password
    }
}
