//! Session store trait.
//!
//! Defines the interface for per-user conversation state.

use async_trait::async_trait;

use super::model::{ConversationState, Session};
use crate::error::Result;
use crate::field::FieldMap;
use crate::transport::SubjectId;

/// Holds at most one [`Session`] per external user identity.
///
/// Implementations only need per-call atomicity: the dispatcher never runs two
/// events of the same user at once.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the session of `subject`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: A conversation is in progress
    /// - `Ok(None)`: No conversation
    async fn load(&self, subject: SubjectId) -> Result<Option<Session>>;

    /// Moves the session to `state` and copies `fields` over its data.
    ///
    /// Creates the session when none exists.
    async fn merge(
        &self,
        subject: SubjectId,
        state: ConversationState,
        fields: FieldMap,
    ) -> Result<()>;

    /// Replaces the whole session.
    async fn replace(&self, session: Session) -> Result<()>;

    /// Drops the session of `subject`, if any.
    async fn clear(&self, subject: SubjectId) -> Result<()>;
}
