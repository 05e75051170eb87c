//! Messaging transport interface.
//!
//! The engine never talks to the transport itself; it returns effects that the
//! dispatcher delivers through [`Transport`]. File retrieval is the one call
//! collaborators make directly, through [`FileFetcher`].

mod message;

pub use message::{
    Action, Attachment, Button, Choices, InboundEvent, Outbound, Payload, SubjectId,
};

use async_trait::async_trait;

use crate::error::Result;

/// Delivers messages to a remote user.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one message to `to`.
    ///
    /// Returns `RegistrarError::Transport` when the recipient cannot be reached.
    async fn send(&self, to: SubjectId, message: Outbound) -> Result<()>;
}

/// Turns an attachment reference into local bytes.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch(&self, attachment: &Attachment) -> Result<Vec<u8>>;
}
