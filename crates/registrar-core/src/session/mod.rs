//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: `Session`, `ConversationState` and the per-form `Phase`
//! - `store`: `SessionStore` trait for per-user persistence

mod model;
mod store;

pub use model::{AdminState, ConversationState, Phase, RecordOrigin, Session, SupervisorDraft};
pub use store::SessionStore;
