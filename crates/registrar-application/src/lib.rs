//! Application layer for Registrar.
//!
//! Coordinates the conversation engine with the session store and the
//! messaging transport.

pub mod bootstrap;
pub mod conversation_service;
pub mod subject_locks;

pub use bootstrap::assemble;
pub use conversation_service::ConversationService;
pub use subject_locks::SubjectLocks;
