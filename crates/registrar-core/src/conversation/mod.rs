//! Conversation engine.
//!
//! # Module Structure
//!
//! - `form`: The two forms and their field sequences
//! - `engine`: `ConversationEngine::step` and global command handling
//! - `collect`: Linear collection, review, edit and submit
//! - `lookup`: Resume-by-name and record editing
//! - `support`: Contact relay and roster upload
//! - `admin`: Password-gated admin menus
//! - `menu`: Reply-keyboard menus
//! - `messages`: User-facing texts
//! - `transition`: `Transition`, `SessionChange`, `Effect`

mod admin;
mod collect;
mod engine;
mod form;
mod lookup;
pub mod menu;
pub mod messages;
mod support;
mod transition;

#[cfg(test)]
mod tests;

pub use engine::{Collaborators, ConversationEngine, EngineSettings};
pub use form::Form;
pub use menu::{AdminEntry, MenuEntry, SupervisorEntry};
pub use transition::{Effect, SessionChange, Transition};
