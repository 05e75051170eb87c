//! Registrar core: the conversational intake engine for student records.
//!
//! The engine is a pure transition function over a per-user [`session::Session`].
//! Storage, file handling and message delivery sit behind the traits in
//! [`session`], [`record`] and [`transport`].

pub mod admin;
pub mod conversation;
pub mod error;
pub mod field;
pub mod record;
pub mod session;
pub mod transport;

pub use error::{RegistrarError, Result};
