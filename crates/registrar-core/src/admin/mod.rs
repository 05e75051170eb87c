//! Administrative gating.

mod gate;

pub use gate::{AdminGate, FORM_STATUS_KEY, FormStatus};
