pub mod admissions;
pub mod chat;
pub mod roster;
