//! Infrastructure adapters for the registrar core traits.
//!
//! # Module Structure
//!
//! - `config`: TOML configuration loading
//! - `paths`: Default file locations
//! - `sqlite`: `SqliteStore`, the relational store behind every repository trait
//! - `memory_session_store`: `InMemorySessionStore`
//! - `local_asset_store`: Filesystem `AssetStore`
//! - `roster`: CSV/text roster import and CSV export

pub mod config;
pub mod local_asset_store;
pub mod memory_session_store;
pub mod paths;
pub mod roster;
pub mod sqlite;

pub use config::RegistrarConfig;
pub use local_asset_store::LocalAssetStore;
pub use memory_session_store::InMemorySessionStore;
pub use paths::RegistrarPaths;
pub use roster::{CsvRosterImporter, CsvStudentExporter};
pub use sqlite::SqliteStore;
