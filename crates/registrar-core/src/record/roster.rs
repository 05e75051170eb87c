//! File-based collaborators: uploaded images, bulk import and export.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::transport::Attachment;

/// Stores uploaded images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Downloads `attachment` into `folder` and returns a stable path that is
    /// stored as the field value.
    async fn store(&self, attachment: &Attachment, folder: &str) -> Result<String>;
}

/// Counts from one bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Turns an uploaded name list into shell records.
#[async_trait]
pub trait RosterImporter: Send + Sync {
    /// Whether `file_name` has a format this importer reads.
    fn supports(&self, file_name: &str) -> bool;

    /// Inserts a shell for every name not yet present.
    async fn import(&self, file_name: &str, bytes: &[u8]) -> Result<ImportReport>;
}

/// Writes all student rows to a tabular file.
#[async_trait]
pub trait StudentExporter: Send + Sync {
    /// Returns the written file, or `None` when there is nothing to export.
    async fn export(&self) -> Result<Option<PathBuf>>;
}
