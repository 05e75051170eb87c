//! One-shot roster import and student export.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use registrar_core::record::{RosterImporter, StudentExporter};
use registrar_infrastructure::{CsvRosterImporter, CsvStudentExporter, RegistrarConfig, SqliteStore};

pub async fn import(store: SqliteStore, file: &Path) -> Result<()> {
    let file_name = file
        .file_name()
        .and_then(|name| name.to_str())
        .context("Roster path has no file name")?;

    let importer = CsvRosterImporter::new(Arc::new(store));
    if !importer.supports(file_name) {
        tracing::warn!("[Roster] Rejected roster file {}", file_name);
        anyhow::bail!("Unsupported roster file '{}': use .csv or .txt", file_name);
    }

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let report = importer.import(file_name, &bytes).await?;
    tracing::info!(
        "[Roster] Imported {} from the command line: {} added, {} skipped",
        file_name,
        report.inserted,
        report.skipped
    );

    println!(
        "{}",
        format!("Imported {}: {} added, {} already present", file_name, report.inserted, report.skipped)
            .green()
    );
    Ok(())
}

pub async fn export(config: &RegistrarConfig, store: SqliteStore) -> Result<()> {
    let exporter = CsvStudentExporter::new(Arc::new(store), config.storage.exports_dir.clone());
    match exporter.export().await? {
        Some(path) => {
            tracing::info!("[Roster] Exported students to {}", path.display());
            println!("{}", format!("Exported to {}", path.display()).green());
        }
        None => {
            tracing::debug!("[Roster] Export skipped: no students");
            println!("{}", "No students to export".yellow());
        }
    }
    Ok(())
}
