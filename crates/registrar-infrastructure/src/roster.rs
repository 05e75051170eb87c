//! Bulk roster import and tabular export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use registrar_core::conversation::Form;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::record::{ImportReport, RosterImporter, StudentExporter, StudentRepository};

fn csv_error(err: csv::Error) -> RegistrarError {
    RegistrarError::Serialization {
        format: "CSV".to_string(),
        message: err.to_string(),
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
}

/// Reads names from the first column of a `.csv` file (first row is the
/// header) or from the lines of a `.txt` file.
fn read_names(file_name: &str, bytes: &[u8]) -> Result<Vec<String>> {
    let names = match extension(file_name).as_deref() {
        Some("csv") => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .from_reader(bytes);
            let mut names = Vec::new();
            for record in reader.records() {
                let record = record.map_err(csv_error)?;
                if let Some(name) = record.get(0) {
                    names.push(name.to_string());
                }
            }
            names
        }
        Some("txt") => String::from_utf8_lossy(bytes)
            .lines()
            .map(str::to_string)
            .collect(),
        _ => {
            return Err(RegistrarError::config(format!(
                "unsupported roster file '{}'",
                file_name
            )));
        }
    };

    Ok(names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Creates a name-only shell for every listed name that is not stored yet.
pub struct CsvRosterImporter {
    students: Arc<dyn StudentRepository>,
}

impl CsvRosterImporter {
    pub fn new(students: Arc<dyn StudentRepository>) -> Self {
        Self { students }
    }
}

#[async_trait]
impl RosterImporter for CsvRosterImporter {
    fn supports(&self, file_name: &str) -> bool {
        matches!(extension(file_name).as_deref(), Some("csv" | "txt"))
    }

    async fn import(&self, file_name: &str, bytes: &[u8]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for name in read_names(file_name, bytes)? {
            if self.students.insert_shell(&name).await? {
                report.inserted += 1;
            } else {
                report.skipped += 1;
            }
        }
        tracing::info!(
            "[Roster] Imported '{}': {} inserted, {} skipped",
            file_name,
            report.inserted,
            report.skipped
        );
        Ok(report)
    }
}

/// Writes every student row to a timestamped CSV file.
pub struct CsvStudentExporter {
    students: Arc<dyn StudentRepository>,
    exports_dir: PathBuf,
}

impl CsvStudentExporter {
    pub fn new(students: Arc<dyn StudentRepository>, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            students,
            exports_dir: exports_dir.into(),
        }
    }
}

#[async_trait]
impl StudentExporter for CsvStudentExporter {
    async fn export(&self) -> Result<Option<PathBuf>> {
        let students = self.students.list_all().await?;
        if students.is_empty() {
            return Ok(None);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = vec!["id".to_string(), "telegram_id".to_string()];
        header.extend(Form::Student.sequence().iter().map(|k| k.to_string()));
        header.extend(["can_view_data", "created_at", "updated_at"].map(String::from));
        writer.write_record(&header).map_err(csv_error)?;

        for student in &students {
            let mut row = vec![
                student.id.to_string(),
                student.identity.map(|id| id.to_string()).unwrap_or_default(),
            ];
            row.extend(Form::Student.sequence().iter().map(|key| {
                student
                    .fields
                    .get(*key)
                    .map(ToString::to_string)
                    .unwrap_or_default()
            }));
            row.push(student.can_view_data.to_string());
            row.push(student.created_at.to_rfc3339());
            row.push(student.updated_at.to_rfc3339());
            writer.write_record(&row).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| RegistrarError::internal(format!("Failed to flush CSV: {}", e)))?;

        tokio::fs::create_dir_all(&self.exports_dir).await?;
        let path = self.exports_dir.join(format!(
            "students_{}.csv",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));
        tokio::fs::write(&path, bytes).await?;

        tracing::info!("[Roster] Exported {} students to {}", students.len(), path.display());
        Ok(Some(path))
    }
}
