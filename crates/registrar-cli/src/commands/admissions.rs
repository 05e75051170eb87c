use anyhow::Result;
use colored::Colorize;
use registrar_core::conversation::{Form, messages};
use registrar_core::record::AdmissionRepository;
use registrar_infrastructure::SqliteStore;

/// Prints every admission application, oldest first.
pub async fn list(store: SqliteStore) -> Result<()> {
    let admissions = AdmissionRepository::list_all(&store).await?;
    tracing::debug!("[Admissions] Listing {} applications", admissions.len());
    if admissions.is_empty() {
        println!("{}", "No admission applications".yellow());
        return Ok(());
    }

    for admission in admissions {
        let from = admission
            .identity
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}",
            format!(
                "#{} from {} [{}] {}",
                admission.id,
                from,
                admission.review_status,
                admission.created_at.format("%Y-%m-%d %H:%M")
            )
            .bright_magenta()
        );
        println!("{}", messages::render_fields(Form::Admission, &admission.fields));
        println!();
    }
    Ok(())
}
