//! SQLite-backed store.
//!
//! One [`SqliteStore`] implements every repository trait of the core. The
//! connection is shared behind an async mutex and each operation runs on the
//! blocking pool.

mod admissions;
mod settings;
mod students;

use std::path::Path;
use std::sync::Arc;

use registrar_core::error::{RegistrarError, Result};
use registrar_core::field::{FieldKey, FieldValue};
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode};
use tokio::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS students (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER UNIQUE,
    full_name TEXT NOT NULL,
    dob TEXT,
    grade TEXT,
    section TEXT,
    student_number INTEGER UNIQUE,
    phone_number TEXT,
    parent_phone_number TEXT,
    middle_school TEXT,
    location_link TEXT,
    address_description TEXT,
    personal_photo_path TEXT,
    student_card_photo_path TEXT,
    father_card_photo_path TEXT,
    mother_card_photo_path TEXT,
    status TEXT,
    role TEXT,
    academic_year TEXT,
    can_view_data INTEGER NOT NULL DEFAULT 1,
    is_form_locked INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_students_full_name ON students(full_name);

CREATE TABLE IF NOT EXISTS admission_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    telegram_id INTEGER,
    full_name TEXT NOT NULL,
    dob TEXT,
    phone_number TEXT,
    parent_phone_number TEXT,
    middle_school TEXT,
    location_link TEXT,
    address_description TEXT,
    personal_photo_path TEXT,
    student_card_photo_path TEXT,
    father_card_photo_path TEXT,
    mother_card_photo_path TEXT,
    review_status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS supervisors (
    telegram_id INTEGER PRIMARY KEY,
    username TEXT,
    full_name TEXT NOT NULL,
    password TEXT NOT NULL,
    created_at TEXT NOT NULL
);

INSERT OR IGNORE INTO settings (key, value) VALUES ('form_status', 'open');
";

/// Relational store for students, admissions, settings and supervisors.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and bootstraps the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_error)?;
        tracing::info!("[SqliteStore] Opened {}", path.display());
        Self::bootstrap(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_error)?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `op` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.blocking_lock();
            op(&mut *conn)
        })
        .await
        .map_err(|e| RegistrarError::internal(format!("Failed to join task: {}", e)))?
    }
}

/// Maps a driver error; constraint failures become `Conflict` with the raw
/// SQLite message.
pub(crate) fn db_error(err: rusqlite::Error) -> RegistrarError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RegistrarError::conflict(message.clone().unwrap_or_else(|| err.to_string()))
        }
        _ => RegistrarError::data_access(err.to_string()),
    }
}

pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

/// Column value for a field.
fn to_sql_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(n) => Value::Integer(*n),
        FieldValue::Text(s) | FieldValue::Asset(s) => Value::Text(s.clone()),
    }
}

/// Field value for a column; `None` for NULL.
fn from_sql_value(key: FieldKey, value: Value) -> Option<FieldValue> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(n) if key == FieldKey::StudentNumber => Some(FieldValue::Integer(n)),
        Value::Integer(n) => Some(FieldValue::Text(n.to_string())),
        Value::Real(f) => Some(FieldValue::Text(f.to_string())),
        Value::Text(s) if key.is_image() => Some(FieldValue::Asset(s)),
        Value::Text(s) => Some(FieldValue::Text(s)),
    }
}

/// Comma-separated column names of `keys`.
fn column_list(keys: &[FieldKey]) -> String {
    keys.iter()
        .map(|key| key.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}
