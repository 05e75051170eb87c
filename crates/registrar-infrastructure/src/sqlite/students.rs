use async_trait::async_trait;
use chrono::{DateTime, Utc};
use registrar_core::conversation::Form;
use registrar_core::error::{RegistrarError, Result};
use registrar_core::field::{FieldKey, FieldMap, FieldValue};
use registrar_core::record::{
    CommitAction, CommitOutcome, StudentCommit, StudentRecord, StudentRepository,
    StudentStatistics,
};
use registrar_core::transport::SubjectId;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, TransactionBehavior, params};

use super::{SqliteStore, column_list, db_error, from_sql_value, to_sql_value};

const META_COLUMNS: &str = "id, telegram_id, can_view_data, is_form_locked, created_at, updated_at";
const META_COUNT: usize = 6;

fn select_students(filter: &str) -> String {
    format!(
        "SELECT {}, {} FROM students {}",
        META_COLUMNS,
        column_list(Form::Student.sequence()),
        filter
    )
}

fn map_student(row: &Row<'_>) -> rusqlite::Result<StudentRecord> {
    let mut fields = FieldMap::new();
    for (offset, key) in Form::Student.sequence().iter().enumerate() {
        let value: Value = row.get(META_COUNT + offset)?;
        if let Some(value) = from_sql_value(*key, value) {
            fields.set(*key, value);
        }
    }
    Ok(StudentRecord {
        id: row.get(0)?,
        identity: row.get::<_, Option<i64>>(1)?.map(SubjectId),
        can_view_data: row.get(2)?,
        is_form_locked: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        fields,
    })
}

/// Form columns present in `fields`, with their values.
fn form_columns(fields: &FieldMap) -> (Vec<FieldKey>, Vec<Value>) {
    Form::Student
        .sequence()
        .iter()
        .filter_map(|key| fields.get(*key).map(|value| (*key, to_sql_value(value))))
        .unzip()
}

fn find_by_name(conn: &Connection, full_name: &str) -> rusqlite::Result<Option<StudentRecord>> {
    conn.query_row(
        &select_students("WHERE full_name = ?1 ORDER BY id LIMIT 1"),
        params![full_name],
        map_student,
    )
    .optional()
}

/// Overwrites the form columns present in `fields`.
///
/// `claimant` is attached only when a shell is claimed; a linked record
/// keeps its owner.
fn update_student(
    conn: &Connection,
    id: i64,
    claimant: Option<SubjectId>,
    fields: &FieldMap,
    now: DateTime<Utc>,
) -> Result<()> {
    let (keys, values) = form_columns(fields);
    let mut assignments: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| format!("{} = ?{}", key.as_ref(), i + 1))
        .collect();
    let mut args: Vec<Box<dyn ToSql>> = values
        .into_iter()
        .map(|v| Box::new(v) as Box<dyn ToSql>)
        .collect();

    if let Some(claimant) = claimant {
        args.push(Box::new(claimant.0));
        assignments.push(format!("telegram_id = ?{}", args.len()));
    }
    args.push(Box::new(now));
    assignments.push(format!("updated_at = ?{}", args.len()));
    args.push(Box::new(id));

    let sql = format!(
        "UPDATE students SET {} WHERE id = ?{}",
        assignments.join(", "),
        args.len()
    );
    let changed = conn
        .execute(&sql, rusqlite::params_from_iter(args.iter()))
        .map_err(db_error)?;
    if changed == 0 {
        return Err(RegistrarError::not_found("Student", id.to_string()));
    }
    Ok(())
}

fn insert_student(
    conn: &Connection,
    identity: Option<SubjectId>,
    fields: &FieldMap,
    now: DateTime<Utc>,
) -> Result<i64> {
    let (keys, values) = form_columns(fields);
    let n = keys.len();
    let placeholders: Vec<String> = (1..=n + 3).map(|i| format!("?{}", i)).collect();

    let mut args: Vec<Box<dyn ToSql>> = values
        .into_iter()
        .map(|v| Box::new(v) as Box<dyn ToSql>)
        .collect();
    args.push(Box::new(identity.map(|id| id.0)));
    args.push(Box::new(now));
    args.push(Box::new(now));

    let sql = format!(
        "INSERT INTO students ({}{}telegram_id, created_at, updated_at) VALUES ({})",
        column_list(&keys),
        if keys.is_empty() { "" } else { ", " },
        placeholders.join(", ")
    );
    conn.execute(&sql, rusqlite::params_from_iter(args.iter()))
        .map_err(db_error)?;
    Ok(conn.last_insert_rowid())
}

fn commit(conn: &mut Connection, commit: StudentCommit) -> Result<CommitOutcome> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(db_error)?;

    let shell = if CommitAction::needs_shell_lookup(commit.target) {
        let full_name = commit
            .fields
            .full_name()
            .ok_or_else(|| RegistrarError::internal("student form has no full name"))?;
        tx.query_row(
            "SELECT id FROM students WHERE full_name = ?1 AND telegram_id IS NULL ORDER BY id LIMIT 1",
            params![full_name],
            |row| row.get::<_, i64>(0),
        )
        .optional()
        .map_err(db_error)?
    } else {
        None
    };

    let now = Utc::now();
    let action = CommitAction::plan(commit.target, shell);
    tracing::debug!("[SqliteStore] Commit by {}: {:?}", commit.identity, action);

    let outcome = match action {
        CommitAction::Update(id) => {
            update_student(&tx, id, None, &commit.fields, now)?;
            CommitOutcome::Updated(id)
        }
        CommitAction::Claim(id) => {
            update_student(&tx, id, Some(commit.identity), &commit.fields, now)?;
            CommitOutcome::Updated(id)
        }
        CommitAction::Insert => {
            CommitOutcome::Created(insert_student(&tx, Some(commit.identity), &commit.fields, now)?)
        }
    };

    tx.commit().map_err(db_error)?;
    Ok(outcome)
}

fn group_counts(conn: &Connection, column: &str) -> rusqlite::Result<Vec<(Option<String>, u64)>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {col}, COUNT(*) FROM students GROUP BY {col} ORDER BY {col}",
        col = column
    ))?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?;
    rows.collect()
}

#[async_trait]
impl StudentRepository for SqliteStore {
    async fn find_by_name(&self, full_name: &str) -> Result<Option<StudentRecord>> {
        let full_name = full_name.to_string();
        self.with_conn(move |conn| find_by_name(conn, &full_name).map_err(db_error))
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<StudentRecord>> {
        self.with_conn(move |conn| {
            conn.query_row(&select_students("WHERE id = ?1"), params![id], map_student)
                .optional()
                .map_err(db_error)
        })
        .await
    }

    async fn slot_in_use(&self, slot: i64, excluding: Option<i64>) -> Result<bool> {
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM students WHERE student_number = ?1 AND (?2 IS NULL OR id != ?2))",
                params![slot, excluding],
                |row| row.get(0),
            )
            .map_err(db_error)
        })
        .await
    }

    async fn commit(&self, student: StudentCommit) -> Result<CommitOutcome> {
        self.with_conn(move |conn| commit(conn, student)).await
    }

    async fn insert_shell(&self, full_name: &str) -> Result<bool> {
        let full_name = full_name.trim().to_string();
        self.with_conn(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(db_error)?;
            if find_by_name(&tx, &full_name).map_err(db_error)?.is_some() {
                return Ok(false);
            }
            let fields: FieldMap = [(FieldKey::FullName, FieldValue::text(full_name.as_str()))]
                .into_iter()
                .collect();
            insert_student(&tx, None, &fields, Utc::now())?;
            tx.commit().map_err(db_error)?;
            Ok(true)
        })
        .await
    }

    async fn toggle_view_permission(&self, full_name: &str) -> Result<Option<bool>> {
        let full_name = full_name.to_string();
        let toggled = self
            .with_conn(move |conn| {
                let tx = conn.transaction().map_err(db_error)?;
                let Some((id, allowed)) = tx
                    .query_row(
                        "SELECT id, can_view_data FROM students WHERE full_name = ?1 ORDER BY id LIMIT 1",
                        params![full_name],
                        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)),
                    )
                    .optional()
                    .map_err(db_error)?
                else {
                    return Ok(None);
                };
                tx.execute(
                    "UPDATE students SET can_view_data = ?1, updated_at = ?2 WHERE id = ?3",
                    params![!allowed, Utc::now(), id],
                )
                .map_err(db_error)?;
                tx.commit().map_err(db_error)?;
                Ok(Some(!allowed))
            })
            .await?;
        tracing::info!("[SqliteStore] View permission toggled: {:?}", toggled);
        Ok(toggled)
    }

    async fn statistics(&self) -> Result<StudentStatistics> {
        self.with_conn(|conn| {
            let total: i64 = conn
                .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
                .map_err(db_error)?;
            Ok(StudentStatistics {
                total: total as u64,
                by_grade: group_counts(conn, FieldKey::Grade.as_ref()).map_err(db_error)?,
                by_section: group_counts(conn, FieldKey::Section.as_ref()).map_err(db_error)?,
            })
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(&select_students("ORDER BY id"))
                .map_err(db_error)?;
            let rows = stmt.query_map([], map_student).map_err(db_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
        })
        .await
    }
}
