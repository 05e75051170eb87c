use async_trait::async_trait;
use chrono::Utc;
use registrar_core::conversation::Form;
use registrar_core::error::Result;
use registrar_core::field::FieldMap;
use registrar_core::record::{AdmissionRecord, AdmissionRepository, PENDING_REVIEW};
use registrar_core::transport::SubjectId;
use rusqlite::types::Value;
use rusqlite::{Row, ToSql};

use super::{SqliteStore, column_list, db_error, from_sql_value, to_sql_value};

fn map_admission(row: &Row<'_>) -> rusqlite::Result<AdmissionRecord> {
    let mut fields = FieldMap::new();
    for (offset, key) in Form::Admission.sequence().iter().enumerate() {
        let value: Value = row.get(4 + offset)?;
        if let Some(value) = from_sql_value(*key, value) {
            fields.set(*key, value);
        }
    }
    Ok(AdmissionRecord {
        id: row.get(0)?,
        identity: row.get::<_, Option<i64>>(1)?.map(SubjectId),
        review_status: row.get(2)?,
        created_at: row.get(3)?,
        fields,
    })
}

#[async_trait]
impl AdmissionRepository for SqliteStore {
    async fn insert(&self, identity: SubjectId, fields: &FieldMap) -> Result<i64> {
        let (keys, values): (Vec<_>, Vec<_>) = Form::Admission
            .sequence()
            .iter()
            .filter_map(|key| fields.get(*key).map(|value| (*key, to_sql_value(value))))
            .unzip();

        let id = self
            .with_conn(move |conn| {
                let n = keys.len();
                let placeholders: Vec<String> = (1..=n + 3).map(|i| format!("?{}", i)).collect();
                let mut args: Vec<Box<dyn ToSql>> = values
                    .into_iter()
                    .map(|v| Box::new(v) as Box<dyn ToSql>)
                    .collect();
                args.push(Box::new(identity.0));
                args.push(Box::new(PENDING_REVIEW));
                args.push(Box::new(Utc::now()));

                let sql = format!(
                    "INSERT INTO admission_requests ({}{}telegram_id, review_status, created_at) VALUES ({})",
                    column_list(&keys),
                    if keys.is_empty() { "" } else { ", " },
                    placeholders.join(", ")
                );
                conn.execute(&sql, rusqlite::params_from_iter(args.iter()))
                    .map_err(db_error)?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        tracing::info!("[SqliteStore] Admission request {} stored", id);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<AdmissionRecord>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT id, telegram_id, review_status, created_at, {} FROM admission_requests ORDER BY id",
                column_list(Form::Admission.sequence())
            );
            let mut stmt = conn.prepare(&sql).map_err(db_error)?;
            let rows = stmt.query_map([], map_admission).map_err(db_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
        })
        .await
    }
}
