use async_trait::async_trait;
use registrar_core::error::Result;
use registrar_core::record::{SettingsRepository, Supervisor, SupervisorRepository};
use registrar_core::transport::SubjectId;
use rusqlite::{OptionalExtension, params};

use super::{SqliteStore, db_error, is_constraint_violation};

#[async_trait]
impl SettingsRepository for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_error)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(db_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SupervisorRepository for SqliteStore {
    async fn add(&self, supervisor: &Supervisor) -> Result<bool> {
        let supervisor = supervisor.clone();
        self.with_conn(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO supervisors (telegram_id, username, full_name, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    supervisor.identity.0,
                    supervisor.username,
                    supervisor.full_name,
                    supervisor.password,
                    supervisor.created_at
                ],
            );
            match inserted {
                Ok(_) => Ok(true),
                Err(e) if is_constraint_violation(&e) => Ok(false),
                Err(e) => Err(db_error(e)),
            }
        })
        .await
    }

    async fn remove(&self, identity: SubjectId) -> Result<bool> {
        self.with_conn(move |conn| {
            let removed = conn
                .execute(
                    "DELETE FROM supervisors WHERE telegram_id = ?1",
                    params![identity.0],
                )
                .map_err(db_error)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Supervisor>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT telegram_id, username, full_name, password, created_at
                     FROM supervisors ORDER BY created_at, telegram_id",
                )
                .map_err(db_error)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Supervisor {
                        identity: SubjectId(row.get(0)?),
                        username: row.get(1)?,
                        full_name: row.get(2)?,
                        password: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })
                .map_err(db_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(db_error)
        })
        .await
    }
}
