use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::ActuatorLog;

/// Entries kept before the oldest are pruned.
pub const ACTUATOR_LOG_CAPACITY: u32 = 10_000;

#[derive(Clone)]
pub struct ActuatorLogRepository {
    storage: Arc<Storage>,
    capacity: u32,
}

impl ActuatorLogRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self::with_capacity(storage, ACTUATOR_LOG_CAPACITY)
    }

    pub fn with_capacity(storage: Arc<Storage>, capacity: u32) -> Self {
        Self { storage, capacity }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl ActuatorLogRepository {
    /// Appends an entry, dropping the oldest ones beyond the capacity.
    pub async fn create(&self, key: &str, value: &str, source: &str, success: bool) -> Result<i64, Error> {
        let mut tx = self.storage.get_pool().begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO actuator_log (key, value, source, success, time)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(source)
        .bind(success)
        .bind(OffsetDateTime::now_utc())
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let pruned = sqlx::query(
            r#"
            DELETE FROM actuator_log
            WHERE id <= (SELECT id FROM actuator_log ORDER BY id DESC LIMIT 1 OFFSET $1)
            "#,
        )
        .bind(self.capacity)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        if pruned > 0 {
            tracing::debug!("pruned {} actuator log entries", pruned);
        }

        Ok(id)
    }

    /// Newest entries first.
    pub async fn find_recent(&self, limit: u32) -> Result<Vec<ActuatorLog>, Error> {
        let logs: Vec<ActuatorLog> = sqlx::query_as("SELECT * FROM actuator_log ORDER BY id DESC LIMIT $1")
            .bind(limit)
            .fetch_all(self.storage.get_pool())
            .await?;

        Ok(logs)
    }
}
