use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Error, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

/// SQLite database holding the rule blob and the actuator log.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        let in_memory = database.url.contains(":memory:");
        let options = SqliteConnectOptions::from_str(&database.url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            // an in-memory database lives only as long as its single connection
            .min_connections(1)
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await?;

        Self::prepare(&pool, &schema_manager, database.clean_start).await?;

        tracing::debug!("storage ready at {}", database.url);

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn prepare(pool: &SqlitePool, schema: &SchemaManager, clean_start: bool) -> Result<(), Error> {
        let mut tx = pool.begin().await?;

        if clean_start {
            tracing::warn!("clean start: dropping stored rules and actuator history");

            for statement in schema.dispose_schema() {
                sqlx::query(&statement).execute(&mut *tx).await?;
            }
        }

        for statement in schema.create_schema() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        tx.commit().await
    }
}
