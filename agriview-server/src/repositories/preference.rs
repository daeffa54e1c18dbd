use std::sync::Arc;

use sqlx::{Error, Pool, Sqlite};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::Preference;

#[derive(Clone)]
pub struct PreferenceRepository {
    storage: Arc<Storage>,
}

impl PreferenceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn get_pool(&self) -> &Pool<Sqlite> {
        self.storage.get_pool()
    }
}

impl PreferenceRepository {
    pub async fn get(&self, key: &str) -> Result<Option<Preference>, Error> {
        let preference: Option<Preference> = sqlx::query_as("SELECT * FROM preferences WHERE key = $1")
            .bind(key)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(preference)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO preferences (key, value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(OffsetDateTime::now_utc())
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::setup_test_db;

    #[tokio::test]
    async fn test_set_overwrites_value() {
        let repository = PreferenceRepository::new(setup_test_db().await);

        assert!(repository.get("layout").await.unwrap().is_none());

        repository.set("layout", "compact").await.unwrap();
        repository.set("layout", "wide").await.unwrap();

        let preference = repository.get("layout").await.unwrap().unwrap();
        assert_eq!(preference.value, "wide");
    }
}
