use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

/// Client-profile scoped key-value entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preference {
    pub key: String,
    pub value: String,
    pub updated_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct PreferenceTable;

impl Table for PreferenceTable {
    fn name(&self) -> &'static str {
        "preferences"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS preferences;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
