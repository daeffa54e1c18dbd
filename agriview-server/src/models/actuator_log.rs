use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::models::Table;

/// One write attempted against the remote channel.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActuatorLog {
    pub id: i64,
    pub key: String,
    /// JSON encoded value
    pub value: String,
    pub source: String,
    pub success: bool,
    pub time: OffsetDateTime,
}

#[derive(Clone)]
pub struct ActuatorLogTable;

impl Table for ActuatorLogTable {
    fn name(&self) -> &'static str {
        "actuator_log"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS actuator_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                source TEXT NOT NULL,
                success BOOLEAN NOT NULL,
                time TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS actuator_log;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
