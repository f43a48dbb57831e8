use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Test {
    pub id: Uuid,
    pub external_id: String,
    pub test_name: String,
    pub subject: String,
    /// Sum of per-question allotments, in minutes.
    pub total_time_limit: i32,
    /// Practice tests are auto-allowed for every student on creation.
    pub is_practice: bool,
    pub questions: JsonValue,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Test {
    pub fn parsed_questions(&self) -> Vec<crate::models::question::Question> {
        serde_json::from_value(self.questions.clone()).unwrap_or_default()
    }
}
