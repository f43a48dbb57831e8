use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_COMPLETED: &str = "completed";

/// A graded attempt, written exactly once and never mutated afterwards.
/// The `user_id` foreign key doubles as the student's history link; history
/// reads are `ORDER BY created_at DESC` over this table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub test_name: String,
    pub score: i32,
    /// Ordered `GradedAnswer` breakdown, in submitted order.
    pub answers: JsonValue,
    pub status: String,
    /// Aggregate time across questions, in minutes.
    pub total_time_taken: f64,
    pub idempotency_key: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One entry of the persisted breakdown. `correct_answer` is absent when the
/// submitted question id matched nothing in the test definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradedAnswer {
    pub question_id: i32,
    pub question_text: String,
    pub given_answer: String,
    pub correct_answer: Option<String>,
    pub correct: bool,
}
