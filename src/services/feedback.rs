use crate::dto::student_dto::FeedbackRequest;
use crate::error::{Error, Result};
use crate::models::feedback::Feedback;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Feedback line as admins read it, with the student and test names joined in.
#[derive(Debug, Clone, serde::Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub feedback_text: String,
    pub student_name: String,
    pub test_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct FeedbackService {
    pool: PgPool,
}

impl FeedbackService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user_id: Uuid, req: &FeedbackRequest) -> Result<Feedback> {
        let test_exists =
            sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM tests WHERE id = $1"#)
                .bind(req.test_id)
                .fetch_one(&self.pool)
                .await?;
        if test_exists == 0 {
            return Err(Error::NotFound("Test not found".to_string()));
        }

        let feedback = sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (user_id, test_id, feedback_text)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(req.test_id)
        .bind(&req.feedback_text)
        .fetch_one(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn list(&self) -> Result<Vec<FeedbackEntry>> {
        let entries = sqlx::query_as::<_, FeedbackEntry>(
            r#"
            SELECT f.id, f.feedback_text, u.name AS student_name, t.test_name, f.created_at
            FROM feedback f
            JOIN users u ON u.id = f.user_id
            JOIN tests t ON t.id = f.test_id
            ORDER BY f.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
