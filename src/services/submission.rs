use crate::dto::student_dto::{PopulatedSubmission, SubmitTestRequest};
use crate::error::{Error, Result};
use crate::models::submission::{Submission, STATUS_COMPLETED};
use crate::models::test::Test;
use crate::models::user::User;
use crate::services::scoring::ScoringEngine;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubmissionService {
    pool: PgPool,
}

impl SubmissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Grades the payload and writes the result exactly once. The submission
    /// row's user reference is the history link, so grade and linkage land in
    /// a single transactional insert. A replayed idempotency key returns the
    /// originally graded record instead of writing again.
    pub async fn submit(&self, req: &SubmitTestRequest) -> Result<Submission> {
        if let Some(key) = req.idempotency_key {
            if let Some(existing) = self.find_by_idempotency_key(key).await? {
                tracing::info!(submission_id = %existing.id, "Replayed submission, returning stored record");
                return Ok(existing);
            }
        }

        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(req.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(req.test_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        let questions = test.parsed_questions();
        let (score, breakdown) = ScoringEngine::score(&questions, &req.answers);
        let answers_json = serde_json::to_value(&breakdown)?;

        let inserted = sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions
                (user_id, test_id, test_name, score, answers, status, total_time_taken, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(test.id)
        .bind(&req.test_name)
        .bind(score)
        .bind(answers_json)
        .bind(STATUS_COMPLETED)
        .bind(req.total_time_taken)
        .bind(req.idempotency_key)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(submission) => {
                tx.commit().await?;
                tracing::info!(
                    submission_id = %submission.id,
                    student = %user.student_id,
                    score,
                    "Submission graded"
                );
                Ok(submission)
            }
            Err(err) if is_unique_violation(&err) => {
                // Lost a race against a concurrent retry; the winner's row is
                // the canonical one.
                tx.rollback().await.ok();
                match req.idempotency_key {
                    Some(key) => self
                        .find_by_idempotency_key(key)
                        .await?
                        .ok_or_else(|| {
                            Error::Internal("Duplicate submission vanished".to_string())
                        }),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_idempotency_key(&self, key: Uuid) -> Result<Option<Submission>> {
        let existing = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE idempotency_key = $1"#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(existing)
    }

    /// Score-card read: the submission with its student and test attached.
    pub async fn scorecard(&self, submission_id: Uuid) -> Result<PopulatedSubmission> {
        let submission = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE id = $1"#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Given test not found".to_string()))?;

        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(submission.user_id)
            .fetch_one(&self.pool)
            .await?;

        let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(submission.test_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(PopulatedSubmission {
            submission,
            user,
            test,
        })
    }

    /// A student's attempt history, newest first.
    pub async fn history_for_user(&self, user_id: Uuid) -> Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn for_school(&self, school_id: Uuid) -> Result<Vec<(User, Vec<Submission>)>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE school_id = $1 ORDER BY name"#,
        )
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;
        if users.is_empty() {
            return Err(Error::NotFound(
                "No users found for the specified school".to_string(),
            ));
        }
        self.attach_histories(users).await
    }

    pub async fn for_class(&self, class_name: &str) -> Result<Vec<(User, Vec<Submission>)>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE class_name = $1 ORDER BY name"#,
        )
        .bind(class_name)
        .fetch_all(&self.pool)
        .await?;
        self.attach_histories(users).await
    }

    async fn attach_histories(&self, users: Vec<User>) -> Result<Vec<(User, Vec<Submission>)>> {
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let history = self.history_for_user(user.id).await?;
            out.push((user, history));
        }
        Ok(out)
    }

    /// Flat rows for the admin spreadsheet export.
    pub async fn export_rows(&self) -> Result<Vec<crate::services::export::SubmissionExportRow>> {
        let rows = sqlx::query_as::<_, crate::services::export::SubmissionExportRow>(
            r#"
            SELECT s.id, u.name AS student_name, u.student_id, sc.school_name, u.class_name,
                   s.test_name, t.subject, s.score,
                   jsonb_array_length(s.answers) AS question_count,
                   s.total_time_taken, s.status, s.created_at
            FROM submissions s
            JOIN users u ON u.id = s.user_id
            JOIN schools sc ON sc.id = u.school_id
            JOIN tests t ON t.id = s.test_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
