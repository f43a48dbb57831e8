use crate::dto::admin_dto::{
    AllocateTestRequest, AllowTestRequest, CreateTestRequest, NewQuestion, UpdateTestRequest,
};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::test::Test;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TestCatalogService {
    pool: PgPool,
}

impl TestCatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_test(&self, req: &CreateTestRequest) -> Result<Test> {
        let questions = assign_question_ids(&req.questions);
        let total = total_time_limit(&questions);
        let questions_json = serde_json::to_value(&questions)?;

        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (external_id, test_name, subject, total_time_limit, is_practice, questions)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&req.test_name)
        .bind(&req.subject)
        .bind(total)
        .bind(req.is_practice)
        .bind(questions_json)
        .fetch_one(&self.pool)
        .await?;

        if test.is_practice {
            self.allow_for_everyone(test.id).await?;
        }

        tracing::info!(test_id = %test.id, questions = questions.len(), "Test created");
        Ok(test)
    }

    /// Persists a bulk-imported sheet. The rows were validated and numbered
    /// upstream; this is the same write path as a hand-authored test.
    pub async fn create_imported(
        &self,
        test_name: &str,
        subject: &str,
        is_practice: bool,
        outcome: &crate::services::import::ImportOutcome,
    ) -> Result<Test> {
        let questions_json = serde_json::to_value(&outcome.questions)?;
        let test = sqlx::query_as::<_, Test>(
            r#"
            INSERT INTO tests (external_id, test_name, subject, total_time_limit, is_practice, questions)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(test_name)
        .bind(subject)
        .bind(outcome.total_time_limit)
        .bind(is_practice)
        .bind(questions_json)
        .fetch_one(&self.pool)
        .await?;

        if test.is_practice {
            self.allow_for_everyone(test.id).await?;
        }

        tracing::info!(
            test_id = %test.id,
            questions = outcome.questions.len(),
            skipped = outcome.skipped_rows,
            "Test imported"
        );
        Ok(test)
    }

    pub async fn get_test(&self, test_id: Uuid) -> Result<Test> {
        sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE id = $1"#)
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))
    }

    pub async fn list_tests(&self) -> Result<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests ORDER BY created_at DESC"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(tests)
    }

    /// Partial update. A new question list gets fresh sequential ids and the
    /// total allotment is always recomputed from whatever list ends up stored.
    pub async fn update_test(&self, test_id: Uuid, req: &UpdateTestRequest) -> Result<Test> {
        let questions_json = match &req.questions {
            Some(qs) => Some(serde_json::to_value(assign_question_ids(qs))?),
            None => None,
        };

        let test = sqlx::query_as::<_, Test>(
            r#"
            UPDATE tests
            SET test_name = COALESCE($1, test_name),
                subject = COALESCE($2, subject),
                is_practice = COALESCE($3, is_practice),
                questions = COALESCE($4, questions),
                updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&req.test_name)
        .bind(&req.subject)
        .bind(req.is_practice)
        .bind(questions_json)
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        let total = total_time_limit(&test.parsed_questions());
        let test = sqlx::query_as::<_, Test>(
            r#"UPDATE tests SET total_time_limit = $1 WHERE id = $2 RETURNING *"#,
        )
        .bind(total)
        .bind(test_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(test)
    }

    /// Graded submissions keep referencing their test forever, so a test
    /// with recorded attempts refuses deletion instead of orphaning them.
    pub async fn delete_test(&self, test_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM tests WHERE id = $1"#)
            .bind(test_id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) if done.rows_affected() == 0 => {
                Err(Error::NotFound("Test not found".to_string()))
            }
            Ok(_) => Ok(()),
            Err(err) if is_foreign_key_violation(&err) => Err(Error::Conflict(
                "Test has recorded submissions and cannot be deleted".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    /// Grants a test to a whole school, one class of it, or a single student,
    /// whichever scope the request names.
    pub async fn allow_test(&self, req: &AllowTestRequest) -> Result<u64> {
        self.get_test(req.test_id).await?;

        let granted = match (&req.school_id, &req.class_name, &req.student_id) {
            (Some(school_id), Some(class_name), _) => {
                sqlx::query(
                    r#"
                    INSERT INTO allowed_tests (user_id, test_id)
                    SELECT id, $1 FROM users WHERE school_id = $2 AND class_name = $3
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(req.test_id)
                .bind(school_id)
                .bind(class_name)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            (Some(school_id), None, _) => {
                sqlx::query(
                    r#"
                    INSERT INTO allowed_tests (user_id, test_id)
                    SELECT id, $1 FROM users WHERE school_id = $2
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(req.test_id)
                .bind(school_id)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            (None, Some(class_name), _) => {
                sqlx::query(
                    r#"
                    INSERT INTO allowed_tests (user_id, test_id)
                    SELECT id, $1 FROM users WHERE class_name = $2
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(req.test_id)
                .bind(class_name)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            (None, None, Some(student_id)) => {
                sqlx::query(
                    r#"
                    INSERT INTO allowed_tests (user_id, test_id)
                    SELECT id, $1 FROM users WHERE student_id = $2
                    ON CONFLICT DO NOTHING
                    "#,
                )
                .bind(req.test_id)
                .bind(student_id)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            (None, None, None) => {
                return Err(Error::BadRequest(
                    "Please select a school, class, or user to allow the test.".to_string(),
                ));
            }
        };

        if granted == 0 {
            return Err(Error::NotFound(
                "No matching students for the selected scope".to_string(),
            ));
        }
        Ok(granted)
    }

    /// Single-student grant addressed by the external test identifier, the
    /// form the spreadsheet-driven admin tooling uses.
    pub async fn allocate_test(&self, req: &AllocateTestRequest) -> Result<()> {
        let test = sqlx::query_as::<_, Test>(r#"SELECT * FROM tests WHERE external_id = $1"#)
            .bind(&req.test_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"SELECT id FROM users WHERE student_id = $1"#,
        )
        .bind(&req.student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        // Granting twice is a no-op, not an error.
        sqlx::query(
            r#"INSERT INTO allowed_tests (user_id, test_id) VALUES ($1, $2) ON CONFLICT DO NOTHING"#,
        )
        .bind(user_id)
        .bind(test.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn allow_for_everyone(&self, test_id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO allowed_tests (user_id, test_id)
            SELECT id, $1 FROM users
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(test_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23503")
        .unwrap_or(false)
}

/// Questions get stable ids 1..N at creation; submitted answers are matched
/// against these for the life of the test.
pub fn assign_question_ids(questions: &[NewQuestion]) -> Vec<Question> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| Question {
            id: (idx as i32) + 1,
            question_text: q.question_text.clone(),
            options: q.options.clone(),
            correct_answer: q.correct_answer.clone(),
            time_limit: q.time_limit,
        })
        .collect()
}

pub fn total_time_limit(questions: &[Question]) -> i32 {
    questions.iter().map(|q| q.time_limit).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_question(text: &str, minutes: i32) -> NewQuestion {
        NewQuestion {
            question_text: text.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "a".into(),
            time_limit: minutes,
        }
    }

    #[test]
    fn question_ids_are_sequential_from_one() {
        let questions =
            assign_question_ids(&[new_question("q1", 1), new_question("q2", 2)]);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[1].id, 2);
    }

    #[test]
    fn total_allotment_is_the_sum_of_question_limits() {
        let questions = assign_question_ids(&[
            new_question("q1", 1),
            new_question("q2", 2),
            new_question("q3", 3),
        ]);
        assert_eq!(total_time_limit(&questions), 6);
    }
}
