use crate::dto::admin_dto::{CreateUserRequest, UserPatch};
use crate::dto::student_dto::{PopulatedUser, ProfilePatch};
use crate::error::{Error, Result};
use crate::models::class::Class;
use crate::models::school::School;
use crate::models::submission::Submission;
use crate::models::test::Test;
use crate::models::user::{User, LEVEL_STUDENT};
use crate::utils::student_id;
use sqlx::PgPool;
use uuid::Uuid;

/// Schools, classes and user accounts: the administrative directory the
/// quiz flows hang off.
#[derive(Clone)]
pub struct DirectoryService {
    pool: PgPool,
}

impl DirectoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_schools(&self) -> Result<Vec<School>> {
        let schools =
            sqlx::query_as::<_, School>(r#"SELECT * FROM schools ORDER BY school_name"#)
                .fetch_all(&self.pool)
                .await?;
        Ok(schools)
    }

    pub async fn add_school(&self, school_name: &str) -> Result<School> {
        let school = sqlx::query_as::<_, School>(
            r#"INSERT INTO schools (school_code, school_name) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(school_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(school)
    }

    pub async fn edit_school(&self, school_id: Uuid, school_name: &str) -> Result<School> {
        sqlx::query_as::<_, School>(
            r#"UPDATE schools SET school_name = $1 WHERE id = $2 RETURNING *"#,
        )
        .bind(school_name)
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("School not found".to_string()))
    }

    pub async fn delete_school(&self, school_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM schools WHERE id = $1"#)
            .bind(school_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("School not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_classes(&self) -> Result<Vec<Class>> {
        let classes = sqlx::query_as::<_, Class>(r#"SELECT * FROM classes ORDER BY class_name"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(classes)
    }

    pub async fn add_class(&self, class_name: &str) -> Result<Class> {
        let class = sqlx::query_as::<_, Class>(
            r#"INSERT INTO classes (class_name) VALUES ($1) RETURNING *"#,
        )
        .bind(class_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(class)
    }

    pub async fn edit_class(&self, class_id: Uuid, class_name: &str) -> Result<Class> {
        sqlx::query_as::<_, Class>(
            r#"UPDATE classes SET class_name = $1 WHERE id = $2 RETURNING *"#,
        )
        .bind(class_name)
        .bind(class_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("Class not found".to_string()))
    }

    pub async fn delete_class(&self, class_id: Uuid) -> Result<()> {
        let result = sqlx::query(r#"DELETE FROM classes WHERE id = $1"#)
            .bind(class_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Class not found".to_string()));
        }
        Ok(())
    }

    /// Admin-created student account with a freshly minted student id.
    pub async fn create_user(&self, req: &CreateUserRequest) -> Result<User> {
        let school = sqlx::query_as::<_, School>(r#"SELECT * FROM schools WHERE id = $1"#)
            .bind(req.school_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("School not found".to_string()))?;

        let minted = student_id::mint(&school.school_name, &req.class_name);
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (student_id, name, phone_number, school_id, class_name, access_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&minted)
        .bind(&req.name)
        .bind(&req.phone_number)
        .bind(school.id)
        .bind(&req.class_name)
        .bind(LEVEL_STUDENT)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(student_id = %user.student_id, "User created by admin");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users ORDER BY name"#)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn user_by_student_id(&self, student_id: &str) -> Result<User> {
        sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE student_id = $1"#)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Profile with allowance and history attached, history newest first.
    pub async fn populated_user(&self, student_id: &str) -> Result<PopulatedUser> {
        let user = self.user_by_student_id(student_id).await?;

        let allowed_tests = sqlx::query_as::<_, Test>(
            r#"
            SELECT t.* FROM tests t
            JOIN allowed_tests a ON a.test_id = t.id
            WHERE a.user_id = $1
            ORDER BY t.test_name
            "#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        let given_tests = sqlx::query_as::<_, Submission>(
            r#"SELECT * FROM submissions WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PopulatedUser {
            user,
            allowed_tests,
            given_tests,
        })
    }

    /// Self-service profile edit: name and phone only.
    pub async fn update_profile(&self, student_id: &str, patch: &ProfilePatch) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                phone_number = COALESCE($2, phone_number),
                updated_at = NOW()
            WHERE student_id = $3
            RETURNING *
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.phone_number)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    /// Admin edit: may also move the student between schools and classes or
    /// change their access level.
    pub async fn update_user(&self, patch: &UserPatch) -> Result<User> {
        if let Some(school_id) = patch.school_id {
            let exists =
                sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM schools WHERE id = $1"#)
                    .bind(school_id)
                    .fetch_one(&self.pool)
                    .await?;
            if exists == 0 {
                return Err(Error::NotFound("School not found".to_string()));
            }
        }

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                phone_number = COALESCE($2, phone_number),
                school_id = COALESCE($3, school_id),
                class_name = COALESCE($4, class_name),
                access_level = COALESCE($5, access_level),
                updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&patch.name)
        .bind(&patch.phone_number)
        .bind(patch.school_id)
        .bind(&patch.class_name)
        .bind(&patch.access_level)
        .bind(patch.id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }

    pub async fn delete_user(&self, student_id: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"DELETE FROM users WHERE student_id = $1 RETURNING *"#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))
    }
}
