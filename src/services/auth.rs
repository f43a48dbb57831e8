use crate::dto::auth_dto::{
    AuthSuccessResponse, OtpIssuedResponse, RegisterRequest, SignInRequest, VerifyOtpRequest,
};
use crate::error::{Error, Result};
use crate::models::pending::{PendingRegistration, PendingSignIn};
use crate::models::school::School;
use crate::models::user::{User, LEVEL_STUDENT};
use crate::services::sms::OtpSender;
use crate::utils::{otp, student_id, token};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// OTP lifecycle for registration and sign-in. Pending state lives in its own
/// tables, never in process memory; every read checks expiry and the sweeper
/// deletes what the reads miss.
#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    sender: Arc<dyn OtpSender>,
}

impl AuthService {
    pub fn new(pool: PgPool, sender: Arc<dyn OtpSender>) -> Self {
        Self { pool, sender }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<OtpIssuedResponse> {
        let existing = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE phone_number = $1"#)
            .bind(&req.phone_number)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(Error::Conflict(
                "User already exists. Please sign in.".to_string(),
            ));
        }

        let school = self.find_or_create_school(&req.school_name).await?;
        let student_id = student_id::mint(&school.school_name, &req.class_name);

        let code = otp::generate_code();
        let expires_at = Utc::now() + Duration::minutes(self.otp_ttl_minutes());

        // A re-registration replaces the previous pending record for the
        // same phone, so only the latest code is live.
        sqlx::query(r#"DELETE FROM pending_registrations WHERE phone_number = $1"#)
            .bind(&req.phone_number)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO pending_registrations
                (student_id, name, phone_number, school_id, class_name, access_level, otp_digest, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&student_id)
        .bind(&req.name)
        .bind(&req.phone_number)
        .bind(school.id)
        .bind(&req.class_name)
        .bind(LEVEL_STUDENT)
        .bind(otp::digest(&code))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        self.sender.send_otp(&req.phone_number, &code).await?;
        tracing::info!(student_id = %student_id, "Registration OTP issued");

        Ok(OtpIssuedResponse {
            message: "OTP sent successfully. Please verify to complete registration.".to_string(),
            student_id,
            expires_at,
        })
    }

    pub async fn verify_registration(&self, req: &VerifyOtpRequest) -> Result<AuthSuccessResponse> {
        let pending = sqlx::query_as::<_, PendingRegistration>(
            r#"SELECT * FROM pending_registrations WHERE student_id = $1"#,
        )
        .bind(&req.student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            Error::BadRequest("No pending registration found. Please register first.".to_string())
        })?;

        if pending.is_expired(Utc::now()) || !otp::verify(&req.otp, &pending.otp_digest) {
            return Err(Error::BadRequest(
                "Invalid or expired OTP. Please try again.".to_string(),
            ));
        }

        let user = match sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE student_id = $1"#)
            .bind(&pending.student_id)
            .fetch_optional(&self.pool)
            .await?
        {
            Some(user) => user,
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (student_id, name, phone_number, school_id, class_name, access_level)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING *
                    "#,
                )
                .bind(&pending.student_id)
                .bind(&pending.name)
                .bind(&pending.phone_number)
                .bind(pending.school_id)
                .bind(&pending.class_name)
                .bind(&pending.access_level)
                .fetch_one(&self.pool)
                .await?
            }
        };

        let token = token::issue_token(&user.student_id, &user.access_level)?;

        sqlx::query(r#"DELETE FROM pending_registrations WHERE student_id = $1"#)
            .bind(&pending.student_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(student_id = %user.student_id, "Registration verified");
        Ok(AuthSuccessResponse {
            message: "OTP verified successfully.".to_string(),
            token,
            user,
        })
    }

    pub async fn sign_in(&self, req: &SignInRequest) -> Result<OtpIssuedResponse> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE student_id = $1"#)
            .bind(&req.student_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                Error::NotFound("User not found. Please check your student id.".to_string())
            })?;

        let code = otp::generate_code();
        let expires_at = Utc::now() + Duration::minutes(self.otp_ttl_minutes());

        sqlx::query(
            r#"
            INSERT INTO pending_signins (student_id, otp_digest, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id) DO UPDATE
                SET otp_digest = EXCLUDED.otp_digest,
                    expires_at = EXCLUDED.expires_at,
                    created_at = NOW()
            "#,
        )
        .bind(&user.student_id)
        .bind(otp::digest(&code))
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        self.sender.send_otp(&user.phone_number, &code).await?;
        tracing::info!(student_id = %user.student_id, "Sign-in OTP issued");

        Ok(OtpIssuedResponse {
            message: "OTP sent successfully. Please verify to complete sign-in.".to_string(),
            student_id: user.student_id,
            expires_at,
        })
    }

    pub async fn verify_sign_in(&self, req: &VerifyOtpRequest) -> Result<AuthSuccessResponse> {
        let pending = sqlx::query_as::<_, PendingSignIn>(
            r#"SELECT * FROM pending_signins WHERE student_id = $1"#,
        )
        .bind(&req.student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            Error::BadRequest(
                "No pending sign-in found. Please initiate sign-in again.".to_string(),
            )
        })?;

        if pending.is_expired(Utc::now()) || !otp::verify(&req.otp, &pending.otp_digest) {
            return Err(Error::BadRequest(
                "Invalid or expired OTP. Please try again.".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE student_id = $1"#)
            .bind(&pending.student_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                Error::NotFound("User not found. Please contact support.".to_string())
            })?;

        let token = token::issue_token(&user.student_id, &user.access_level)?;

        sqlx::query(r#"DELETE FROM pending_signins WHERE student_id = $1"#)
            .bind(&pending.student_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(student_id = %user.student_id, "Sign-in verified");
        Ok(AuthSuccessResponse {
            message: "Sign-in successful.".to_string(),
            token,
            user,
        })
    }

    /// Deletes stale pending records. Run by the background sweeper; reads
    /// also check expiry themselves, so this is hygiene, not correctness.
    pub async fn sweep_expired(&self) -> Result<u64> {
        let now = Utc::now();
        let regs = sqlx::query(r#"DELETE FROM pending_registrations WHERE expires_at < $1"#)
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        let signins = sqlx::query(r#"DELETE FROM pending_signins WHERE expires_at < $1"#)
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(regs + signins)
    }

    async fn find_or_create_school(&self, school_name: &str) -> Result<School> {
        if let Some(school) =
            sqlx::query_as::<_, School>(r#"SELECT * FROM schools WHERE school_name = $1"#)
                .bind(school_name)
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(school);
        }
        let school = sqlx::query_as::<_, School>(
            r#"INSERT INTO schools (school_code, school_name) VALUES ($1, $2) RETURNING *"#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(school_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(school)
    }

    fn otp_ttl_minutes(&self) -> i64 {
        crate::config::get_config().otp_ttl_minutes
    }
}
