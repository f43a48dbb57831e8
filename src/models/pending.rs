use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Pending-action record for an OTP-gated registration. Rows expire; every
/// read must check `expires_at` and the background sweeper deletes stale ones.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingRegistration {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
    pub school_id: Uuid,
    pub class_name: String,
    pub access_level: String,
    pub otp_digest: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PendingRegistration {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingSignIn {
    pub student_id: String,
    pub otp_digest: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PendingSignIn {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
