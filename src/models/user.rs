use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const LEVEL_STUDENT: &str = "student";
pub const LEVEL_ADMIN: &str = "admin";
pub const LEVEL_SUPER_ADMIN: &str = "super_admin";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub student_id: String,
    pub name: String,
    pub phone_number: String,
    pub school_id: Uuid,
    pub class_name: String,
    pub access_level: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
