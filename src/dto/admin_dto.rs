use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 6))]
    pub phone_number: String,
    pub school_id: Uuid,
    #[validate(length(min = 1))]
    pub class_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateUserRequest {
    pub user: UserPatch,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub id: Uuid,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub school_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub access_level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    #[validate(length(min = 1))]
    pub question_text: String,
    #[validate(length(equal = 4))]
    pub options: Vec<String>,
    #[validate(length(min = 1))]
    pub correct_answer: String,
    #[validate(range(min = 1))]
    pub time_limit: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestRequest {
    #[validate(length(min = 1))]
    pub test_name: String,
    #[validate(length(min = 1))]
    pub subject: String,
    #[serde(default)]
    pub is_practice: bool,
    #[validate(nested)]
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTestRequest {
    pub test_name: Option<String>,
    pub subject: Option<String>,
    pub is_practice: Option<bool>,
    #[validate(nested)]
    pub questions: Option<Vec<NewQuestion>>,
}

/// Allow a test for a whole school (optionally narrowed to one class), for a
/// class across schools, or for a single student.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowTestRequest {
    pub test_id: Uuid,
    pub school_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AllocateTestRequest {
    #[validate(length(min = 1))]
    pub student_id: String,
    /// The external (spreadsheet-facing) test identifier.
    #[validate(length(min = 1))]
    pub test_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SchoolRequest {
    #[validate(length(min = 1))]
    pub school_name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    #[validate(length(min = 1))]
    pub class_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionsByClassRequest {
    pub class_name: String,
}

/// One student with their attempt history, the shape of the per-school and
/// per-class submission listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubmissions {
    #[serde(flatten)]
    pub user: crate::models::user::User,
    pub given_tests: Vec<crate::models::submission::Submission>,
}
