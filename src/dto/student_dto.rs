use crate::models::submission::Submission;
use crate::models::test::Test;
use crate::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One answer of the submission payload. `question_id` is the stable
/// identifier answers are graded against; the text rides along for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: i32,
    pub question_text: String,
    pub given_answer: String,
    /// Minutes spent on this question.
    pub time_taken: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestRequest {
    /// The submitting student's row id.
    pub id: Uuid,
    pub test_id: Uuid,
    #[validate(length(min = 1))]
    pub test_name: String,
    pub answers: Vec<SubmittedAnswer>,
    /// Aggregate of per-question times, in minutes.
    pub total_time_taken: f64,
    /// Client-chosen key; resubmitting with the same key returns the
    /// already-graded record instead of writing a second one.
    pub idempotency_key: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTestResponse {
    pub message: String,
    pub given_test: Submission,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardRequest {
    pub id: Uuid,
}

/// A submission with its student and test rows attached, the shape the
/// score-card screen reads back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulatedSubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub user: User,
    pub test: Test,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorecardResponse {
    pub given_test: PopulatedSubmission,
}

/// Profile with allowance and history attached, newest submissions first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedUser {
    #[serde(flatten)]
    pub user: User,
    pub allowed_tests: Vec<Test>,
    pub given_tests: Vec<Submission>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub user: ProfilePatch,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 6))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub test_id: Uuid,
    #[validate(length(min = 1))]
    pub feedback_text: String,
}
