use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{
    AdminUpdateUserRequest, AllocateTestRequest, AllowTestRequest, ClassRequest,
    CreateTestRequest, CreateUserRequest, SchoolRequest, SubmissionsByClassRequest,
    UserSubmissions,
};
use crate::error::Error;
use crate::services::import::ImportService;
use crate::AppState;


#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let user = state.directory_service.create_user(&req).await?;
    Ok(Json(json!({
        "message": "User created successfully",
        "user": user
    })))
}

#[axum::debug_handler]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let all_users = state.directory_service.list_users().await?;
    Ok(Json(json!({ "allUsers": all_users })))
}

#[axum::debug_handler]
pub async fn get_user_detail(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> crate::error::Result<impl IntoResponse> {
    let populated = state.directory_service.populated_user(&student_id).await?;
    Ok(Json(populated))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> crate::error::Result<impl IntoResponse> {
    let updated = state.directory_service.update_user(&req.user).await?;
    Ok(Json(json!({ "updatedUser": updated })))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> crate::error::Result<impl IntoResponse> {
    let user = state.directory_service.delete_user(&student_id).await?;
    Ok(Json(json!({ "user": user })))
}


/// Bulk import: multipart form with `testName`, `subject`, optional
/// `isPractice`, and a `testFile` part holding the extracted sheet rows as a
/// JSON array. Malformed rows are skipped, mirroring how the spreadsheet
/// tooling reports partial uploads.
#[axum::debug_handler]
pub async fn upload_test(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::error::Result<impl IntoResponse> {
    let mut test_name: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut is_practice = false;
    let mut rows: Option<Vec<JsonValue>> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "testName" => test_name = Some(field.text().await?),
            "subject" => subject = Some(field.text().await?),
            "isPractice" => {
                let raw = field.text().await?;
                is_practice = raw.trim().eq_ignore_ascii_case("true");
            }
            "testFile" => {
                let data: bytes::Bytes = field.bytes().await?;
                let parsed: Vec<JsonValue> = serde_json::from_slice(&data)?;
                rows = Some(parsed);
            }
            _ => {}
        }
    }

    let test_name = test_name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("TestName or subject are required".to_string()))?;
    let subject = subject
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::BadRequest("TestName or subject are required".to_string()))?;
    let rows = rows.ok_or_else(|| Error::BadRequest("No file uploaded".to_string()))?;

    let outcome = ImportService::build_questions(&rows);
    if outcome.questions.is_empty() {
        return Err(Error::BadRequest(
            "No valid rows in uploaded file".to_string(),
        ));
    }

    let test = state
        .test_service
        .create_imported(&test_name, &subject, is_practice, &outcome)
        .await?;

    Ok(Json(json!({
        "message": "Test data processed and saved successfully",
        "test": {
            "testId": test.external_id,
            "testName": test.test_name,
            "questionCount": outcome.questions.len(),
            "skippedRows": outcome.skipped_rows,
        }
    })))
}

#[utoipa::path(
    post,
    path = "/api/admin/tests",
    request_body = CreateTestRequest,
    responses(
        (status = 200, description = "Test created successfully"),
        (status = 400, description = "Invalid question set"),
    ),
)]
pub async fn create_test(
    State(state): State<AppState>,
    Json(req): Json<CreateTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let test = state.test_service.create_test(&req).await?;
    Ok(Json(json!({
        "message": "Test created successfully",
        "test": test
    })))
}

#[axum::debug_handler]
pub async fn get_all_tests(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let tests = state.test_service.list_tests().await?;
    Ok(Json(json!({ "tests": tests })))
}

#[utoipa::path(
    get,
    path = "/api/admin/tests/{id}",
    params(
        ("id" = Uuid, Path, description = "Test ID")
    ),
    responses(
        (status = 200, description = "Test retrieved successfully"),
        (status = 404, description = "Test not found"),
    ),
)]
pub async fn get_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let test = state.test_service.get_test(id).await?;
    Ok(Json(json!({ "test": test })))
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<crate::dto::admin_dto::UpdateTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let updated = state.test_service.update_test(id, &req).await?;
    Ok(Json(json!({
        "message": "Test updated successfully",
        "updatedTest": updated
    })))
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    state.test_service.delete_test(id).await?;
    Ok(Json(json!({ "message": "Test deleted successfully" })))
}


#[axum::debug_handler]
pub async fn allow_test(
    State(state): State<AppState>,
    Json(req): Json<AllowTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    let updated = state.test_service.allow_test(&req).await?;
    Ok(Json(json!({
        "message": format!("Test {} allowed for selected users.", req.test_id),
        "updatedCount": updated
    })))
}

#[axum::debug_handler]
pub async fn allocate_test(
    State(state): State<AppState>,
    Json(req): Json<AllocateTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    state.test_service.allocate_test(&req).await?;
    Ok(Json(json!({ "message": "Test added to user successfully" })))
}


#[axum::debug_handler]
pub async fn submissions_by_school(
    State(state): State<AppState>,
    Path(school_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    let rows = state.submission_service.for_school(school_id).await?;
    let users: Vec<UserSubmissions> = rows
        .into_iter()
        .map(|(user, given_tests)| UserSubmissions { user, given_tests })
        .collect();
    Ok(Json(json!({ "users": users })))
}

#[axum::debug_handler]
pub async fn submissions_by_class(
    State(state): State<AppState>,
    Json(req): Json<SubmissionsByClassRequest>,
) -> crate::error::Result<impl IntoResponse> {
    let rows = state.submission_service.for_class(&req.class_name).await?;
    let users: Vec<UserSubmissions> = rows
        .into_iter()
        .map(|(user, given_tests)| UserSubmissions { user, given_tests })
        .collect();
    Ok(Json(json!({ "users": users })))
}


#[axum::debug_handler]
pub async fn add_school(
    State(state): State<AppState>,
    Json(req): Json<SchoolRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let school = state.directory_service.add_school(&req.school_name).await?;
    Ok(Json(json!({
        "message": "School added successfully",
        "school": school
    })))
}

#[axum::debug_handler]
pub async fn edit_school(
    State(state): State<AppState>,
    Path(school_id): Path<Uuid>,
    Json(req): Json<SchoolRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let school = state
        .directory_service
        .edit_school(school_id, &req.school_name)
        .await?;
    Ok(Json(json!({
        "message": "School updated successfully",
        "school": school
    })))
}

#[axum::debug_handler]
pub async fn delete_school(
    State(state): State<AppState>,
    Path(school_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    state.directory_service.delete_school(school_id).await?;
    Ok(Json(json!({ "message": "School deleted successfully" })))
}

#[axum::debug_handler]
pub async fn add_class(
    State(state): State<AppState>,
    Json(req): Json<ClassRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let class = state.directory_service.add_class(&req.class_name).await?;
    Ok(Json(json!({
        "message": "Class added successfully",
        "class": class
    })))
}

#[axum::debug_handler]
pub async fn edit_class(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
    Json(req): Json<ClassRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let class = state
        .directory_service
        .edit_class(class_id, &req.class_name)
        .await?;
    Ok(Json(json!({
        "message": "Class updated successfully",
        "class": class
    })))
}

#[axum::debug_handler]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(class_id): Path<Uuid>,
) -> crate::error::Result<impl IntoResponse> {
    state.directory_service.delete_class(class_id).await?;
    Ok(Json(json!({ "message": "Class deleted successfully" })))
}


#[axum::debug_handler]
pub async fn list_feedback(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let feedback = state.feedback_service.list().await?;
    Ok(Json(json!({ "feedback": feedback })))
}
