use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde_json::json;
use validator::Validate;

use crate::dto::student_dto::{
    FeedbackRequest, ScorecardRequest, ScorecardResponse, SubmitTestRequest, SubmitTestResponse,
    UpdateProfileRequest,
};
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::utils::token;
use crate::AppState;

/// Profile plus a freshly issued token, the shape the SPA session bootstrap
/// expects.
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let user = state.directory_service.user_by_student_id(&claims.sub).await?;
    let token = token::issue_token(&user.student_id, &user.access_level)?;
    Ok(Json(json!({ "user": user, "token": token })))
}

#[axum::debug_handler]
pub async fn user_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<impl IntoResponse> {
    let populated = state.directory_service.populated_user(&claims.sub).await?;
    Ok(Json(populated))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.user.validate()?;
    let updated = state
        .directory_service
        .update_profile(&claims.sub, &req.user)
        .await?;
    Ok(Json(json!({ "updatedUser": updated })))
}

#[axum::debug_handler]
pub async fn get_schools(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let schools = state.directory_service.list_schools().await?;
    Ok(Json(json!({ "schools": schools })))
}

#[axum::debug_handler]
pub async fn get_classes(
    State(state): State<AppState>,
) -> crate::error::Result<impl IntoResponse> {
    let classes = state.directory_service.list_classes().await?;
    Ok(Json(json!({
        "message": "Classes retrieved successfully",
        "classes": classes
    })))
}

/// The submission endpoint: grades the payload and persists the result.
#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitTestRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;

    // The payload names a student row; it must be the token holder's own.
    let caller = state.directory_service.user_by_student_id(&claims.sub).await?;
    if caller.id != req.id {
        return Err(Error::Unauthorized(
            "You can only submit your own attempt".to_string(),
        ));
    }

    let submission = state.submission_service.submit(&req).await?;
    Ok(Json(SubmitTestResponse {
        message: "Test submitted successfully".to_string(),
        given_test: submission,
    }))
}

#[axum::debug_handler]
pub async fn scorecard(
    State(state): State<AppState>,
    Json(req): Json<ScorecardRequest>,
) -> crate::error::Result<impl IntoResponse> {
    let populated = state.submission_service.scorecard(req.id).await?;
    Ok(Json(ScorecardResponse {
        given_test: populated,
    }))
}

#[axum::debug_handler]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<FeedbackRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let user = state.directory_service.user_by_student_id(&claims.sub).await?;
    let feedback = state.feedback_service.create(user.id, &req).await?;
    Ok(Json(json!({
        "message": "Feedback submitted successfully",
        "feedback": feedback
    })))
}
