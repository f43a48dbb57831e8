use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::dto::auth_dto::{RegisterRequest, SignInRequest, VerifyOtpRequest};
use crate::AppState;

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let resp = state.auth_service.register(&req).await?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn verify_registration_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let resp = state.auth_service.verify_registration(&req).await?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let resp = state.auth_service.sign_in(&req).await?;
    Ok(Json(resp))
}

#[axum::debug_handler]
pub async fn verify_sign_in_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> crate::error::Result<impl IntoResponse> {
    req.validate()?;
    let resp = state.auth_service.verify_sign_in(&req).await?;
    Ok(Json(resp))
}
