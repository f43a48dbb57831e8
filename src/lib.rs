pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    auth::AuthService, directory::DirectoryService, feedback::FeedbackService,
    sms::{OtpSender, SmsGateway}, submission::SubmissionService,
    test_catalog::TestCatalogService,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth_service: AuthService,
    pub directory_service: DirectoryService,
    pub test_service: TestCatalogService,
    pub submission_service: SubmissionService,
    pub feedback_service: FeedbackService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let sender: Arc<dyn OtpSender> = Arc::new(SmsGateway::from_config());
        Self::with_sender(pool, sender)
    }

    /// Same state with a caller-chosen OTP channel; tests use this to avoid
    /// touching the SMS gateway.
    pub fn with_sender(pool: PgPool, sender: Arc<dyn OtpSender>) -> Self {
        Self {
            auth_service: AuthService::new(pool.clone(), sender),
            directory_service: DirectoryService::new(pool.clone()),
            test_service: TestCatalogService::new(pool.clone()),
            submission_service: SubmissionService::new(pool.clone()),
            feedback_service: FeedbackService::new(pool.clone()),
            pool,
        }
    }
}
