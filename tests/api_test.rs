//! Live-database integration tests. They need a running PostgreSQL pointed to
//! by DATABASE_URL and are ignored by default.

use std::env;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use testbook_backend::dto::admin_dto::{CreateTestRequest, CreateUserRequest, NewQuestion};
use testbook_backend::services::sms::OtpSender;
use testbook_backend::AppState;

struct NoopSender;

#[async_trait::async_trait]
impl OtpSender for NoopSender {
    async fn send_otp(&self, _phone_number: &str, _code: &str) -> testbook_backend::error::Result<()> {
        Ok(())
    }
}

fn test_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("JWT_EXPIRY_HOURS", "24");
    env::set_var("OTP_TTL_MINUTES", "10");
    env::set_var("PUBLIC_RPS", "100");
    env::set_var("SMS_GATEWAY_URL", "http://localhost/sms");
    let _ = testbook_backend::config::init_config();
}

async fn setup_state() -> AppState {
    test_env();
    let pool = testbook_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    AppState::with_sender(pool, Arc::new(NoopSender))
}

fn sample_test_request() -> CreateTestRequest {
    CreateTestRequest {
        test_name: "Sample Paper".into(),
        subject: "General Knowledge".into(),
        is_practice: false,
        questions: vec![
            NewQuestion {
                question_text: "2+2=?".into(),
                options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
                correct_answer: "4".into(),
                time_limit: 1,
            },
            NewQuestion {
                question_text: "Capital of France?".into(),
                options: vec!["Paris".into(), "Lyon".into(), "Nice".into(), "Tours".into()],
                correct_answer: "Paris".into(),
                time_limit: 1,
            },
        ],
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn submit_and_scorecard_flow() {
    let state = setup_state().await;

    let school = state
        .directory_service
        .add_school(&format!("Flow School {}", Uuid::new_v4()))
        .await
        .expect("school");
    let user = state
        .directory_service
        .create_user(&CreateUserRequest {
            name: "Asha Verma".into(),
            phone_number: format!("99{}", &Uuid::new_v4().simple().to_string()[..8]),
            school_id: school.id,
            class_name: "10A".into(),
        })
        .await
        .expect("user");
    let test = state
        .test_service
        .create_test(&sample_test_request())
        .await
        .expect("test");

    let token = testbook_backend::utils::token::issue_token(&user.student_id, &user.access_level)
        .expect("token");

    let app = Router::new()
        .route("/api/submit-test", post(testbook_backend::routes::student::submit_test))
        .route("/api/scorecard", post(testbook_backend::routes::student::scorecard))
        .layer(axum::middleware::from_fn(
            testbook_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(state.clone());

    let idempotency_key = Uuid::new_v4();
    let submit_body = json!({
        "id": user.id,
        "testId": test.id,
        "testName": test.test_name,
        "answers": [
            {"questionId": 1, "questionText": "2+2=?", "givenAnswer": "4", "timeTaken": 0.5},
            {"questionId": 2, "questionText": "Capital of France?", "givenAnswer": "Lyon", "timeTaken": 0.4}
        ],
        "totalTimeTaken": 0.9,
        "idempotencyKey": idempotency_key,
    });

    let req = Request::builder()
        .method("POST")
        .uri("/api/submit-test")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(submit_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["givenTest"]["score"], 1);
    assert_eq!(body["givenTest"]["status"], "completed");
    let submission_id = body["givenTest"]["id"].as_str().unwrap().to_string();

    // Replaying the same idempotency key returns the stored record.
    let req = Request::builder()
        .method("POST")
        .uri("/api/submit-test")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(submit_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["givenTest"]["id"].as_str().unwrap(), submission_id);

    // The score-card reads the graded record back with test and student.
    let scorecard_body = json!({ "id": submission_id });
    let req = Request::builder()
        .method("POST")
        .uri("/api/scorecard")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(scorecard_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["givenTest"]["score"], 1);
    assert_eq!(body["givenTest"]["answers"][1]["correctAnswer"], "Paris");
    assert_eq!(
        body["givenTest"]["user"]["student_id"].as_str().unwrap(),
        user.student_id
    );

    // Submitting against a missing test is a 404 with a message.
    let missing_body = json!({
        "id": user.id,
        "testId": Uuid::new_v4(),
        "testName": "Ghost",
        "answers": [],
        "totalTimeTaken": 0.0,
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/submit-test")
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(missing_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn otp_sign_in_flow() {
    let state = setup_state().await;

    let school = state
        .directory_service
        .add_school(&format!("OTP School {}", Uuid::new_v4()))
        .await
        .expect("school");
    let user = state
        .directory_service
        .create_user(&CreateUserRequest {
            name: "Ravi Kumar".into(),
            phone_number: format!("88{}", &Uuid::new_v4().simple().to_string()[..8]),
            school_id: school.id,
            class_name: "9B".into(),
        })
        .await
        .expect("user");

    let app = Router::new()
        .route("/api/user", get(testbook_backend::routes::student::get_user))
        .route_layer(axum::middleware::from_fn(
            testbook_backend::middleware::auth::require_bearer_auth,
        ))
        .route("/api/auth/login", post(testbook_backend::routes::auth::sign_in))
        .route(
            "/api/auth/login/verify-otp",
            post(testbook_backend::routes::auth::verify_sign_in_otp),
        )
        .with_state(state.clone());

    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "studentId": user.student_id }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // Plant a known code behind the pending record, the way the SMS channel
    // would have delivered it.
    sqlx::query("UPDATE pending_signins SET otp_digest = $1 WHERE student_id = $2")
        .bind(testbook_backend::utils::otp::digest("123456"))
        .bind(&user.student_id)
        .execute(&state.pool)
        .await
        .expect("plant otp");

    // A wrong code is rejected.
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login/verify-otp")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "otp": "000000", "studentId": user.student_id }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // The right one signs in and issues a usable token.
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login/verify-otp")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "otp": "123456", "studentId": user.student_id }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let token = body["token"].as_str().unwrap().to_string();

    // The pending record is single-use.
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/login/verify-otp")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "otp": "123456", "studentId": user.student_id }).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("GET")
        .uri("/api/user")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
