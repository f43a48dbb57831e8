use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::time::Duration;
use testbook_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, rate_limit},
    routes, AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    {
        // Hygiene sweep over expired OTP records; reads check expiry
        // themselves, this just keeps the tables small.
        let state = app_state.clone();
        tokio::spawn(async move {
            loop {
                match state.auth_service.sweep_expired().await {
                    Ok(0) => {}
                    Ok(purged) => info!(purged, "Swept expired OTP records"),
                    Err(e) => tracing::error!("OTP sweeper error: {:?}", e),
                }
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
    }

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let auth_api = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route(
            "/api/auth/register/verify-otp",
            post(routes::auth::verify_registration_otp),
        )
        .route("/api/auth/login", post(routes::auth::sign_in))
        .route(
            "/api/auth/login/verify-otp",
            post(routes::auth::verify_sign_in_otp),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/schools", get(routes::student::get_schools))
        .route("/api/classes", get(routes::student::get_classes));

    let student_api = Router::new()
        .route("/api/user", get(routes::student::get_user))
        .route("/api/user-details", get(routes::student::user_details))
        .route("/api/update-profile", post(routes::student::update_profile))
        .route("/api/submit-test", post(routes::student::submit_test))
        .route("/api/scorecard", post(routes::student::scorecard))
        .route("/api/feedback", post(routes::student::submit_feedback))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth));

    let admin_api = Router::new()
        .route(
            "/api/admin/users",
            get(routes::admin::get_all_users).post(routes::admin::create_user),
        )
        .route(
            "/api/admin/users/:student_id",
            get(routes::admin::get_user_detail).delete(routes::admin::delete_user),
        )
        .route("/api/admin/update-user", post(routes::admin::update_user))
        .route("/api/admin/upload-test", post(routes::admin::upload_test))
        .route("/api/admin/tests", post(routes::admin::create_test))
        .route(
            "/api/admin/tests/:id",
            get(routes::admin::get_test)
                .put(routes::admin::update_test)
                .delete(routes::admin::delete_test),
        )
        .route("/api/admin/allow-test", post(routes::admin::allow_test))
        .route(
            "/api/admin/allocate-test",
            post(routes::admin::allocate_test),
        )
        .route(
            "/api/admin/submitted-tests/:school_id",
            get(routes::admin::submissions_by_school),
        )
        .route(
            "/api/admin/submitted-tests",
            post(routes::admin::submissions_by_class),
        )
        .route("/api/admin/schools", post(routes::admin::add_school))
        .route(
            "/api/admin/schools/:school_id",
            put(routes::admin::edit_school).delete(routes::admin::delete_school),
        )
        .route("/api/admin/classes", post(routes::admin::add_class))
        .route(
            "/api/admin/classes/:class_id",
            put(routes::admin::edit_class).delete(routes::admin::delete_class),
        )
        .route("/api/admin/feedback", get(routes::admin::list_feedback))
        .route(
            "/api/admin/export/submissions",
            get(routes::export::export_submissions),
        )
        .layer(axum::middleware::from_fn(auth::require_admin));

    let super_admin_api = Router::new()
        .route("/api/admin/tests/all", get(routes::admin::get_all_tests))
        .layer(axum::middleware::from_fn(auth::require_super_admin));

    let app = base_routes
        .merge(auth_api)
        .merge(public_api)
        .merge(student_api)
        .merge(admin_api)
        .merge(super_admin_api)
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
