use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod analytics;
pub mod auth;
pub mod handlers;
pub mod layers;

/// Build the public router. Mutating employee routes authenticate through the
/// [`crate::auth::AuthUser`] extractor rather than a blanket layer, so reads
/// stay open.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/healthz", get(|| async { "ok" }))
        .route("/readyz", get(readiness_check))
        .route("/token", post(auth::login_for_access_token))
        .route(
            "/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        // Static segments win over `:employee_id` in the matcher.
        .route("/employees/avg-salary", get(analytics::average_salary))
        .route("/employees/search", get(analytics::search_by_skill))
        .route(
            "/employees/:employee_id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .fallback(fallback_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Employee Records API" }))
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match state.repo.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!("readiness: store ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

async fn fallback_404() -> StatusCode {
    StatusCode::NOT_FOUND
}
