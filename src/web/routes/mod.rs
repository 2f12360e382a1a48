//! Contains all the routes that this application can handle.

mod api;

use crate::AppState;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// All the routes of the server
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/submit-interest", post(api::submit_interest))
        .with_state(app_state)
        .route("/hello", get(api::hello))
        .route("/health-check", get(health_check))
}
