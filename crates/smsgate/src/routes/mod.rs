//! HTTP route handlers for smsgate.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod health;
mod otp;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Liveness & health
        .route("/", get(health::home))
        .route("/health", get(health::health_check))

        // OTP endpoints
        .route("/send-otp", post(otp::send_otp))
        .route("/verify-otp", post(otp::verify_otp))

        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
