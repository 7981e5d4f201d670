pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/v1/match", post(handlers::handle_match))
        .route(
            "/api/v1/match/rule-based",
            post(handlers::handle_rule_based_match),
        )
        .route("/api/v1/match/ai", post(handlers::handle_ai_match))
        .route("/api/v1/match/batch", post(handlers::handle_batch_match))
        .with_state(state)
}
