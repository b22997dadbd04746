pub mod health;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::pipeline::handlers;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation pipeline
        .route(
            "/api/v1/recommendations",
            post(handlers::handle_submit_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/recommendations/:category",
            get(handlers::handle_get_bundle),
        )
        .route("/api/v1/categories", get(handlers::handle_list_categories))
        // Accounts (read-only)
        .route("/api/v1/users", get(users::handle_list_users))
        .route("/api/v1/users/me", get(users::handle_me))
        .with_state(state)
}
