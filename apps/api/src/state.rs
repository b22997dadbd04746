use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::pipeline::orchestrator::ResumePipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Session store written by the account service.
    pub redis: RedisClient,
    /// Read-only after startup: inference context, catalog, document store.
    pub pipeline: Arc<ResumePipeline>,
    pub config: Config,
}
