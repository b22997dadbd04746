mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod inference;
mod models;
mod pipeline;
mod routes;
mod state;
mod storage;
mod users;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{Config, S3Config};
use crate::db::create_pool;
use crate::inference::{InferenceContext, InferenceSettings};
use crate::pipeline::classifier::CategoryClassifier;
use crate::pipeline::extractor::PdfTextExtractor;
use crate::pipeline::orchestrator::ResumePipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{DocumentStore, LocalDocumentStore, S3DocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career Guide API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (accounts)
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (sessions)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    // Static catalog: bundles + override table
    let catalog = Catalog::load(config.catalog_path.as_deref())?;
    info!(
        "Catalog loaded: {} categories, {} overrides",
        catalog::category::Category::ALL.len(),
        catalog.overrides.len()
    );

    // Inference context: loaded once, read-only afterwards
    let settings = InferenceSettings {
        model_dir: config.model_dir.clone(),
        max_tokens: config.max_sequence_tokens,
        truncation: config.truncation_policy,
        sessions: config.inference_sessions,
    };
    let inference = tokio::task::spawn_blocking(move || InferenceContext::load(&settings))
        .await
        .context("Inference loader panicked")??;
    let classifier = CategoryClassifier::new(Arc::new(inference), config.min_resume_words);

    // Document store: S3/MinIO when configured, local directory otherwise
    let store: Arc<dyn DocumentStore> = match &config.s3 {
        Some(s3) => {
            let client = build_s3_client(s3).await;
            info!("S3 document store initialized (bucket: {})", s3.bucket);
            Arc::new(S3DocumentStore::new(client, s3.bucket.clone()))
        }
        None => {
            info!(
                "Local document store initialized ({})",
                config.upload_dir.display()
            );
            Arc::new(LocalDocumentStore::new(config.upload_dir.clone()))
        }
    };

    let pipeline = ResumePipeline::new(
        store,
        Arc::new(PdfTextExtractor),
        Arc::new(classifier),
        Arc::new(catalog),
    );

    // Build app state
    let state = AppState {
        db,
        redis,
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "careerguide-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
