//! Axum route handlers for the recommendation pipeline.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::catalog::category::{Category, CLASSIFIER_LABELS, LABEL_SET_VERSION};
use crate::errors::AppError;
use crate::pipeline::orchestrator::Recommendation;
use crate::pipeline::recommend::Course;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct BundleResponse {
    pub category: Category,
    pub skills: Vec<String>,
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub label_set_version: &'static str,
    pub categories: Vec<Category>,
    pub classifier_labels: Vec<Category>,
}

/// POST /api/v1/recommendations
///
/// Multipart upload with the PDF in the `resume` field.
pub async fn handle_submit_resume(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<Recommendation>, AppError> {
    let (filename, bytes) = read_upload(multipart).await?;
    tracing::debug!(
        "User {} submitted {:?} ({} bytes)",
        user.id,
        filename,
        bytes.len()
    );

    let recommendation = state
        .pipeline
        .submit_resume(filename.as_deref(), bytes)
        .await?;
    Ok(Json(recommendation))
}

/// Pulls the `resume` field out of a multipart body.
///
/// A body without that field yields no filename and no bytes, which the
/// pipeline rejects as a missing upload.
pub async fn read_upload(mut multipart: Multipart) -> Result<(Option<String>, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(upload_error)?;
        return Ok((filename, bytes));
    }
    Ok((None, Bytes::new()))
}

// Body-limit failures keep their 413; anything else is a malformed request.
fn upload_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(format!("Malformed upload: {}", err.body_text()))
    }
}

/// GET /api/v1/recommendations/:category
///
/// Unrecognised names resolve to `Unknown` with an empty bundle.
pub async fn handle_get_bundle(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(name): Path<String>,
) -> Json<BundleResponse> {
    let category = Category::from_display_name(&name);
    let bundle = state
        .pipeline
        .catalog()
        .recommendations
        .recommend(category)
        .clone();
    Json(BundleResponse {
        category,
        skills: bundle.skills,
        courses: bundle.courses,
    })
}

/// GET /api/v1/categories
pub async fn handle_list_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        label_set_version: LABEL_SET_VERSION,
        categories: Category::ALL.to_vec(),
        classifier_labels: CLASSIFIER_LABELS.to_vec(),
    })
}
