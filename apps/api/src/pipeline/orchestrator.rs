//! Pipeline Orchestrator: one resume submission from upload to recommendation.
//!
//! Precedence, short-circuiting at the first resolved category:
//! validate upload → persist → override lookup → extract → classify → recommend.
//! Returns a complete `Recommendation` or a typed `PipelineError`, never a partial result.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::category::Category;
use crate::catalog::Catalog;
use crate::pipeline::classifier::{CategoryClassifier, ClassificationResult};
use crate::pipeline::document::Document;
use crate::pipeline::errors::PipelineError;
use crate::pipeline::extractor::{ExtractedText, TextExtractor};
use crate::pipeline::recommend::Course;
use crate::storage::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    Override,
    Classifier,
}

/// Response payload of a submission.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub submission_id: Uuid,
    pub category: Category,
    pub skills: Vec<String>,
    pub courses: Vec<Course>,
    pub resolved_by: ResolvedBy,
    /// Winning label probability; classifier resolutions only.
    pub confidence: Option<f32>,
}

pub struct ResumePipeline {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    classifier: Arc<CategoryClassifier>,
    catalog: Arc<Catalog>,
}

impl ResumePipeline {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        classifier: Arc<CategoryClassifier>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            store,
            extractor,
            classifier,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn submit_resume(
        &self,
        filename: Option<&str>,
        bytes: Bytes,
    ) -> Result<Recommendation, PipelineError> {
        let document = Document::from_upload(filename, bytes)?;
        let submission_id = Uuid::new_v4();
        let stored = self.store.put(submission_id, &document).await?;
        debug!("Submission {submission_id} stored at {}", stored.location);

        let (category, resolved_by, confidence) =
            match self.catalog.overrides.resolve_override(&document.filename) {
                Some(category) => (category, ResolvedBy::Override, None),
                None => {
                    let result = self.classify_document(document.clone()).await?;
                    debug!(
                        "Submission {submission_id} distribution: {:?}",
                        result.distribution
                    );
                    (
                        result.category,
                        ResolvedBy::Classifier,
                        Some(result.confidence),
                    )
                }
            };

        if category == Category::Unknown {
            warn!(
                "Submission {submission_id} ({}) resolved to Unknown; returning empty recommendations",
                document.filename
            );
        } else {
            info!(
                "Submission {submission_id} ({}) resolved to {category} by {resolved_by:?}",
                document.filename
            );
        }

        let bundle = self.catalog.recommendations.recommend(category).clone();
        Ok(Recommendation {
            submission_id,
            category,
            skills: bundle.skills,
            courses: bundle.courses,
            resolved_by,
            confidence,
        })
    }

    /// Extraction and inference are CPU-bound and run on the blocking pool.
    async fn classify_document(
        &self,
        document: Document,
    ) -> Result<ClassificationResult, PipelineError> {
        let extractor = Arc::clone(&self.extractor);
        let text: ExtractedText =
            tokio::task::spawn_blocking(move || extractor.extract(&document))
                .await
                .map_err(|e| PipelineError::UnreadablePdf(format!("extraction aborted: {e}")))??;

        let classifier = Arc::clone(&self.classifier);
        tokio::task::spawn_blocking(move || classifier.classify(text.as_str()))
            .await
            .map_err(|e| PipelineError::Inference(format!("classification aborted: {e}")))?
    }
}
