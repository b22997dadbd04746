//! Document Store: persists uploaded resumes before they are read.
//!
//! S3/MinIO when a bucket is configured, otherwise a local upload directory.

use std::path::PathBuf;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::pipeline::document::Document;
use crate::pipeline::errors::PipelineError;

/// Where an upload was persisted.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub submission_id: Uuid,
    pub location: String,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn put(
        &self,
        submission_id: Uuid,
        document: &Document,
    ) -> Result<StoredDocument, PipelineError>;
}

pub struct S3DocumentStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3DocumentStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn put(
        &self,
        submission_id: Uuid,
        document: &Document,
    ) -> Result<StoredDocument, PipelineError> {
        let key = format!("uploads/{}/{}", submission_id, document.filename);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(document.bytes.clone()))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| PipelineError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Uploaded resume to s3://{}/{}", self.bucket, key);
        Ok(StoredDocument {
            submission_id,
            location: format!("s3://{}/{}", self.bucket, key),
        })
    }
}

pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn put(
        &self,
        submission_id: Uuid,
        document: &Document,
    ) -> Result<StoredDocument, PipelineError> {
        let dir = self.root.join(submission_id.to_string());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PipelineError::Storage(format!("create {}: {e}", dir.display())))?;

        let path = dir.join(&document.filename);
        tokio::fs::write(&path, &document.bytes)
            .await
            .map_err(|e| PipelineError::Storage(format!("write {}: {e}", path.display())))?;

        info!("Saved resume to {}", path.display());
        Ok(StoredDocument {
            submission_id,
            location: path.display().to_string(),
        })
    }
}
