use thiserror::Error;

/// Typed failures of a single pipeline run. All are terminal for the request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No resume was uploaded")]
    MissingInput,

    #[error("Could not read PDF: {0}")]
    UnreadablePdf(String),

    #[error("Resume has {words} words; at least {required} are required")]
    InsufficientContent { words: usize, required: usize },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Inference error: {0}")]
    Inference(String),
}
