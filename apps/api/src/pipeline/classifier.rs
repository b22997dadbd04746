//! Category Classifier: resume text → probability distribution → single category.
//!
//! Decision logic only. The model call goes through `InferenceBackend`.
//!
//! 1. Reject text under `min_words` whitespace-separated words before any inference.
//! 2. Softmax the backend's logits into a distribution over the label set.
//! 3. Argmax; ties go to the lowest label index.
//! 4. Map the winning index onto `Category`; indices outside the label set are `Unknown`.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::catalog::category::Category;
use crate::inference::InferenceBackend;
use crate::pipeline::errors::PipelineError;

pub const DEFAULT_MIN_WORDS: usize = 120;

#[derive(Debug, Clone, Serialize)]
pub struct LabelProbability {
    pub label_index: usize,
    pub category: Category,
    pub probability: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub category: Category,
    /// Probability of the winning label.
    pub confidence: f32,
    /// One entry per model label, in label order.
    pub distribution: Vec<LabelProbability>,
}

pub struct CategoryClassifier {
    backend: Arc<dyn InferenceBackend>,
    min_words: usize,
}

impl CategoryClassifier {
    pub fn new(backend: Arc<dyn InferenceBackend>, min_words: usize) -> Self {
        Self { backend, min_words }
    }

    pub fn classify(&self, text: &str) -> Result<ClassificationResult, PipelineError> {
        let words = text.split_whitespace().count();
        if words < self.min_words {
            return Err(PipelineError::InsufficientContent {
                words,
                required: self.min_words,
            });
        }

        let logits = self
            .backend
            .logits(text)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(PipelineError::Inference(
                "model produced non-finite logits".to_string(),
            ));
        }

        let probabilities = softmax(&logits);
        let winner = argmax(&probabilities)
            .ok_or_else(|| PipelineError::Inference("model produced no logits".to_string()))?;

        let distribution: Vec<LabelProbability> = probabilities
            .iter()
            .enumerate()
            .map(|(label_index, &probability)| LabelProbability {
                label_index,
                category: Category::from_label_index(label_index),
                probability,
            })
            .collect();

        debug!(
            "Classified {} words: label {} p={:.4} over {} labels",
            words,
            winner,
            probabilities[winner],
            probabilities.len()
        );

        Ok(ClassificationResult {
            category: Category::from_label_index(winner),
            confidence: probabilities[winner],
            distribution,
        })
    }
}

/// Numerically stable softmax.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
