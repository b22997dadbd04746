//! Inference context: the loaded sequence-classification model and its tokenizer.
//!
//! Built once at startup from a local artifact directory and shared read-only
//! behind an `Arc`. Everything that touches ONNX Runtime lives here; the
//! classifier only sees the `InferenceBackend` trait.
//!
//! Artifact layout:
//! - `model.onnx`     inputs `input_ids`, `attention_mask` (i64, `[1, max_tokens]`), output 0 = logits `[1, num_labels]`
//! - `tokenizer.json` HuggingFace tokenizer
//! - `config.json`    optional HuggingFace config; `id2label` is checked against the label set

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::{Tensor, ValueType};
use serde::Deserialize;
use thiserror::Error;
use tokenizers::{
    PaddingParams, PaddingStrategy, Tokenizer, TruncationDirection, TruncationParams,
    TruncationStrategy,
};
use tracing::{debug, info, warn};

use crate::catalog::category::{CLASSIFIER_LABELS, LABEL_SET_VERSION};

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Tokenization failed: {0}")]
    Tokenizer(String),

    #[error("ONNX Runtime error: {0}")]
    Runtime(#[from] ort::Error),

    #[error("Unexpected model output: {0}")]
    Output(String),

    #[error("Inference session poisoned by an earlier panic")]
    SessionPoisoned,
}

/// Turns resume text into one raw logit per label.
///
/// Implementations must be safe to call from several threads at once and keep
/// no state between calls.
pub trait InferenceBackend: Send + Sync {
    fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// Which end of an over-long resume survives tokenization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Keep the first `max_tokens` tokens (summary/objective sections).
    #[default]
    KeepLeading,
    /// Keep the last `max_tokens` tokens.
    KeepTrailing,
}

impl TruncationPolicy {
    fn direction(self) -> TruncationDirection {
        match self {
            TruncationPolicy::KeepLeading => TruncationDirection::Right,
            TruncationPolicy::KeepTrailing => TruncationDirection::Left,
        }
    }
}

impl FromStr for TruncationPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep_leading" | "leading" => Ok(TruncationPolicy::KeepLeading),
            "keep_trailing" | "trailing" => Ok(TruncationPolicy::KeepTrailing),
            other => Err(anyhow!(
                "unknown truncation policy '{other}' (expected keep_leading or keep_trailing)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceSettings {
    pub model_dir: PathBuf,
    pub max_tokens: usize,
    pub truncation: TruncationPolicy,
    pub sessions: usize,
}

#[derive(Debug, Deserialize)]
struct ArtifactConfig {
    #[serde(default)]
    id2label: BTreeMap<String, String>,
}

/// The immutable loaded model + tokenizer.
///
/// ONNX Runtime needs exclusive access to a session while it runs, so a small
/// fixed pool of sessions serves concurrent classifications.
pub struct InferenceContext {
    tokenizer: Tokenizer,
    sessions: Vec<Mutex<Session>>,
    next_session: AtomicUsize,
}

impl InferenceContext {
    pub fn load(settings: &InferenceSettings) -> Result<Self> {
        let dir = &settings.model_dir;
        info!("Loading inference context from {}", dir.display());

        validate_artifact_labels(dir)?;

        let tokenizer = load_tokenizer(&dir.join("tokenizer.json"), settings)?;

        let model_path = dir.join("model.onnx");
        let pool_size = settings.sessions.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let session = Session::builder()
                .map_err(|e| anyhow!("ONNX session builder error: {e}"))?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .map_err(|e| anyhow!("ONNX optimization config error: {e}"))?
                .with_intra_threads(2)
                .map_err(|e| anyhow!("ONNX thread config error: {e}"))?
                .commit_from_file(&model_path)
                .map_err(|e| anyhow!("Failed to load {}: {e}", model_path.display()))?;
            if sessions.is_empty() {
                check_output_labels(&session);
            }
            sessions.push(Mutex::new(session));
        }

        info!(
            "Inference context ready: {} session(s), max {} tokens, {:?}",
            pool_size, settings.max_tokens, settings.truncation
        );

        Ok(Self {
            tokenizer,
            sessions,
            next_session: AtomicUsize::new(0),
        })
    }

    /// Runs `f` on a free session, waiting on the round-robin pick if all are busy.
    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut Session) -> Result<T, InferenceError>,
    ) -> Result<T, InferenceError> {
        let start = self.next_session.fetch_add(1, Ordering::Relaxed) % self.sessions.len();
        for offset in 0..self.sessions.len() {
            let slot = &self.sessions[(start + offset) % self.sessions.len()];
            if let Ok(mut session) = slot.try_lock() {
                return f(&mut session);
            }
        }
        let mut session = self.sessions[start]
            .lock()
            .map_err(|_| InferenceError::SessionPoisoned)?;
        f(&mut session)
    }
}

impl InferenceBackend for InferenceContext {
    fn logits(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;

        let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let seq_len = ids.len();
        debug!(
            "Tokenized resume into {} positions ({} attended)",
            seq_len,
            mask.iter().filter(|&&m| m == 1).count()
        );

        let ids = Array2::from_shape_vec((1, seq_len), ids)
            .map_err(|e| InferenceError::Output(format!("input_ids shape: {e}")))?;
        let mask = Array2::from_shape_vec((1, seq_len), mask)
            .map_err(|e| InferenceError::Output(format!("attention_mask shape: {e}")))?;
        let ids = Tensor::from_array(ids)?;
        let mask = Tensor::from_array(mask)?;

        self.with_session(|session| {
            let outputs = session.run(ort::inputs![
                "input_ids" => ids,
                "attention_mask" => mask
            ])?;
            let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
            if shape.len() != 2 || shape[0] != 1 {
                return Err(InferenceError::Output(format!(
                    "expected logits of shape [1, labels], got {shape:?}"
                )));
            }
            Ok(logits.to_vec())
        })
    }
}

fn load_tokenizer(path: &Path, settings: &InferenceSettings) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
        .map_err(|e| anyhow!("Failed to load tokenizer {}: {e}", path.display()))?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: settings.max_tokens,
            direction: settings.truncation.direction(),
            strategy: TruncationStrategy::LongestFirst,
            stride: 0,
        }))
        .map_err(|e| anyhow!("Invalid truncation settings: {e}"))?;

    // RoBERTa-style vocabularies pad with <pad>, BERT-style with [PAD]
    let (pad_token, pad_id) = ["<pad>", "[PAD]"]
        .into_iter()
        .find_map(|t| tokenizer.token_to_id(t).map(|id| (t.to_string(), id)))
        .unwrap_or_else(|| ("[PAD]".to_string(), 0));
    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::Fixed(settings.max_tokens),
        pad_id,
        pad_token,
        ..Default::default()
    }));

    Ok(tokenizer)
}

/// Checks the artifact's `id2label` against the closed label set.
///
/// Divergence is only logged: lookups fail soft to `Unknown` at request time.
fn validate_artifact_labels(dir: &Path) -> Result<()> {
    let config_path = dir.join("config.json");
    if !config_path.exists() {
        warn!(
            "No config.json in {}; label set {} assumed",
            dir.display(),
            LABEL_SET_VERSION
        );
        return Ok(());
    }

    let raw = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: ArtifactConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid model config {}", config_path.display()))?;

    for warning in label_divergence(&config.id2label) {
        warn!("Model artifact label mismatch: {warning}");
    }
    Ok(())
}

/// Checks the logits width declared by the graph, so artifacts shipped
/// without `config.json` are still validated.
fn check_output_labels(session: &Session) {
    let Some(output) = session.outputs.first() else {
        warn!("Model declares no outputs");
        return;
    };
    if let ValueType::Tensor { shape, .. } = &output.output_type {
        if let Some(warning) = output_label_divergence(shape) {
            warn!("Model output '{}' label mismatch: {warning}", output.name);
        }
    }
}

/// Compares the label dimension of the logits output with the label set.
/// Dynamic (negative) dimensions cannot be checked until the first run.
fn output_label_divergence(dims: &[i64]) -> Option<String> {
    let labels = *dims.last()?;
    if labels < 0 || labels as usize == CLASSIFIER_LABELS.len() {
        return None;
    }
    Some(format!(
        "model emits {labels} logits, label set {} has {}",
        LABEL_SET_VERSION,
        CLASSIFIER_LABELS.len()
    ))
}

fn label_divergence(id2label: &BTreeMap<String, String>) -> Vec<String> {
    let mut warnings = Vec::new();
    if id2label.is_empty() {
        return warnings;
    }
    if id2label.len() != CLASSIFIER_LABELS.len() {
        warnings.push(format!(
            "artifact has {} labels, label set {} has {}",
            id2label.len(),
            LABEL_SET_VERSION,
            CLASSIFIER_LABELS.len()
        ));
    }
    for (index, category) in CLASSIFIER_LABELS.iter().enumerate() {
        let Some(name) = id2label.get(&index.to_string()) else {
            continue;
        };
        // Untrained heads export generic LABEL_N names
        if !name.starts_with("LABEL_") && !name.eq_ignore_ascii_case(category.as_str()) {
            warnings.push(format!("label {index} is '{name}', expected '{category}'"));
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id2label(names: &[&str]) -> BTreeMap<String, String> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| (i.to_string(), n.to_string()))
            .collect()
    }

    #[test]
    fn test_truncation_policy_parse() {
        assert_eq!(
            "keep_leading".parse::<TruncationPolicy>().unwrap(),
            TruncationPolicy::KeepLeading
        );
        assert_eq!(
            "KEEP_TRAILING".parse::<TruncationPolicy>().unwrap(),
            TruncationPolicy::KeepTrailing
        );
        assert!("middle".parse::<TruncationPolicy>().is_err());
    }

    #[test]
    fn test_keep_leading_truncates_right() {
        assert_eq!(
            TruncationPolicy::KeepLeading.direction(),
            TruncationDirection::Right
        );
        assert_eq!(
            TruncationPolicy::KeepTrailing.direction(),
            TruncationDirection::Left
        );
    }

    #[test]
    fn test_matching_labels_no_warnings() {
        let labels = id2label(&["Web Development", "Data Science", "Software Development"]);
        assert!(label_divergence(&labels).is_empty());
    }

    #[test]
    fn test_generic_labels_only_count_checked() {
        let labels = id2label(&["LABEL_0", "LABEL_1"]);
        let warnings = label_divergence(&labels);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2 labels"));
    }

    #[test]
    fn test_renamed_label_reported() {
        let labels = id2label(&["Web Development", "HR", "Software Development"]);
        let warnings = label_divergence(&labels);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'HR'"));
    }

    #[test]
    fn test_missing_config_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_artifact_labels(dir.path()).is_ok());
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{not json").unwrap();
        assert!(validate_artifact_labels(dir.path()).is_err());
    }

    #[test]
    fn test_load_fails_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let settings = InferenceSettings {
            model_dir: dir.path().to_path_buf(),
            max_tokens: 512,
            truncation: TruncationPolicy::KeepLeading,
            sessions: 1,
        };
        assert!(InferenceContext::load(&settings).is_err());
    }

    #[test]
    fn test_output_dimension_matching_label_set() {
        assert_eq!(output_label_divergence(&[1, 3]), None);
        assert_eq!(output_label_divergence(&[-1, 3]), None);
    }

    #[test]
    fn test_output_dimension_dynamic_or_missing_skipped() {
        assert_eq!(output_label_divergence(&[1, -1]), None);
        assert_eq!(output_label_divergence(&[]), None);
    }

    #[test]
    fn test_output_dimension_mismatch_reported() {
        let warning = output_label_divergence(&[1, 5]).unwrap();
        assert!(warning.contains("5 logits"));
    }
}
