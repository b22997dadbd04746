use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::inference::TruncationPolicy;

/// S3/MinIO settings. Present only when `S3_BUCKET` is set.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub rust_log: String,
    pub model_dir: PathBuf,
    pub max_sequence_tokens: usize,
    pub min_resume_words: usize,
    pub truncation_policy: TruncationPolicy,
    pub inference_sessions: usize,
    pub catalog_path: Option<PathBuf>,
    pub upload_dir: PathBuf,
    pub s3: Option<S3Config>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let s3 = match optional_env("S3_BUCKET") {
            Some(bucket) => Some(S3Config {
                bucket,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            }),
            None => None,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            model_dir: optional_env("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static/roberta_model")),
            max_sequence_tokens: parse_env("MAX_SEQUENCE_TOKENS", 512)?,
            min_resume_words: parse_env("MIN_RESUME_WORDS", 120)?,
            truncation_policy: parse_env("TRUNCATION_POLICY", TruncationPolicy::KeepLeading)?,
            inference_sessions: parse_env("INFERENCE_SESSIONS", 2)?,
            catalog_path: optional_env("CATALOG_PATH").map(PathBuf::from),
            upload_dir: optional_env("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            s3,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has invalid value '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_port() {
        assert_eq!(parse_value::<u16>("PORT", " 9090 ").unwrap(), 9090);
    }

    #[test]
    fn test_parse_value_error_names_key() {
        let err = parse_value::<usize>("MIN_RESUME_WORDS", "lots").unwrap_err();
        assert!(err.to_string().contains("MIN_RESUME_WORDS"));
    }

    #[test]
    fn test_parse_value_truncation_policy() {
        assert_eq!(
            parse_value::<TruncationPolicy>("TRUNCATION_POLICY", "keep_trailing").unwrap(),
            TruncationPolicy::KeepTrailing
        );
    }
}
