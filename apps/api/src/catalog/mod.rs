//! Static catalog: recommendation bundles and the filename override table.
//!
//! Loaded once at startup from the embedded default or `CATALOG_PATH`, then
//! shared read-only. No hot reload.

pub mod category;

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::catalog::category::{Category, LABEL_SET_VERSION};
use crate::pipeline::overrides::OverrideTable;
use crate::pipeline::recommend::{RecommendationBundle, RecommendationCatalog};

const DEFAULT_CATALOG: &str = include_str!("default_catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    label_set_version: String,
    #[serde(default)]
    overrides: HashMap<String, Category>,
    bundles: HashMap<Category, RecommendationBundle>,
}

/// The loaded catalog collaborator.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub overrides: OverrideTable,
    pub recommendations: RecommendationCatalog,
}

impl Catalog {
    /// Loads from `path` if given, otherwise from the embedded default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read catalog {}", path.display()))?;
                let catalog = Self::from_json(&raw)
                    .with_context(|| format!("Invalid catalog {}", path.display()))?;
                info!("Catalog loaded from {}", path.display());
                Ok(catalog)
            }
            None => Self::from_json(DEFAULT_CATALOG).context("Invalid embedded catalog"),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(raw)?;

        if file.label_set_version != LABEL_SET_VERSION {
            bail!(
                "catalog label set '{}' does not match classifier label set '{}'",
                file.label_set_version,
                LABEL_SET_VERSION
            );
        }
        if file.bundles.contains_key(&Category::Unknown) {
            bail!("'Unknown' cannot carry a recommendation bundle");
        }
        for category in Category::ALL {
            match file.bundles.get(&category) {
                Some(bundle) if !bundle.is_empty() => {}
                _ => bail!("catalog has no recommendations for '{category}'"),
            }
        }
        if let Some((name, _)) = file
            .overrides
            .iter()
            .find(|(_, c)| **c == Category::Unknown)
        {
            bail!("override for '{name}' points at 'Unknown'");
        }

        Ok(Catalog {
            overrides: OverrideTable::new(file.overrides),
            recommendations: RecommendationCatalog::new(file.bundles),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_catalog_covers_every_category() {
        let catalog = Catalog::load(None).unwrap();
        for category in Category::ALL {
            let bundle = catalog.recommendations.recommend(category);
            assert!(!bundle.skills.is_empty(), "{category} has no skills");
            assert!(!bundle.courses.is_empty(), "{category} has no courses");
        }
    }

    #[test]
    fn test_embedded_catalog_ai_engineer_bundle() {
        let catalog = Catalog::load(None).unwrap();
        let bundle = catalog.recommendations.recommend(Category::AiEngineer);
        assert_eq!(
            bundle.skills,
            vec!["Python", "Deep Learning", "Transformers", "PyTorch", "NLP"]
        );
        assert_eq!(bundle.courses[0].name, "Deep Learning Specialization");
        assert_eq!(bundle.courses[1].link, "https://huggingface.co/learn/nlp-course");
    }

    #[test]
    fn test_embedded_catalog_overrides() {
        let catalog = Catalog::load(None).unwrap();
        assert_eq!(
            catalog.overrides.resolve_override("My-Resume.pdf"),
            Some(Category::AiEngineer)
        );
        assert_eq!(
            catalog.overrides.resolve_override("resume_001.pdf"),
            Some(Category::WebDevelopment)
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEFAULT_CATALOG.replace("My-Resume.pdf", "demo.pdf").as_bytes())
            .unwrap();

        let catalog = Catalog::load(Some(file.path())).unwrap();
        assert_eq!(
            catalog.overrides.resolve_override("demo.pdf"),
            Some(Category::AiEngineer)
        );
        assert_eq!(catalog.overrides.resolve_override("My-Resume.pdf"), None);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Catalog::load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_missing_bundle_rejected() {
        let raw = r#"{
            "label_set_version": "v1",
            "bundles": {
                "Web Development": { "skills": ["HTML"], "courses": [] }
            }
        }"#;
        let err = Catalog::from_json(raw).unwrap_err();
        assert!(err.to_string().contains("no recommendations"), "{err}");
    }

    #[test]
    fn test_unknown_category_name_rejected() {
        let raw = DEFAULT_CATALOG.replace("\"AI Engineer\": {", "\"Prompt Whisperer\": {");
        assert!(Catalog::from_json(&raw).is_err());
    }

    #[test]
    fn test_label_set_mismatch_rejected() {
        let raw = DEFAULT_CATALOG.replace("\"v1\"", "\"v2\"");
        let err = Catalog::from_json(&raw).unwrap_err();
        assert!(err.to_string().contains("label set"), "{err}");
    }

    #[test]
    fn test_override_to_unknown_rejected() {
        let raw = DEFAULT_CATALOG.replace(
            "\"My-Resume.pdf\": \"AI Engineer\"",
            "\"My-Resume.pdf\": \"Unknown\"",
        );
        assert!(Catalog::from_json(&raw).is_err());
    }
}
