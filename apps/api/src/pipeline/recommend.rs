//! Recommendation Resolver: category → static skills and course bundle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::category::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub link: String,
}

/// Skills in relevance order, followed by course references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub skills: Vec<String>,
    pub courses: Vec<Course>,
}

impl RecommendationBundle {
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty() && self.courses.is_empty()
    }
}

static EMPTY_BUNDLE: RecommendationBundle = RecommendationBundle {
    skills: Vec::new(),
    courses: Vec::new(),
};

#[derive(Debug, Clone, Default)]
pub struct RecommendationCatalog {
    bundles: HashMap<Category, RecommendationBundle>,
}

impl RecommendationCatalog {
    pub fn new(bundles: HashMap<Category, RecommendationBundle>) -> Self {
        Self { bundles }
    }

    /// Total lookup. Categories without a bundle (including `Unknown`) get the
    /// empty bundle; absence is data, not an error.
    pub fn recommend(&self, category: Category) -> &RecommendationBundle {
        self.bundles.get(&category).unwrap_or(&EMPTY_BUNDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RecommendationCatalog {
        let mut bundles = HashMap::new();
        bundles.insert(
            Category::DataScience,
            RecommendationBundle {
                skills: vec!["Python".to_string(), "Python".to_string()],
                courses: vec![Course {
                    name: "IBM Data Science".to_string(),
                    link: "https://www.coursera.org/professional-certificates/ibm-data-science"
                        .to_string(),
                }],
            },
        );
        RecommendationCatalog::new(bundles)
    }

    #[test]
    fn test_known_category_returns_bundle() {
        let bundle = catalog().recommend(Category::DataScience).clone();
        assert_eq!(bundle.courses.len(), 1);
    }

    #[test]
    fn test_duplicate_skills_preserved_in_order() {
        let c = catalog();
        assert_eq!(c.recommend(Category::DataScience).skills, vec!["Python", "Python"]);
    }

    #[test]
    fn test_unknown_returns_empty_bundle() {
        assert!(catalog().recommend(Category::Unknown).is_empty());
    }

    #[test]
    fn test_absent_category_returns_empty_bundle() {
        assert!(catalog().recommend(Category::WebDevelopment).is_empty());
    }
}
