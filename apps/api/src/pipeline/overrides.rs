//! Override Resolver: curated filename → category assignments that bypass the classifier.

use std::collections::HashMap;

use crate::catalog::category::Category;

#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: HashMap<String, Category>,
}

impl OverrideTable {
    pub fn new(entries: HashMap<String, Category>) -> Self {
        Self { entries }
    }

    /// Exact, case-sensitive lookup by sanitized filename.
    pub fn resolve_override(&self, filename: &str) -> Option<Category> {
        self.entries.get(filename).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OverrideTable {
        OverrideTable::new(HashMap::from([
            ("My-Resume.pdf".to_string(), Category::AiEngineer),
            ("resume_001.pdf".to_string(), Category::WebDevelopment),
        ]))
    }

    #[test]
    fn test_hit() {
        assert_eq!(table().resolve_override("My-Resume.pdf"), Some(Category::AiEngineer));
    }

    #[test]
    fn test_miss() {
        assert_eq!(table().resolve_override("resume_002.pdf"), None);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(table().resolve_override("my-resume.pdf"), None);
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(OverrideTable::default().resolve_override("My-Resume.pdf"), None);
        assert_eq!(OverrideTable::default().len(), 0);
    }
}
