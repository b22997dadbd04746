//! Closed career-track enumeration and the classifier's label mapping.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the classifier label set. Must match the trained artifact and the catalog.
pub const LABEL_SET_VERSION: &str = "v1";

/// Classifier output index → category, in label order.
pub const CLASSIFIER_LABELS: [Category; 3] = [
    Category::WebDevelopment,
    Category::DataScience,
    Category::SoftwareDevelopment,
];

/// A candidate career track.
///
/// `Unknown` is the sentinel for classifier outputs that do not map onto the
/// label set; it never carries recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Data Science")]
    DataScience,
    #[serde(rename = "Software Development")]
    SoftwareDevelopment,
    #[serde(rename = "AI Engineer")]
    AiEngineer,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl Category {
    /// Every category that must carry a recommendation bundle.
    pub const ALL: [Category; 4] = [
        Category::WebDevelopment,
        Category::DataScience,
        Category::SoftwareDevelopment,
        Category::AiEngineer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::WebDevelopment => "Web Development",
            Category::DataScience => "Data Science",
            Category::SoftwareDevelopment => "Software Development",
            Category::AiEngineer => "AI Engineer",
            Category::Unknown => "Unknown",
        }
    }

    /// Parses a display name. Anything unrecognised is `Unknown`.
    pub fn from_display_name(name: &str) -> Category {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or(Category::Unknown)
    }

    /// Maps a classifier output index onto the enumeration.
    pub fn from_label_index(index: usize) -> Category {
        CLASSIFIER_LABELS
            .get(index)
            .copied()
            .unwrap_or(Category::Unknown)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
