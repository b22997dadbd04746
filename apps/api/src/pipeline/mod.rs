// Resume classification & recommendation pipeline.
// Extraction, override lookup, classification and recommendation; handlers expose it over HTTP.

pub mod classifier;
pub mod document;
pub mod errors;
pub mod extractor;
pub mod handlers;
pub mod orchestrator;
pub mod overrides;
pub mod recommend;
