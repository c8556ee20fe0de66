//! Retrieval paths and score fusion

mod fusion;
mod hybrid;

pub use fusion::{merge_weighted, normalize_scores};
pub use hybrid::{HybridRetriever, RetrieveError};
