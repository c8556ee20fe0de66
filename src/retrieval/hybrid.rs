//! Hybrid retrieval over both indexes

use crate::config::RetrievalConfig;
use crate::corpus::{RetrievedChunk, RetrieverKind};
use crate::index::{LexicalIndex, LexicalIndexError, SemanticIndex, SemanticIndexError};
use crate::retrieval::fusion::{merge_weighted, normalize_scores};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("Lexical retrieval failed: {0}")]
    Lexical(#[from] LexicalIndexError),

    #[error("Semantic retrieval failed: {0}")]
    Semantic(#[from] SemanticIndexError),

    #[error("Vector weight must be between 0.0 and 1.0, got {0}")]
    InvalidWeight(f32),
}

/// Queries both indexes and fuses their rankings
///
/// Indexes are built once per corpus version and read-only afterwards, so
/// they are shared through plain `Arc` with no locking.
pub struct HybridRetriever {
    lexical: Arc<LexicalIndex>,
    semantic: Arc<SemanticIndex>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(
        lexical: Arc<LexicalIndex>,
        semantic: Arc<SemanticIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            lexical,
            semantic,
            config,
        }
    }

    /// Lexical-only retrieval
    pub fn retrieve_lexical(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        Ok(self.lexical.search(query, k)?)
    }

    /// Semantic-only retrieval
    pub fn retrieve_semantic(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        Ok(self.semantic.search(query, k)?)
    }

    /// Fused retrieval: both indexes are queried for `k * fetch_multiplier`
    /// candidates so fusion can reorder beyond each index's own cutoff,
    /// then scores are normalized and merged under `vector_weight`
    pub async fn retrieve_hybrid(
        &self,
        query: &str,
        k: usize,
        vector_weight: f32,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        if !(0.0..=1.0).contains(&vector_weight) {
            return Err(RetrieveError::InvalidWeight(vector_weight));
        }

        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let depth = k * self.config.fetch_multiplier;
        let (lexical, semantic) = tokio::join!(
            self.lexical_candidates(query, depth),
            self.semantic_candidates(query, depth),
        );
        let mut lexical = lexical?;
        let mut semantic = semantic?;

        if lexical.is_empty() && semantic.is_empty() {
            return Ok(Vec::new());
        }

        // one empty batch: pass the other through with its own path tag so
        // callers can see the result did not come from fusion
        if semantic.is_empty() {
            debug!("No semantic candidates for query; returning lexical results");
            lexical.truncate(k);
            return Ok(lexical);
        }
        if lexical.is_empty() {
            debug!("No lexical candidates for query; returning semantic results");
            semantic.truncate(k);
            return Ok(semantic);
        }

        normalize_scores(&mut semantic);
        normalize_scores(&mut lexical);
        Ok(merge_weighted(semantic, lexical, vector_weight, k))
    }

    /// Retrieve through the given path with the configured defaults
    pub async fn retrieve(
        &self,
        query: &str,
        kind: RetrieverKind,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        match kind {
            RetrieverKind::Lexical => self.retrieve_lexical(query, self.config.top_k),
            RetrieverKind::Semantic => self.retrieve_semantic(query, self.config.top_k),
            RetrieverKind::Hybrid => {
                self.retrieve_hybrid(query, self.config.top_k, self.config.vector_weight)
                    .await
            }
        }
    }

    async fn lexical_candidates(
        &self,
        query: &str,
        depth: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        Ok(self.lexical.search(query, depth)?)
    }

    async fn semantic_candidates(
        &self,
        query: &str,
        depth: usize,
    ) -> Result<Vec<RetrievedChunk>, RetrieveError> {
        Ok(self.semantic.search(query, depth)?)
    }
}
