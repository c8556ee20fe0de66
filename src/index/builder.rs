//! Builds both indexes from one chunk collection

use crate::config::{IndexConfig, LexicalConfig};
use crate::corpus::Chunk;
use crate::embedding::EmbeddingProvider;
use crate::index::{LexicalIndex, SemanticIndex, SemanticIndexError};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Constructs the lexical and semantic indexes over the same chunks, so
/// both agree on the corpus snapshot they answer for
pub struct IndexBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    lexical_config: LexicalConfig,
    index_config: IndexConfig,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        lexical_config: LexicalConfig,
        index_config: IndexConfig,
        batch_size: usize,
    ) -> Self {
        Self {
            provider,
            lexical_config,
            index_config,
            batch_size,
        }
    }

    pub fn build(
        &self,
        chunks: Vec<Chunk>,
    ) -> Result<(LexicalIndex, SemanticIndex), SemanticIndexError> {
        let start = Instant::now();
        let count = chunks.len();

        let mut lexical = LexicalIndex::new(self.lexical_config.k1, self.lexical_config.b);
        lexical.build(chunks.clone());

        let mut semantic = SemanticIndex::new(Arc::clone(&self.provider), &self.index_config);
        semantic.add_chunks(chunks, self.batch_size)?;

        info!(
            "Indexed {} chunks in {:.2}s",
            count,
            start.elapsed().as_secs_f64()
        );

        Ok((lexical, semantic))
    }
}
