//! HNSW semantic index
//!
//! Approximate nearest neighbor search over chunk embeddings using cosine
//! distance. The chunk ordinal doubles as the HNSW point id, so a search
//! hit maps straight back to its chunk.

use crate::config::IndexConfig;
use crate::corpus::{Chunk, RetrievedChunk, RetrieverKind};
use crate::embedding::{EmbeddingError, EmbeddingProvider};
use hnsw_rs::prelude::*;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SemanticIndexError {
    #[error("Semantic index not built: call add_chunks() before search()")]
    NotBuilt,

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Embedding-based index over a chunk collection
///
/// Populated once per corpus version; read-only afterwards and safe to
/// share behind an `Arc`.
pub struct SemanticIndex {
    provider: Arc<dyn EmbeddingProvider>,
    index: Hnsw<'static, f32, DistCosine>,
    records: Vec<Chunk>,
    dimension: usize,
    ef_search: usize,
    built: bool,
}

impl SemanticIndex {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: &IndexConfig) -> Self {
        let index = Hnsw::<f32, DistCosine>::new(
            config.hnsw_m,
            config.vector_dim,
            config.hnsw_ef_construction,
            200, // max_nb_connection
            DistCosine,
        );

        Self {
            provider,
            index,
            records: Vec::new(),
            dimension: config.vector_dim,
            ef_search: config.hnsw_ef_search,
            built: false,
        }
    }

    /// Embed and index a chunk collection
    ///
    /// Embeddings are generated in batches of `batch_size` to bound peak
    /// memory on large corpora. An embedding failure aborts the build.
    pub fn add_chunks(
        &mut self,
        chunks: Vec<Chunk>,
        batch_size: usize,
    ) -> Result<(), SemanticIndexError> {
        let batch_size = batch_size.max(1);

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.provider.embed_batch(&texts)?;

            for (chunk, embedding) in batch.iter().zip(embeddings) {
                if embedding.len() != self.dimension {
                    return Err(SemanticIndexError::DimensionMismatch {
                        expected: self.dimension,
                        actual: embedding.len(),
                    });
                }

                let ordinal = self.records.len();
                self.index.insert((&embedding, ordinal));
                self.records.push(chunk.clone());
            }

            debug!("Indexed {} / {} chunks", self.records.len(), chunks.len());
        }

        self.built = true;
        info!(
            "Built semantic index: {} chunks, {}D embeddings ({})",
            self.records.len(),
            self.dimension,
            self.provider.model_name()
        );
        Ok(())
    }

    /// Nearest-neighbor search returning up to `k` results with cosine
    /// similarity scores clamped to [0, 1] and 1-based ranks
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, SemanticIndexError> {
        if !self.built {
            return Err(SemanticIndexError::NotBuilt);
        }

        if query.trim().is_empty() || self.records.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.provider.embed(query)?;
        if embedding.len() != self.dimension {
            return Err(SemanticIndexError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let neighbours = self.index.search(&embedding, k, self.ef_search);

        let results = neighbours
            .into_iter()
            .enumerate()
            .map(|(i, n)| {
                let score = (1.0 - n.distance).clamp(0.0, 1.0);
                RetrievedChunk::from_chunk(
                    &self.records[n.d_id],
                    score,
                    i + 1,
                    RetrieverKind::Semantic,
                )
            })
            .collect();

        Ok(results)
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::embedding::{EmbeddingError, EmbeddingProvider};
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    /// Deterministic embedder for tests: tokens hash into dimension
    /// buckets and the vector is L2-normalized. Texts sharing words get
    /// high cosine similarity without any model download.
    pub struct HashEmbedder {
        pub dimension: usize,
    }

    impl HashEmbedder {
        pub fn new(dimension: usize) -> Self {
            Self { dimension }
        }

        fn vector_for(&self, text: &str) -> Vec<f32> {
            let mut v = vec![0.0f32; self.dimension];
            for token in text.to_lowercase().split_whitespace() {
                let mut hasher = DefaultHasher::new();
                token.hash(&mut hasher);
                let bucket = (hasher.finish() as usize) % self.dimension;
                v[bucket] += 1.0;
            }

            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for x in &mut v {
                    *x /= norm;
                }
            } else {
                v[0] = 1.0;
            }
            v
        }
    }

    impl EmbeddingProvider for HashEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.vector_for(text))
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts.iter().map(|t| self.vector_for(t)).collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn model_name(&self) -> &str {
            "hash-embedder"
        }
    }
}
