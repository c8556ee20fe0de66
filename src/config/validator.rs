use crate::config::Config;
use crate::error::{EvidexError, Result, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_chunking(config, &mut errors);
        Self::validate_lexical(config, &mut errors);
        Self::validate_embedding(config, &mut errors);
        Self::validate_indexing(config, &mut errors);
        Self::validate_retrieval(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EvidexError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_chunking(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.chunking.chunk_size == 0 {
            errors.push(ValidationError::new(
                "chunking.chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        // Overlap must leave room for new content in every chunk
        if config.chunking.base_overlap >= config.chunking.chunk_size {
            errors.push(ValidationError::new(
                "chunking.base_overlap",
                format!(
                    "Overlap {} must be smaller than chunk size {}",
                    config.chunking.base_overlap, config.chunking.chunk_size
                ),
            ));
        }

        if config.chunking.table_overlap >= config.chunking.chunk_size {
            errors.push(ValidationError::new(
                "chunking.table_overlap",
                format!(
                    "Overlap {} must be smaller than chunk size {}",
                    config.chunking.table_overlap, config.chunking.chunk_size
                ),
            ));
        }
    }

    fn validate_lexical(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.lexical.k1 <= 0.0 {
            errors.push(ValidationError::new(
                "lexical.k1",
                format!("k1 must be positive, got {}", config.lexical.k1),
            ));
        }

        if !(0.0..=1.0).contains(&config.lexical.b) {
            errors.push(ValidationError::new(
                "lexical.b",
                format!("b must be between 0.0 and 1.0, got {}", config.lexical.b),
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.embedding.model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        }

        if config.embedding.batch_size == 0 {
            errors.push(ValidationError::new(
                "embedding.batch_size",
                "Batch size must be greater than 0",
            ));
        }

        if config.embedding.dimension == 0 {
            errors.push(ValidationError::new(
                "embedding.dimension",
                "Embedding dimension must be greater than 0",
            ));
        }
    }

    fn validate_indexing(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.indexing.vector_dim == 0 {
            errors.push(ValidationError::new(
                "indexing.vector_dim",
                "Vector dimension must be greater than 0",
            ));
        }

        if config.indexing.vector_dim != config.embedding.dimension {
            errors.push(ValidationError::new(
                "indexing.vector_dim",
                format!(
                    "Vector dimension {} must match embedding dimension {}",
                    config.indexing.vector_dim, config.embedding.dimension
                ),
            ));
        }

        if config.indexing.hnsw_ef_construction == 0 {
            errors.push(ValidationError::new(
                "indexing.hnsw_ef_construction",
                "HNSW ef_construction must be greater than 0",
            ));
        }

        if config.indexing.hnsw_m == 0 {
            errors.push(ValidationError::new(
                "indexing.hnsw_m",
                "HNSW M must be greater than 0",
            ));
        }

        if config.indexing.hnsw_ef_search == 0 {
            errors.push(ValidationError::new(
                "indexing.hnsw_ef_search",
                "HNSW ef_search must be greater than 0",
            ));
        }
    }

    fn validate_retrieval(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.retrieval.top_k == 0 {
            errors.push(ValidationError::new(
                "retrieval.top_k",
                "top_k must be greater than 0",
            ));
        }

        if !(0.0..=1.0).contains(&config.retrieval.vector_weight) {
            errors.push(ValidationError::new(
                "retrieval.vector_weight",
                format!(
                    "Vector weight must be between 0.0 and 1.0, got {}",
                    config.retrieval.vector_weight
                ),
            ));
        }

        if config.retrieval.fetch_multiplier == 0 {
            errors.push(ValidationError::new(
                "retrieval.fetch_multiplier",
                "Fetch multiplier must be greater than 0",
            ));
        }
    }
}
