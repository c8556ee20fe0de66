//! Configuration management for the retrieval core
//!
//! All tunable constants of the segmenter, the two indexes and the fusion
//! engine live here, loaded from TOML with environment overrides and
//! validated before use.

use crate::error::{EvidexError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub chunking: ChunkingConfig,
    pub lexical: LexicalConfig,
    pub embedding: EmbeddingConfig,
    pub indexing: IndexConfig,
    pub retrieval: RetrievalConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Segmenter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens
    pub chunk_size: usize,
    /// Overlap in tokens for ordinary documents
    pub base_overlap: usize,
    /// Overlap in tokens for table-heavy documents
    pub table_overlap: usize,
    /// Estimated table count above which a document counts as table-heavy
    pub table_heavy_threshold: usize,
}

/// Lexical (BM25) index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalConfig {
    /// Term-frequency saturation constant
    pub k1: f32,
    /// Length-normalization constant
    pub b: f32,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name (e.g. "all-MiniLM-L6-v2")
    pub model: String,
    /// Embedding dimension (384 for MiniLM)
    pub dimension: usize,
    /// Batch size for embedding generation; bounds peak memory during builds
    pub batch_size: usize,
}

/// Semantic (ANN) index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector dimension (must match embedding dimension)
    pub vector_dim: usize,
    /// HNSW construction parameter (higher = better recall, slower build)
    pub hnsw_ef_construction: usize,
    /// HNSW M parameter (number of connections per layer)
    pub hnsw_m: usize,
    /// HNSW search parameter (higher = better recall, slower search)
    pub hnsw_ef_search: usize,
}

/// Fusion engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of results per query
    pub top_k: usize,
    /// Weight for semantic scores in [0, 1]; lexical gets the complement
    pub vector_weight: f32,
    /// Each index is queried for top_k * fetch_multiplier candidates so
    /// fusion can reorder rather than being bound by each index's cutoff
    pub fetch_multiplier: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EvidexError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| EvidexError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| EvidexError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: EVIDEX_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("EVIDEX_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
            value.parse().map_err(|_| EvidexError::InvalidConfigValue {
                path: path.to_string(),
                message: format!("Cannot parse '{}'", value),
            })
        }

        match path {
            "CHUNKING__CHUNK_SIZE" => {
                self.chunking.chunk_size = parse(path, value)?;
            }
            "CHUNKING__BASE_OVERLAP" => {
                self.chunking.base_overlap = parse(path, value)?;
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__BATCH_SIZE" => {
                self.embedding.batch_size = parse(path, value)?;
            }
            "RETRIEVAL__TOP_K" => {
                self.retrieval.top_k = parse(path, value)?;
            }
            "RETRIEVAL__VECTOR_WEIGHT" => {
                self.retrieval.vector_weight = parse(path, value)?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EvidexError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("evidex").join("config.toml"))
    }

    /// Get the default data directory (chunk store, index files)
    pub fn default_data_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| EvidexError::Config("Cannot determine home directory".to_string()))?;

        Ok(home_dir.join(".evidex"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            chunking: ChunkingConfig::default(),
            lexical: LexicalConfig::default(),
            embedding: EmbeddingConfig::default(),
            indexing: IndexConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            base_overlap: 50,
            table_overlap: 100,
            table_heavy_threshold: 200,
        }
    }
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            batch_size: 32,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            vector_dim: 384,
            hnsw_ef_construction: 200,
            hnsw_m: 16,
            hnsw_ef_search: 50,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            vector_weight: 0.5,
            fetch_multiplier: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(ConfigValidator::validate(&config).is_ok());
        assert_eq!(config.chunking.chunk_size, 512);
        assert_eq!(config.chunking.base_overlap, 50);
        assert_eq!(config.chunking.table_overlap, 100);
        assert_eq!(config.lexical.k1, 1.5);
        assert_eq!(config.lexical.b, 0.75);
        assert_eq!(config.retrieval.vector_weight, 0.5);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config::default();
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.chunking.chunk_size, config.chunking.chunk_size);
        assert_eq!(loaded.retrieval.top_k, config.retrieval.top_k);
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");

        let err = Config::load(&path);
        assert!(matches!(err, Err(EvidexError::ConfigNotFound { .. })));
    }
}
