//! Text embedding generation

mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
