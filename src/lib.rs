//! Evidex - Evidence-Bound Retrieval Core for Regulatory Drug Documents
//!
//! Segments parsed regulatory documents into token-bounded chunks with
//! adaptive overlap, indexes them lexically (BM25) and semantically
//! (embedding distance), and fuses both ranked lists into a single
//! reproducible ranking for downstream citation.

pub mod chunking;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retrieval;
pub mod tokenize;

pub use error::{EvidexError, Result};
