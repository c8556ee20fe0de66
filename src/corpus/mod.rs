//! Core data model: documents, chunks, integrity warnings, retrieval results

mod store;

pub use store::{load_chunks, save_chunks};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A parsed regulatory document (external input, immutable once parsed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub source_path: String,
    /// Issuing authority, e.g. "FDA", "NICE", "WHO"
    pub authority_family: String,
    /// Trust tier: 1 = primary regulator, 2 = secondary
    pub tier: u8,
    pub year: Option<i32>,
    pub drug_names: Vec<String>,
    /// Full normalized markdown text
    pub text: String,
    /// Rough table-row count for the document, drives the overlap width
    pub estimated_table_count: usize,
}

/// A token-bounded text unit derived from a document; the unit of retrieval
///
/// Created once during segmentation and never mutated. The id suffix always
/// equals the zero-padded sequential index, enforced by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub text: String,
    pub token_count: usize,
    pub index: usize,
    pub section: Option<String>,
    pub authority_family: String,
    pub tier: u8,
    pub year: Option<i32>,
    pub drug_names: Vec<String>,
}

impl Chunk {
    /// Build a chunk for `document` at the given sequential index, deriving
    /// the id and inheriting the document's authority metadata
    pub fn new(document: &Document, index: usize, text: String, token_count: usize) -> Self {
        Self {
            id: Self::id_for(&document.id, index),
            document_id: document.id.clone(),
            text,
            token_count,
            index,
            section: None,
            authority_family: document.authority_family.clone(),
            tier: document.tier,
            year: document.year,
            drug_names: document.drug_names.clone(),
        }
    }

    /// Deterministic chunk identifier: `{document_id}_chunk_{index:04}`
    pub fn id_for(document_id: &str, index: usize) -> String {
        format!("{}_chunk_{:04}", document_id, index)
    }
}

/// Severity tier for integrity warnings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Category of a chunk integrity warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// Chunk fell below the minimum token threshold
    TooSmall,
    /// Chunk exceeded the maximum token threshold
    TooLarge,
    /// Chunk appears to begin mid-table, without its header context
    TableSplit,
    /// Document had no text to segment
    EmptyDocument,
}

/// Integrity warning attached to segmenter output
///
/// Diagnostic only, never fatal; warnings are collected alongside chunks and
/// never mutate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkWarning {
    pub document_id: String,
    pub chunk_id: String,
    pub category: WarningCategory,
    pub message: String,
    pub token_count: usize,
    pub chunk_index: usize,
    pub severity: Severity,
}

/// Which retrieval path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverKind {
    Lexical,
    Semantic,
    Hybrid,
}

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RetrieverKind::Lexical => "lexical",
            RetrieverKind::Semantic => "semantic",
            RetrieverKind::Hybrid => "hybrid",
        };
        f.write_str(s)
    }
}

/// Error for an unrecognized retrieval mode string
///
/// An unknown mode is rejected at parse time; there is no silent fallback
/// from one retrieval path to another.
#[derive(Error, Debug)]
#[error("Unknown retriever kind '{0}' (expected lexical, semantic or hybrid)")]
pub struct UnknownRetrieverKind(pub String);

impl FromStr for RetrieverKind {
    type Err = UnknownRetrieverKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "bm25" => Ok(RetrieverKind::Lexical),
            "semantic" | "vector" => Ok(RetrieverKind::Semantic),
            "hybrid" => Ok(RetrieverKind::Hybrid),
            other => Err(UnknownRetrieverKind(other.to_string())),
        }
    }
}

/// A ranked retrieval result, created fresh per query and never persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub document_id: String,
    pub text: String,
    /// Normalized relevance in [0, 1]
    pub score: f32,
    /// 1-based position in the result list
    pub rank: usize,
    pub retriever: RetrieverKind,
    pub authority_family: String,
    pub tier: u8,
    pub year: Option<i32>,
    pub drug_names: Vec<String>,
}

impl RetrievedChunk {
    /// Build a result from an indexed chunk with a score, rank and path tag
    pub fn from_chunk(chunk: &Chunk, score: f32, rank: usize, retriever: RetrieverKind) -> Self {
        Self {
            chunk_id: chunk.id.clone(),
            document_id: chunk.document_id.clone(),
            text: chunk.text.clone(),
            score,
            rank,
            retriever,
            authority_family: chunk.authority_family.clone(),
            tier: chunk.tier,
            year: chunk.year,
            drug_names: chunk.drug_names.clone(),
        }
    }

    /// Short preview of the text for display, truncated at a char boundary
    pub fn preview(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let head: String = self.text.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }
}
