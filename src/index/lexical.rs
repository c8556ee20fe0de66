//! BM25 lexical index
//!
//! In-memory inverted index over the chunk collection. Tokenization is
//! lowercase whitespace splitting, which keeps dosage strings like
//! "mg/dL" and "5-10" intact as single terms.

use crate::corpus::{Chunk, RetrievedChunk, RetrieverKind};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_K1: f32 = 1.5;
pub const DEFAULT_B: f32 = 0.75;

#[derive(Error, Debug)]
pub enum LexicalIndexError {
    #[error("Lexical index not built: call build() before search()")]
    NotBuilt,
}

struct LexicalState {
    chunks: Vec<Chunk>,
    /// term -> (chunk ordinal, term frequency)
    postings: HashMap<String, Vec<(usize, u32)>>,
    doc_lengths: Vec<u32>,
    avg_doc_len: f32,
}

/// BM25 index over a chunk collection
///
/// `build` replaces the whole index; there is no incremental update. The
/// index is read-only after build and safe to share behind an `Arc`.
pub struct LexicalIndex {
    k1: f32,
    b: f32,
    state: Option<LexicalState>,
}

impl LexicalIndex {
    pub fn new(k1: f32, b: f32) -> Self {
        Self { k1, b, state: None }
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|t| t.to_string())
            .collect()
    }

    /// Build the index from a chunk collection, replacing any prior state
    pub fn build(&mut self, chunks: Vec<Chunk>) {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(chunks.len());

        for (ordinal, chunk) in chunks.iter().enumerate() {
            let tokens = Self::tokenize(&chunk.text);
            doc_lengths.push(tokens.len() as u32);

            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for (term, tf) in freqs {
                postings.entry(term).or_default().push((ordinal, tf));
            }
        }

        let avg_doc_len = if doc_lengths.is_empty() {
            0.0
        } else {
            doc_lengths.iter().sum::<u32>() as f32 / doc_lengths.len() as f32
        };

        info!(
            "Built lexical index: {} chunks, {} terms, {:.1} avg tokens/chunk",
            chunks.len(),
            postings.len(),
            avg_doc_len
        );

        self.state = Some(LexicalState {
            chunks,
            postings,
            doc_lengths,
            avg_doc_len,
        });
    }

    /// BM25 search returning up to `k` results with min-max normalized
    /// scores and 1-based ranks
    ///
    /// Chunks matching no query term are never returned; an empty or
    /// whitespace-only query yields an empty result, not an error.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, LexicalIndexError> {
        let state = self.state.as_ref().ok_or(LexicalIndexError::NotBuilt)?;

        let query_terms = Self::tokenize(query);
        if query_terms.is_empty() || state.chunks.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let n = state.chunks.len() as f32;
        let mut scores: HashMap<usize, f32> = HashMap::new();

        for term in &query_terms {
            let Some(posting) = state.postings.get(term) else {
                continue;
            };

            let df = posting.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for &(ordinal, tf) in posting {
                let tf = tf as f32;
                let doc_len = state.doc_lengths[ordinal] as f32;
                let norm = self.k1 * (1.0 - self.b + self.b * doc_len / state.avg_doc_len);
                let contribution = idf * tf * (self.k1 + 1.0) / (tf + norm);
                *scores.entry(ordinal).or_insert(0.0) += contribution;
            }
        }

        let candidates = scores.len();
        let mut scored: Vec<(usize, f32)> = scores
            .into_iter()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        if scored.len() < candidates {
            debug!(
                "Discarded {} zero-score candidates (no token overlap)",
                candidates - scored.len()
            );
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        if scored.is_empty() {
            return Ok(Vec::new());
        }

        // min-max normalize into [0, 1]; a uniform batch maps to all 1.0
        let max = scored[0].1;
        let min = scored[scored.len() - 1].1;
        let range = max - min;

        let results = scored
            .into_iter()
            .enumerate()
            .map(|(i, (ordinal, raw))| {
                let score = if range > 0.0 { (raw - min) / range } else { 1.0 };
                RetrievedChunk::from_chunk(
                    &state.chunks[ordinal],
                    score,
                    i + 1,
                    RetrieverKind::Lexical,
                )
            })
            .collect();

        Ok(results)
    }

    pub fn is_built(&self) -> bool {
        self.state.is_some()
    }

    pub fn len(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.chunks.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LexicalIndex {
    fn default() -> Self {
        Self::new(DEFAULT_K1, DEFAULT_B)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn corpus() -> Vec<Chunk> {
        let doc = Document {
            id: "fda_warfarin_2019".to_string(),
            source_path: "data/raw/fda_warfarin_2019.pdf".to_string(),
            authority_family: "FDA".to_string(),
            tier: 1,
            year: Some(2019),
            drug_names: vec!["warfarin".to_string()],
            text: String::new(),
            estimated_table_count: 0,
        };

        let texts = [
            "Warfarin dosing should be individualized based on INR monitoring.",
            "The recommended starting dose of warfarin is 2 to 5 mg once daily.",
            "Apixaban does not require routine INR monitoring in most patients.",
            "Store tablets at room temperature away from moisture and heat.",
        ];

        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Chunk::new(&doc, i, t.to_string(), 10))
            .collect()
    }

    fn built_index() -> LexicalIndex {
        let mut index = LexicalIndex::default();
        index.build(corpus());
        index
    }

    #[test]
    fn test_search_before_build_is_an_error() {
        let index = LexicalIndex::default();
        assert!(matches!(
            index.search("warfarin", 5),
            Err(LexicalIndexError::NotBuilt)
        ));
    }

    #[test]
    fn test_matching_chunks_ranked_first() {
        let index = built_index();
        let results = index.search("warfarin dose", 4).unwrap();

        assert!(!results.is_empty());
        // only chunks sharing a query term appear
        for r in &results {
            assert!(
                r.text.to_lowercase().contains("warfarin")
                    || r.text.to_lowercase().contains("dose")
            );
        }
    }

    #[test]
    fn test_no_match_returns_empty() {
        let index = built_index();
        let results = index.search("ribavirin", 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_query_returns_empty() {
        let index = built_index();
        assert!(index.search("", 5).unwrap().is_empty());
        assert!(index.search("   ", 5).unwrap().is_empty());
    }

    #[test]
    fn test_scores_normalized_and_ranks_sequential() {
        let index = built_index();
        let results = index.search("warfarin monitoring", 4).unwrap();

        assert!(results.len() >= 2);
        assert_eq!(results[0].score, 1.0);
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i + 1);
            assert!((0.0..=1.0).contains(&r.score));
            assert_eq!(r.retriever, RetrieverKind::Lexical);
        }
        // descending order
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_single_result_scores_one() {
        let index = built_index();
        let results = index.search("moisture", 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn test_k_limits_results() {
        let index = built_index();
        let results = index.search("warfarin inr dose", 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_rebuild_replaces_state() {
        let mut index = built_index();
        assert_eq!(index.len(), 4);

        index.build(corpus().into_iter().take(2).collect());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_tokenizer_preserves_dosage_strings() {
        let tokens = LexicalIndex::tokenize("Monitor INR; target 2-3 at 5 mg/dL");
        assert!(tokens.contains(&"2-3".to_string()));
        assert!(tokens.contains(&"mg/dl".to_string()));
    }
}
