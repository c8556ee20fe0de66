//! Score normalization and weighted fusion
//!
//! BM25 scores are unbounded while cosine similarities live in [0, 1], so
//! each candidate batch is min-max normalized before the weighted merge.

use crate::corpus::{RetrievedChunk, RetrieverKind};
use std::collections::HashMap;

/// Min-max normalize scores in place to [0, 1]
///
/// A uniform batch (max == min) maps every score to 1.0 rather than
/// dividing by zero; an empty batch is a no-op.
pub fn normalize_scores(results: &mut [RetrievedChunk]) {
    let Some(first) = results.first() else {
        return;
    };

    let mut min = first.score;
    let mut max = first.score;
    for r in results.iter() {
        min = min.min(r.score);
        max = max.max(r.score);
    }

    let range = max - min;
    for r in results.iter_mut() {
        r.score = if range > 0.0 { (r.score - min) / range } else { 1.0 };
    }
}

struct FusionEntry {
    chunk: RetrievedChunk,
    semantic: Option<f32>,
    lexical: Option<f32>,
}

/// Merge two normalized candidate batches into one ranked hybrid list
///
/// A chunk found by both paths scores
/// `vector_weight * semantic + (1 - vector_weight) * lexical`. A chunk
/// found by only one path keeps its full normalized score: omission from
/// the other index's candidate pool is a depth cutoff, not evidence of
/// irrelevance, so single-path hits are not down-weighted.
pub fn merge_weighted(
    semantic: Vec<RetrievedChunk>,
    lexical: Vec<RetrievedChunk>,
    vector_weight: f32,
    k: usize,
) -> Vec<RetrievedChunk> {
    let mut entries: HashMap<String, FusionEntry> = HashMap::new();

    for r in semantic {
        let score = r.score;
        entries
            .entry(r.chunk_id.clone())
            .or_insert(FusionEntry {
                chunk: r,
                semantic: None,
                lexical: None,
            })
            .semantic = Some(score);
    }

    for r in lexical {
        let score = r.score;
        entries
            .entry(r.chunk_id.clone())
            .or_insert(FusionEntry {
                chunk: r,
                semantic: None,
                lexical: None,
            })
            .lexical = Some(score);
    }

    let mut merged: Vec<RetrievedChunk> = entries
        .into_values()
        .map(|entry| {
            let score = match (entry.semantic, entry.lexical) {
                (Some(s), Some(l)) => vector_weight * s + (1.0 - vector_weight) * l,
                (Some(s), None) => s,
                (None, Some(l)) => l,
                (None, None) => 0.0,
            };
            let mut chunk = entry.chunk;
            chunk.score = score;
            chunk.retriever = RetrieverKind::Hybrid;
            chunk
        })
        .collect();

    // chunk_id tie-break keeps equal-score orderings deterministic
    merged.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.chunk_id.cmp(&b.chunk_id))
    });
    merged.truncate(k);

    for (i, r) in merged.iter_mut().enumerate() {
        r.rank = i + 1;
    }

    merged
}
