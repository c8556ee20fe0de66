//! Chunk integrity diagnostics
//!
//! Outlier detection on chunk token counts and mid-table split detection.
//! Warnings are advisory; segmentation output is never altered by them.

use crate::corpus::{Chunk, ChunkWarning, Severity, WarningCategory};

/// Chunks below this token count are flagged as undersized
pub const MIN_CHUNK_TOKENS: usize = 50;
/// Chunks above this token count are flagged as oversized
pub const MAX_CHUNK_TOKENS: usize = 800;

// Severity bands for undersized chunks: first band whose lower bound the
// token count reaches wins.
const TOO_SMALL_BANDS: &[(usize, Severity)] = &[
    (40, Severity::Low),
    (20, Severity::Medium),
    (0, Severity::High),
];

// Severity bands for oversized chunks: first band whose upper bound the
// token count stays under wins.
const TOO_LARGE_BANDS: &[(usize, Severity)] = &[
    (900, Severity::Low),
    (1200, Severity::Medium),
    (usize::MAX, Severity::High),
];

/// Flag a chunk whose token count falls outside the expected range
pub fn detect_outlier(chunk: &Chunk) -> Option<ChunkWarning> {
    if chunk.token_count < MIN_CHUNK_TOKENS {
        let severity = TOO_SMALL_BANDS
            .iter()
            .find(|(min, _)| chunk.token_count >= *min)
            .map(|(_, sev)| *sev)
            .unwrap_or(Severity::High);

        return Some(ChunkWarning {
            document_id: chunk.document_id.clone(),
            chunk_id: chunk.id.clone(),
            category: WarningCategory::TooSmall,
            message: format!(
                "Chunk contains only {} tokens (threshold: {})",
                chunk.token_count, MIN_CHUNK_TOKENS
            ),
            token_count: chunk.token_count,
            chunk_index: chunk.index,
            severity,
        });
    }

    if chunk.token_count > MAX_CHUNK_TOKENS {
        let severity = TOO_LARGE_BANDS
            .iter()
            .find(|(max, _)| chunk.token_count <= *max)
            .map(|(_, sev)| *sev)
            .unwrap_or(Severity::High);

        return Some(ChunkWarning {
            document_id: chunk.document_id.clone(),
            chunk_id: chunk.id.clone(),
            category: WarningCategory::TooLarge,
            message: format!(
                "Chunk contains {} tokens (threshold: {})",
                chunk.token_count, MAX_CHUNK_TOKENS
            ),
            token_count: chunk.token_count,
            chunk_index: chunk.index,
            severity,
        });
    }

    None
}

/// Heuristic for a chunk that opens mid-table: the first line is a table
/// row but no header separator row appears among the first few lines
pub fn detect_table_split(text: &str) -> bool {
    let mut lines = text.trim_start().lines();
    let first = match lines.next() {
        Some(line) => line.trim(),
        None => return false,
    };

    if !first.starts_with('|') {
        return false;
    }

    let mut head = vec![first];
    head.extend(lines.take(4));
    !head
        .iter()
        .any(|line| line.contains("|---") || line.contains("| ---"))
}

/// Flag a chunk that appears to begin inside a table body
pub fn detect_table_split_warning(chunk: &Chunk) -> Option<ChunkWarning> {
    if !detect_table_split(&chunk.text) {
        return None;
    }

    Some(ChunkWarning {
        document_id: chunk.document_id.clone(),
        chunk_id: chunk.id.clone(),
        category: WarningCategory::TableSplit,
        message: "Chunk starts with a table row but no table header found \
                  in the first lines (possible mid-table split)"
            .to_string(),
        token_count: chunk.token_count,
        chunk_index: chunk.index,
        severity: Severity::Medium,
    })
}
