//! Semantic document segmentation
//!
//! Turns a parsed regulatory document into a sequence of token-bounded
//! chunks. Overlap widens for table-heavy documents so that rows keep
//! their header context, and every chunk is screened by the integrity
//! checks in [`integrity`].

mod integrity;
mod splitter;

pub use integrity::{
    detect_outlier, detect_table_split, detect_table_split_warning, MAX_CHUNK_TOKENS,
    MIN_CHUNK_TOKENS,
};
pub use splitter::{default_separators, RecursiveSplitter};

use crate::config::ChunkingConfig;
use crate::corpus::{Chunk, ChunkWarning, Document, Severity, WarningCategory};
use crate::tokenize::{TokenCounter, UnicodeWordTokenizer};
use std::sync::Arc;
use tracing::{debug, warn};

/// Document segmenter
///
/// Stateless across documents; the same chunker instance can process an
/// entire corpus. Segmentation never fails: malformed or empty input yields
/// zero chunks plus a warning.
pub struct SemanticChunker {
    config: ChunkingConfig,
    tokenizer: Arc<dyn TokenCounter>,
}

impl SemanticChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self::with_tokenizer(config, Arc::new(UnicodeWordTokenizer))
    }

    pub fn with_tokenizer(config: ChunkingConfig, tokenizer: Arc<dyn TokenCounter>) -> Self {
        Self { config, tokenizer }
    }

    /// Overlap width for a document: table-heavy documents get the wider
    /// overlap so rows near a chunk boundary survive with header context
    pub fn overlap_for(&self, document: &Document) -> usize {
        if document.estimated_table_count > self.config.table_heavy_threshold {
            self.config.table_overlap
        } else {
            self.config.base_overlap
        }
    }

    /// Segment a document into chunks plus integrity warnings
    pub fn chunk_document(&self, document: &Document) -> (Vec<Chunk>, Vec<ChunkWarning>) {
        if document.text.trim().is_empty() {
            warn!("Document {} has no text to segment", document.id);
            let warning = ChunkWarning {
                document_id: document.id.clone(),
                chunk_id: Chunk::id_for(&document.id, 0),
                category: WarningCategory::EmptyDocument,
                message: format!("Document {} produced no chunks (empty text)", document.id),
                token_count: 0,
                chunk_index: 0,
                severity: Severity::Medium,
            };
            return (Vec::new(), vec![warning]);
        }

        let overlap = self.overlap_for(document);
        let splitter =
            RecursiveSplitter::new(self.config.chunk_size, overlap, Arc::clone(&self.tokenizer));

        let mut chunks = Vec::new();
        let mut warnings = Vec::new();

        for (index, text) in splitter.split(&document.text).into_iter().enumerate() {
            let token_count = self.tokenizer.count(&text);
            let chunk = Chunk::new(document, index, text, token_count);

            if let Some(warning) = detect_outlier(&chunk) {
                warnings.push(warning);
            }
            if let Some(warning) = detect_table_split_warning(&chunk) {
                warnings.push(warning);
            }

            chunks.push(chunk);
        }

        debug!(
            "Segmented document {} into {} chunks ({} warnings, overlap {})",
            document.id,
            chunks.len(),
            warnings.len(),
            overlap
        );

        (chunks, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str, estimated_table_count: usize) -> Document {
        Document {
            id: "fda_apixaban_2022".to_string(),
            source_path: "data/raw/fda_apixaban_2022.pdf".to_string(),
            authority_family: "FDA".to_string(),
            tier: 1,
            year: Some(2022),
            drug_names: vec!["apixaban".to_string()],
            text: text.to_string(),
            estimated_table_count,
        }
    }

    fn chunker() -> SemanticChunker {
        SemanticChunker::new(ChunkingConfig::default())
    }

    #[test]
    fn test_table_heavy_document_widens_overlap() {
        let c = chunker();
        assert_eq!(c.overlap_for(&document("text", 250)), 100);
        assert_eq!(c.overlap_for(&document("text", 50)), 50);
        // threshold itself is not table-heavy
        assert_eq!(c.overlap_for(&document("text", 200)), 50);
    }

    #[test]
    fn test_empty_document_yields_warning_not_chunks() {
        let (chunks, warnings) = chunker().chunk_document(&document("   \n  ", 0));
        assert!(chunks.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].category, WarningCategory::EmptyDocument);
        assert_eq!(warnings[0].document_id, "fda_apixaban_2022");
    }

    #[test]
    fn test_chunk_ids_are_sequential_and_unique() {
        let paragraph = "Apixaban is a direct factor Xa inhibitor indicated to reduce \
                         the risk of stroke and systemic embolism in patients with \
                         nonvalvular atrial fibrillation. "
            .repeat(40);
        let (chunks, _) = chunker().chunk_document(&document(&paragraph, 0));

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.id, Chunk::id_for("fda_apixaban_2022", i));
        }
    }

    #[test]
    fn test_chunks_respect_token_budget() {
        let paragraph = "The recommended dose of apixaban is 5 mg taken orally twice daily. "
            .repeat(200);
        let (chunks, _) = chunker().chunk_document(&document(&paragraph, 0));

        for chunk in &chunks {
            assert!(
                chunk.token_count <= 512,
                "chunk {} has {} tokens",
                chunk.id,
                chunk.token_count
            );
        }
    }

    #[test]
    fn test_short_document_flags_small_chunk() {
        let (chunks, warnings) = chunker().chunk_document(&document("Apixaban 5 mg.", 0));
        assert_eq!(chunks.len(), 1);
        assert!(warnings
            .iter()
            .any(|w| w.category == WarningCategory::TooSmall));
    }

    #[test]
    fn test_chunks_inherit_document_metadata() {
        let (chunks, _) = chunker().chunk_document(&document(
            "Dosage and administration guidance for apixaban in adults.",
            0,
        ));
        for chunk in &chunks {
            assert_eq!(chunk.authority_family, "FDA");
            assert_eq!(chunk.tier, 1);
            assert_eq!(chunk.year, Some(2022));
        }
    }
}
