//! Token counting shared by the segmenter and integrity checks
//!
//! The whole pipeline must count tokens with one deterministic tokenizer:
//! the overlap budget and the outlier thresholds are calibrated to it, and
//! mixing tokenizers between steps silently breaks both.

use unicode_segmentation::UnicodeSegmentation;

/// Pure token counting over text
pub trait TokenCounter: Send + Sync {
    /// Count tokens in `text`
    fn count(&self, text: &str) -> usize;
}

/// Unicode word-boundary tokenizer (UAX #29)
///
/// Deterministic and model-free. Punctuation-only fragments count as zero
/// tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordTokenizer;

impl TokenCounter for UnicodeWordTokenizer {
    fn count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }
}
