//! Recursive boundary-hierarchy text splitting
//!
//! Splits text on the coarsest boundary present (paragraph break, line
//! break, sentence break, space, then hard character cuts) and merges the
//! fragments back together under a token budget with an inclusive token
//! overlap across consecutive chunks.

use crate::tokenize::TokenCounter;
use std::collections::VecDeque;
use std::sync::Arc;

/// Boundary hierarchy tried in order; the empty separator is the terminal
/// character-level fallback and must come last.
pub fn default_separators() -> Vec<String> {
    vec![
        "\n\n".to_string(),
        "\n".to_string(),
        ". ".to_string(),
        " ".to_string(),
        String::new(),
    ]
}

/// Token-budgeted recursive splitter
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
    tokenizer: Arc<dyn TokenCounter>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, tokenizer: Arc<dyn TokenCounter>) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: default_separators(),
            tokenizer,
        }
    }

    /// Split `text` into pieces at most `chunk_size` tokens where a boundary
    /// under the budget exists; a fragment that cannot be reduced even at
    /// character level is emitted oversized rather than dropped.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, rest) = Self::pick_separator(text, separators);
        let fragments = Self::split_keeping_separator(text, separator);

        let mut finals = Vec::new();
        let mut pending: Vec<String> = Vec::new();

        for fragment in fragments {
            if self.tokenizer.count(&fragment) < self.chunk_size.max(1) {
                pending.push(fragment);
            } else {
                if !pending.is_empty() {
                    finals.extend(self.merge(std::mem::take(&mut pending)));
                }
                if rest.is_empty() {
                    // character level reached, nothing finer to try
                    finals.push(fragment);
                } else {
                    finals.extend(self.split_recursive(&fragment, rest));
                }
            }
        }

        if !pending.is_empty() {
            finals.extend(self.merge(pending));
        }

        finals
    }

    /// First separator occurring in the text wins; the empty separator
    /// always matches
    fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep.as_str()) {
                return (sep.as_str(), &separators[i + 1..]);
            }
        }
        ("", &[])
    }

    /// Split on `separator`, attaching the separator to the front of the
    /// following fragment so that concatenation reconstructs the text
    fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
        if separator.is_empty() {
            return text.chars().map(|c| c.to_string()).collect();
        }

        let mut fragments = Vec::new();
        for (i, part) in text.split(separator).enumerate() {
            let fragment = if i == 0 {
                part.to_string()
            } else {
                format!("{}{}", separator, part)
            };
            if !fragment.is_empty() {
                fragments.push(fragment);
            }
        }
        fragments
    }

    /// Greedily pack fragments into chunks under the token budget. When a
    /// chunk fills up it is emitted, and the window slides back until at
    /// most `chunk_overlap` tokens remain; those tokens open the next chunk
    /// as well, making the overlap inclusive.
    fn merge(&self, fragments: Vec<String>) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: VecDeque<(String, usize)> = VecDeque::new();
        let mut total = 0usize;

        for fragment in fragments {
            let len = self.tokenizer.count(&fragment);

            if total + len > self.chunk_size && !window.is_empty() {
                let doc = Self::join(&window);
                if !doc.is_empty() {
                    docs.push(doc);
                }

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some((_, head_len)) => total -= head_len,
                        None => break,
                    }
                }
            }

            total += len;
            window.push_back((fragment, len));
        }

        let doc = Self::join(&window);
        if !doc.is_empty() {
            docs.push(doc);
        }

        docs
    }

    fn join(window: &VecDeque<(String, usize)>) -> String {
        let mut out = String::new();
        for (fragment, _) in window {
            out.push_str(fragment);
        }
        out.trim().to_string()
    }
}
