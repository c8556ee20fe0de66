//! Lexical and semantic indexes over the chunk collection

mod builder;
mod lexical;
pub(crate) mod semantic;

pub use builder::IndexBuilder;
pub use lexical::{LexicalIndex, LexicalIndexError, DEFAULT_B, DEFAULT_K1};
pub use semantic::{SemanticIndex, SemanticIndexError};
