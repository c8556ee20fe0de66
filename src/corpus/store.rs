//! Chunk collection persistence
//!
//! The chunk collection round-trips losslessly through JSON so indexes can
//! be rebuilt without re-running segmentation.

use crate::corpus::Chunk;
use crate::error::{EvidexError, Result};
use std::path::Path;
use tracing::info;

/// Save a chunk collection as JSON
pub fn save_chunks(chunks: &[Chunk], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| EvidexError::Io {
            source: e,
            context: format!("Failed to create directory {:?}", parent),
        })?;
    }

    let content = serde_json::to_string_pretty(chunks).map_err(|e| EvidexError::Json {
        source: e,
        context: "Failed to serialize chunk collection".to_string(),
    })?;

    std::fs::write(path, content).map_err(|e| EvidexError::Io {
        source: e,
        context: format!("Failed to write chunk file {:?}", path),
    })?;

    info!("Saved {} chunks to {:?}", chunks.len(), path);
    Ok(())
}

/// Load a chunk collection from JSON
pub fn load_chunks(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path).map_err(|e| EvidexError::Io {
        source: e,
        context: format!("Failed to read chunk file {:?}", path),
    })?;

    let chunks: Vec<Chunk> = serde_json::from_str(&content).map_err(|e| EvidexError::Json {
        source: e,
        context: format!("Failed to parse chunk file {:?}", path),
    })?;

    info!("Loaded {} chunks from {:?}", chunks.len(), path);
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use tempfile::TempDir;

    fn sample_chunks() -> Vec<Chunk> {
        let doc = Document {
            id: "nice_apixaban_2021".to_string(),
            source_path: "data/raw/nice_apixaban_2021.pdf".to_string(),
            authority_family: "NICE".to_string(),
            tier: 2,
            year: Some(2021),
            drug_names: vec!["apixaban".to_string()],
            text: String::new(),
            estimated_table_count: 0,
        };

        vec![
            Chunk::new(&doc, 0, "Apixaban is indicated for...".to_string(), 5),
            Chunk::new(&doc, 1, "Dose: 5 mg twice daily.".to_string(), 5),
        ]
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("processed").join("chunks.json");

        let chunks = sample_chunks();
        save_chunks(&chunks, &path).unwrap();

        let restored = load_chunks(&path).unwrap();
        assert_eq!(chunks, restored);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.json");

        let err = load_chunks(&path);
        assert!(matches!(err, Err(EvidexError::Io { .. })));
    }
}
