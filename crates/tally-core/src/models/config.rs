//! Configuration structures for the ingestion pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::TallyError;

/// Main configuration for the tally pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TallyConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Transaction store configuration.
    pub store: StoreConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory holding `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: Option<PathBuf>,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,

    /// Spans below this confidence are dropped (0.0 keeps everything).
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            keep_unk: false,
            min_confidence: 0.0,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Below this many characters of trimmed digital text the document is
    /// treated as scanned and its pages are sent to OCR.
    pub min_text_length: usize,

    /// DPI hint for page rasterization.
    pub render_dpi: u32,

    /// Maximum pages to OCR (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            render_dpi: 300,
            max_pages: 0,
        }
    }
}

/// Where accepted transactions are appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON-lines file of transactions.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("transactions.jsonl"),
        }
    }
}

impl TallyConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TallyError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            TallyError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), TallyError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| TallyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TallyConfig::default();
        assert_eq!(config.pdf.min_text_length, 50);
        assert!(config.ocr.model_dir.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TallyConfig = serde_json::from_str(r#"{"pdf": {"max_pages": 3}}"#).unwrap();
        assert_eq!(config.pdf.max_pages, 3);
        assert_eq!(config.pdf.min_text_length, 50);
        assert_eq!(config.store.path, PathBuf::from("transactions.jsonl"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = TallyConfig::default();
        config.ocr.min_confidence = 0.4;
        config.save(&path).unwrap();

        let loaded = TallyConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.min_confidence, 0.4);
    }
}
