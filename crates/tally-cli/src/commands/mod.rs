//! Subcommands and the pieces they share.

pub mod add;
pub mod batch;
pub mod config;
pub mod import;
pub mod list;

use std::path::Path;

use tally_core::{JsonLinesStore, OcrAdapter, TallyConfig};

/// Load the config given by `--config`, else the default file if it exists,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TallyConfig> {
    if let Some(path) = config_path {
        return Ok(TallyConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(TallyConfig::from_file(&default_path)?)
    } else {
        Ok(TallyConfig::default())
    }
}

/// The transaction file from `--store`, or the configured one.
pub fn open_store(config: &TallyConfig, store: Option<&Path>) -> JsonLinesStore {
    JsonLinesStore::new(store.unwrap_or(config.store.path.as_path()))
}

/// One OCR adapter per process; models load on first use.
pub fn ocr_adapter(config: &TallyConfig) -> OcrAdapter {
    OcrAdapter::from_config(&config.ocr)
}
