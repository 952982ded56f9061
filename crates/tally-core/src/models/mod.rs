//! Data models.

pub mod config;
pub mod transaction;

pub use config::{OcrConfig, PdfConfig, StoreConfig, TallyConfig};
pub use transaction::{
    Category, Direction, ExtractionResult, ManualEntry, TransactionRecord, MAX_DESCRIPTION_LEN,
};
