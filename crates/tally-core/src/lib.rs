//! Core library for turning financial documents into normalized transactions.
//!
//! This crate provides:
//! - Amount normalization and keyword category heuristics
//! - Line-oriented transaction parsing of free text
//! - CSV/XLSX/XLS, PDF (digital text with OCR escalation) and image extractors
//! - A lazily-initialized OCR adapter over PaddleOCR models
//! - Upload dispatch and append-only transaction stores

pub mod dispatch;
pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod parser;
pub mod pdf;
pub mod rules;
pub mod store;

pub use dispatch::{Dispatcher, FileKind, UploadResponse, UploadStatus};
pub use error::{Result, TallyError};
pub use extract::{DocumentExtractor, Extractor, ImageExtractor, TabularExtractor, TabularFormat};
pub use models::{Category, Direction, ExtractionResult, ManualEntry, TallyConfig, TransactionRecord};
pub use ocr::{OcrAdapter, OcrBackend, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrBackend;
pub use parser::TextBlobParser;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use store::{JsonLinesStore, MemoryStore, TransactionFilter, TransactionStore};
