//! Upload validation, extractor selection and batch persistence.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ValidationError;
use crate::extract::{DocumentExtractor, Extractor, ImageExtractor, TabularExtractor, TabularFormat};
use crate::models::PdfConfig;
use crate::ocr::OcrAdapter;
use crate::store::TransactionStore;

/// Supported upload kinds, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Tabular(TabularFormat),
    Pdf,
    Image,
}

impl FileKind {
    /// Classify a filename by its extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ValidationError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(FileKind::Tabular(TabularFormat::Csv)),
            "xlsx" => Ok(FileKind::Tabular(TabularFormat::Xlsx)),
            "xls" => Ok(FileKind::Tabular(TabularFormat::Xls)),
            "pdf" => Ok(FileKind::Pdf),
            "jpg" | "jpeg" | "png" => Ok(FileKind::Image),
            _ => Err(ValidationError::UnsupportedExtension(ext)),
        }
    }
}

/// Overall outcome of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Success,
    #[serde(rename = "Partial Success")]
    PartialSuccess,
    Failed,
}

impl UploadStatus {
    fn from_counts(records: usize, errors: usize) -> Self {
        match (records, errors) {
            (_, 0) => UploadStatus::Success,
            (0, _) => UploadStatus::Failed,
            _ => UploadStatus::PartialSuccess,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Success => "Success",
            UploadStatus::PartialSuccess => "Partial Success",
            UploadStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured response for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: UploadStatus,
    /// Records accepted by the store.
    pub records: usize,
    pub errors: Vec<String>,
    pub details: String,
}

impl UploadResponse {
    pub fn new(filename: &str, records: usize, errors: Vec<String>) -> Self {
        Self {
            message: UploadStatus::from_counts(records, errors.len()),
            records,
            errors,
            details: format!("Parsed {} transactions from {}", records, filename),
        }
    }
}

/// Top-level upload orchestrator.
///
/// Holds references to the process-wide OCR adapter and the store; build one
/// per request or share it, it carries no per-upload state.
pub struct Dispatcher<'a> {
    ocr: &'a OcrAdapter,
    store: &'a dyn TransactionStore,
    pdf: PdfConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(ocr: &'a OcrAdapter, store: &'a dyn TransactionStore) -> Self {
        Self {
            ocr,
            store,
            pdf: PdfConfig::default(),
        }
    }

    pub fn with_pdf_config(mut self, config: PdfConfig) -> Self {
        self.pdf = config;
        self
    }

    /// Validate, extract and persist one upload.
    ///
    /// Only validation failures are returned as errors; everything after
    /// that is reported inside the [`UploadResponse`].
    pub fn process(
        &self,
        filename: &str,
        data: Option<&[u8]>,
        owner_id: Option<&str>,
    ) -> Result<UploadResponse, ValidationError> {
        let owner_id = owner_id
            .filter(|o| !o.trim().is_empty())
            .ok_or(ValidationError::MissingOwner)?;
        let data = data
            .filter(|_| !filename.trim().is_empty())
            .ok_or(ValidationError::MissingFile)?;
        let kind = FileKind::from_filename(filename)?;

        let extractor = self.extractor_for(kind);
        info!("Processing {} ({} bytes) with {} extractor", filename, data.len(), extractor.name());

        let result = extractor.extract(data, owner_id);
        let mut errors = result.errors;

        let accepted = if result.records.is_empty() {
            0
        } else {
            match self.store.insert_batch(owner_id, &result.records) {
                Ok(count) => count,
                Err(e) => {
                    warn!("Batch insert for {} failed: {}", filename, e);
                    errors.push(format!("Failed to save transactions: {}", e));
                    0
                }
            }
        };

        info!("{}: {} records accepted, {} errors", filename, accepted, errors.len());
        Ok(UploadResponse::new(filename, accepted, errors))
    }

    fn extractor_for(&self, kind: FileKind) -> Box<dyn Extractor + '_> {
        match kind {
            FileKind::Tabular(format) => Box::new(TabularExtractor::new(format)),
            FileKind::Pdf => Box::new(DocumentExtractor::new(self.ocr, self.pdf.clone())),
            FileKind::Image => Box::new(ImageExtractor::new(self.ocr)),
        }
    }
}
