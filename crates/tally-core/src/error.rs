//! Error types for the tally-core library.

use thiserror::Error;

/// Main error type for the tally library.
#[derive(Error, Debug)]
pub enum TallyError {
    /// Upload rejected before any extractor ran.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Tabular input has no usable column layout.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Spreadsheet or CSV container could not be decoded.
    #[error("tabular error: {0}")]
    Tabular(#[from] TabularError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Storage sink error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Record construction error.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons an upload is rejected up front.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No owner identifier was supplied.
    #[error("owner id is required")]
    MissingOwner,

    /// No file payload was supplied.
    #[error("no file uploaded")]
    MissingFile,

    /// The filename's extension is not one we can extract from.
    #[error("unsupported file type: .{0}")]
    UnsupportedExtension(String),
}

/// Errors about the column layout of tabular input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Neither a unified amount column nor debit/credit columns were found.
    #[error("could not identify amount column")]
    NoAmountColumn,

    /// The table has no header row.
    #[error("table has no header row")]
    NoHeader,
}

/// A single row or line that failed to normalize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct RowError {
    /// Zero-based data row index (header excluded).
    pub row: usize,
    /// Human-readable cause.
    pub reason: String,
}

impl RowError {
    pub fn new(row: usize, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

/// Errors decoding CSV/XLSX/XLS containers.
#[derive(Error, Debug)]
pub enum TabularError {
    /// CSV reader failure.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet reader failure.
    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// Workbook contains no worksheet.
    #[error("workbook has no sheets")]
    NoSheets,
}

impl From<calamine::Error> for TabularError {
    fn from(err: calamine::Error) -> Self {
        TabularError::Spreadsheet(err.to_string())
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// No page image could be produced for OCR.
    #[error("failed to rasterize page {page}: {reason}")]
    Rasterize { page: u32, reason: String },

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug, Clone)]
pub enum OcrError {
    /// The backend failed to initialize; cached for the process lifetime.
    #[error("OCR engine could not initialize: {0}")]
    Unavailable(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl OcrError {
    /// Whether this error means the backend itself is missing rather than a
    /// single recognition call failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, OcrError::Unavailable(_) | OcrError::ModelLoad(_))
    }
}

/// Errors raised by the transaction storage sink.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record in the batch belongs to a different owner than the batch.
    #[error("record owner {found} does not match batch owner {expected}")]
    OwnerMismatch { expected: String, found: String },

    /// Record could not be serialized or deserialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The sink refused the batch for another reason.
    #[error("batch rejected: {0}")]
    Rejected(String),
}

/// Errors from the validating transaction factory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Owner identifier is empty.
    #[error("owner id is empty")]
    MissingOwner,

    /// Amount is zero; such rows are noise, not transactions.
    #[error("amount is zero")]
    ZeroAmount,

    /// Amount is negative; direction must carry the sign.
    #[error("amount {0} is negative")]
    NegativeAmount(String),

    /// Direction text is neither credit nor debit.
    #[error("unknown direction: {0}")]
    UnknownDirection(String),
}

/// Result type for the tally library.
pub type Result<T> = std::result::Result<T, TallyError>;
