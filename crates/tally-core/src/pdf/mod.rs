//! PDF processing module.

mod extractor;
mod layout;

pub use extractor::PdfExtractor;
pub use layout::{layout_page_text, split_table_row};

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Page-level access to a loaded PDF.
pub trait PdfProcessor {
    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the embedded text layer of a page (1-indexed).
    fn page_text(&self, page: u32) -> Result<String>;

    /// Render a page as an image at the specified DPI.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;
}
