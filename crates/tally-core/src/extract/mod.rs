//! Format-specific extractors turning raw upload bytes into transactions.

mod document;
mod image;
mod tabular;

pub use document::DocumentExtractor;
pub use image::ImageExtractor;
pub use tabular::{TabularExtractor, TabularFormat};

use crate::models::ExtractionResult;

/// Turns the bytes of one uploaded document into candidate records.
///
/// Extractors never fail as a whole: container decode errors, missing
/// backends and bad rows all end up in [`ExtractionResult::errors`].
pub trait Extractor {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Extract records owned by `owner_id` from `data`.
    fn extract(&self, data: &[u8], owner_id: &str) -> ExtractionResult;
}
