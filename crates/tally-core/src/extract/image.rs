//! Receipt and screenshot extraction straight through OCR.

use tracing::{debug, warn};

use super::Extractor;
use crate::models::ExtractionResult;
use crate::ocr::OcrAdapter;
use crate::parser::TextBlobParser;

const OCR_UNAVAILABLE: &str = "OCR engine could not initialize";

/// Runs JPEG/PNG uploads through OCR, one recognized span per line.
pub struct ImageExtractor<'a> {
    ocr: &'a OcrAdapter,
    parser: TextBlobParser,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(ocr: &'a OcrAdapter) -> Self {
        Self {
            ocr,
            parser: TextBlobParser::new(),
        }
    }
}

impl Extractor for ImageExtractor<'_> {
    fn name(&self) -> &'static str {
        "image"
    }

    fn extract(&self, data: &[u8], owner_id: &str) -> ExtractionResult {
        if !self.ocr.is_available() {
            return ExtractionResult::failed(OCR_UNAVAILABLE);
        }

        let image = match ::image::load_from_memory(data) {
            Ok(image) => image,
            Err(e) => {
                warn!("Could not decode image: {}", e);
                return ExtractionResult::failed(format!("Image Error: {}", e));
            }
        };

        match self.ocr.recognize(&image) {
            Ok(result) => {
                debug!("Image OCR produced {} spans", result.boxes.len());
                self.parser.parse(&result.joined("\n"), owner_id)
            }
            Err(e) if e.is_unavailable() => ExtractionResult::failed(OCR_UNAVAILABLE),
            Err(e) => {
                warn!("Image OCR failed: {}", e);
                ExtractionResult::failed(format!("Image Error: {}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use crate::models::Category;
    use crate::ocr::{OcrBackend, OcrResult, TextBox};
    use ::image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    struct ReceiptBackend;

    impl OcrBackend for ReceiptBackend {
        fn name(&self) -> &str {
            "receipt"
        }

        fn recognize(&mut self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
            let boxes = vec![
                TextBox::new("AMAZON.IN", 0.95, [0.0; 8]),
                TextBox::new("12/03/2026 Order total ₹1,499.00", 0.91, [0.0; 8]),
            ];
            Ok(OcrResult::new(boxes, (image.width(), image.height())))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(16, 16)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_unavailable_backend() {
        let ocr = OcrAdapter::unavailable("no models");
        let result = ImageExtractor::new(&ocr).extract(&png_bytes(), "u1");

        assert!(result.records.is_empty());
        assert_eq!(result.errors, vec![OCR_UNAVAILABLE.to_string()]);
    }

    #[test]
    fn test_receipt_lines_parsed() {
        let ocr = OcrAdapter::with_backend(ReceiptBackend);
        let result = ImageExtractor::new(&ocr).extract(&png_bytes(), "u1");

        assert!(result.errors.is_empty());
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].description(), "Order total");
        // Category comes from the line carrying the amount.
        assert_eq!(result.records[0].category(), &Category::Other);
    }

    #[test]
    fn test_undecodable_image() {
        let ocr = OcrAdapter::with_backend(ReceiptBackend);
        let result = ImageExtractor::new(&ocr).extract(b"not an image", "u1");

        assert!(result.records.is_empty());
        assert!(result.errors[0].starts_with("Image Error"));
    }
}
