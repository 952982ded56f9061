//! PDF extraction: digital text first, OCR when the text layer is too thin.

use tracing::{debug, info, warn};

use super::Extractor;
use crate::models::{ExtractionResult, PdfConfig};
use crate::ocr::OcrAdapter;
use crate::parser::TextBlobParser;
use crate::pdf::{layout_page_text, PdfExtractor, PdfProcessor};

/// Two-stage PDF extractor.
///
/// Table rows and free text from every page are collected into one blob. If
/// the trimmed blob is shorter than [`PdfConfig::min_text_length`] the
/// document is assumed to be scanned, and each page image is sent through
/// the OCR adapter. Whatever text was gathered is then parsed line by line.
pub struct DocumentExtractor<'a> {
    ocr: &'a OcrAdapter,
    config: PdfConfig,
    parser: TextBlobParser,
}

impl<'a> DocumentExtractor<'a> {
    pub fn new(ocr: &'a OcrAdapter, config: PdfConfig) -> Self {
        Self {
            ocr,
            config,
            parser: TextBlobParser::new(),
        }
    }

    /// Run both stages against an already loaded document.
    pub fn extract_from(&self, pdf: &dyn PdfProcessor, owner_id: &str) -> ExtractionResult {
        let mut stage = ExtractionResult::new();
        let mut blob = self.digital_text(pdf, &mut stage);
        debug!("Extracted {} chars from the PDF text layer", blob.len());

        if blob.trim().chars().count() < self.config.min_text_length {
            info!("Low text count, escalating PDF to OCR");
            self.ocr_text(pdf, &mut blob, &mut stage);
        }

        stage.merge(self.parser.parse(&blob, owner_id));
        stage
    }

    fn digital_text(&self, pdf: &dyn PdfProcessor, stage: &mut ExtractionResult) -> String {
        let mut blob = String::new();
        for page in 1..=pdf.page_count() {
            match pdf.page_text(page) {
                Ok(text) => {
                    let text = layout_page_text(&text);
                    if !text.trim().is_empty() {
                        blob.push_str(&text);
                        blob.push('\n');
                    }
                }
                Err(e) => {
                    // Text layer failures are document-wide; OCR may still work.
                    warn!("PDF text extraction failed: {}", e);
                    stage.push_error(format!("PDF Error: {}", e));
                    break;
                }
            }
        }
        blob
    }

    fn ocr_text(&self, pdf: &dyn PdfProcessor, blob: &mut String, stage: &mut ExtractionResult) {
        let pages = match self.config.max_pages {
            0 => pdf.page_count(),
            max => pdf.page_count().min(max as u32),
        };

        for page in 1..=pages {
            let image = match pdf.render_page(page, self.config.render_dpi) {
                Ok(image) => image,
                Err(e) => {
                    warn!("Skipping OCR for page {}: {}", page, e);
                    stage.push_error(format!("OCR skipped for page {}: {}", page, e));
                    continue;
                }
            };

            match self.ocr.recognize(&image) {
                Ok(result) => {
                    debug!("Page {}: {} OCR spans", page, result.boxes.len());
                    blob.push_str(&result.joined(" "));
                    blob.push('\n');
                }
                Err(e) if e.is_unavailable() => {
                    warn!("OCR unavailable, skipping remaining pages: {}", e);
                    stage.push_error(format!("OCR processing failed: {}", e));
                    break;
                }
                Err(e) => {
                    warn!("OCR failed on page {}: {}", page, e);
                    stage.push_error(format!("OCR failed on page {}: {}", page, e));
                }
            }
        }
    }
}

impl Extractor for DocumentExtractor<'_> {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extract(&self, data: &[u8], owner_id: &str) -> ExtractionResult {
        match PdfExtractor::from_bytes(data) {
            Ok(pdf) => self.extract_from(&pdf, owner_id),
            Err(e) => {
                warn!("Could not open PDF: {}", e);
                ExtractionResult::failed(format!("PDF Error: {}", e))
            }
        }
    }
}
