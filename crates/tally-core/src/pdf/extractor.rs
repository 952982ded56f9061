//! PDF text and page-image extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// A loaded PDF with its per-page text layer.
pub struct PdfExtractor {
    document: Document,
    page_texts: Vec<String>,
    text_error: Option<String>,
}

impl PdfExtractor {
    /// Parse a PDF from bytes. Empty-password encryption is removed; any
    /// other encryption is an error.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        // A broken text layer is not fatal: scanned pages can still be OCR'd.
        let (page_texts, text_error) =
            match guard_text_layer(|| pdf_extract::extract_text_from_mem_by_pages(&raw_data)) {
                Ok(pages) => (pages, None),
                Err(e) => {
                    warn!("PDF text layer extraction failed: {}", e);
                    (Vec::new(), Some(e))
                }
            };

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self {
            document,
            page_texts,
            text_error,
        })
    }

    /// Decode the image XObjects placed on a page.
    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        if let Some(resources) = self.get_page_resources(*page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobj_dict))) = self.document.dereference(xobjects) {
                    for (_name, obj_ref) in xobj_dict.iter() {
                        if let Ok((_, obj)) = self.document.dereference(obj_ref) {
                            if let Some(img) = self.try_extract_image_from_object(obj) {
                                images.push(img);
                            }
                        }
                    }
                }
            }
        }

        trace!("Found {} images on page {}", images.len(), page);
        Ok(images)
    }

    /// Every decodable image in the document, in object order.
    fn all_images(&self) -> Vec<DynamicImage> {
        self.document
            .objects
            .values()
            .filter_map(|object| self.try_extract_image_from_object(object))
            .collect()
    }

    fn try_extract_image_from_object(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                // Scanners almost always embed JPEG; the raw stream is the file.
                Some(b"DCTDecode") => {
                    return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Skipping unsupported image filter {:?}", filter_name.map(String::from_utf8_lossy));
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        raw_to_image(&data, width, height, color_space)
    }

    /// Get resources dictionary for a page, handling inheritance.
    fn get_page_resources(&self, node_id: ObjectId) -> Option<lopdf::Dictionary> {
        let Object::Dictionary(dict) = self.document.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = self.document.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_page_resources(*parent_id),
            _ => None,
        }
    }

    /// Page width in points from the (possibly inherited) MediaBox.
    fn page_width_points(&self, page: u32) -> Option<f32> {
        let page_id = *self.document.get_pages().get(&page)?;
        self.get_media_box(page_id).map(|[x0, _, x1, _]| (x1 - x0).abs())
    }

    fn get_media_box(&self, node_id: ObjectId) -> Option<[f32; 4]> {
        let Object::Dictionary(dict) = self.document.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(media_box) = dict.get(b"MediaBox") {
            if let Ok((_, Object::Array(values))) = self.document.dereference(media_box) {
                let values: Vec<f32> = values.iter().filter_map(|v| v.as_float().ok()).collect();
                if let [x0, y0, x1, y1] = values[..] {
                    return Some([x0, y0, x1, y1]);
                }
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.get_media_box(*parent_id),
            _ => None,
        }
    }
}

/// Shrink an image to at most `max_width` pixels wide, keeping its aspect
/// ratio. Smaller images are returned unchanged.
fn downscale_to_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    if max_width == 0 || image.width() <= max_width {
        return image;
    }
    let height = (u64::from(image.height()) * u64::from(max_width) / u64::from(image.width())).max(1) as u32;
    trace!("Downscaling page image {}x{} to {}x{}", image.width(), image.height(), max_width, height);
    image.resize_exact(max_width, height, FilterType::Triangle)
}

/// Run a text-layer extraction, turning both its error and any panic inside
/// the font or stream decoders into an error message.
fn guard_text_layer<F, E>(extract: F) -> std::result::Result<Vec<String>, String>
where
    F: FnOnce() -> std::result::Result<Vec<String>, E>,
    E: std::fmt::Display,
{
    match panic::catch_unwind(AssertUnwindSafe(extract)) {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("text decoder panicked: {}", reason))
        }
    }
}

/// Expand 8-bit RGB or grayscale samples to an RGBA image.
fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize) * (height as usize);

    let rgba: Vec<u8> = match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => data[..pixels * 3]
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 255])
            .collect(),
        b"DeviceGray" | b"G" if data.len() >= pixels => data[..pixels]
            .iter()
            .flat_map(|&g| [g, g, g, 255])
            .collect(),
        _ => {
            trace!(
                "Could not decode image: colorspace={:?}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            return None;
        }
    };

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl PdfProcessor for PdfExtractor {
    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        if let Some(e) = &self.text_error {
            return Err(PdfError::TextExtraction(e.clone()));
        }
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        Ok(self
            .page_texts
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage> {
        let image = match self.page_images(page)?.into_iter().next() {
            Some(first) => first,
            None => {
                // Some producers put page images in shared resources; fall
                // back to the document's n-th image.
                debug!("No XObject images found on page {}, scanning all objects", page);
                self.all_images()
                    .into_iter()
                    .nth((page - 1) as usize)
                    .ok_or_else(|| PdfError::Rasterize {
                        page,
                        reason: "no decodable page image".to_string(),
                    })?
            }
        };

        // Scans are often embedded far above the requested resolution.
        match self.page_width_points(page) {
            Some(width) => Ok(downscale_to_width(image, (width * dpi as f32 / 72.0).round() as u32)),
            None => Ok(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            PdfExtractor::from_bytes(b"definitely not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }

    #[test]
    fn test_text_layer_panic_becomes_error() {
        let err = guard_text_layer(|| -> std::result::Result<Vec<String>, PdfError> { panic!("bad font widths") }).unwrap_err();
        assert!(err.contains("bad font widths"), "{}", err);

        let err = guard_text_layer(|| Err::<Vec<String>, _>(PdfError::NoPages)).unwrap_err();
        assert_eq!(err, PdfError::NoPages.to_string());

        let pages = guard_text_layer(|| Ok::<_, PdfError>(vec!["page one".to_string()])).unwrap();
        assert_eq!(pages, vec!["page one".to_string()]);
    }

    #[test]
    fn test_downscale_to_width() {
        let image = DynamicImage::new_rgba8(400, 200);

        let scaled = downscale_to_width(image.clone(), 100);
        assert_eq!((scaled.width(), scaled.height()), (100, 50));

        let kept = downscale_to_width(image, 1000);
        assert_eq!((kept.width(), kept.height()), (400, 200));
    }

    #[test]
    fn test_raw_gray_image() {
        let img = raw_to_image(&[0, 128, 255, 64], 2, 2, b"DeviceGray").unwrap();
        assert_eq!((img.width(), img.height()), (2, 2));
        assert!(raw_to_image(&[0, 1], 2, 2, b"DeviceGray").is_none());
        assert!(raw_to_image(&[0; 12], 2, 2, b"DeviceCMYK").is_none());
    }
}
