//! OCR engine adapter and backends.

mod adapter;
#[cfg(feature = "native")]
mod pure_engine;

pub use adapter::{OcrAdapter, OcrBackend};
#[cfg(feature = "native")]
pub use pure_engine::PureOcrBackend;

use serde::{Deserialize, Serialize};

/// A recognized span of text with its position and confidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: [f32; 8]) -> Self {
        Self {
            bbox,
            text: text.into(),
            confidence,
        }
    }

    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized spans in reading order.
    pub boxes: Vec<TextBox>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    pub fn new(boxes: Vec<TextBox>, image_size: (u32, u32)) -> Self {
        Self {
            boxes,
            processing_time_ms: 0,
            image_size,
        }
    }

    /// Span texts joined with `separator`.
    pub fn joined(&self, separator: &str) -> String {
        self.boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right).
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Group by approximate vertical position (within 20 pixels)
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(text: &str, x: f32, y: f32) -> TextBox {
        TextBox::new(text, 0.9, [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0])
    }

    #[test]
    fn test_reading_order() {
        let mut result = OcrResult::new(
            vec![boxed("second", 10.0, 45.0), boxed("right", 200.0, 2.0), boxed("left", 10.0, 5.0)],
            (300, 100),
        );
        result.sort_by_reading_order();

        assert_eq!(result.joined("\n"), "left\nright\nsecond");
    }
}
