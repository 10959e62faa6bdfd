//! OCR pipeline: page enhancement and text recognition engines.

mod enhance;
#[cfg(feature = "onnx")]
mod pure_engine;
mod tesseract;

pub use enhance::ImageEnhancer;
#[cfg(feature = "onnx")]
pub use pure_engine::PureOcrEngine;
pub use tesseract::TesseractEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;
use crate::models::config::{OcrConfig, OcrEngineKind};

/// A recognized text region with its coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence reported by the engine (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
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
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized regions; empty for engines that only report plain text.
    pub boxes: Vec<TextBox>,

    /// Full recognized text, lines separated by `\n`.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Result for an engine that returns plain text only.
    pub fn from_text(text: String, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        Self {
            boxes: Vec::new(),
            text,
            processing_time_ms,
            image_size,
        }
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right) and rebuild `text`.
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (_, ay, _, _) = a.rect();
            let (_, by, _, _) = b.rect();

            // Group by approximate vertical position (within 20 pixels)
            let row_a = (ay / 20.0) as i32;
            let row_b = (by / 20.0) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                let (ax, _, _, _) = a.rect();
                let (bx, _, _, _) = b.rect();
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });

        self.text = self
            .boxes
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
    }
}

/// Converts an enhanced page image into recognized text.
pub trait TextRecognizer {
    /// Engine name for logs.
    fn name(&self) -> &'static str;

    /// Recognize the text on one image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

/// Build the recognizer selected in the configuration.
pub fn create_recognizer(config: &OcrConfig) -> Result<Box<dyn TextRecognizer>, OcrError> {
    match config.engine {
        OcrEngineKind::Tesseract => Ok(Box::new(TesseractEngine::from_config(config))),
        #[cfg(feature = "onnx")]
        OcrEngineKind::Onnx => Ok(Box::new(PureOcrEngine::from_dir(
            &config.model_dir,
            config.clone(),
        )?)),
        #[cfg(not(feature = "onnx"))]
        OcrEngineKind::Onnx => Err(OcrError::EngineDisabled("onnx".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(text: &str, x: f32, y: f32) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order() {
        let mut result = OcrResult {
            boxes: vec![
                text_box("12/05/1990", 10.0, 65.0),
                text_box("Doe", 80.0, 22.0),
                text_box("Jane", 10.0, 25.0),
            ],
            text: String::new(),
            processing_time_ms: 0,
            image_size: (200, 100),
        };

        result.sort_by_reading_order();

        assert_eq!(result.text, "Jane\nDoe\n12/05/1990");
    }

    #[test]
    fn test_rect() {
        let b = text_box("x", 5.0, 7.0);
        assert_eq!(b.rect(), (5.0, 7.0, 55.0, 17.0));
    }

    #[test]
    fn test_create_tesseract_recognizer() {
        let recognizer = create_recognizer(&OcrConfig::default()).unwrap();
        assert_eq!(recognizer.name(), "tesseract");
    }
}
