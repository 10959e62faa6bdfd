//! Tesseract OCR engine driven through the `tesseract` command-line binary.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrResult, TextRecognizer};

/// Tesseract engine recognizing several language packs at once (e.g. `eng+hin`).
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    languages: String,
    page_segmentation_mode: u8,
}

impl TesseractEngine {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            command: config.tesseract_cmd.clone(),
            languages: config.language_arg(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }

    /// Language argument passed with `-l`.
    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Check whether the Tesseract binary can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .is_ok()
    }
}

impl TextRecognizer for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage("image has no pixels".to_string()));
        }

        let temp_dir = tempfile::tempdir()
            .map_err(|e| OcrError::Recognition(format!("failed to create temp dir: {}", e)))?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| OcrError::InvalidImage(format!("failed to write page image: {}", e)))?;

        debug!(
            "Running {} on {}x{} image (lang={}, psm={})",
            self.command.display(),
            width,
            height,
            self.languages,
            self.page_segmentation_mode
        );

        let output = Command::new(&self.command)
            .arg(&image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.languages)
            .arg("--psm")
            .arg(self.page_segmentation_mode.to_string())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => OcrError::EngineUnavailable(format!(
                    "{} not found. Make sure tesseract-ocr is installed",
                    self.command.display()
                )),
                _ => OcrError::EngineUnavailable(format!(
                    "failed to run {}: {}",
                    self.command.display(),
                    e
                )),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(OcrError::Recognition(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout).map_err(|e| {
            OcrError::Recognition(format!("tesseract produced non-UTF-8 output: {}", e))
        })?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "OCR complete: {} characters in {}ms",
            text.len(),
            processing_time_ms
        );

        Ok(OcrResult::from_text(text, (width, height), processing_time_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    #[test]
    fn test_language_argument() {
        let engine = TesseractEngine::from_config(&OcrConfig::default());
        assert_eq!(engine.languages(), "eng+hin");
    }

    #[test]
    fn test_missing_binary_is_engine_unavailable() {
        let config = OcrConfig {
            tesseract_cmd: PathBuf::from("/nonexistent/tesseract-binary"),
            ..OcrConfig::default()
        };
        let engine = TesseractEngine::from_config(&config);
        assert!(!engine.is_available());

        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, image::Luma([255])));
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, OcrError::EngineUnavailable(_)));
    }

    #[test]
    fn test_empty_image_rejected() {
        let engine = TesseractEngine::from_config(&OcrConfig::default());
        let image = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            engine.recognize(&image),
            Err(OcrError::InvalidImage(_))
        ));
    }
}
