//! Configuration structures for the document pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for the idscan pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF rasterization configuration.
    pub pdf: PdfConfig,

    /// Image enhancement configuration.
    pub enhance: EnhanceConfig,
}

/// Which OCR engine recognizes page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrEngineKind {
    /// Tesseract, driven through its command-line binary.
    Tesseract,
    /// Pure Rust PaddleOCR models via `pure-onnx-ocr` (Latin script only).
    Onnx,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Engine used for recognition.
    pub engine: OcrEngineKind,

    /// Tesseract language packs, recognized simultaneously.
    pub languages: Vec<String>,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,

    /// Tesseract executable.
    pub tesseract_cmd: PathBuf,

    /// Directory with `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    pub model_dir: PathBuf,

    /// Keep `[UNK]` markers emitted by the ONNX recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: OcrEngineKind::Tesseract,
            languages: vec!["eng".to_string(), "hin".to_string()],
            page_segmentation_mode: 3,
            tesseract_cmd: PathBuf::from("tesseract"),
            model_dir: PathBuf::from("models"),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Language argument in Tesseract's `eng+hin` form.
    pub fn language_arg(&self) -> String {
        if self.languages.is_empty() {
            "eng".to_string()
        } else {
            self.languages.join("+")
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to process (0 = unlimited).
    pub max_pages: u32,

    /// Poppler `pdftoppm` executable.
    pub pdftoppm_cmd: PathBuf,

    /// Use images embedded in the PDF when the renderer is unavailable.
    pub embedded_fallback: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 200,
            max_pages: 0,
            pdftoppm_cmd: PathBuf::from("pdftoppm"),
            embedded_fallback: true,
        }
    }
}

/// Binarization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    /// Local mean threshold over a square window.
    Adaptive,
    /// Global threshold picked from the histogram (Otsu).
    Otsu,
}

/// Image enhancement configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Binarization strategy.
    pub mode: ThresholdMode,

    /// Half-width of the adaptive window (5 gives an 11x11 block).
    pub block_radius: u32,

    /// Constant subtracted from the local mean.
    pub offset: i32,

    /// Save every enhanced page as PNG into this directory.
    pub debug_dir: Option<PathBuf>,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            mode: ThresholdMode::Adaptive,
            block_radius: 5,
            offset: 2,
            debug_dir: None,
        }
    }
}

impl IdscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
