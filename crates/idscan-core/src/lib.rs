//! Core library for identity-card field extraction.
//!
//! This crate provides:
//! - File type detection and image loading
//! - PDF rasterization (Poppler, or images embedded in the PDF)
//! - Image enhancement and OCR (Tesseract, or pure Rust ONNX models)
//! - Field extraction: 12-digit identifier, name, date of birth, gender, PIN code
//! - JSON-serializable extraction records

pub mod document;
pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use document::{DocumentKind, detect_kind, load_image};
pub use error::{IdscanError, Result};
pub use extraction::{IdentityExtractor, IdentityParser};
pub use models::config::IdscanConfig;
pub use models::record::{ExtractionResult, FailureRecord, Gender, PageOutcome, PageRecord, Report};
pub use ocr::{ImageEnhancer, OcrResult, TextBox, TextRecognizer, create_recognizer};
pub use pipeline::{DocumentPipeline, ProgressEvent};
