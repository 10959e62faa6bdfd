//! Identity field extraction module.

mod parser;
pub mod rules;

pub use parser::{IdentityParser, OUTPUT_FIELDS};

use crate::error::ExtractionError;
use crate::models::record::{ExtractionResult, FailureRecord, PageOutcome};
use crate::ocr::OcrResult;

/// Trait for identity field extractors.
pub trait IdentityExtractor {
    /// Extract fields from recognized text. Never fails; missing fields are `None`.
    fn extract(&self, text: &str) -> ExtractionResult;

    /// Extract fields from an OCR result.
    fn extract_ocr(&self, ocr_result: &OcrResult) -> ExtractionResult {
        self.extract(&ocr_result.text)
    }

    /// Extract fields from raw recognizer output.
    ///
    /// Output that is not valid UTF-8 yields a failure record instead of fields.
    fn extract_bytes(&self, bytes: &[u8]) -> PageOutcome {
        match std::str::from_utf8(bytes) {
            Ok(text) => PageOutcome::Extracted(self.extract(text)),
            Err(e) => {
                let error = ExtractionError::NotText {
                    offset: e.valid_up_to(),
                };
                tracing::warn!("{}", error);
                PageOutcome::Failed(FailureRecord::new(error))
            }
        }
    }
}
