//! Error types for the idscan-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the idscan library.
#[derive(Error, Debug)]
pub enum IdscanError {
    /// No input file path was given.
    #[error("File path not provided")]
    MissingInput,

    /// The input path does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Neither content sniffing nor the extension identified the file.
    #[error("Unable to determine file type for: {}", .0.display())]
    UnsupportedType(PathBuf),

    /// Image enhancement failed.
    #[error("Image enhancement failed: {0}")]
    Enhancement(String),

    /// Both the primary and the fallback image loader failed.
    #[error("Failed to load image with both decoders (primary: {primary}; fallback: {fallback})")]
    Load { primary: String, fallback: String },

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to rasterize a page.
    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    /// The external renderer could not be started.
    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("No pages found in PDF")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR engine could not be started or its models could not be loaded.
    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The configured engine is not compiled into this build.
    #[error("OCR engine '{0}' is not enabled in this build")]
    EngineDisabled(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Recognized output was not valid UTF-8 text.
    #[error("recognized output is not valid UTF-8 text (invalid byte at offset {offset})")]
    NotText { offset: usize },
}

/// Result type for the idscan library.
pub type Result<T> = std::result::Result<T, IdscanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        assert_eq!(IdscanError::MissingInput.to_string(), "File path not provided");
        assert_eq!(
            IdscanError::FileNotFound(PathBuf::from("/tmp/missing.pdf")).to_string(),
            "File not found: /tmp/missing.pdf"
        );
        assert_eq!(
            IdscanError::from(PdfError::NoPages).to_string(),
            "PDF error: No pages found in PDF"
        );
    }

    #[test]
    fn test_load_failure_mentions_both_loaders() {
        let err = IdscanError::Load {
            primary: "bad header".to_string(),
            fallback: "unknown format".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("bad header"));
        assert!(message.contains("unknown format"));
    }
}
