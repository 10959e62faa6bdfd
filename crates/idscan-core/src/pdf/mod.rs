//! PDF rasterization module.

mod extractor;
mod render;

pub use extractor::EmbeddedImageExtractor;
pub use render::{PopplerRenderer, pdfinfo_page_count};

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Turns PDF pages into images, one page at a time.
pub trait PageRenderer {
    /// Renderer name for logs.
    fn name(&self) -> &'static str;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Rasterize a page (1-indexed).
    fn render_page(&self, page: u32) -> Result<DynamicImage>;
}

/// Pick a renderer for a PDF file.
///
/// `pdftoppm` is preferred. When it cannot be started, the images embedded in
/// the document are used instead, if enabled. A document with no pages is an
/// error.
pub fn open_renderer(path: &Path, config: &PdfConfig) -> Result<Box<dyn PageRenderer>> {
    let data = std::fs::read(path).map_err(|e| PdfError::Parse(e.to_string()))?;
    let embedded = EmbeddedImageExtractor::load(&data);

    let renderer: Box<dyn PageRenderer> = if PopplerRenderer::is_available(&config.pdftoppm_cmd) {
        let page_count = match &embedded {
            Ok(extractor) => extractor.page_count(),
            Err(e) => {
                warn!("lopdf could not read {}: {}. Asking pdfinfo.", path.display(), e);
                pdfinfo_page_count(&config.pdftoppm_cmd, path)?
            }
        };
        Box::new(PopplerRenderer::new(
            config.pdftoppm_cmd.clone(),
            path,
            config.render_dpi,
            page_count,
        ))
    } else if config.embedded_fallback {
        warn!(
            "{} is not available, using images embedded in the PDF",
            config.pdftoppm_cmd.display()
        );
        Box::new(embedded?)
    } else {
        return Err(PdfError::RendererUnavailable(format!(
            "{} not found. Make sure poppler-utils is installed",
            config.pdftoppm_cmd.display()
        )));
    };

    let page_count = renderer.page_count();
    if page_count == 0 {
        return Err(PdfError::NoPages);
    }

    info!(
        "Opened {} ({} pages) with {} renderer",
        path.display(),
        page_count,
        renderer.name()
    );
    Ok(renderer)
}

/// Pages to process, honoring the `max_pages` limit (0 = unlimited).
pub fn pages_to_process(page_count: u32, config: &PdfConfig) -> std::ops::RangeInclusive<u32> {
    let last = if config.max_pages == 0 {
        page_count
    } else {
        page_count.min(config.max_pages)
    };
    if last < page_count {
        debug!("Limiting processing to {} of {} pages", last, page_count);
    }
    1..=last
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn without_poppler() -> PdfConfig {
        PdfConfig {
            pdftoppm_cmd: PathBuf::from("/nonexistent/pdftoppm"),
            ..PdfConfig::default()
        }
    }

    #[test]
    fn test_embedded_fallback_when_poppler_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.pdf");
        std::fs::write(&path, test_pdf::with_gray_pages(&[(10, 5), (5, 10)])).unwrap();

        let renderer = open_renderer(&path, &without_poppler()).unwrap();
        assert_eq!(renderer.name(), "embedded");
        assert_eq!(renderer.page_count(), 2);
        assert_eq!(renderer.render_page(2).unwrap().width(), 5);
    }

    #[test]
    fn test_no_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, test_pdf::with_gray_pages(&[])).unwrap();

        let err = open_renderer(&path, &without_poppler()).err().unwrap();
        assert_eq!(err.to_string(), "No pages found in PDF");
    }

    #[test]
    fn test_no_renderer_available() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.pdf");
        std::fs::write(&path, test_pdf::with_gray_pages(&[(4, 4)])).unwrap();

        let config = PdfConfig {
            embedded_fallback: false,
            ..without_poppler()
        };
        let err = open_renderer(&path, &config).err().unwrap();
        assert!(matches!(err, PdfError::RendererUnavailable(_)));
    }

    #[test]
    fn test_page_limit() {
        let mut config = PdfConfig::default();
        assert_eq!(pages_to_process(3, &config).count(), 3);
        config.max_pages = 2;
        assert_eq!(pages_to_process(3, &config).collect::<Vec<_>>(), vec![1, 2]);
        config.max_pages = 10;
        assert_eq!(pages_to_process(3, &config).count(), 3);
        config.max_pages = u32::MAX;
        assert_eq!(pages_to_process(3, &config).count(), 3);
    }
}
