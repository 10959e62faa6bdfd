//! End-to-end processing of one input file into a report.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::document::{self, DocumentKind};
use crate::error::{IdscanError, Result};
use crate::extraction::{IdentityExtractor, IdentityParser};
use crate::models::config::IdscanConfig;
use crate::models::record::{ExtractionResult, FailureRecord, PageRecord, Report};
use crate::ocr::{self, ImageEnhancer, TextRecognizer};
use crate::pdf;

/// Pipeline stage reported to the progress callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Input type detected.
    Opened { kind: DocumentKind, pages: u32 },
    /// A PDF page is being rasterized.
    Rendering { page: u32 },
    /// An image or page is being binarized.
    Enhancing { page: u32 },
    /// OCR is running.
    Recognizing { page: u32 },
    /// Fields are being extracted.
    Extracting { page: u32 },
    /// All pages were processed.
    Finished,
}

type ProgressCallback = Box<dyn Fn(&ProgressEvent)>;

/// Load, rasterize, enhance, recognize and extract.
pub struct DocumentPipeline {
    config: IdscanConfig,
    parser: IdentityParser,
    enhancer: ImageEnhancer,
    recognizer: Option<Box<dyn TextRecognizer>>,
    progress: Option<ProgressCallback>,
}

impl DocumentPipeline {
    /// Create a pipeline; the OCR engine is built from `config.ocr` when first needed.
    pub fn new(config: IdscanConfig) -> Self {
        Self {
            enhancer: ImageEnhancer::from_config(&config.enhance),
            parser: IdentityParser::new(),
            recognizer: None,
            progress: None,
            config,
        }
    }

    /// Use the given recognizer instead of the configured engine.
    pub fn with_recognizer(mut self, recognizer: Box<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Receive a callback for every pipeline stage.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ProgressEvent) + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &IdscanConfig {
        &self.config
    }

    /// Process an input file. Every fault is reported in the returned report.
    pub fn run(&self, input: Option<&Path>) -> Report {
        let result = input
            .ok_or(IdscanError::MissingInput)
            .and_then(|path| self.process_file(path));

        self.report(result)
    }

    /// Run only the field extractor over a file holding recognized text.
    pub fn run_text(&self, input: Option<&Path>) -> Report {
        let result = input
            .ok_or(IdscanError::MissingInput)
            .and_then(|path| self.process_text_file(path));

        self.report(result)
    }

    fn report(&self, result: Result<Report>) -> Report {
        self.notify(ProgressEvent::Finished);
        match result {
            Ok(report) => report,
            Err(e) => {
                warn!("Processing failed: {}", e);
                Report::failure(e)
            }
        }
    }

    /// Process an image or PDF file.
    ///
    /// Faults that stop the whole file are returned as errors; faults on a
    /// single PDF page become failure records for that page.
    pub fn process_file(&self, path: &Path) -> Result<Report> {
        let _span = tracing::info_span!("pipeline.file", path = %path.display()).entered();
        let start = Instant::now();

        let kind = document::detect_kind(path)?;
        info!("Processing {:?} file: {}", kind, path.display());

        let configured;
        let recognizer: &dyn TextRecognizer = match &self.recognizer {
            Some(recognizer) => recognizer.as_ref(),
            None => {
                configured = ocr::create_recognizer(&self.config.ocr)?;
                configured.as_ref()
            }
        };
        debug!("Using {} OCR engine", recognizer.name());

        let report = match kind {
            DocumentKind::Image => {
                self.notify(ProgressEvent::Opened { kind, pages: 1 });
                let image = document::load_image(path)?;
                let result = self.process_image(&image, recognizer, path, None)?;
                Report::Single(PageRecord::untagged(result))
            }
            DocumentKind::Pdf => {
                let renderer = pdf::open_renderer(path, &self.config.pdf)?;
                let pages = pdf::pages_to_process(renderer.page_count(), &self.config.pdf);
                self.notify(ProgressEvent::Opened {
                    kind,
                    pages: *pages.end(),
                });

                let records = pages
                    .map(|page| {
                        match self.process_pdf_page(renderer.as_ref(), page, recognizer, path) {
                            Ok(result) => PageRecord::for_page(page, result),
                            Err(e) => {
                                warn!("Page {} failed: {}", page, e);
                                PageRecord::for_page(page, FailureRecord::new(e))
                            }
                        }
                    })
                    .collect();

                Report::from_pages(records)
            }
        };

        info!(
            "Finished {} in {}ms",
            path.display(),
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Run the field extractor over a UTF-8 text file.
    pub fn process_text_file(&self, path: &Path) -> Result<Report> {
        if !path.is_file() {
            return Err(IdscanError::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        info!("Extracting fields from text file: {}", path.display());

        self.notify(ProgressEvent::Extracting { page: 1 });
        let outcome = self.parser.extract_bytes(&bytes);
        Ok(Report::Single(PageRecord::untagged(outcome)))
    }

    fn process_pdf_page(
        &self,
        renderer: &dyn pdf::PageRenderer,
        page: u32,
        recognizer: &dyn TextRecognizer,
        path: &Path,
    ) -> Result<ExtractionResult> {
        self.notify(ProgressEvent::Rendering { page });
        let image = renderer.render_page(page)?;
        self.process_image(&image, recognizer, path, Some(page))
    }

    /// Enhance, recognize and extract one page image.
    pub fn process_image(
        &self,
        image: &DynamicImage,
        recognizer: &dyn TextRecognizer,
        source: &Path,
        page: Option<u32>,
    ) -> Result<ExtractionResult> {
        let page_number = page.unwrap_or(1);

        self.notify(ProgressEvent::Enhancing { page: page_number });
        let enhanced = DynamicImage::ImageLuma8(self.enhancer.enhance(image)?);
        self.save_enhanced(&enhanced, source, page);

        self.notify(ProgressEvent::Recognizing { page: page_number });
        let ocr_result = recognizer.recognize(&enhanced)?;
        debug!(
            "Recognized {} characters on page {}",
            ocr_result.text.len(),
            page_number
        );

        self.notify(ProgressEvent::Extracting { page: page_number });
        Ok(self.parser.extract_ocr(&ocr_result))
    }

    fn save_enhanced(&self, image: &DynamicImage, source: &Path, page: Option<u32>) {
        let Some(dir) = &self.config.enhance.debug_dir else {
            return;
        };

        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let file_name = match page {
            Some(page) => format!("{}_page{}_enhanced.png", stem, page),
            None => format!("{}_enhanced.png", stem),
        };
        let target = dir.join(file_name);

        let saved = std::fs::create_dir_all(dir)
            .map_err(IdscanError::from)
            .and_then(|_| Ok(image.save_with_format(&target, image::ImageFormat::Png)?));
        match saved {
            Ok(()) => debug!("Saved enhanced image to {}", target.display()),
            Err(e) => warn!("Could not save enhanced image {}: {}", target.display(), e),
        }
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
    }
}
