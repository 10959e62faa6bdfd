//! Page rasterization through Poppler's `pdftoppm`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, warn};

use super::{PageRenderer, Result};
use crate::error::PdfError;

/// Renders pages with `pdftoppm -png -r <dpi>`.
pub struct PopplerRenderer {
    command: PathBuf,
    pdf_path: PathBuf,
    dpi: u32,
    page_count: u32,
}

impl PopplerRenderer {
    pub fn new(command: impl Into<PathBuf>, pdf_path: &Path, dpi: u32, page_count: u32) -> Self {
        Self {
            command: command.into(),
            pdf_path: pdf_path.to_path_buf(),
            dpi,
            page_count,
        }
    }

    /// Whether the `pdftoppm` binary can be started.
    pub fn is_available(command: &Path) -> bool {
        Command::new(command).arg("-v").output().is_ok()
    }
}

impl PageRenderer for PopplerRenderer {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        if page == 0 || page > self.page_count {
            return Err(PdfError::InvalidPage(page));
        }

        let temp_dir = tempfile::tempdir().map_err(|e| PdfError::Render {
            page,
            reason: format!("failed to create temp dir: {}", e),
        })?;
        let prefix = temp_dir.path().join("page");

        debug!(
            "Rendering page {} of {} at {} DPI",
            page,
            self.pdf_path.display(),
            self.dpi
        );

        let output = Command::new(&self.command)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg(&self.pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => PdfError::RendererUnavailable(format!(
                    "{} not found. Make sure poppler-utils is installed",
                    self.command.display()
                )),
                _ => PdfError::RendererUnavailable(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("pdftoppm failed on page {}: {}", page, stderr.trim());
            return Err(PdfError::Render {
                page,
                reason: format!("pdftoppm failed: {}", stderr.trim()),
            });
        }

        // Output is named page-N.png, zero-padded to the page count's width.
        let rendered = std::fs::read_dir(temp_dir.path())
            .map_err(|e| PdfError::Render {
                page,
                reason: e.to_string(),
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .find(|path| path.extension().is_some_and(|ext| ext == "png"))
            .ok_or_else(|| PdfError::Render {
                page,
                reason: "pdftoppm produced no image".to_string(),
            })?;

        image::open(&rendered).map_err(|e| PdfError::Render {
            page,
            reason: e.to_string(),
        })
    }
}

/// Page count reported by Poppler's `pdfinfo`, for files lopdf cannot parse.
pub fn pdfinfo_page_count(pdftoppm_cmd: &Path, pdf_path: &Path) -> Result<u32> {
    // pdfinfo ships next to pdftoppm
    let command = pdftoppm_cmd
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join("pdfinfo"))
        .unwrap_or_else(|| PathBuf::from("pdfinfo"));

    let output = Command::new(&command)
        .arg(pdf_path)
        .output()
        .map_err(|e| PdfError::RendererUnavailable(format!("failed to run pdfinfo: {}", e)))?;

    if !output.status.success() {
        return Err(PdfError::Parse(format!(
            "pdfinfo failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_pdfinfo_pages(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| PdfError::Parse("pdfinfo did not report a page count".to_string()))
}

fn parse_pdfinfo_pages(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}
