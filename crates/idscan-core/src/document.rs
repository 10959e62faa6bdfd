//! Input file classification and image loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, warn};

use crate::error::{IdscanError, Result};

/// PDF files start with this marker.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extensions accepted as raster images when content sniffing fails.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif"];

/// How an input file is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Rasterized page by page.
    Pdf,
    /// Processed as a single page.
    Image,
}

/// Classify a file by its leading bytes, then by its extension.
pub fn detect_kind(path: &Path) -> Result<DocumentKind> {
    if !path.is_file() {
        return Err(IdscanError::FileNotFound(path.to_path_buf()));
    }

    let mut header = Vec::with_capacity(64);
    File::open(path)?.take(64).read_to_end(&mut header)?;

    if let Some(kind) = sniff_kind(&header) {
        debug!("Detected {:?} from content of {}", kind, path.display());
        return Ok(kind);
    }

    match kind_from_extension(path) {
        Some(kind) => {
            debug!("Detected {:?} from extension of {}", kind, path.display());
            Ok(kind)
        }
        None => Err(IdscanError::UnsupportedType(path.to_path_buf())),
    }
}

/// Classify leading bytes, if they identify a PDF or a known image format.
pub fn sniff_kind(header: &[u8]) -> Option<DocumentKind> {
    if header.starts_with(PDF_MAGIC) {
        return Some(DocumentKind::Pdf);
    }
    image::guess_format(header).ok().map(|_| DocumentKind::Image)
}

/// Classify a path by its extension, case-insensitively.
pub fn kind_from_extension(path: &Path) -> Option<DocumentKind> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    if extension == "pdf" {
        Some(DocumentKind::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Some(DocumentKind::Image)
    } else {
        None
    }
}

/// Decode an image file.
///
/// The content-sniffing decoder runs first. If it fails, the file is decoded
/// again with the format implied by its extension.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let primary = match decode_sniffed(path) {
        Ok(image) => return Ok(image),
        Err(e) => e,
    };
    warn!(
        "Primary decoder failed for {}: {}. Trying fallback.",
        path.display(),
        primary
    );

    let fallback = match decode_by_extension(path) {
        Ok(image) => return Ok(image),
        Err(e) => e,
    };

    Err(IdscanError::Load { primary, fallback })
}

fn decode_sniffed(path: &Path) -> std::result::Result<DynamicImage, String> {
    ImageReader::open(path)
        .map_err(|e| e.to_string())?
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

fn decode_by_extension(path: &Path) -> std::result::Result<DynamicImage, String> {
    let format = ImageFormat::from_path(path).map_err(|e| e.to_string())?;
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    image::load_from_memory_with_format(&data, format).map_err(|e| e.to_string())
}
