//! Page images taken from the image XObjects embedded in a PDF.

use std::collections::HashSet;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PageRenderer, Result};
use crate::error::PdfError;

/// Rasterizer for scanned PDFs: each page yields its largest embedded image.
///
/// Vector content and text are not drawn, so this only suits documents whose
/// pages are images, which is the usual case for scanned cards.
pub struct EmbeddedImageExtractor {
    document: Document,
}

impl EmbeddedImageExtractor {
    /// Parse a PDF, decrypting it when it uses an empty user password.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(Self { document })
    }

    /// Images referenced from a page's resources, in resource order.
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let pages = self.document.get_pages();
        let page_id = pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();
        let mut seen: HashSet<ObjectId> = HashSet::new();

        if let Some(resources) = self.page_resources(*page_id) {
            if let Ok(xobjects) = resources.get(b"XObject") {
                if let Ok((_, Object::Dictionary(xobject_dict))) = self.document.dereference(xobjects)
                {
                    for (_name, object_ref) in xobject_dict.iter() {
                        if let Object::Reference(id) = object_ref {
                            if !seen.insert(*id) {
                                continue;
                            }
                        }
                        if let Ok((_, object)) = self.document.dereference(object_ref) {
                            if let Some(image) = self.decode_image_object(object) {
                                images.push(image);
                            }
                        }
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn decode_image_object(&self, object: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = object else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        if let Ok(filter) = dict.get(b"Filter") {
            let filter_name = match filter {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(filters) => filters.first().and_then(|o| o.as_name().ok()),
                _ => None,
            };

            match filter_name {
                Some(b"DCTDecode") => {
                    return image::load_from_memory_with_format(
                        &stream.content,
                        image::ImageFormat::Jpeg,
                    )
                    .ok();
                }
                Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                    trace!("Skipping image with unsupported filter");
                    return None;
                }
                _ => {}
            }
        }

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
                Object::Reference(id) => self
                    .document
                    .get_object(*id)
                    .ok()
                    .and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);

        raw_to_image(data, width, height, color_space, bits)
    }

    /// Resources dictionary for a page, following `Parent` inheritance.
    fn page_resources(&self, node_id: ObjectId) -> Option<Dictionary> {
        let Object::Dictionary(dict) = self.document.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(resource_dict))) = self.document.dereference(resources)
            {
                return Some(resource_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }
}

impl PageRenderer for EmbeddedImageExtractor {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    fn render_page(&self, page: u32) -> Result<DynamicImage> {
        self.page_images(page)?
            .into_iter()
            .max_by_key(|image| image.width() as u64 * image.height() as u64)
            .ok_or_else(|| PdfError::Render {
                page,
                reason: "page has no embedded image".to_string(),
            })
    }
}

fn raw_to_image(
    data: Vec<u8>,
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!("Unsupported bits per component: {}", bits_per_component);
        return None;
    }

    let pixels = width as usize * height as usize;
    match color_space {
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            let mut data = data;
            data.truncate(pixels * 3);
            RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
        }
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            let mut data = data;
            data.truncate(pixels);
            GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            None
        }
    }
}
