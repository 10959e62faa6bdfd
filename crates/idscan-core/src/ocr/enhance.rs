//! Page enhancement for OCR: grayscale conversion and binarization.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

use crate::error::{IdscanError, Result};
use crate::models::config::{EnhanceConfig, ThresholdMode};

/// Turns a page photo or scan into a black/white image.
#[derive(Debug, Clone)]
pub struct ImageEnhancer {
    mode: ThresholdMode,
    /// Half-width of the adaptive window.
    block_radius: u32,
    /// Constant subtracted from the local mean.
    offset: i32,
}

impl ImageEnhancer {
    /// Create an enhancer with default settings (adaptive, 11x11 window, offset 2).
    pub fn new() -> Self {
        Self::from_config(&EnhanceConfig::default())
    }

    pub fn from_config(config: &EnhanceConfig) -> Self {
        Self {
            mode: config.mode,
            block_radius: config.block_radius,
            offset: config.offset,
        }
    }

    /// Set the binarization strategy.
    pub fn with_mode(mut self, mode: ThresholdMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the adaptive window half-width.
    pub fn with_block_radius(mut self, radius: u32) -> Self {
        self.block_radius = radius;
        self
    }

    /// Binarize an image. Empty images are rejected.
    pub fn enhance(&self, image: &DynamicImage) -> Result<GrayImage> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(IdscanError::Enhancement(
                "invalid or empty image".to_string(),
            ));
        }

        let gray = image.to_luma8();

        let binary = match self.mode {
            ThresholdMode::Adaptive => self.adaptive_threshold(&gray),
            ThresholdMode::Otsu => {
                let level = otsu_level(&gray);
                debug!("Otsu threshold level: {}", level);
                global_threshold(&gray, level)
            }
        };

        debug!("Enhanced {}x{} image ({:?})", width, height, self.mode);
        Ok(binary)
    }

    /// Local mean threshold using an integral image.
    fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let integral = integral_image(image);
        let stride = width as usize + 1;
        let mut result = GrayImage::new(width, height);

        for y in 0..height {
            let y0 = y.saturating_sub(self.block_radius) as usize;
            let y1 = (y + self.block_radius + 1).min(height) as usize;

            for x in 0..width {
                let x0 = x.saturating_sub(self.block_radius) as usize;
                let x1 = (x + self.block_radius + 1).min(width) as usize;

                let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                    - integral[y0 * stride + x1]
                    - integral[y1 * stride + x0];
                let count = ((y1 - y0) * (x1 - x0)) as u64;

                let mean = (sum / count) as i32;
                let threshold = mean - self.offset;
                let pixel_value = image.get_pixel(x, y)[0] as i32;

                let output = if pixel_value > threshold { 255 } else { 0 };
                result.put_pixel(x, y, Luma([output]));
            }
        }

        result
    }
}

impl Default for ImageEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

/// Summed-area table with a zero row and column prepended.
fn integral_image(image: &GrayImage) -> Vec<u64> {
    let (width, height) = image.dimensions();
    let stride = width as usize + 1;
    let mut integral = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += image.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    integral
}

/// Threshold maximizing between-class variance of the histogram.
fn otsu_level(image: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total = image.width() as f64 * image.height() as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, count)| level as f64 * *count as f64)
        .sum();

    let mut background_weight = 0.0;
    let mut background_sum = 0.0;
    let mut best_level = 0u8;
    let mut best_variance = 0.0;

    for (level, count) in histogram.iter().enumerate() {
        background_weight += *count as f64;
        if background_weight == 0.0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0.0 {
            break;
        }

        background_sum += level as f64 * *count as f64;
        let background_mean = background_sum / background_weight;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight;

        let variance = background_weight
            * foreground_weight
            * (background_mean - foreground_mean).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}

fn global_threshold(image: &GrayImage, level: u8) -> GrayImage {
    let mut result = image.clone();
    for pixel in result.pixels_mut() {
        pixel[0] = if pixel[0] > level { 255 } else { 0 };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    /// White page with a black square in the middle.
    fn page() -> DynamicImage {
        let mut img = RgbImage::from_pixel(40, 40, Rgb([240, 240, 240]));
        for y in 15..25 {
            for x in 15..25 {
                img.put_pixel(x, y, Rgb([20, 20, 20]));
            }
        }
        DynamicImage::ImageRgb8(img)
    }

    fn is_binary(image: &GrayImage) -> bool {
        image.pixels().all(|p| p[0] == 0 || p[0] == 255)
    }

    #[test]
    fn test_adaptive_produces_black_and_white() {
        let enhanced = ImageEnhancer::new().enhance(&page()).unwrap();
        assert_eq!(enhanced.dimensions(), (40, 40));
        assert!(is_binary(&enhanced));
        assert_eq!(enhanced.get_pixel(0, 0)[0], 255);
        // Square edge is darker than its neighbourhood
        assert_eq!(enhanced.get_pixel(15, 15)[0], 0);
    }

    #[test]
    fn test_otsu_separates_foreground() {
        let enhanced = ImageEnhancer::new()
            .with_mode(ThresholdMode::Otsu)
            .enhance(&page())
            .unwrap();
        assert!(is_binary(&enhanced));
        assert_eq!(enhanced.get_pixel(20, 20)[0], 0);
        assert_eq!(enhanced.get_pixel(2, 2)[0], 255);
    }

    #[test]
    fn test_empty_image_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = ImageEnhancer::new().enhance(&empty).unwrap_err();
        assert!(matches!(err, IdscanError::Enhancement(_)));
    }

    #[test]
    fn test_integral_image_sums() {
        let img = GrayImage::from_pixel(3, 2, Luma([2]));
        let integral = integral_image(&img);
        // bottom-right corner holds the total
        assert_eq!(integral[2 * 4 + 3], 12);
    }

    #[test]
    fn test_otsu_level_between_modes() {
        let level = otsu_level(&page().to_luma8());
        assert!(level >= 20 && level < 240);
    }
}
