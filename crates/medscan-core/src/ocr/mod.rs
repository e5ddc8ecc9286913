//! Image text extraction with a per-call OCR engine.

mod extractor;
mod lease;
#[cfg(feature = "native")]
mod pure_engine;

pub use extractor::ImageTextExtractor;
pub use lease::EngineLease;
#[cfg(feature = "native")]
pub use pure_engine::{PureOcrEngine, PureOcrEngineFactory};

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::OcrError;

/// A text recognizer holding model state.
///
/// Instances are never shared between documents. Callers obtain one from an
/// [`OcrEngineFactory`] and hold it in an [`EngineLease`] for the duration of
/// a single recognition.
pub trait OcrEngine {
    /// Recognize all text in the image, in reading order.
    fn recognize(&mut self, image: &DynamicImage) -> Result<String, OcrError>;

    /// Free any resources held by the engine. Called exactly once per acquisition.
    fn release(&mut self) {}
}

/// Creates a fresh engine for every extraction.
pub trait OcrEngineFactory: Send + Sync {
    fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// Shrink an image so that its longer side is at most `max_size`, keeping the
/// aspect ratio. Smaller images are returned unchanged.
pub fn downscale(image: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    let max_dim = width.max(height);

    if max_size == 0 || max_dim <= max_size {
        return image;
    }

    let scale = max_size as f32 / max_dim as f32;
    let new_width = ((width as f32 * scale) as u32).max(1);
    let new_height = ((height as f32 * scale) as u32).max(1);

    debug!(
        "Downscaling image from {}x{} to {}x{}",
        width, height, new_width, new_height
    );

    image.resize_exact(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

/// A recognized text region.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
#[derive(Debug, Clone)]
pub(crate) struct TextBox {
    /// Quadrilateral corners (x1, y1, x2, y2, x3, y3, x4, y4).
    pub bbox: [f32; 8],
    pub text: String,
}

impl TextBox {
    /// Axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Sort boxes top-to-bottom in 20px rows, then left-to-right, and join them
/// with newlines.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub(crate) fn join_in_reading_order(mut boxes: Vec<TextBox>) -> String {
    boxes.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();
        let row_a = (ay / 20.0) as i32;
        let row_b = (by / 20.0) as i32;
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });

    boxes
        .iter()
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
