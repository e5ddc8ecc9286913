//! Scoped ownership of an OCR engine.

use image::DynamicImage;
use tracing::debug;

use super::{OcrEngine, OcrEngineFactory};
use crate::error::OcrError;

/// Holds an engine for one extraction and releases it when dropped.
///
/// Release happens on every exit path, including early returns and unwinding.
pub struct EngineLease {
    engine: Box<dyn OcrEngine>,
}

impl EngineLease {
    /// Acquire a fresh engine from the factory.
    pub fn acquire(factory: &dyn OcrEngineFactory) -> Result<Self, OcrError> {
        let engine = factory.acquire()?;
        debug!("OCR engine acquired");
        Ok(Self { engine })
    }

    pub fn recognize(&mut self, image: &DynamicImage) -> Result<String, OcrError> {
        self.engine.recognize(image)
    }
}

impl Drop for EngineLease {
    fn drop(&mut self) {
        self.engine.release();
        debug!("OCR engine released");
    }
}
