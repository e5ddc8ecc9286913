//! OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::{OcrEngine, OcrEngineFactory, TextBox, join_in_reading_order};
use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

/// Detection and recognition models loaded for a single extraction.
pub struct PureOcrEngine {
    engine: Option<pure_onnx_ocr::engine::OcrEngine>,
    keep_unknown_glyphs: bool,
}

impl PureOcrEngine {
    /// Load the models named by the configuration.
    pub fn load(models: &ModelConfig, config: &OcrConfig) -> Result<Self, OcrError> {
        if !models.is_available() {
            return Err(OcrError::ModelLoad(format!(
                "OCR models not found in {}",
                models.model_dir.display()
            )));
        }

        let det_path = models.detection_path();
        let rec_path = models.recognition_path();
        let dict_path = models.dictionary_path();

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", models.model_dir.display());

        Ok(Self {
            engine: Some(engine),
            keep_unknown_glyphs: config.keep_unknown_glyphs,
        })
    }
}

impl OcrEngine for PureOcrEngine {
    fn recognize(&mut self, image: &DynamicImage) -> Result<String, OcrError> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| OcrError::Recognition("engine already released".to_string()))?;

        let start = Instant::now();
        let (width, height) = image.dimensions();
        debug!("Processing image: {}x{}", width, height);

        let results = engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: if self.keep_unknown_glyphs {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                },
            })
            .collect();

        let count = boxes.len();
        let text = join_in_reading_order(boxes);

        info!(
            "OCR complete: {} text boxes in {}ms",
            count,
            start.elapsed().as_millis()
        );

        Ok(text)
    }

    fn release(&mut self) {
        // Drops the ONNX sessions.
        self.engine = None;
    }
}

/// Loads a new [`PureOcrEngine`] on every acquisition.
#[derive(Debug, Clone)]
pub struct PureOcrEngineFactory {
    models: ModelConfig,
    config: OcrConfig,
}

impl PureOcrEngineFactory {
    pub fn new(models: ModelConfig, config: OcrConfig) -> Self {
        Self { models, config }
    }
}

impl OcrEngineFactory for PureOcrEngineFactory {
    fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
        Ok(Box::new(PureOcrEngine::load(&self.models, &self.config)?))
    }
}

/// Convert a `Polygon<f64>` to the `[f32; 8]` quadrilateral format.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
