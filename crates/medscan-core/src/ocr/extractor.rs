//! OCR extraction for raster images.

use std::sync::Arc;

use image::GenericImageView;
use tracing::{debug, info, warn};

use super::{EngineLease, OcrEngineFactory, downscale};
use crate::document::TextExtractor;
use crate::error::{DocumentError, OcrError};
use crate::models::config::{DEFAULT_MAX_FILE_SIZE, MedscanConfig};
use crate::models::document::SubmittedDocument;
use crate::models::extraction::{ExtractionMethod, ExtractionResult};

const DEFAULT_MAX_IMAGE_SIZE: u32 = 2048;

/// Extracts text from images with a freshly acquired OCR engine per call.
pub struct ImageTextExtractor {
    factory: Arc<dyn OcrEngineFactory>,
    max_file_size: u64,
    max_image_size: u32,
}

impl ImageTextExtractor {
    pub fn new(factory: Arc<dyn OcrEngineFactory>) -> Self {
        Self {
            factory,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
        }
    }

    pub fn from_config(factory: Arc<dyn OcrEngineFactory>, config: &MedscanConfig) -> Self {
        Self::new(factory)
            .with_max_file_size(config.documents.max_file_size_bytes)
            .with_max_image_size(config.ocr.max_image_size)
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Longest side an image may have before it is downscaled.
    pub fn with_max_image_size(mut self, max_image_size: u32) -> Self {
        self.max_image_size = max_image_size;
        self
    }

    fn validate(&self, doc: &SubmittedDocument) -> Result<(), DocumentError> {
        let invalid = |reason: String| Err(DocumentError::InvalidDocument(reason));

        if !doc.content_type().trim().to_lowercase().starts_with("image/") {
            return invalid("Invalid file type. Please upload an image file.".to_string());
        }
        if doc.byte_size() == 0 {
            return invalid("File is empty".to_string());
        }
        if doc.byte_size() > self.max_file_size || doc.content().len() as u64 > self.max_file_size {
            return invalid(format!(
                "File is too large. Maximum size is {}MB.",
                self.max_file_size / (1024 * 1024)
            ));
        }
        if doc.content().is_empty() {
            return invalid("Failed to read file content".to_string());
        }
        Ok(())
    }
}

impl TextExtractor for ImageTextExtractor {
    fn extract(&self, doc: &SubmittedDocument) -> Result<ExtractionResult, DocumentError> {
        self.validate(doc)?;

        let image = image::load_from_memory(doc.content()).map_err(|e| {
            warn!("Failed to decode image {}: {}", doc.name(), e);
            DocumentError::InvalidDocument("Invalid image format. File may be corrupted.".to_string())
        })?;
        let (width, height) = image.dimensions();
        debug!("Decoded {} as {}x{}", doc.name(), width, height);

        let image = downscale(image, self.max_image_size);

        let mut lease = EngineLease::acquire(self.factory.as_ref()).map_err(|e| {
            warn!("Failed to acquire OCR engine: {}", e);
            DocumentError::Unexpected(e.to_string())
        })?;

        let text = lease.recognize(&image).map_err(|e| {
            warn!("OCR failed for {}: {}", doc.name(), e);
            DocumentError::OcrExtractionFailed(e.to_string())
        })?;
        drop(lease);

        if text.trim().is_empty() {
            warn!("OCR found no text in {}", doc.name());
            return Err(DocumentError::OcrExtractionFailed(OcrError::EmptyText.to_string()));
        }

        info!("OCR extracted {} characters from {}", text.chars().count(), doc.name());
        Ok(ExtractionResult::new(text, ExtractionMethod::Ocr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::OcrEngine;
    use crate::test_support;
    use image::DynamicImage;
    use pretty_assertions::assert_eq;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Behavior {
        Text(&'static str),
        Fail,
        Panic,
    }

    #[derive(Default)]
    struct Counters {
        acquired: AtomicUsize,
        released: AtomicUsize,
        recognized: AtomicUsize,
    }

    struct FakeEngine {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    impl OcrEngine for FakeEngine {
        fn recognize(&mut self, _image: &DynamicImage) -> Result<String, OcrError> {
            self.counters.recognized.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Text(text) => Ok(text.to_string()),
                Behavior::Fail => Err(OcrError::Recognition("detector produced no boxes".into())),
                Behavior::Panic => panic!("onnx session aborted"),
            }
        }

        fn release(&mut self) {
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeFactory {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    impl FakeFactory {
        fn new(behavior: Behavior) -> (Arc<Self>, Arc<Counters>) {
            let counters = Arc::new(Counters::default());
            let factory = Arc::new(Self {
                behavior,
                counters: counters.clone(),
            });
            (factory, counters)
        }
    }

    impl OcrEngineFactory for FakeFactory {
        fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeEngine {
                behavior: self.behavior,
                counters: self.counters.clone(),
            }))
        }
    }

    struct MissingModels;

    impl OcrEngineFactory for MissingModels {
        fn acquire(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
            Err(OcrError::ModelLoad("det.onnx not found".into()))
        }
    }

    fn png_doc() -> SubmittedDocument {
        SubmittedDocument::new("scan.png", "image/png", test_support::png())
    }

    #[test]
    fn test_success_releases_engine() {
        let (factory, counters) = FakeFactory::new(Behavior::Text("Blood Glucose: 101 mg/dl"));
        let extractor = ImageTextExtractor::new(factory);

        let result = extractor.extract(&png_doc()).unwrap();

        assert_eq!(result.method, ExtractionMethod::Ocr);
        assert_eq!(result.raw_text, "Blood Glucose: 101 mg/dl");
        assert_eq!(result.page_count, None);
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recognition_error_releases_engine() {
        let (factory, counters) = FakeFactory::new(Behavior::Fail);
        let extractor = ImageTextExtractor::new(factory);

        let result = extractor.extract(&png_doc());

        assert!(matches!(result, Err(DocumentError::OcrExtractionFailed(_))));
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_engine_is_released_while_unwinding() {
        let (factory, counters) = FakeFactory::new(Behavior::Panic);
        let extractor = ImageTextExtractor::new(factory);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(&png_doc())));

        assert!(outcome.is_err());
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(counters.recognized.load(Ordering::SeqCst), 1);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_text_releases_engine() {
        let (factory, counters) = FakeFactory::new(Behavior::Text("  \n "));
        let extractor = ImageTextExtractor::new(factory);

        let result = extractor.extract(&png_doc());

        assert!(matches!(result, Err(DocumentError::OcrExtractionFailed(_))));
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_each_call_acquires_its_own_engine() {
        let (factory, counters) = FakeFactory::new(Behavior::Text("TSH: 1.2 mIU/L"));
        let extractor = ImageTextExtractor::new(factory);

        for _ in 0..3 {
            extractor.extract(&png_doc()).unwrap();
        }

        assert_eq!(counters.acquired.load(Ordering::SeqCst), 3);
        assert_eq!(counters.released.load(Ordering::SeqCst), 3);
        assert_eq!(counters.recognized.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_invalid_documents_never_acquire() {
        let (factory, counters) = FakeFactory::new(Behavior::Text("text"));
        let extractor = ImageTextExtractor::new(factory);

        let wrong_type = SubmittedDocument::new("scan.png", "application/pdf", test_support::png());
        let empty = SubmittedDocument::new("scan.png", "image/png", Vec::new());
        let undecodable = SubmittedDocument::new("scan.png", "image/png", b"not an image".to_vec());

        for doc in [wrong_type, empty, undecodable] {
            assert!(matches!(
                extractor.extract(&doc),
                Err(DocumentError::InvalidDocument(_))
            ));
        }
        assert_eq!(counters.acquired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_model_load_failure_is_unexpected() {
        let extractor = ImageTextExtractor::new(Arc::new(MissingModels));
        let result = extractor.extract(&png_doc());
        assert!(matches!(result, Err(DocumentError::Unexpected(_))));
    }
}
