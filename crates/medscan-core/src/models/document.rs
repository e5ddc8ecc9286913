//! Submitted document model.

use chrono::{DateTime, Utc};

/// One uploaded file belonging to a single analysis request.
///
/// Immutable once constructed. The payload is dropped together with the
/// request that carries it.
#[derive(Debug, Clone)]
pub struct SubmittedDocument {
    name: String,
    content_type: String,
    byte_size: u64,
    content: Vec<u8>,
    submitted_at: DateTime<Utc>,
}

impl SubmittedDocument {
    /// Create a document whose declared size is the payload length.
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, content: Vec<u8>) -> Self {
        let byte_size = content.len() as u64;
        Self {
            name: name.into(),
            content_type: content_type.into(),
            byte_size,
            content,
            submitted_at: Utc::now(),
        }
    }

    /// Override the declared size, e.g. with the size reported by an upload form.
    pub fn with_declared_size(mut self, byte_size: u64) -> Self {
        self.byte_size = byte_size;
        self
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type, as received.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Declared size in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Raw payload.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Time the document was received.
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
