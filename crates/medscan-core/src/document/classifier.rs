//! Routing by declared content type.

use serde::{Deserialize, Serialize};

/// Extraction path chosen for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
    Unsupported,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Image => write!(f, "image"),
            DocumentKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Classify a declared content type. Bytes are never sniffed.
pub fn classify(content_type: &str) -> DocumentKind {
    let content_type = content_type.trim().to_lowercase();

    if content_type == "application/pdf" {
        DocumentKind::Pdf
    } else if content_type.starts_with("image/") {
        DocumentKind::Image
    } else {
        DocumentKind::Unsupported
    }
}
