//! Fallback strategy: text-showing operators read page by page with `lopdf`.

use lopdf::content::Content;
use lopdf::{Document, Object};
use tracing::{debug, trace};

use super::{PdfStrategy, Result, StrategyOutput};
use crate::error::PdfError;
use crate::models::extraction::ExtractionMethod;

/// Walks pages 1..N in order and collects the strings shown by `Tj`, `TJ`,
/// `'` and `"` operators.
///
/// Tokens on a page are joined with single spaces, pages with a newline. Pages
/// are never processed concurrently; the first page that cannot be decoded
/// fails the whole document and is named in the error.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenStreamStrategy;

impl TokenStreamStrategy {
    pub fn new() -> Self {
        Self
    }

    fn load(data: &[u8]) -> Result<Document> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");
        }

        Ok(doc)
    }

    fn page_tokens(doc: &Document, page: u32, page_id: lopdf::ObjectId) -> Result<Vec<String>> {
        let raw = doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::TextExtraction {
                page,
                reason: e.to_string(),
            })?;

        let content = Content::decode(&raw).map_err(|e| PdfError::TextExtraction {
            page,
            reason: format!("invalid content stream: {}", e),
        })?;

        let mut tokens = Vec::new();
        for op in &content.operations {
            let shown = match op.operator.as_str() {
                "Tj" | "'" => op.operands.last(),
                "\"" => op.operands.get(2),
                "TJ" => op.operands.first(),
                _ => None,
            };

            let Some(operand) = shown else {
                continue;
            };

            let token = match operand {
                Object::Array(items) => items
                    .iter()
                    .filter_map(decode_string_operand)
                    .collect::<String>(),
                other => decode_string_operand(other).unwrap_or_default(),
            };

            let token = token.trim();
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }

        trace!("Page {}: {} text tokens", page, tokens.len());
        Ok(tokens)
    }
}

impl PdfStrategy for TokenStreamStrategy {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Fallback
    }

    fn extract(&self, data: &[u8]) -> Result<StrategyOutput> {
        let doc = Self::load(data)?;

        // BTreeMap: ascending page numbers.
        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for (&page, &page_id) in pages.iter() {
            let tokens = Self::page_tokens(&doc, page, page_id)?;
            page_texts.push(tokens.join(" "));
            debug!("Processed page {}/{}", page, pages.len());
        }

        Ok(StrategyOutput {
            text: page_texts.join("\n").trim().to_string(),
            page_count: Some(pages.len() as u32),
        })
    }
}

/// Decode a PDF string object: UTF-16BE when it carries a BOM, otherwise
/// UTF-8 with a Latin-1 fallback.
fn decode_string_operand(obj: &Object) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&units));
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Some(s.to_string()),
        Err(_) => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}
