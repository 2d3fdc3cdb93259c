// src/inputs/pdf.rs
use crate::extractors::PageTextSource;
use crate::utils::error::ExtractError;
use lopdf::Document;
use std::path::Path;

/// A PDF opened with lopdf, exposing the text of each page.
pub struct PdfDocument {
    document: Document,
    page_numbers: Vec<u32>,
}

impl PdfDocument {
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let unreadable = |reason: String| ExtractError::DocumentUnreadable {
            path: path.display().to_string(),
            reason,
        };

        let mut document = Document::load(path).map_err(|e| unreadable(e.to_string()))?;

        // Statements are often "encrypted" with an empty user password.
        if document.is_encrypted() && document.decrypt("").is_err() {
            return Err(unreadable("password-protected document".to_string()));
        }

        // get_pages is keyed by page number, so the keys come out in page order.
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        tracing::debug!("Opened {} ({} pages)", path.display(), page_numbers.len());

        Ok(Self { document, page_numbers })
    }
}

impl PageTextSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&mut self, index: usize) -> Result<String, ExtractError> {
        let number = *self.page_numbers.get(index).ok_or(ExtractError::PageUnreadable {
            page: index + 1,
            reason: "page index out of range".to_string(),
        })?;

        merge_chunks(index + 1, self.document.extract_text_chunks(&[number]))
    }
}

/// Joins the readable text chunks of a page. Chunks lopdf could not decode
/// (typically an unsupported font encoding) are logged and left out; the page
/// only fails when nothing on it could be read.
fn merge_chunks(page: usize, chunks: Vec<lopdf::Result<String>>) -> Result<String, ExtractError> {
    let mut text = String::new();
    let mut readable = 0;
    let mut failures = Vec::new();

    for chunk in chunks {
        match chunk {
            Ok(fragment) => {
                text.push_str(&fragment);
                readable += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable text on page {}: {}", page, e);
                failures.push(e.to_string());
            }
        }
    }

    if readable == 0 && !failures.is_empty() {
        return Err(ExtractError::PageUnreadable { page, reason: failures.join("; ") });
    }
    Ok(text)
}
