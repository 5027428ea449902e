use std::fs;
use std::panic;
use std::path::Path;

use lopdf::Document;

use crate::error::IngestError;

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub source: String,
    pub pages: usize,
    pub text: String,
}

/// Reads a document from disk into plain text. Blocking.
pub trait DocumentLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadedDocument, IngestError>;
}

/// PDF loader: `lopdf` validates structure and rejects encrypted files,
/// `pdf-extract` produces the text of all pages in order.
#[derive(Debug, Clone, Default)]
pub struct PdfLoader;

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<LoadedDocument, IngestError> {
        let unreadable = |reason: String| IngestError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
        let document = Document::load_mem(&bytes).map_err(|e| unreadable(e.to_string()))?;
        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(unreadable("document is encrypted".to_string()));
        }
        let pages = document.get_pages().len();

        // pdf-extract panics on some malformed font and encoding tables
        let text = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
            .map_err(|_| unreadable("text extraction aborted".to_string()))?
            .map_err(|e| unreadable(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(IngestError::Empty {
                path: path.to_path_buf(),
            });
        }

        let source = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(LoadedDocument {
            source,
            pages,
            text,
        })
    }
}
