use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::anyhow;

use crate::traits::PageExtractor;

/// Page text extraction backed by `pdf-extract`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPageExtractor;

impl PageExtractor for PdfPageExtractor {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let bytes = std::fs::read(path)?;
        // pdf-extract panics on some malformed documents instead of erroring.
        match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(&bytes))) {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(anyhow!("PDF parse error: {}", e)),
            Err(_) => Err(anyhow!("PDF parser aborted on malformed input")),
        }
    }
}
