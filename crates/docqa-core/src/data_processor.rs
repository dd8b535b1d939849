use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::ChunkingSettings;
use crate::error::{Error, Result};
use crate::extract::PdfPageExtractor;
use crate::splitter::RecursiveSplitter;
use crate::traits::PageExtractor;
use crate::types::Chunk;

/// Turns PDF files into page-tagged chunks.
pub struct DataProcessor {
    extractor: Box<dyn PageExtractor>,
    splitter: RecursiveSplitter,
}

impl Default for DataProcessor {
    fn default() -> Self { Self::new() }
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(PdfPageExtractor), &ChunkingSettings::default())
    }

    pub fn with_settings(settings: &ChunkingSettings) -> Self {
        Self::with_extractor(Box::new(PdfPageExtractor), settings)
    }

    pub fn with_extractor(extractor: Box<dyn PageExtractor>, settings: &ChunkingSettings) -> Self {
        Self { extractor, splitter: RecursiveSplitter::from_settings(settings) }
    }

    /// Chunk every readable document, in input order. Unreadable documents
    /// are logged and skipped; zero chunks overall is `EmptyCorpus`.
    pub fn process_files(&self, paths: &[PathBuf]) -> Result<Vec<Chunk>> {
        let mut all_chunks = Vec::new();
        for (file_index, path) in paths.iter().enumerate() {
            info!("Processing file {}/{}: {}", file_index + 1, paths.len(), path.display());
            match self.chunk_document(path) {
                Ok(chunks) => {
                    debug!("{} -> {} chunks", path.display(), chunks.len());
                    all_chunks.extend(chunks);
                }
                Err(e) => warn!("Skipping document: {}", e),
            }
        }
        info!("Processed {} files into {} chunks", paths.len(), all_chunks.len());
        if all_chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        Ok(all_chunks)
    }

    /// Chunk one document page by page. Pages without text yield nothing.
    pub fn chunk_document(&self, path: &Path) -> Result<Vec<Chunk>> {
        let pages = self
            .extractor
            .extract_pages(path)
            .map_err(|e| Error::DocumentRead { path: path.to_path_buf(), reason: format!("{e:#}") })?;
        let source_name = source_name(path);
        let mut chunks = Vec::new();
        for (page_index, text) in pages.iter().enumerate() {
            let page_number = u32::try_from(page_index + 1).unwrap_or(u32::MAX);
            chunks.extend(
                self.splitter
                    .split(text)
                    .into_iter()
                    .map(|window| Chunk::new(window, source_name.clone(), page_number)),
            );
        }
        Ok(chunks)
    }
}

/// Base filename used to tag chunks.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Expand directories into the sorted `*.pdf` files beneath them; plain file
/// paths are passed through unchanged.
pub fn list_pdf_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(input)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")))
            .collect();
        found.sort();
        files.extend(found);
    }
    files
}
