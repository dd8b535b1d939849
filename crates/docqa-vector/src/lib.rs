//! Vector index over document chunks, cached on disk as a LanceDB snapshot
//! keyed by the fingerprint of the input file set.

use std::path::PathBuf;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docqa_core::data_processor::DataProcessor;
use docqa_core::traits::Embedder;
use docqa_core::{Chunk, Error, Result, RetrievedChunk};

pub mod fingerprint;
pub mod schema;
pub mod store;
pub mod table;

pub use fingerprint::{fingerprint, Fingerprint};
pub use store::{IndexedChunk, SnapshotStore};

pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    embedder: Arc<dyn Embedder>,
    fingerprint: Fingerprint,
}

impl VectorIndex {
    /// Load the snapshot when it was built from the same file set with the
    /// same embedder, otherwise chunk, embed and persist from scratch.
    pub fn build_or_load(
        paths: &[PathBuf],
        processor: &DataProcessor,
        embedder: Arc<dyn Embedder>,
        store: &SnapshotStore,
        batch_size: usize,
    ) -> Result<Self> {
        let fingerprint = fingerprint(paths);
        let _guard = store.lock_build()?;

        if store.exists()? && !store.is_empty()? {
            let stored = store.fingerprint()?;
            let stored_embedder = store.embedder_id()?;
            if stored.as_ref() == Some(&fingerprint) && stored_embedder.as_deref() == Some(embedder.embedder_id()) {
                let entries = store.load()?;
                info!("Loaded {} chunks from snapshot {}", entries.len(), store.dir().display());
                return Ok(Self { entries, embedder, fingerprint });
            }
            info!("Snapshot at {} was built from a different input; rebuilding", store.dir().display());
        }

        let chunks = processor.process_files(paths)?;
        let vectors = embed_chunks(embedder.as_ref(), &chunks, batch_size)?;
        let entries: Vec<IndexedChunk> = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedChunk { chunk, vector })
            .collect();
        store.overwrite(&fingerprint, embedder.embedder_id(), &entries)?;
        info!("Built index of {} chunks ({})", entries.len(), fingerprint);
        Ok(Self { entries, embedder, fingerprint })
    }

    /// In-memory index, not backed by a snapshot.
    pub fn from_entries(entries: Vec<IndexedChunk>, embedder: Arc<dyn Embedder>, fingerprint: Fingerprint) -> Self {
        Self { entries, embedder, fingerprint }
    }

    /// Top-`k` chunks by cosine similarity to `text`; ties keep insertion order.
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed(text).map_err(Error::embedding)?;
        let dim = self.entries[0].vector.len();
        if q.len() != dim {
            return Err(Error::EmbeddingService(format!(
                "query embedding has dimension {} but the index stores {}",
                q.len(),
                dim
            )));
        }
        let mut scored: Vec<(usize, f32)> =
            self.entries.iter().enumerate().map(|(i, e)| (i, cosine(&q, &e.vector))).collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let hits: Vec<RetrievedChunk> = scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (idx, similarity))| RetrievedChunk { rank: i + 1, chunk: self.entries[idx].chunk.clone(), similarity })
            .collect();
        debug!("query {:?} -> {} hits", text, hits.len());
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Distinct source names in first-seen order.
    pub fn sources(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for e in &self.entries {
            if !out.iter().any(|s| s == &e.chunk.source_name) {
                out.push(e.chunk.source_name.clone());
            }
        }
        out
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.entries.iter().map(|e| &e.chunk)
    }
}

fn embed_chunks(embedder: &dyn Embedder, chunks: &[Chunk], batch_size: usize) -> Result<Vec<Vec<f32>>> {
    let pb = ProgressBar::new(chunks.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    let mut vectors: Vec<Vec<f32>> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embedded = embedder.embed_batch(&texts).map_err(Error::embedding)?;
        if embedded.len() != texts.len() {
            return Err(Error::EmbeddingService(format!(
                "embedder returned {} vectors for {} chunks",
                embedded.len(),
                texts.len()
            )));
        }
        vectors.extend(embedded);
        pb.set_position(vectors.len() as u64);
    }
    pb.finish_with_message("embedded");

    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if dim == 0 || vectors.iter().any(|v| v.len() != dim) {
        return Err(Error::EmbeddingService("embedder returned vectors of inconsistent dimension".to_string()));
    }
    Ok(vectors)
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
