//! Per-user conversation state.
//!
//! A `Session` owns everything one interactive user accumulates: the index
//! and pipeline built from their documents, the names of those documents and
//! the conversation so far. Dropping or ending it discards all of it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use docqa_core::config::Settings;
use docqa_core::data_processor::{source_name, DataProcessor};
use docqa_core::traits::{Embedder, Generator};
use docqa_core::{ConversationTurn, Error, Result};
use docqa_vector::{SnapshotStore, VectorIndex};

use crate::pipeline::RagPipeline;

pub struct Session {
    settings: Settings,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    processor: DataProcessor,
    pipeline: Option<RagPipeline>,
    documents: Vec<String>,
    history: Vec<ConversationTurn>,
}

impl Session {
    pub fn new(settings: Settings, embedder: Arc<dyn Embedder>, generator: Arc<dyn Generator>) -> Self {
        let processor = DataProcessor::with_settings(&settings.chunking);
        Self::with_processor(settings, embedder, generator, processor)
    }

    pub fn with_processor(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        processor: DataProcessor,
    ) -> Self {
        Self { settings, embedder, generator, processor, pipeline: None, documents: Vec::new(), history: Vec::new() }
    }

    /// Build or load the index for `paths`. A session ingests once; later
    /// calls keep the existing pipeline.
    pub fn ingest(&mut self, paths: &[PathBuf]) -> Result<&[String]> {
        if self.pipeline.is_some() {
            info!("Session already has an index; keeping it");
            return Ok(&self.documents);
        }
        let store = SnapshotStore::new(self.settings.snapshot_dir())?;
        let index = VectorIndex::build_or_load(
            paths,
            &self.processor,
            self.embedder.clone(),
            &store,
            self.settings.embedding.batch_size,
        )?;
        self.documents = paths.iter().map(|p| source_name(p)).collect();
        self.pipeline = Some(RagPipeline::new(index, self.generator.clone(), self.settings.retrieval.top_k));
        Ok(&self.documents)
    }

    /// Answer `question`. The user turn is kept even when answering fails;
    /// the assistant turn is only recorded on success.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        let pipeline = self.pipeline.as_ref().ok_or(Error::NotReady)?;
        self.history.push(ConversationTurn::user(question));
        let answer = pipeline.answer_question(question)?;
        self.history.push(ConversationTurn::assistant(answer.clone()));
        Ok(answer)
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn pipeline(&self) -> Option<&RagPipeline> {
        self.pipeline.as_ref()
    }

    pub fn end(self) {
        info!("Ending session after {} turns", self.history.len());
    }
}
