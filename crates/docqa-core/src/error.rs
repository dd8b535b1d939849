use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A single PDF could not be opened or parsed. Absorbed by the extractor.
    #[error("Failed to read document {}: {reason}", path.display())]
    DocumentRead { path: PathBuf, reason: String },

    #[error("No valid document chunks could be created.")]
    EmptyCorpus,

    #[error("Embedding service failed: {0}")]
    EmbeddingService(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Snapshot storage failed: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No documents have been ingested in this session")]
    NotReady,
}

impl Error {
    /// Wrap a collaborator failure, keeping the full `anyhow` context chain.
    pub fn embedding(err: anyhow::Error) -> Self {
        Self::EmbeddingService(format!("{err:#}"))
    }

    pub fn generation(err: anyhow::Error) -> Self {
        Self::Generation(format!("{err:#}"))
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
