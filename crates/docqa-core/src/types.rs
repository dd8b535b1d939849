//! Domain types shared by the extractor, the vector index and the pipeline.

use serde::{Deserialize, Serialize};

/// A window of text cut from exactly one PDF page.
///
/// - `text`: the window payload
/// - `source_name`: base filename of the owning document
/// - `page_number`: 1-indexed physical page the window came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_name: String,
    pub page_number: u32,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source_name: impl Into<String>, page_number: u32) -> Self {
        Self { text: text.into(), source_name: source_name.into(), page_number }
    }

    /// Length in characters, the unit used by the splitter and by confidence scoring.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// One entry of a retrieval result. `rank` starts at 1; `similarity` is cosine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub rank: usize,
    pub chunk: Chunk,
    pub similarity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of a session's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}
