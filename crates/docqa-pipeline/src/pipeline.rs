use std::sync::Arc;

use tracing::{debug, info};

use docqa_core::traits::Generator;
use docqa_core::{Error, Result, RetrievedChunk};
use docqa_vector::VectorIndex;

use crate::confidence::score;
use crate::prompt::{build_prompt, format_context};

pub const NO_RELEVANT_INFORMATION: &str =
    "I am sorry, I could not find any relevant information in the documents to answer your question.";

const PREVIEW_CHARS: usize = 200;

/// Retrieval, prompt assembly, generation and citation formatting.
pub struct RagPipeline {
    index: VectorIndex,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

impl RagPipeline {
    pub fn new(index: VectorIndex, generator: Arc<dyn Generator>, top_k: usize) -> Self {
        Self { index, generator, top_k }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn answer_question(&self, question: &str) -> Result<String> {
        let retrieved = self.index.query(question, self.top_k)?;
        if retrieved.is_empty() {
            info!("No chunks retrieved for question");
            return Ok(NO_RELEVANT_INFORMATION.to_string());
        }
        debug!("Retrieved {} chunks", retrieved.len());

        let context = format_context(&retrieved);
        let prompt = build_prompt(&context, question);
        let response = self.generator.generate(&prompt).map_err(Error::generation)?;

        Ok(format!("{}\n\n**Sources and Context:**\n{}", response, source_info_with_scores(&retrieved)))
    }
}

/// Citation lines with a confidence score for each retrieved chunk.
pub fn source_info_with_scores(retrieved: &[RetrievedChunk]) -> String {
    let mut lines = Vec::with_capacity(retrieved.len() * 4);
    for r in retrieved {
        let confidence = score(r.rank, r.chunk.char_len(), r.chunk.page_number);
        let preview: String = r.chunk.text.chars().take(PREVIEW_CHARS).collect();
        lines.push(format!("• **Source {}**: {}", r.rank, r.chunk.source_name));
        lines.push(format!("  - **Page**: {}", r.chunk.page_number));
        lines.push(format!("  - **Confidence**: {}% ({})", confidence.percent, confidence.level));
        lines.push(format!("  - **Content Preview**: {preview}..."));
    }
    lines.join("\n")
}
