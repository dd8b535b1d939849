//! Prompt assembly for the answering model.

use docqa_core::RetrievedChunk;

const TEMPLATE: &str = "You are a helpful assistant. Use the following context to answer the question at the end.
If you don't know the answer, just say that you don't know, don't try to make up an answer.

Context:
{context}

Question:
{question}

Instructions:
1. Provide a detailed and accurate answer based ONLY on the provided context.
2. When referencing information, mention which source and page it comes from.
3. If the context doesn't contain enough information, say so clearly.
4. Keep your answer concise but comprehensive.

Answer:
";

/// One citation block per retrieved chunk, separated by `---` lines.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|r| {
            format!(
                "Source {}:\nFile: {}\nPage: {}\nContent:\n{}\n",
                r.rank, r.chunk.source_name, r.chunk.page_number, r.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

pub fn build_prompt(context: &str, question: &str) -> String {
    // Substitute the question last so braces inside the context stay literal.
    let (head, tail) = TEMPLATE.split_once("{question}").unwrap_or((TEMPLATE, ""));
    let head = head.replacen("{context}", context, 1);
    format!("{head}{question}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docqa_core::Chunk;

    fn hit(rank: usize, text: &str, source: &str, page: u32) -> RetrievedChunk {
        RetrievedChunk { rank, chunk: Chunk::new(text, source, page), similarity: 0.5 }
    }

    #[test]
    fn context_lists_sources_in_rank_order() {
        let ctx = format_context(&[hit(1, "Boil water.", "water.pdf", 3), hit(2, "Use tinder.", "fire.pdf", 1)]);
        assert_eq!(
            ctx,
            "Source 1:\nFile: water.pdf\nPage: 3\nContent:\nBoil water.\n\n---\nSource 2:\nFile: fire.pdf\nPage: 1\nContent:\nUse tinder.\n"
        );
    }

    #[test]
    fn prompt_keeps_question_verbatim() {
        let prompt = build_prompt("ctx {question}", "What is {context}?");
        assert!(prompt.contains("Context:\nctx {question}\n\nQuestion:\nWhat is {context}?\n\nInstructions:"));
        assert!(prompt.starts_with("You are a helpful assistant."));
        assert!(prompt.ends_with("Answer:\n"));
    }
}
