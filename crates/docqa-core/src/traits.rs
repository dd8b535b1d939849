use std::path::Path;

/// Turns text into fixed-dimension vectors. Implementations must return
/// vectors in the same order as their inputs.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `gemini:models/embedding-001`).
    fn embedder_id(&self) -> &str;

    /// Embed a batch of document texts.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single query text. Providers that distinguish query and
    /// document embeddings override this.
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Produces an answer for a fully composed prompt.
pub trait Generator: Send + Sync {
    fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Extracts plain text per page, in physical page order.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>>;
}

