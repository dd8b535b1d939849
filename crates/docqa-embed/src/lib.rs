//! Embedding collaborators: the Gemini HTTP client and a deterministic
//! hashing stub selected with `APP_USE_FAKE_EMBEDDINGS=1`.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;

mod gemini;
mod hash;

pub use gemini::GeminiEmbedder;
pub use hash::HashEmbedder;

pub const FAKE_EMBEDDING_DIM: usize = 256;

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Build the configured embedder. The API key is only required for the
/// network-backed client.
pub fn default_embedder(settings: &EmbeddingSettings, api_key: Option<&str>) -> Result<Arc<dyn Embedder>> {
    if use_fake_embeddings() {
        info!("Using HashEmbedder (d{})", FAKE_EMBEDDING_DIM);
        return Ok(Arc::new(HashEmbedder::new(FAKE_EMBEDDING_DIM)));
    }
    let key = api_key.ok_or_else(|| anyhow::anyhow!("a Gemini API key is required for embeddings"))?;
    info!("Using Gemini embeddings ({})", settings.model);
    Ok(Arc::new(GeminiEmbedder::new(key, settings)?))
}
