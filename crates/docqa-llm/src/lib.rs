//! Generation collaborators: the Gemini HTTP client and a scripted stub
//! selected with `APP_USE_FAKE_LLM=1`.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use docqa_core::config::GenerationSettings;
use docqa_core::traits::Generator;

mod fake;
mod gemini;

pub use fake::FakeGenerator;
pub use gemini::GeminiGenerator;

pub fn use_fake_llm() -> bool {
    std::env::var("APP_USE_FAKE_LLM")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn default_generator(settings: &GenerationSettings, api_key: Option<&str>) -> Result<Arc<dyn Generator>> {
    if use_fake_llm() {
        info!("Using FakeGenerator");
        return Ok(Arc::new(FakeGenerator::default()));
    }
    let key = api_key.ok_or_else(|| anyhow::anyhow!("a Gemini API key is required for generation"))?;
    info!("Using Gemini generation ({}, temperature {})", settings.model, settings.temperature);
    Ok(Arc::new(GeminiGenerator::new(key, settings)?))
}
