//! Gemini embedding client.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::config::EmbeddingSettings;
use docqa_core::traits::Embedder;

const TASK_DOCUMENT: &str = "RETRIEVAL_DOCUMENT";
const TASK_QUERY: &str = "RETRIEVAL_QUERY";

/// Blocking client for the `embedContent` / `batchEmbedContents` endpoints.
pub struct GeminiEmbedder {
    client: Client,
    base_url: String,
    model: String,
    id: String,
    batch_size: usize,
}

impl GeminiEmbedder {
    pub fn new(api_key: &str, settings: &EmbeddingSettings) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Gemini API key");
        anyhow::ensure!(!settings.model.trim().is_empty(), "missing embedding model name");
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key.trim()).context("invalid Gemini API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(Option::<Duration>::None)
            .default_headers(headers)
            .build()
            .context("failed to build Gemini HTTP client")?;
        let model = qualified_model(&settings.model);
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            id: format!("gemini:{model}"),
            model,
            batch_size: settings.batch_size.max(1),
        })
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}:{}", self.base_url, self.model, method)
    }

    fn post<B: Serialize>(&self, method: &str, body: &B) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint(method))
            .json(body)
            .send()
            .with_context(|| format!("failed to call Gemini {method}"))?;
        let status = resp.status();
        let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
        anyhow::ensure!(status.is_success(), "Gemini {} returned {}: {}", method, status, text);
        Ok(text)
    }

    fn request<'a>(&'a self, text: &'a str, task_type: &'a str) -> EmbedContentRequest<'a> {
        EmbedContentRequest {
            model: &self.model,
            content: Content { parts: vec![Part { text }] },
            task_type,
        }
    }
}

impl Embedder for GeminiEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let body = BatchEmbedRequest {
                requests: batch.iter().map(|t| self.request(t, TASK_DOCUMENT)).collect(),
            };
            let raw = self.post("batchEmbedContents", &body)?;
            let embedded = parse_batch_response(&raw)?;
            anyhow::ensure!(
                embedded.len() == batch.len(),
                "Gemini returned {} embeddings for {} inputs",
                embedded.len(),
                batch.len()
            );
            debug!("embedded batch of {}", batch.len());
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let raw = self.post("embedContent", &self.request(text, TASK_QUERY))?;
        parse_single_response(&raw)
    }
}

/// The REST paths expect `models/<name>`.
fn qualified_model(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") { model.to_string() } else { format!("models/{model}") }
}

pub(crate) fn parse_batch_response(raw: &str) -> Result<Vec<Vec<f32>>> {
    let parsed: BatchEmbedResponse =
        serde_json::from_str(raw).context("failed to parse Gemini batch embedding response")?;
    Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
}

pub(crate) fn parse_single_response(raw: &str) -> Result<Vec<f32>> {
    let parsed: EmbedContentResponse =
        serde_json::from_str(raw).context("failed to parse Gemini embedding response")?;
    Ok(parsed.embedding.values)
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: ContentEmbedding,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_names_are_qualified() {
        assert_eq!(qualified_model("embedding-001"), "models/embedding-001");
        assert_eq!(qualified_model("models/text-embedding-004"), "models/text-embedding-004");
    }

    #[test]
    fn request_uses_camel_case_task_type() {
        let settings = EmbeddingSettings {
            model: "embedding-001".into(),
            base_url: "http://localhost:9/v1beta/".into(),
            batch_size: 2,
        };
        let embedder = GeminiEmbedder::new("key", &settings).expect("client");
        let json = serde_json::to_value(embedder.request("hi", TASK_QUERY)).expect("json");
        assert_eq!(json["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(json["model"], "models/embedding-001");
        assert_eq!(json["content"]["parts"][0]["text"], "hi");
        assert_eq!(
            embedder.endpoint("embedContent"),
            "http://localhost:9/v1beta/models/embedding-001:embedContent"
        );
        assert_eq!(embedder.embedder_id(), "gemini:models/embedding-001");
    }

    #[test]
    fn parses_batch_and_single_responses() {
        let batch = r#"{"embeddings":[{"values":[0.1,0.2]},{"values":[0.3,0.4]}]}"#;
        assert_eq!(parse_batch_response(batch).expect("batch"), vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        let single = r#"{"embedding":{"values":[1.0,0.0,-1.0]}}"#;
        assert_eq!(parse_single_response(single).expect("single"), vec![1.0, 0.0, -1.0]);
        assert!(parse_single_response(r#"{"error":{"code":400}}"#).is_err());
    }

    #[test]
    fn empty_key_is_rejected() {
        let settings = docqa_core::config::Settings::default().embedding;
        assert!(GeminiEmbedder::new("  ", &settings).is_err());
    }
}
