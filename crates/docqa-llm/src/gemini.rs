//! Gemini `generateContent` client.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use docqa_core::config::GenerationSettings;
use docqa_core::traits::Generator;

pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    temperature: f32,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, settings: &GenerationSettings) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Gemini API key");
        anyhow::ensure!(!settings.model.trim().is_empty(), "missing generation model name");
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
        let model = settings.model.trim().trim_start_matches("models/");
        let endpoint = format!("{}/models/{}:generateContent", settings.base_url.trim_end_matches('/'), model);
        Ok(Self { client, endpoint, temperature: settings.temperature })
    }

    pub fn endpoint(&self) -> &str { &self.endpoint }

    fn body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![RequestContent { role: "user", parts: vec![RequestPart { text: prompt }] }],
            generation_config: GenerationConfig { temperature: self.temperature },
        }
    }
}

impl Generator for GeminiGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.body(prompt))
            .send()
            .context("failed to call Gemini generateContent")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Gemini returned {}: {}", status, text);
        }
        let raw = resp.text().context("failed to read Gemini response")?;
        parse_response(&raw)
    }
}

pub(crate) fn parse_response(raw: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(raw).context("failed to parse Gemini response")?;
    let answer = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect::<Vec<_>>().join(""))
        .unwrap_or_default();
    if answer.is_empty() {
        bail!("Gemini response missing text content");
    }
    Ok(answer)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}
