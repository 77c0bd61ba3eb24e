//! Gemini client over the generateContent HTTP API.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::llm::ModelClient;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, api_base: Option<&str>, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base
                .unwrap_or(GEMINI_API_BASE)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );

        let request = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
        });

        debug!("calling Gemini model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        let raw_body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Provider(format!(
                "Gemini API error {}: {}",
                status, raw_body
            )));
        }

        let resp: GenerateResponse = serde_json::from_str(&raw_body).map_err(|e| {
            Error::Provider(format!(
                "failed to parse Gemini response: {}. Body: {}",
                e,
                &raw_body[..raw_body.len().min(500)]
            ))
        })?;

        let candidate = resp
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| Error::Provider("no candidates in Gemini response".to_string()))?;

        let text_parts: Vec<String> = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text_parts.iter().all(|t| t.is_empty()) {
            return Err(Error::Provider(
                "Gemini returned an empty completion".to_string(),
            ));
        }

        Ok(text_parts.join("\n"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}
