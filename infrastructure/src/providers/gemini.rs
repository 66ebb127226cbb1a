//! Gemini generative-language adapter
//!
//! Implements the `LanguageModel` port over the generativelanguage
//! `generateContent` REST endpoint. Credentials come from the config file or
//! the `GEMINI_API_KEY` environment variable; without a key the constructor
//! returns `None` and every caller runs on its deterministic fallback.

use crate::config::file_config::FileModelConfig;
use advisor_application::ports::language_model::{LanguageModel, LanguageModelError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

pub struct GeminiLanguageModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiLanguageModel {
    /// Create the adapter from configuration.
    ///
    /// Returns `None` when no API key is configured anywhere; the engine
    /// then runs entirely on keyword routing and deterministic synthesis.
    pub fn try_new(config: &FileModelConfig) -> Option<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        match api_key {
            Some(api_key) => {
                info!(model = %config.model, "Gemini language model initialized");
                Some(Self {
                    client: reqwest::Client::new(),
                    api_key,
                    model: config.model.clone(),
                    temperature: config.temperature,
                    max_output_tokens: config.max_output_tokens,
                })
            }
            None => {
                warn!("no Gemini API key configured, running without a language model");
                None
            }
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.model)
    }

    /// Pull the generated text out of a `generateContent` response body
    fn extract_text(body: &Value) -> Option<String> {
        let parts = body
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;
        let text = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("");
        (!text.trim().is_empty()).then_some(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiLanguageModel {
    async fn generate(&self, prompt: &str) -> Result<String, LanguageModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "Gemini request");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LanguageModelError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LanguageModelError::RequestFailed(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LanguageModelError::RequestFailed(e.to_string()))?;

        Self::extract_text(&body).ok_or(LanguageModelError::EmptyResponse)
    }
}
