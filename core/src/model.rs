//! Hosted generative model client.
//!
//! The engine only needs "send prompt, receive text, may fail", so callers
//! depend on the `GenerativeModel` trait. `GeminiClient` is the shipped
//! HTTP implementation: one request, one bounded timeout, no retries.

use crate::{
    config::AppConfig,
    error::{RecError, RecResult},
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub trait GenerativeModel: Send + Sync {
    /// Stable name for logs and health reports.
    fn name(&self) -> &str;

    /// Send one prompt and return the model's text reply.
    fn generate(&self, prompt: &str) -> RecResult<String>;
}

// ── Gemini wire types ─────────────────────────────────────────────

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

// ── Client ────────────────────────────────────────────────────────

pub struct GeminiClient {
    http:        reqwest::blocking::Client,
    base_url:    String,
    model:       String,
    api_key:     String,
    timeout:     Duration,
    temperature: Option<f64>,
}

impl GeminiClient {
    /// Build a client from configuration. Fails when no API key is available.
    pub fn from_config(config: &AppConfig) -> RecResult<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            RecError::InvalidInput(format!(
                "no API key configured (set model.api_key or {})",
                crate::config::API_KEY_ENV
            ))
        })?;
        let timeout = Duration::from_secs(config.model.timeout_secs);
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecError::ExternalService(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.model.base_url.trim_end_matches('/').to_string(),
            model: config.model.model.trim().to_string(),
            api_key,
            timeout,
            temperature: config.model.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> RecError {
        if e.is_timeout() {
            RecError::Timeout {
                seconds: self.timeout.as_secs(),
            }
        } else {
            RecError::ExternalService(format!("request failed: {e}"))
        }
    }
}

/// First non-empty candidate text in a Gemini reply body.
fn extract_text(body: &str) -> RecResult<String> {
    let reply: GeminiResponse = serde_json::from_str(body)
        .map_err(|e| RecError::ExternalService(format!("malformed model reply: {e}")))?;
    reply
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .map(|p| p.text)
        .find(|t| !t.trim().is_empty())
        .ok_or_else(|| RecError::ExternalService("model reply contained no text".to_string()))
}

impl GenerativeModel for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> RecResult<String> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: self.temperature.map(|temperature| GenerationConfig { temperature }),
        };

        let started = Instant::now();
        debug!("POST {} ({} prompt chars)", self.endpoint(), prompt.len());
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let text = response.text().map_err(|e| self.map_transport_error(e))?;
        if !status.is_success() {
            return Err(RecError::ExternalService(format!("API error ({status}): {text}")));
        }

        let reply = extract_text(&text)?;
        info!(
            "model {} replied with {} chars in {:.1}s",
            self.model,
            reply.len(),
            started.elapsed().as_secs_f64()
        );
        Ok(reply)
    }
}
