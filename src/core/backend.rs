//! Upstream structured-completion backends

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::CompletionRequest;

/// A service able to answer a schema-constrained completion request.
///
/// Implementations return the raw response text (`None` when the service
/// answered without any), or an error carrying the transport status code
/// when one is available.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Option<String>>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: SystemInstruction<'a>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Gemini `generateContent` over HTTPS
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(config: &TranslatorConfig) -> Result<Self> {
        Self::new(config.api_endpoint.clone(), config.timeout())
    }

    fn url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }
}

fn request_body(request: &CompletionRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: &request.prompt }],
        }],
        system_instruction: SystemInstruction {
            parts: vec![Part { text: &request.system_instruction }],
        },
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: &request.response_schema,
        },
    }
}

/// Concatenated text of the first candidate, `None` if there is none
fn extract_text(body: &str) -> Result<Option<String>> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| TranslationError::MalformedResponse {
            message: format!("unexpected response envelope: {}", e),
        })?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    Ok(if text.trim().is_empty() { None } else { Some(text) })
}

/// Error for a non-success HTTP answer
fn error_from_response(status: u16, body: &str) -> TranslationError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let ErrorBody { code, message, status: api_status } = envelope.error;
            match (api_status, code) {
                (Some(api_status), _) => format!("{} {}: {}", status, api_status, message),
                (None, Some(code)) if code != status => format!("{} ({}): {}", status, code, message),
                _ => format!("{}: {}", status, message),
            }
        }
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => format!("HTTP {}: {}", status, body.trim()),
    };

    TranslationError::from_status(Some(status), message)
}

#[async_trait]
impl CompletionBackend for GeminiBackend {
    async fn complete(&self, api_key: &str, request: &CompletionRequest) -> Result<Option<String>> {
        let url = self.url(&request.model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            extract_text(&body)
        } else {
            Err(error_from_response(status.as_u16(), &body))
        }
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
