// src/llm_extract.rs

use crate::config::{LlmBackend, LlmSection};
use crate::error::{CompletionError, ReportError};
use crate::normalizer::{self, NormalizedReport};
use crate::prompt;
use crate::response_parser;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// A black-box text completion service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one system + user exchange and return the answer text.
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError>;
}

/// Resolved endpoint configuration ready to make API calls.
#[derive(Debug, Clone)]
pub struct ResolvedEndpoint {
    pub base_url: String,
    pub model: String,
    /// `None` when the remote key variable is unset; requests then fail
    /// with [`CompletionError::MissingApiKey`].
    pub api_key: Option<String>,
    pub api_key_env: String,
}

/// Resolve the LLM config section into a concrete endpoint. Runs once at
/// startup; nothing reads the environment per request.
pub fn resolve_endpoint(llm: &LlmSection) -> ResolvedEndpoint {
    match llm.backend {
        LlmBackend::Ollama => {
            info!(
                url = %llm.ollama.base_url,
                model = %llm.ollama.model,
                "Using Ollama (local) backend"
            );
            ResolvedEndpoint {
                base_url: llm.ollama.base_url.clone(),
                model: llm.ollama.model.clone(),
                api_key: Some("ollama".to_string()), // required by API but ignored
                api_key_env: String::new(),
            }
        }
        LlmBackend::Remote => {
            let api_key = std::env::var(&llm.remote.api_key_env).ok();
            if api_key.is_none() {
                warn!(
                    var = %llm.remote.api_key_env,
                    "API key not set, extraction requests will fail"
                );
            }
            info!(
                url = %llm.remote.base_url,
                model = %llm.remote.model,
                "Using remote API backend"
            );
            ResolvedEndpoint {
                base_url: llm.remote.base_url.clone(),
                model: llm.remote.model.clone(),
                api_key,
                api_key_env: llm.remote.api_key_env.clone(),
            }
        }
    }
}

/// Check if the Ollama server is reachable.
pub async fn check_ollama_health(client: &Client, base_url: &str) -> bool {
    // Ollama's health endpoint is at the root (not under /v1)
    let health_url = base_url.trim_end_matches('/').trim_end_matches("/v1");

    match client
        .get(health_url)
        .timeout(std::time::Duration::from_secs(3))
        .send()
        .await
    {
        Ok(resp) => {
            if resp.status().is_success() {
                info!("Ollama server is reachable");
                true
            } else {
                warn!(status = %resp.status(), "Ollama server returned non-OK status");
                false
            }
        }
        Err(e) => {
            warn!(error = %e, "Ollama server not reachable");
            false
        }
    }
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionClient {
    client: Client,
    endpoint: ResolvedEndpoint,
}

impl ChatCompletionClient {
    pub fn new(client: Client, endpoint: ResolvedEndpoint) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl CompletionService for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let api_key = self
            .endpoint
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::MissingApiKey(self.endpoint.api_key_env.clone()))?;

        let request = ChatRequest {
            model: self.endpoint.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let url = format!("{}/chat/completions", self.endpoint.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        info!(status = %status, bytes = body.len(), model = %self.endpoint.model, "Completion response");
        debug!(body = %body, "Raw completion body");

        answer_text(status, &body)
    }
}

/// Pull the first choice's content out of a completion body. Any body
/// without `choices` is treated as an API error, whatever the status.
fn answer_text(status: StatusCode, body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|_| CompletionError::Malformed {
            status: status.as_u16(),
            body: body.to_string(),
        })?;

    match parsed.choices {
        Some(choices) => choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CompletionError::Api("response contained no choices".to_string())),
        None => Err(CompletionError::Api(
            parsed
                .error
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string()),
        )),
    }
}

/// Outcome of one free-text extraction.
#[derive(Debug)]
pub struct Extraction {
    pub normalized: Result<NormalizedReport, ReportError>,
    /// Upstream failure, for display next to the (default) report.
    pub upstream_error: Option<String>,
}

/// Ask the completion service for a report and normalize whatever comes
/// back. Upstream and decode failures degrade to the default report.
pub async fn extract_report(service: &dyn CompletionService, user_input: &str) -> Extraction {
    let user_prompt = prompt::build_extraction_prompt(user_input);

    let (answer, upstream_error) = match service.complete(prompt::SYSTEM_PROMPT, &user_prompt).await
    {
        Ok(text) => (text, None),
        Err(e) => {
            warn!(error = %e, "Completion request failed");
            let message = e.to_string();
            (message.clone(), Some(message))
        }
    };

    let decoded = response_parser::parse_response(&answer).ok();
    Extraction {
        normalized: normalizer::normalize(decoded),
        upstream_error,
    }
}
