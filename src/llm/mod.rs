//! LLM client for triple extraction and query translation
//!
//! The pipeline only needs "prompt in, text out", expressed by the
//! [`LanguageModel`] trait. [`LlmClient`] implements it over HTTP for two
//! backends:
//!
//! - **Ollama** (`POST {endpoint}/api/generate`, non-streaming)
//! - **OpenAI-compatible** chat completions (`POST {endpoint}/chat/completions`),
//!   which covers Groq, OpenAI and most hosted gateways
//!
//! [`ScriptedModel`] replays canned responses and never touches the network.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::Duration;

/// Default Groq endpoint for the OpenAI-compatible backend
pub const GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1";

/// Errors raised while talking to a language model
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response is empty")]
    EmptyResponse,

    #[error("Unknown LLM backend: '{0}'")]
    UnknownBackend(String),

    #[error("LLM backend '{0}' requires an API key")]
    MissingApiKey(LlmBackend),
}

impl LlmError {
    /// Transport failures and rate limits are worth retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// A text-completion model: one prompt in, one response out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Which wire protocol the client speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmBackend {
    Ollama,
    #[serde(rename = "openai")]
    OpenAiCompatible,
}

impl fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmBackend::Ollama => write!(f, "ollama"),
            LlmBackend::OpenAiCompatible => write!(f, "openai"),
        }
    }
}

impl FromStr for LlmBackend {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmBackend::Ollama),
            "openai" | "openai-compatible" | "groq" => Ok(LlmBackend::OpenAiCompatible),
            other => Err(LlmError::UnknownBackend(other.to_string())),
        }
    }
}

/// Configuration for LLM client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Wire protocol
    pub backend: LlmBackend,

    /// Base URL (Ollama root, or the `/v1` root of an OpenAI-compatible API)
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Bearer token for OpenAI-compatible backends
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature for generation (0.0 - 1.0)
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: LlmBackend::Ollama,
            endpoint: "http://localhost:11434".to_string(),
            model: "gemma2:9b".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: 2048,
            temperature: 0.0,
        }
    }
}

impl LlmConfig {
    /// Config for Groq's OpenAI-compatible API
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self {
            backend: LlmBackend::OpenAiCompatible,
            endpoint: GROQ_ENDPOINT.to_string(),
            model: "gemma2-9b-it".to_string(),
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Create config from environment variables
    ///
    /// `LLM_BACKEND` picks the protocol. When it is unset, a `GROQ_API_KEY`
    /// selects Groq and anything else falls back to a local Ollama.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("LLM_API_KEY")
            .or_else(|_| std::env::var("GROQ_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());

        let backend = match std::env::var("LLM_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) if api_key.is_some() => LlmBackend::OpenAiCompatible,
            Err(_) => LlmBackend::Ollama,
        };

        let mut config = match backend {
            LlmBackend::Ollama => Self {
                endpoint: std::env::var("OLLAMA_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:11434".to_string()),
                model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "gemma2:9b".to_string()),
                ..Self::default()
            },
            LlmBackend::OpenAiCompatible => Self::groq(String::new()),
        };
        config.api_key = api_key;

        if let Ok(endpoint) = std::env::var("LLM_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.model = model;
        }
        config.timeout_secs = std::env::var("LLM_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.timeout_secs);
        config.max_tokens = std::env::var("LLM_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.max_tokens);
        config.temperature = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(config.temperature);

        Ok(config)
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Ollama generation options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama generate response
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP language model client
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with custom config
    pub fn with_config(config: LlmConfig) -> Result<Self, LlmError> {
        if config.backend == LlmBackend::OpenAiCompatible && config.api_key.is_none() {
            return Err(LlmError::MissingApiKey(config.backend));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, LlmError> {
        Self::with_config(LlmConfig::from_env()?)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Check if the backend answers at all
    pub async fn is_available(&self) -> bool {
        let url = match self.config.backend {
            LlmBackend::Ollama => format!("{}/api/tags", self.endpoint()),
            LlmBackend::OpenAiCompatible => format!("{}/models", self.endpoint()),
        };
        let mut request = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        request
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    /// Generate text using Ollama
    async fn generate_ollama(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint());

        let request = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = check_status(response).await?;
        let body: OllamaResponse = response.json().await?;
        Ok(body.response)
    }

    /// Generate text using an OpenAI-compatible chat completion
    async fn generate_chat(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint());

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = check_status(builder.send().await?).await?;
        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(
            backend = %self.config.backend,
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Sending prompt to LLM"
        );

        let text = match self.config.backend {
            LlmBackend::Ollama => self.generate_ollama(prompt).await?,
            LlmBackend::OpenAiCompatible => self.generate_chat(prompt).await?,
        };

        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Language model that replays queued responses in order.
///
/// Prompts are recorded so callers can inspect what was sent. Once the queue
/// is drained every call returns [`LlmError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedModel {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .ok_or(LlmError::EmptyResponse)
    }
}
