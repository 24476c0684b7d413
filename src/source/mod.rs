//! Text acquisition: typed text, local files and web pages
//!
//! Every source yields a list of chunks no longer than the configured chunk
//! size, split on spaces so words stay whole.

use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use crate::utils::{char_boundary, normalize_whitespace};

/// Default maximum chunk length in characters
pub const DEFAULT_CHUNK_SIZE: usize = 3000;

/// Desktop browser User-Agent; many sites refuse the reqwest default
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// Errors raised while acquiring text
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

impl SourceError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            SourceError::Http(e) => e.is_timeout() || e.is_connect(),
            SourceError::Status { status, .. } => *status == 429 || *status >= 500,
            SourceError::Io(_) | SourceError::InvalidUrl(_) => false,
        }
    }
}

/// Text source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// HTTP timeout for URL sources, in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout_secs: 30,
            user_agent: DESKTOP_USER_AGENT.to_string(),
        }
    }
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Each split happens at the last space inside the window, or hard at
/// `max_len` when the window has none. Chunks are trimmed; empty chunks are
/// dropped.
pub fn chunk_text(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_len {
        let window_end = char_boundary(rest, max_len);
        let split = match rest[..window_end].rfind(' ') {
            Some(pos) if pos > 0 => pos,
            _ => window_end,
        };
        let chunk = rest[..split].trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        rest = rest[split..].trim();
    }

    let tail = rest.trim();
    if !tail.is_empty() {
        chunks.push(tail.to_string());
    }
    chunks
}

/// Heuristic check for input too thin to extract anything from.
///
/// True when the trimmed text has fewer than five words, is at most ten
/// letters and spaces, or uses fewer than five distinct characters.
pub fn is_gibberish(text: &str) -> bool {
    static SHORT_LETTERS_RE: OnceLock<Regex> = OnceLock::new();
    let short_letters =
        SHORT_LETTERS_RE.get_or_init(|| Regex::new(r"^[a-zA-Z\s]{0,10}$").expect("Invalid regex pattern"));

    let text = text.trim();
    if text.split_whitespace().count() < 5 {
        return true;
    }
    if short_letters.is_match(text) {
        return true;
    }
    let mut distinct: Vec<char> = text.chars().collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() < 5
}

fn paragraph_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("p").expect("Invalid CSS selector"))
}

/// Text of every `<p>` element, joined by single spaces
pub fn paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(paragraph_selector())
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Acquires text and splits it into chunks
pub struct TextSource {
    client: Client,
    config: SourceConfig,
}

impl TextSource {
    pub fn new() -> Result<Self, SourceError> {
        Self::with_config(SourceConfig::default())
    }

    pub fn with_config(config: SourceConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        if let Ok(agent) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, agent);
        } else {
            tracing::warn!(user_agent = %config.user_agent, "Invalid User-Agent, using default");
            headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_USER_AGENT));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .gzip(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Typed text is taken as one chunk
    pub fn from_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            Vec::new()
        } else {
            vec![text.to_string()]
        }
    }

    /// Read a UTF-8 file and chunk it
    pub async fn from_file(&self, path: impl AsRef<Path>) -> Result<Vec<String>, SourceError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let chunks = chunk_text(&content, self.config.chunk_size);
        tracing::info!(path = %path.display(), chunks = chunks.len(), "Read text file");
        Ok(chunks)
    }

    /// Fetch a web page and chunk the text of its paragraphs
    pub async fn from_url(&self, url: &str) -> Result<Vec<String>, SourceError> {
        let parsed = url::Url::parse(url).map_err(|_| SourceError::InvalidUrl(url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(parsed).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            tracing::warn!(url, status = status.as_u16(), "Failed to fetch URL");
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let text = paragraph_text(&html);
        let chunks = chunk_text(&text, self.config.chunk_size);
        tracing::info!(url, chunks = chunks.len(), "Extracted text from URL");
        Ok(chunks)
    }
}
