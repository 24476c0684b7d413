//! Configuration management for omnigraph
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files. Secrets (the Neo4j password and the LLM API key)
//! are never written back out and fall back to the environment when a file
//! leaves them empty.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::llm::{LlmBackend, LlmConfig};
use crate::source::SourceConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Neo4j connection
    pub graph: GraphConfig,

    /// Language model backend
    pub llm: LlmConfig,

    /// Text acquisition
    pub source: SourceConfig,

    /// Liveness probe
    pub health: HealthConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Neo4j connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Bolt URI, e.g. `neo4j://localhost:7687`
    pub uri: String,

    pub user: String,

    #[serde(skip_serializing)]
    pub password: String,

    /// Database name; the server default when unset
    pub database: Option<String>,

    /// Connection pool size
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: String::from("neo4j://localhost:7687"),
            user: String::from("neo4j"),
            password: String::new(),
            database: None,
            max_connections: 4,
        }
    }
}

/// Liveness probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Seconds between pings
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30 * 60,
        }
    }
}

impl HealthConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let graph = GraphConfig {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.graph.uri),
            user: std::env::var("NEO4J_USER")
                .or_else(|_| std::env::var("NEO4J_USERNAME"))
                .unwrap_or(defaults.graph.user),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or_default(),
            database: std::env::var("NEO4J_DATABASE")
                .ok()
                .filter(|d| !d.trim().is_empty()),
            max_connections: env_parse("NEO4J_MAX_CONNECTIONS")
                .unwrap_or(defaults.graph.max_connections),
        };

        let llm = LlmConfig::from_env().context("Invalid LLM configuration")?;

        let source = SourceConfig {
            chunk_size: env_parse("OMNIGRAPH_CHUNK_SIZE").unwrap_or(defaults.source.chunk_size),
            timeout_secs: env_parse("OMNIGRAPH_FETCH_TIMEOUT")
                .unwrap_or(defaults.source.timeout_secs),
            user_agent: std::env::var("OMNIGRAPH_USER_AGENT")
                .unwrap_or(defaults.source.user_agent),
        };

        let health = HealthConfig {
            interval_secs: env_parse("OMNIGRAPH_HEALTH_INTERVAL")
                .unwrap_or(defaults.health.interval_secs),
        };

        let logging = LoggingConfig {
            level: std::env::var("OMNIGRAPH_LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: std::env::var("OMNIGRAPH_LOG_FORMAT").unwrap_or(defaults.logging.format),
        };

        Ok(Self {
            graph,
            llm,
            source,
            health,
            logging,
        })
    }

    /// Load configuration from a TOML file, taking secrets the file omits
    /// from the environment
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        if config.graph.password.is_empty() {
            config.graph.password = std::env::var("NEO4J_PASSWORD").unwrap_or_default();
        }
        if config.llm.api_key.is_none() {
            config.llm.api_key = std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .ok()
                .filter(|k| !k.trim().is_empty());
        }

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.graph.uri.trim().is_empty() {
            anyhow::bail!("graph.uri must not be empty");
        }

        if self.graph.max_connections == 0 {
            anyhow::bail!("graph.max_connections must be greater than 0");
        }

        if self.llm.model.trim().is_empty() {
            anyhow::bail!("llm.model must not be empty");
        }

        if self.llm.backend == LlmBackend::OpenAiCompatible && self.llm.api_key.is_none() {
            anyhow::bail!("llm.api_key (or GROQ_API_KEY) is required for the openai backend");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0.0 and 2.0");
        }

        if self.source.chunk_size == 0 {
            anyhow::bail!("source.chunk_size must be greater than 0");
        }

        if self.health.interval_secs == 0 {
            anyhow::bail!("health.interval_secs must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }
}
