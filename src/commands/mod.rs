//! CLI command implementations

mod maintenance;
mod session;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use omnigraph::config::Config;
use omnigraph::graph::{GraphStore, MemoryGraph, Neo4jStore};
use omnigraph::llm::{LanguageModel, LlmClient};
use omnigraph::source::TextSource;

pub use maintenance::{ping, reset, watch};
pub use session::{ask, build, BuildSource};

/// Load configuration from `path`, or from the environment when absent
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Process-wide resources shared by every command
pub struct AppContext {
    pub config: Config,
    /// `None` when the store could not be reached; commands report it as a
    /// configuration error instead of exiting here
    pub store: Option<Arc<dyn GraphStore>>,
}

impl AppContext {
    pub async fn new(config: Config, in_memory: bool) -> Result<Self> {
        let store: Option<Arc<dyn GraphStore>> = if in_memory {
            tracing::info!("Using in-memory graph; nothing is persisted");
            Some(Arc::new(MemoryGraph::new()))
        } else {
            match Neo4jStore::connect(&config.graph).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    tracing::error!(uri = %config.graph.uri, error = %e, "Neo4j is not reachable");
                    None
                }
            }
        };

        Ok(Self { config, store })
    }

    /// Language model client; built on demand so store-only commands work
    /// without LLM credentials
    pub fn model(&self) -> Result<Arc<dyn LanguageModel>> {
        let client = LlmClient::with_config(self.config.llm.clone())
            .context("Failed to create LLM client")?;
        tracing::debug!(
            backend = %self.config.llm.backend,
            model = %self.config.llm.model,
            "LLM client ready"
        );
        Ok(Arc::new(client))
    }

    pub fn text_source(&self) -> Result<TextSource> {
        TextSource::with_config(self.config.source.clone()).context("Failed to create HTTP client")
    }
}
