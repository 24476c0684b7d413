//! omnigraph - Knowledge graph builder with natural-language querying
//!
//! Turns unstructured text into `(subject, relation, object)` facts with a
//! language model, merges them into a Neo4j property graph, and answers
//! questions by translating them into Cypher.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`graph`] - Graph store trait with Neo4j and in-memory implementations
//! - [`llm`] - Language model clients (Ollama, OpenAI-compatible)
//! - [`ontology`] - Triple extraction, graph writes, question translation
//! - [`source`] - Text acquisition and chunking
//! - [`service`] - Validate, reset, build and ask workflow
//! - [`health`] - Periodic graph store liveness probe
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use omnigraph::config::Config;
//! use omnigraph::graph::{GraphStore, Neo4jStore};
//! use omnigraph::llm::LlmClient;
//! use omnigraph::service::{GraphService, Input};
//! use omnigraph::source::TextSource;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store: Arc<dyn GraphStore> = Arc::new(Neo4jStore::connect(&config.graph).await?);
//!     let model = Arc::new(LlmClient::with_config(config.llm.clone())?);
//!     let source = TextSource::with_config(config.source.clone())?;
//!
//!     let mut service = GraphService::new(model, Some(store), source)?;
//!     service.prepare(&Input::Text("Apple Inc. was founded by Steve Jobs in 1976.".into())).await?;
//!     service.build().await?;
//!     let answer = service.ask("Who founded Apple Inc.?").await?;
//!     println!("{}", answer.status());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod health;
pub mod llm;
pub mod ontology;
pub mod service;
pub mod source;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, OmnigraphErrorTrait, Result};
    pub use crate::graph::{GraphStore, MemoryGraph, Neo4jStore};
    pub use crate::llm::{LanguageModel, LlmClient};
    pub use crate::ontology::{QueryOutcome, Triple};
    pub use crate::service::{GraphService, Input, Status};
}

// Direct re-exports for convenience
pub use ontology::{sanitize_relation, AliasMap, Triple};
