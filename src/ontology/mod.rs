//! Knowledge graph extraction and question answering
//!
//! This module turns free text into `(subject, relation, object)` facts and
//! answers questions over them.
//!
//! # Pipeline
//!
//! ```text
//! chunk -> FactExtractor -> FactParser -> GraphWriter -> GraphStore
//! question -> QueryTranslator -> QueryExecutor -> GraphStore -> values
//! ```
//!
//! # Submodules
//!
//! - [`sanitize`] - relation labels to edge-type identifiers
//! - [`literal`] - strict list literal grammar for model output
//! - [`parser`] - model output to triples and alias hints
//! - [`writer`] - merge triples and aliases into the store, reset
//! - [`extractor`] - prompt, model call, parse and write for one chunk
//! - [`translator`] - question to Cypher through the model
//! - [`executor`] - run a query and project the first column
//! - [`prompt`] - Handlebars prompt templates
//! - [`error`] - error types for this pipeline
//!
//! # Quick Start
//!
//! ```ignore
//! use omnigraph::graph::{GraphStore, MemoryGraph};
//! use omnigraph::ontology::{FactExtractor, GraphWriter, QueryExecutor, QueryTranslator};
//!
//! let store: Arc<dyn GraphStore> = Arc::new(MemoryGraph::new());
//! let extractor = FactExtractor::new(model.clone(), GraphWriter::new(Some(store.clone())))?;
//! extractor.extract("Apple Inc. was founded by Steve Jobs.").await?;
//!
//! let query = QueryTranslator::new(model)?.translate("Who founded Apple Inc.?").await?;
//! let outcome = QueryExecutor::new(Some(store)).execute(&query).await;
//! println!("{:?}", outcome.values());
//! ```

pub mod error;
pub mod executor;
pub mod extractor;
pub mod literal;
pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod translator;
pub mod writer;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use error::{OntologyError, OntologyResult};
pub use executor::{QueryExecutor, QueryOutcome};
pub use extractor::{ExtractionReport, FactExtractor, ParseSummary};
pub use parser::{FactParser, ParseOutcome};
pub use prompt::{PromptTemplates, DIRECTION_RULES, RELATION_VOCABULARY};
pub use sanitize::{is_valid_identifier, sanitize_relation, ALIAS_OF};
pub use translator::{clean_cypher, QueryTranslator};
pub use writer::{GraphWriter, WriteOutcome};

/// One extracted fact. The relation is kept as the model wrote it and is
/// sanitized only when written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

/// Canonical entity name to its alternative names
pub type AliasMap = BTreeMap<String, Vec<String>>;
