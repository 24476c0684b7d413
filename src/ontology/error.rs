//! Error types for the extraction and question-answering pipeline
//!
//! Malformed model output is not an error here: the fact parser reports it
//! through [`ParseOutcome::Failed`](super::ParseOutcome) and the executor
//! through [`QueryOutcome::Failed`](super::QueryOutcome). What remains are
//! the conditions a caller has to react to.

use crate::graph::StoreError;
use crate::llm::LlmError;

/// Result type alias for ontology operations
pub type OntologyResult<T> = Result<T, OntologyError>;

/// Errors raised by the ontology pipeline
#[derive(Debug, thiserror::Error)]
pub enum OntologyError {
    /// No graph store was available when the operation ran
    #[error("Graph store is not connected; check NEO4J_URI, NEO4J_USER and NEO4J_PASSWORD")]
    NotConnected,

    /// Blank question passed to the translator
    #[error("Question is empty")]
    EmptyQuestion,

    /// Language model call failed
    #[error("Language model call failed: {0}")]
    Llm(#[from] LlmError),

    /// Prompt template could not be rendered
    #[error("Failed to render prompt '{template}': {reason}")]
    Template { template: String, reason: String },

    /// A write in a batch failed; earlier writes in the batch were kept
    #[error("Failed to insert triples after {completed} successful writes: {source}")]
    WriteFailed {
        completed: usize,
        #[source]
        source: StoreError,
    },

    /// Any other store failure
    #[error("Graph store error: {0}")]
    Store(#[from] StoreError),
}

impl OntologyError {
    /// Create a template rendering error
    pub fn template(template: impl Into<String>, reason: impl ToString) -> Self {
        OntologyError::Template {
            template: template.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            OntologyError::EmptyQuestion => true,
            OntologyError::Llm(e) => e.is_recoverable(),
            OntologyError::WriteFailed { source, .. } | OntologyError::Store(source) => {
                source.is_recoverable()
            }
            OntologyError::NotConnected | OntologyError::Template { .. } => false,
        }
    }
}
