//! Unified error handling for the omnigraph crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`OmnigraphErrorTrait`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use omnigraph::error::{Error, ErrorCategory, OmnigraphErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.category() == ErrorCategory::Input {
//!         println!("Warning: {err}");
//!     } else {
//!         eprintln!("{}: {err}", err.category());
//!     }
//! }
//! ```

use std::fmt;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::graph::StoreError;
pub use crate::llm::LlmError;
pub use crate::ontology::error::OntologyError;
pub use crate::source::SourceError;

/// Common trait for all omnigraph error types
pub trait OmnigraphErrorTrait: std::error::Error {
    /// Check if this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Store not connected, invalid settings
    Config,
    /// LLM transport errors and empty responses
    Llm,
    /// Malformed model output
    Parsing,
    /// Graph store execution errors
    Storage,
    /// Empty, blank or meaningless user input
    Input,
    /// Text source fetch errors
    Network,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Config => "Configuration error",
            Self::Llm => "Language model error",
            Self::Parsing => "Parsing error",
            Self::Storage => "Storage error",
            Self::Input => "Input error",
            Self::Network => "Network error",
            Self::Other => "Error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl OmnigraphErrorTrait for OntologyError {
    fn is_recoverable(&self) -> bool {
        OntologyError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            OntologyError::NotConnected => ErrorCategory::Config,
            OntologyError::EmptyQuestion => ErrorCategory::Input,
            OntologyError::Llm(_) => ErrorCategory::Llm,
            OntologyError::Template { .. } => ErrorCategory::Other,
            OntologyError::WriteFailed { .. } => ErrorCategory::Storage,
            OntologyError::Store(e) => e.category(),
        }
    }
}

impl OmnigraphErrorTrait for StoreError {
    fn is_recoverable(&self) -> bool {
        StoreError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            StoreError::Connection(_) => ErrorCategory::Config,
            StoreError::Query(_) | StoreError::InvalidRelationType(_) | StoreError::Decode(_) => {
                ErrorCategory::Storage
            }
        }
    }
}

impl OmnigraphErrorTrait for LlmError {
    fn is_recoverable(&self) -> bool {
        LlmError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            LlmError::UnknownBackend(_) | LlmError::MissingApiKey(_) => ErrorCategory::Config,
            _ => ErrorCategory::Llm,
        }
    }
}

impl OmnigraphErrorTrait for SourceError {
    fn is_recoverable(&self) -> bool {
        SourceError::is_recoverable(self)
    }

    fn category(&self) -> ErrorCategory {
        match self {
            SourceError::Http(_) | SourceError::Status { .. } => ErrorCategory::Network,
            SourceError::Io(_) => ErrorCategory::Storage,
            SourceError::InvalidUrl(_) => ErrorCategory::Input,
        }
    }
}

/// Unified error type for the omnigraph crate
///
/// This enum wraps all domain-specific errors, providing a single error type
/// that can be used across module boundaries while preserving the detailed
/// error information.
#[derive(Error, Debug)]
pub enum Error {
    /// Extraction and question-answering errors
    #[error(transparent)]
    Ontology(#[from] OntologyError),

    /// Text source errors
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Input rejected before any work was done
    #[error("{0}")]
    Input(String),
}

impl OmnigraphErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Ontology(e) => e.is_recoverable(),
            Self::Source(e) => e.is_recoverable(),
            Self::Input(_) => true,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Ontology(e) => e.category(),
            Self::Source(e) => e.category(),
            Self::Input(_) => ErrorCategory::Input,
        }
    }
}

impl Error {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
