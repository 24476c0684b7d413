//! Fact extraction: text chunk in, triples merged into the graph

use serde::Serialize;
use std::sync::Arc;

use super::error::OntologyResult;
use super::parser::{FactParser, ParseOutcome};
use super::prompt::PromptTemplates;
use super::writer::{GraphWriter, WriteOutcome};
use crate::llm::LanguageModel;
use crate::utils::truncate_text;

/// Summary of how the model response was read
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseSummary {
    Parsed { triples: usize, aliased: usize },
    Failed { reason: String },
}

impl From<&ParseOutcome> for ParseSummary {
    fn from(outcome: &ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Parsed { triples, aliases } => ParseSummary::Parsed {
                triples: triples.len(),
                aliased: aliases.len(),
            },
            ParseOutcome::Failed { reason } => ParseSummary::Failed {
                reason: reason.clone(),
            },
        }
    }
}

/// What happened to one chunk
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Model response exactly as received
    pub raw_response: String,
    pub parse: ParseSummary,
    pub write: WriteOutcome,
}

impl ExtractionReport {
    pub fn inserted(&self) -> usize {
        self.write.inserted()
    }
}

/// Drives prompt rendering, the model call, parsing and the graph write for
/// one chunk at a time.
///
/// The model output is not retried or repaired: a response that does not
/// parse simply contributes nothing.
pub struct FactExtractor {
    model: Arc<dyn LanguageModel>,
    writer: GraphWriter,
    parser: FactParser,
    templates: PromptTemplates,
}

impl FactExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, writer: GraphWriter) -> OntologyResult<Self> {
        Ok(Self {
            model,
            writer,
            parser: FactParser::new(),
            templates: PromptTemplates::new()?,
        })
    }

    pub fn writer(&self) -> &GraphWriter {
        &self.writer
    }

    /// Extract facts from `chunk` and merge them into the graph.
    pub async fn extract(&self, chunk: &str) -> OntologyResult<ExtractionReport> {
        let prompt = self.templates.render_extraction(chunk)?;
        let raw_response = self.model.complete(&prompt).await?;
        tracing::debug!(response = %truncate_text(&raw_response, 500), "Extraction response");

        let outcome = self.parser.parse(&raw_response);
        let parse = ParseSummary::from(&outcome);
        if let ParseSummary::Failed { reason } = &parse {
            tracing::warn!(reason = %reason, "Extraction response could not be parsed");
        }

        let (triples, aliases) = outcome.into_parts();
        let write = self.writer.insert_triples(&triples, &aliases).await?;

        Ok(ExtractionReport {
            raw_response,
            parse,
            write,
        })
    }
}
