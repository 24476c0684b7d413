//! Session workflow: validate input, reset, build, ask
//!
//! [`GraphService`] owns one build session at a time. Input is acquired and
//! checked first; only valid input wipes the graph, so a rejected input never
//! destroys the previous session's graph.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, ErrorCategory, OmnigraphErrorTrait, Result};
use crate::graph::{GraphStore, StoredTriple};
use crate::llm::LanguageModel;
use crate::ontology::{
    FactExtractor, GraphWriter, ParseSummary, QueryExecutor, QueryOutcome, QueryTranslator,
    WriteOutcome,
};
use crate::source::{is_gibberish, TextSource};

/// Number of stored triples shown after a build
const SAMPLE_SIZE: usize = 3;

/// User-facing outcome line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Status {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Status {
    /// Input problems are warnings; everything else is an error
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::Input => Status::Warning(err.to_string()),
            category => Status::Error(format!("{category}: {err}")),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Status::Success(m) | Status::Info(m) | Status::Warning(m) | Status::Error(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Status::Success(_) => "ok",
            Status::Info(_) => "info",
            Status::Warning(_) => "warning",
            Status::Error(_) => "error",
        };
        write!(f, "[{tag}] {}", self.message())
    }
}

/// Where the text for a session comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    File(PathBuf),
    Url(String),
}

/// Totals for one build
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub chunks: usize,
    pub triples: usize,
    pub aliases: usize,
    /// Chunks whose model response could not be parsed
    pub unparsed_chunks: usize,
    pub samples: Vec<StoredTriple>,
}

impl BuildReport {
    pub fn status(&self) -> Status {
        if self.triples == 0 {
            Status::Warning(format!(
                "No facts extracted from {} chunk(s); the graph is empty",
                self.chunks
            ))
        } else {
            Status::Success(format!(
                "Knowledge graph built: {} triple(s) and {} alias link(s) from {} chunk(s)",
                self.triples, self.aliases, self.chunks
            ))
        }
    }
}

/// A question, the query it became, and what the query returned
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub query: String,
    pub outcome: QueryOutcome,
}

impl Answer {
    pub fn status(&self) -> Status {
        match &self.outcome {
            QueryOutcome::Rows(values) => {
                let rendered: Vec<String> = values
                    .iter()
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Status::Success(rendered.join(", "))
            }
            QueryOutcome::NoResults => Status::Info("No results found".to_string()),
            QueryOutcome::Failed(reason) => Status::Error(format!("Query failed: {reason}")),
        }
    }
}

/// One validate, reset, build, ask session over an injected store and model
pub struct GraphService {
    source: TextSource,
    extractor: FactExtractor,
    translator: QueryTranslator,
    executor: QueryExecutor,
    chunks: Vec<String>,
}

impl GraphService {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        store: Option<Arc<dyn GraphStore>>,
        source: TextSource,
    ) -> Result<Self> {
        let writer = GraphWriter::new(store.clone());
        Ok(Self {
            source,
            extractor: FactExtractor::new(model.clone(), writer)?,
            translator: QueryTranslator::new(model)?,
            executor: QueryExecutor::new(store),
            chunks: Vec::new(),
        })
    }

    /// Read the input into chunks
    pub async fn acquire(&self, input: &Input) -> Result<Vec<String>> {
        let chunks = match input {
            Input::Text(text) => self.source.from_text(text),
            Input::File(path) => self.source.from_file(path).await?,
            Input::Url(url) => self.source.from_url(url).await?,
        };
        Ok(chunks)
    }

    /// Validate the input and, if it is usable, reset the graph and keep the
    /// chunks for [`build`](Self::build). Returns the number of chunks.
    pub async fn prepare(&mut self, input: &Input) -> Result<usize> {
        let chunks = self.acquire(input).await?;

        let full_text = chunks.join(" ");
        if full_text.trim().is_empty() || is_gibberish(&full_text) {
            tracing::warn!(chars = full_text.chars().count(), "Input rejected as unclear");
            self.chunks.clear();
            return Err(Error::input(
                "The input is incomplete or unclear. Please provide more meaningful information.",
            ));
        }

        self.extractor.writer().reset_all().await?;
        tracing::info!(chunks = chunks.len(), "Input accepted, graph reset");
        self.chunks = chunks;
        Ok(self.chunks.len())
    }

    /// Extract every pending chunk into the graph. The first failing chunk
    /// stops the build; chunks before it stay in the graph.
    pub async fn build(&mut self) -> Result<BuildReport> {
        if self.chunks.is_empty() {
            return Err(Error::input("Please check the input first"));
        }

        let chunks = std::mem::take(&mut self.chunks);
        let mut report = BuildReport {
            chunks: chunks.len(),
            ..BuildReport::default()
        };

        for (index, chunk) in chunks.iter().enumerate() {
            tracing::info!(chunk = index + 1, total = chunks.len(), "Extracting chunk");
            let extraction = self.extractor.extract(chunk).await?;
            if matches!(extraction.parse, ParseSummary::Failed { .. }) {
                report.unparsed_chunks += 1;
            }
            if let WriteOutcome::Inserted {
                triples, aliases, ..
            } = extraction.write
            {
                report.triples += triples;
                report.aliases += aliases;
            }
        }

        if report.triples > 0 {
            report.samples = self.extractor.writer().sample_triples(SAMPLE_SIZE).await?;
        }

        tracing::info!(
            chunks = report.chunks,
            triples = report.triples,
            aliases = report.aliases,
            unparsed = report.unparsed_chunks,
            "Build finished"
        );
        Ok(report)
    }

    /// Translate and run a question against the current graph
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let query = self.translator.translate(question).await?;
        let outcome = self.executor.execute(&query).await;
        Ok(Answer {
            question: question.trim().to_string(),
            query,
            outcome,
        })
    }
}
