//! Fact parser: model response text to triples and alias hints

use serde::Serialize;

use super::literal::{parse_list, Literal};
use super::{AliasMap, Triple};

/// Result of parsing one model response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ParseOutcome {
    /// The response was a list literal; `triples` may still be empty.
    Parsed { triples: Vec<Triple>, aliases: AliasMap },
    /// The response could not be read as a list literal.
    Failed { reason: String },
}

impl ParseOutcome {
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed { .. })
    }

    pub fn triple_count(&self) -> usize {
        match self {
            ParseOutcome::Parsed { triples, .. } => triples.len(),
            ParseOutcome::Failed { .. } => 0,
        }
    }

    /// Split into triples and aliases; a failed parse yields empty collections.
    pub fn into_parts(self) -> (Vec<Triple>, AliasMap) {
        match self {
            ParseOutcome::Parsed { triples, aliases } => (triples, aliases),
            ParseOutcome::Failed { .. } => (Vec::new(), AliasMap::new()),
        }
    }
}

/// Parser for the list-of-lists format requested by the extraction prompt.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactParser;

impl FactParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a raw model response.
    ///
    /// Elements with at least three scalar positions become triples. A fourth
    /// position holding a list is read as aliases for the subject; a later
    /// element with the same subject replaces earlier aliases.
    pub fn parse(&self, raw: &str) -> ParseOutcome {
        let body = strip_code_fence(raw);

        let items = match parse_list(body) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Model response is not a list literal");
                return ParseOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let mut triples = Vec::new();
        let mut aliases = AliasMap::new();

        for (index, item) in items.iter().enumerate() {
            let Some(fields) = item.as_list() else {
                tracing::debug!(index, "Skipping non-sequence element");
                continue;
            };
            if fields.len() < 3 {
                tracing::debug!(index, len = fields.len(), "Skipping short element");
                continue;
            }
            let (Some(subject), Some(relation), Some(object)) = (
                fields[0].as_text(),
                fields[1].as_text(),
                fields[2].as_text(),
            ) else {
                tracing::debug!(index, "Skipping element with nested subject/relation/object");
                continue;
            };

            if fields.len() == 4 {
                if let Some(names) = fields[3].as_list() {
                    let names: Vec<String> = names.iter().filter_map(Literal::as_text).collect();
                    aliases.insert(subject.clone(), names);
                }
            }

            triples.push(Triple::new(subject, relation, object));
        }

        tracing::debug!(
            triples = triples.len(),
            aliased = aliases.len(),
            "Parsed model response"
        );
        ParseOutcome::Parsed { triples, aliases }
    }
}

/// Remove one surrounding Markdown code fence, including a language tag.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Language tag runs to the end of the first line
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
