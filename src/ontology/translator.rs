//! Natural-language question to Cypher translation

use regex::Regex;
use std::sync::{Arc, OnceLock};

use super::error::{OntologyError, OntologyResult};
use super::prompt::PromptTemplates;
use crate::llm::LanguageModel;

fn fenced_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Language tag: "cypher" anywhere on the fence line, any other word only
        // when it ends the line
        Regex::new(r"(?s)```[ \t]*(?:(?i:cypher)[ \t]*|[A-Za-z]+[ \t]*\r?\n)?(.*?)(?:```|$)")
            .expect("Invalid regex pattern")
    })
}

fn cypher_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^cypher\b[:\s]*").expect("Invalid regex pattern"))
}

/// Turns a question into a bare Cypher query via the language model.
///
/// The query is not validated; syntax errors surface when it is executed.
pub struct QueryTranslator {
    model: Arc<dyn LanguageModel>,
    templates: PromptTemplates,
}

impl QueryTranslator {
    pub fn new(model: Arc<dyn LanguageModel>) -> OntologyResult<Self> {
        Ok(Self {
            model,
            templates: PromptTemplates::new()?,
        })
    }

    pub async fn translate(&self, question: &str) -> OntologyResult<String> {
        let question = question.trim();
        if question.is_empty() {
            tracing::warn!("Empty question, nothing to translate");
            return Err(OntologyError::EmptyQuestion);
        }

        let prompt = self.templates.render_translation(question)?;
        let response = self.model.complete(&prompt).await?;
        let query = clean_cypher(&response);

        tracing::info!(question, query = %query, "Generated Cypher query");
        Ok(query)
    }
}

/// Strip a Markdown code fence and a leading `cypher` tag from model output.
pub fn clean_cypher(response: &str) -> String {
    let mut text = response.trim();

    if text.contains("```") {
        if let Some(body) = fenced_block_re().captures(text).and_then(|c| c.get(1)) {
            text = body.as_str().trim();
        }
    }

    let text = cypher_tag_re().replace(text, "");
    text.trim().to_string()
}
