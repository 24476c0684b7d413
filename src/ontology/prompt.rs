//! Prompt templates for extraction and query translation
//!
//! Both prompts are Handlebars templates under `templates/`. The relation
//! vocabulary, direction rules and worked examples they embed live here as
//! plain tables so code and prompt cannot drift apart.

use handlebars::Handlebars;
use serde::Serialize;

use super::error::{OntologyError, OntologyResult};
use super::sanitize::ALIAS_OF;
use crate::graph::{ALIAS_LABEL, ENTITY_LABEL};

const EXTRACTION_TEMPLATE: &str = include_str!("../../templates/extraction.hbs");
const TRANSLATION_TEMPLATE: &str = include_str!("../../templates/translation.hbs");

const EXTRACTION: &str = "extraction";
const TRANSLATION: &str = "translation";

/// Relation names the extraction prompt steers the model towards
pub const RELATION_VOCABULARY: &[&str] = &[
    "BORN_IN",
    "PROFESSION",
    "FOUNDED",
    "FOUNDED_BY",
    "KNOWN_FOR",
    "HEADQUARTERED",
    "ACTED_IN",
    "DIRECTED",
];

/// Which endpoint plays which role for a relationship type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectionRule {
    pub relation: &'static str,
    pub from: &'static str,
    pub to: &'static str,
}

pub const DIRECTION_RULES: &[DirectionRule] = &[
    DirectionRule { relation: "ACTED_IN", from: "PERSON", to: "MOVIE or SHOW" },
    DirectionRule { relation: "DIRECTED", from: "DIRECTOR", to: "MOVIE or SHOW" },
    DirectionRule { relation: "PROFESSION", from: "PERSON", to: "PROFESSION" },
    DirectionRule { relation: "BORN_IN", from: "PERSON", to: "LOCATION" },
    DirectionRule { relation: "FOUNDED_BY", from: "ORGANIZATION", to: "FOUNDER" },
    DirectionRule { relation: "FOUNDED", from: "FOUNDER", to: "ORGANIZATION" },
    DirectionRule { relation: "HEADQUARTERED", from: "ORGANIZATION", to: "LOCATION" },
];

/// Everyday phrasing mapped onto a relationship type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Synonym {
    pub phrase: &'static str,
    pub relation: &'static str,
}

pub const SYNONYMS: &[Synonym] = &[
    Synonym { phrase: "birthplace", relation: "BORN_IN" },
    Synonym { phrase: "job", relation: "PROFESSION" },
    Synonym { phrase: "occupation", relation: "PROFESSION" },
    Synonym { phrase: "starred in", relation: "ACTED_IN" },
    Synonym { phrase: "started", relation: "FOUNDED" },
    Synonym { phrase: "based in", relation: "HEADQUARTERED" },
];

/// A worked question-to-query pair shown to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryExample {
    pub question: &'static str,
    pub query: &'static str,
}

pub const QUERY_EXAMPLES: &[QueryExample] = &[
    QueryExample {
        question: "Who acted in Screamers?",
        query: r#"MATCH (a:ENTITY)-[:ACTED_IN]->(m:ENTITY {name:"Screamers"}) RETURN a.name AS result"#,
    },
    QueryExample {
        question: "What movies did Pamela Adlon act in?",
        query: r#"MATCH (a:ENTITY {name:"Pamela Adlon"})-[:ACTED_IN]->(m:ENTITY) RETURN m.name AS result"#,
    },
    QueryExample {
        question: "Where was Javed Akhtar born?",
        query: r#"MATCH (j:ENTITY {name:"Javed Akhtar"})-[:BORN_IN]->(b:ENTITY) RETURN b.name AS result"#,
    },
    QueryExample {
        question: "Who founded Apple Inc.?",
        query: r#"MATCH (c:ENTITY {name:"Apple Inc."})-[:FOUNDED_BY]->(p:ENTITY) RETURN p.name AS result"#,
    },
    QueryExample {
        question: "Where was Akhtar born?",
        query: r#"MATCH (p:ENTITY)-[:BORN_IN]->(b:ENTITY) WHERE toLower(p.name) CONTAINS toLower("Akhtar") RETURN b.name AS result"#,
    },
    QueryExample {
        question: "Which companies did Elon start?",
        query: r#"MATCH (p:ENTITY)-[:FOUNDED]->(c:ENTITY) WHERE toLower(p.name) CONTAINS toLower("Elon") OR EXISTS { MATCH (a:ALIAS)-[:ALIAS_OF]->(p) WHERE toLower(a.name) CONTAINS toLower("Elon") } RETURN DISTINCT c.name AS result"#,
    },
];

#[derive(Serialize)]
struct ExtractionData<'a> {
    text: &'a str,
    relations: &'a [&'a str],
}

#[derive(Serialize)]
struct TranslationData<'a> {
    question: &'a str,
    entity_label: &'a str,
    alias_label: &'a str,
    alias_rel: &'a str,
    rules: &'a [DirectionRule],
    synonyms: &'a [Synonym],
    examples: &'a [QueryExample],
}

/// Registered prompt templates
pub struct PromptTemplates {
    handlebars: Handlebars<'static>,
}

impl PromptTemplates {
    /// Templates shipped with the crate
    pub fn new() -> OntologyResult<Self> {
        Self::with_templates(EXTRACTION_TEMPLATE, TRANSLATION_TEMPLATE)
    }

    /// Custom template sources, rendered with the same data
    pub fn with_templates(extraction: &str, translation: &str) -> OntologyResult<Self> {
        let mut handlebars = Handlebars::new();
        // Prompts are plain text; HTML escaping would mangle quotes in the input
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars
            .register_template_string(EXTRACTION, extraction)
            .map_err(|e| OntologyError::template(EXTRACTION, e))?;
        handlebars
            .register_template_string(TRANSLATION, translation)
            .map_err(|e| OntologyError::template(TRANSLATION, e))?;
        Ok(Self { handlebars })
    }

    /// Extraction prompt embedding the literal text chunk
    pub fn render_extraction(&self, text: &str) -> OntologyResult<String> {
        let data = ExtractionData {
            text,
            relations: RELATION_VOCABULARY,
        };
        self.handlebars
            .render(EXTRACTION, &data)
            .map_err(|e| OntologyError::template(EXTRACTION, e))
    }

    /// Translation prompt embedding schema, rules, examples and the question
    pub fn render_translation(&self, question: &str) -> OntologyResult<String> {
        let data = TranslationData {
            question,
            entity_label: ENTITY_LABEL,
            alias_label: ALIAS_LABEL,
            alias_rel: ALIAS_OF,
            rules: DIRECTION_RULES,
            synonyms: SYNONYMS,
            examples: QUERY_EXAMPLES,
        };
        self.handlebars
            .render(TRANSLATION, &data)
            .map_err(|e| OntologyError::template(TRANSLATION, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_prompt_embeds_text_verbatim() {
        let templates = PromptTemplates::new().unwrap();
        let text = r#"Apple Inc. was founded by Steve Jobs & "friends"."#;
        let prompt = templates.render_extraction(text).unwrap();
        assert!(prompt.contains(text));
        assert!(prompt.contains(r#""BORN_IN", "PROFESSION""#));
        assert!(prompt.contains("title case"));
    }

    #[test]
    fn test_translation_prompt_contents() {
        let templates = PromptTemplates::new().unwrap();
        let prompt = templates
            .render_translation("Who founded Apple Inc.?")
            .unwrap();
        assert!(prompt.contains(":ACTED_IN goes from a PERSON entity"));
        assert!(prompt.contains("(:ALIAS {name})-[:ALIAS_OF]->(:ENTITY {name})"));
        assert!(prompt.contains(r#"{name:"Screamers"}"#));
        assert!(prompt.contains(r#""birthplace" means BORN_IN"#));
        assert!(prompt.ends_with("Question: \"Who founded Apple Inc.?\"\n"));
    }

    #[test]
    fn test_every_rule_relation_in_vocabulary() {
        for rule in DIRECTION_RULES {
            assert!(
                RELATION_VOCABULARY.contains(&rule.relation),
                "{} missing from vocabulary",
                rule.relation
            );
        }
    }

    #[test]
    fn test_invalid_custom_template() {
        assert!(PromptTemplates::with_templates("{{#each}}", "ok").is_err());
    }
}
