//! Common test utilities

use std::sync::Arc;

use omnigraph::graph::{GraphStore, MemoryGraph};
use omnigraph::llm::ScriptedModel;
use omnigraph::service::GraphService;
use omnigraph::source::TextSource;

/// Sentence used by the end-to-end scenarios
pub const APPLE_TEXT: &str = "Apple Inc. was founded by Steve Jobs.";

/// Extraction response for [`APPLE_TEXT`]
pub const APPLE_EXTRACTION: &str = r#"[["Apple Inc.", "FOUNDED_BY", "Steve Jobs"]]"#;

/// Translation response for "Who founded Apple Inc.?"
pub const APPLE_QUERY: &str = r#"```cypher
MATCH (c:ENTITY {name:"Apple Inc."})-[:FOUNDED_BY]->(p:ENTITY) RETURN p.name AS result
```"#;

/// Service over a fresh in-memory graph and a model replaying `responses`
pub fn scripted_service(responses: &[&str]) -> (GraphService, Arc<MemoryGraph>, Arc<ScriptedModel>) {
    let graph = Arc::new(MemoryGraph::new());
    let model = Arc::new(ScriptedModel::new(responses.iter().copied()));
    let service = GraphService::new(
        model.clone(),
        Some(graph.clone() as Arc<dyn GraphStore>),
        TextSource::new().expect("HTTP client"),
    )
    .expect("service");
    (service, graph, model)
}
