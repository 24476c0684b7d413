//! Error scenario integration tests
//!
//! Every failure must end in a status the presentation layer can show:
//! 1. Unclear input
//! 2. Unparseable model output
//! 3. Bad generated queries
//! 4. Missing graph store
//! 5. Unreachable text sources

use std::sync::Arc;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use omnigraph::error::{ErrorCategory, OmnigraphErrorTrait};
use omnigraph::graph::GraphStore;
use omnigraph::llm::ScriptedModel;
use omnigraph::ontology::QueryOutcome;
use omnigraph::service::{GraphService, Input, Status};
use omnigraph::source::TextSource;

use crate::common::{scripted_service, APPLE_EXTRACTION, APPLE_TEXT};

#[tokio::test]
async fn test_unclear_input_is_warning() {
    let (mut service, _, model) = scripted_service(&[APPLE_EXTRACTION]);

    for text in ["", "hello there", "aaaa aaaa aaaa aaaa aaaa"] {
        let err = service
            .prepare(&Input::Text(text.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(Status::from_error(&err), Status::Warning(_)), "{text:?}");
    }
    assert!(service.build().await.is_err());
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_unparseable_model_output_yields_empty_graph() {
    let (mut service, graph, _) =
        scripted_service(&["Here are the triples: Apple Inc. FOUNDED_BY Steve Jobs"]);

    service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap();
    let report = service.build().await.unwrap();

    assert_eq!(report.unparsed_chunks, 1);
    assert!(matches!(report.status(), Status::Warning(_)));
    assert!(graph.stats().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bad_query_is_error_not_no_results() {
    let (mut service, _, _) = scripted_service(&[
        APPLE_EXTRACTION,
        "MATCH (c:ENTITY {name:\"Apple Inc.\"}) RETURN c.founder",
        r#"MATCH (c:ENTITY {name:"Google"})-[:FOUNDED_BY]->(p:ENTITY) RETURN p.name AS result"#,
    ]);
    service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap();
    service.build().await.unwrap();

    let failed = service.ask("Who founded Apple Inc.?").await.unwrap();
    assert!(matches!(failed.outcome, QueryOutcome::Failed(_)));
    assert!(failed.status().is_error());

    let empty = service.ask("Who founded Google?").await.unwrap();
    assert_eq!(empty.outcome, QueryOutcome::NoResults);
    assert!(matches!(empty.status(), Status::Info(_)));
}

#[tokio::test]
async fn test_blank_question_is_warning() {
    let (service, _, model) = scripted_service(&[]);
    let err = service.ask("  ").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Input);
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn test_missing_store_reported_at_use() {
    let model = Arc::new(ScriptedModel::new(["RETURN 1"]));
    let mut service = GraphService::new(model, None, TextSource::new().unwrap()).unwrap();

    let err = service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Config);

    let answer = service.ask("Anything?").await.unwrap();
    assert!(answer.outcome.is_failed());
}

#[tokio::test]
async fn test_write_failure_keeps_earlier_chunks() {
    use omnigraph::graph::MemoryGraph;

    let graph = Arc::new(MemoryGraph::with_write_limit(1));
    let model = Arc::new(ScriptedModel::new([
        r#"[["Apple Inc.", "FOUNDED_BY", "Steve Jobs"], ["Apple Inc.", "FOUNDED_BY", "Steve Wozniak"]]"#,
    ]));
    let mut service = GraphService::new(
        model,
        Some(graph.clone() as Arc<dyn GraphStore>),
        TextSource::new().unwrap(),
    )
    .unwrap();

    service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap();
    let err = service.build().await.unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Storage);
    assert_eq!(graph.stats().await.unwrap().relationships, 1);
}

#[tokio::test]
async fn test_url_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (mut service, _, _) = scripted_service(&[]);
    let err = service
        .prepare(&Input::Url(format!("{}/missing", mock_server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Network);
    assert!(err.to_string().contains("404"));
}
