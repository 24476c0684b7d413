//! End-to-end pipeline tests over the in-memory graph

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use omnigraph::graph::GraphStore;
use omnigraph::ontology::QueryOutcome;
use omnigraph::service::{Input, Status};

use super::fixtures::{
    ACTED_IN_QUERY, ACTOR_EXTRACTION, ALIAS_QUERY, ARTICLE_HTML, COMBS_EXTRACTION,
    MUSK_EXTRACTION, PARTIAL_NAME_QUERY,
};
use crate::common::{scripted_service, APPLE_EXTRACTION, APPLE_QUERY, APPLE_TEXT};

#[tokio::test]
async fn test_apple_founded_by_steve_jobs() {
    let (mut service, graph, model) = scripted_service(&[APPLE_EXTRACTION, APPLE_QUERY]);

    service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap();
    let report = service.build().await.unwrap();
    assert_eq!(report.triples, 1);

    assert_eq!(graph.entity_names().await, vec!["Apple Inc.", "Steve Jobs"]);
    let edges = graph.relationships().await;
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].head, "Apple Inc.");
    assert_eq!(edges[0].relation, "FOUNDED_BY");
    assert_eq!(edges[0].tail, "Steve Jobs");

    let answer = service.ask("Who founded Apple Inc.?").await.unwrap();
    assert!(answer.query.starts_with("MATCH"));
    assert_eq!(answer.outcome, QueryOutcome::Rows(vec![json!("Steve Jobs")]));
    assert_eq!(answer.status(), Status::Success("Steve Jobs".to_string()));

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains(APPLE_TEXT));
    assert!(prompts[1].contains("Who founded Apple Inc.?"));
}

#[tokio::test]
async fn test_aliases_and_partial_name_lookup() {
    let (mut service, graph, _) = scripted_service(&[MUSK_EXTRACTION, PARTIAL_NAME_QUERY]);

    service
        .prepare(&Input::Text(
            "Elon Musk founded Tesla and SpaceX. Tesla is based in Austin.".to_string(),
        ))
        .await
        .unwrap();
    let report = service.build().await.unwrap();

    assert_eq!(report.triples, 3);
    assert_eq!(report.aliases, 2);
    assert_eq!(graph.alias_names().await, vec!["Elon", "Musk"]);

    let answer = service.ask("What did Musk found?").await.unwrap();
    assert_eq!(
        answer.outcome.values(),
        &[json!("Tesla"), json!("SpaceX")]
    );
}

#[tokio::test]
async fn test_entity_resolved_through_alias_only() {
    let (mut service, graph, _) = scripted_service(&[COMBS_EXTRACTION, ALIAS_QUERY]);

    service
        .prepare(&Input::Text(
            "Sean Combs, known as Diddy, founded Bad Boy Records. He was born in New York City."
                .to_string(),
        ))
        .await
        .unwrap();
    service.build().await.unwrap();

    assert!(!graph
        .entity_names()
        .await
        .iter()
        .any(|name| name.contains("Diddy")));
    assert_eq!(graph.alias_names().await, vec!["Diddy", "Puff Daddy"]);

    let answer = service.ask("What did Diddy found?").await.unwrap();
    assert_eq!(
        answer.outcome,
        QueryOutcome::Rows(vec![json!("Bad Boy Records")])
    );
}

#[tokio::test]
async fn test_tuple_literals_and_relation_sanitizing() {
    let (mut service, graph, _) = scripted_service(&[ACTOR_EXTRACTION, ACTED_IN_QUERY]);

    service
        .prepare(&Input::Text(
            "Pamela Adlon acted in Better Things and Californication. She was born in New York City."
                .to_string(),
        ))
        .await
        .unwrap();
    service.build().await.unwrap();

    let stats = graph.stats().await.unwrap();
    assert_eq!(stats.nodes, 4);
    assert_eq!(stats.relationships, 3);

    let answer = service.ask("Which shows did Pamela Adlon act in?").await.unwrap();
    assert_eq!(
        answer.outcome.values(),
        &[json!("Better Things"), json!("Californication")]
    );
}

#[tokio::test]
async fn test_new_session_starts_from_empty_graph() {
    let (mut service, graph, _) = scripted_service(&[APPLE_EXTRACTION, MUSK_EXTRACTION]);

    service
        .prepare(&Input::Text(APPLE_TEXT.to_string()))
        .await
        .unwrap();
    service.build().await.unwrap();

    service
        .prepare(&Input::Text(
            "Elon Musk founded Tesla and SpaceX. Tesla is based in Austin.".to_string(),
        ))
        .await
        .unwrap();
    service.build().await.unwrap();

    let names = graph.entity_names().await;
    assert!(!names.contains(&"Apple Inc.".to_string()));
    assert!(names.contains(&"Tesla".to_string()));
}

#[tokio::test]
async fn test_build_from_url() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/apple"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE_HTML))
        .mount(&mock_server)
        .await;

    let (mut service, _, model) = scripted_service(&[APPLE_EXTRACTION]);
    let url = format!("{}/apple", mock_server.uri());

    let chunks = service.prepare(&Input::Url(url)).await.unwrap();
    assert_eq!(chunks, 1);
    service.build().await.unwrap();

    let prompt = &model.prompts()[0];
    assert!(prompt.contains("founded by Steve Jobs, Steve Wozniak and Ronald Wayne in 1976."));
    assert!(!prompt.contains("Home | About"));
}
