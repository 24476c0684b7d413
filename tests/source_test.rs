//! Integration tests for TextSource using wiremock and temporary files

use std::io::Write;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use omnigraph::source::{SourceConfig, SourceError, TextSource};

#[tokio::test]
async fn test_url_paragraphs_are_chunked() {
    let mock_server = MockServer::start().await;
    let paragraph = "Steve Jobs co-founded Apple Inc. in a garage in Los Altos. ".repeat(4);
    let html = format!(
        "<html><body><p>{paragraph}</p><script>var x = 1;</script><p>{paragraph}</p></body></html>"
    );

    Mock::given(method("GET"))
        .and(path("/article"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&mock_server)
        .await;

    let source = TextSource::with_config(SourceConfig {
        chunk_size: 200,
        ..SourceConfig::default()
    })
    .unwrap();
    let chunks = source
        .from_url(&format!("{}/article", mock_server.uri()))
        .await
        .unwrap();

    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 200));
    assert!(chunks.iter().all(|c| !c.contains("var x")));
    assert!(chunks[0].starts_with("Steve Jobs co-founded"));
}

#[tokio::test]
async fn test_url_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let source = TextSource::new().unwrap();
    let err = source
        .from_url(&format!("{}/down", mock_server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Status { status: 503, .. }));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_file_source() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", "Apple Inc. was founded by Steve Jobs. ".repeat(100)).unwrap();

    let source = TextSource::new().unwrap();
    let chunks = source.from_file(file.path()).await.unwrap();

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(|c| c.chars().count() <= 3000));
    assert!(chunks[0].starts_with("Apple Inc."));
    let words: usize = chunks.iter().map(|c| c.split_whitespace().count()).sum();
    assert_eq!(words, 700);
}

#[tokio::test]
async fn test_file_must_be_utf8() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0xff, 0xfe, 0x00, 0x41]).unwrap();

    let source = TextSource::new().unwrap();
    assert!(matches!(
        source.from_file(file.path()).await,
        Err(SourceError::Io(_))
    ));
}

#[tokio::test]
async fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = TextSource::new().unwrap();
    assert!(source.from_file(dir.path().join("nope.txt")).await.is_err());
}
