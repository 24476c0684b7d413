use anyhow::Result;
use std::path::PathBuf;

use omnigraph::service::{GraphService, Input, Status};

use super::AppContext;

/// Input selected on the command line
pub enum BuildSource {
    Text(String),
    File(PathBuf),
    Url(String),
}

impl From<BuildSource> for Input {
    fn from(source: BuildSource) -> Self {
        match source {
            BuildSource::Text(text) => Input::Text(text),
            BuildSource::File(path) => Input::File(path),
            BuildSource::Url(url) => Input::Url(url),
        }
    }
}

fn service(ctx: &AppContext) -> Result<GraphService> {
    Ok(GraphService::new(
        ctx.model()?,
        ctx.store.clone(),
        ctx.text_source()?,
    )?)
}

/// Validate, reset, build, then answer any follow-up questions.
/// Returns `false` when a step ended in an error status.
pub async fn build(ctx: &AppContext, source: BuildSource, questions: &[String]) -> Result<bool> {
    let mut service = service(ctx)?;
    let input = Input::from(source);

    match service.prepare(&input).await {
        Ok(chunks) => println!(
            "{}",
            Status::Success(format!(
                "Input is valid and ready to build the knowledge graph ({chunks} chunk(s))"
            ))
        ),
        Err(e) => {
            let status = Status::from_error(&e);
            println!("{status}");
            return Ok(!status.is_error());
        }
    }

    match service.build().await {
        Ok(report) => {
            println!("{}", report.status());
            for triple in &report.samples {
                println!("  ({}) -[{}]-> ({})", triple.head, triple.relation, triple.tail);
            }
        }
        Err(e) => {
            println!("{}", Status::from_error(&e));
            return Ok(false);
        }
    }

    let mut ok = true;
    for question in questions {
        ok &= answer(&service, question, false).await;
    }
    Ok(ok)
}

/// Answer one question against the persisted graph
pub async fn ask(ctx: &AppContext, question: &str, show_query: bool) -> Result<bool> {
    let service = service(ctx)?;
    Ok(answer(&service, question, show_query).await)
}

async fn answer(service: &GraphService, question: &str, show_query: bool) -> bool {
    println!("Q: {question}");
    match service.ask(question).await {
        Ok(answer) => {
            if show_query {
                println!("  Cypher: {}", answer.query);
            }
            let status = answer.status();
            println!("{status}");
            !status.is_error()
        }
        Err(e) => {
            let status = Status::from_error(&e);
            println!("{status}");
            !status.is_error()
        }
    }
}
