use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch as shutdown;

use omnigraph::health::LivenessProbe;
use omnigraph::ontology::GraphWriter;
use omnigraph::service::Status;

use super::AppContext;

/// Delete everything in the graph
pub async fn reset(ctx: &AppContext) -> Result<bool> {
    let writer = GraphWriter::new(ctx.store.clone());
    let status = match writer.reset_all().await {
        Ok(()) => Status::Success("Deleted all nodes and relationships".to_string()),
        Err(e) => Status::from_error(&e.into()),
    };
    println!("{status}");
    Ok(!status.is_error())
}

/// Ping the store once
pub async fn ping(ctx: &AppContext) -> bool {
    let report = LivenessProbe::new(ctx.store.clone()).check().await;
    let status = match &report.message {
        None => Status::Success(format!("Neo4j is alive ({} ms)", report.latency_ms)),
        Some(message) => Status::Error(format!("Neo4j ping failed: {message}")),
    };
    println!("{status}");
    report.is_healthy()
}

/// Ping on an interval until Ctrl-C
pub async fn watch(ctx: &AppContext, interval_secs: Option<u64>) -> Result<bool> {
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.health.interval());

    let (tx, rx) = shutdown::channel(false);
    let handle = LivenessProbe::new(ctx.store.clone()).spawn(interval, rx);
    println!(
        "{}",
        Status::Info(format!(
            "Pinging Neo4j every {}s, press Ctrl-C to stop",
            interval.as_secs()
        ))
    );

    tokio::signal::ctrl_c().await?;
    let _ = tx.send(true);
    let probes = handle.await?;

    println!("{}", Status::Info(format!("Stopped after {probes} ping(s)")));
    Ok(true)
}
