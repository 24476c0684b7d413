//! Graph store liveness probe
//!
//! A trivial read (`RETURN 1`) on a fixed interval keeps idle hosted
//! databases awake and surfaces dropped connections early. The probe only
//! reads, so it never interferes with extraction or querying beyond normal
//! connection contention.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::graph::GraphStore;

/// Overall health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

/// Result of one probe
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub latency_ms: u64,
    pub timestamp: String,
}

impl ProbeReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Pings the graph store on demand or on an interval
#[derive(Clone)]
pub struct LivenessProbe {
    store: Option<Arc<dyn GraphStore>>,
}

impl LivenessProbe {
    pub fn new(store: Option<Arc<dyn GraphStore>>) -> Self {
        Self { store }
    }

    /// Run a single ping
    pub async fn check(&self) -> ProbeReport {
        let start = Instant::now();
        let result = match &self.store {
            Some(store) => store.ping().await.map_err(|e| e.to_string()),
            None => Err("graph store is not connected".to_string()),
        };
        let latency_ms = start.elapsed().as_millis() as u64;
        let timestamp = chrono::Utc::now().to_rfc3339();

        match result {
            Ok(()) => {
                tracing::info!(latency_ms, "Neo4j ping successful");
                ProbeReport {
                    status: HealthStatus::Healthy,
                    message: None,
                    latency_ms,
                    timestamp,
                }
            }
            Err(message) => {
                tracing::error!(latency_ms, error = %message, "Neo4j ping failed");
                ProbeReport {
                    status: HealthStatus::Unhealthy,
                    message: Some(message),
                    latency_ms,
                    timestamp,
                }
            }
        }
    }

    /// Ping every `interval` until `shutdown` flips to `true` or its sender
    /// is dropped. The first ping runs immediately. The task yields the
    /// number of pings performed.
    pub fn spawn(self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<usize> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut probes = 0;

            tracing::info!(interval_secs = interval.as_secs(), "Liveness probe started");
            loop {
                tokio::select! {
                    biased;
                    _ = ticker.tick() => {
                        self.check().await;
                        probes += 1;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::info!(probes, "Liveness probe stopped");
            probes
        })
    }
}
