//! Graph writer: upserts triples and aliases into the graph store

use serde::Serialize;
use std::sync::Arc;

use super::error::{OntologyError, OntologyResult};
use super::sanitize::sanitize_relation;
use super::{AliasMap, Triple};
use crate::graph::{GraphStore, StoredTriple};

/// Outcome of a successful batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Nothing to write; no statement was sent
    Empty,
    /// Batch written
    Inserted {
        /// Triples merged as edges
        triples: usize,
        /// Triples dropped because the relation sanitized to nothing
        skipped: usize,
        /// `ALIAS_OF` links merged
        aliases: usize,
    },
}

impl WriteOutcome {
    pub fn inserted(&self) -> usize {
        match self {
            WriteOutcome::Empty => 0,
            WriteOutcome::Inserted { triples, .. } => *triples,
        }
    }
}

/// Writes extraction results into the graph with merge semantics.
///
/// The batch is not transactional: every statement commits on its own, and
/// the first failure stops the batch without undoing what came before.
#[derive(Clone)]
pub struct GraphWriter {
    store: Option<Arc<dyn GraphStore>>,
}

impl GraphWriter {
    pub fn new(store: Option<Arc<dyn GraphStore>>) -> Self {
        Self { store }
    }

    fn store(&self) -> OntologyResult<&Arc<dyn GraphStore>> {
        self.store.as_ref().ok_or(OntologyError::NotConnected)
    }

    /// Merge every triple as `(:ENTITY)-[:TYPE]->(:ENTITY)` and every alias
    /// as `(:ALIAS)-[:ALIAS_OF]->(:ENTITY)`.
    pub async fn insert_triples(
        &self,
        triples: &[Triple],
        aliases: &AliasMap,
    ) -> OntologyResult<WriteOutcome> {
        let store = self.store()?;

        if triples.is_empty() {
            tracing::warn!("No triples to insert");
            return Ok(WriteOutcome::Empty);
        }

        let mut completed = 0;
        let mut inserted = 0;
        let mut skipped = 0;

        for triple in triples {
            let rel_type = sanitize_relation(&triple.relation);
            if rel_type.is_empty() {
                tracing::warn!(
                    subject = %triple.subject,
                    object = %triple.object,
                    "Skipping triple with empty relation"
                );
                skipped += 1;
                continue;
            }

            store
                .merge_relation(&triple.subject, &rel_type, &triple.object)
                .await
                .map_err(|source| {
                    tracing::error!(
                        subject = %triple.subject,
                        relation = %rel_type,
                        object = %triple.object,
                        error = %source,
                        "Triple write failed, aborting batch"
                    );
                    OntologyError::WriteFailed { completed, source }
                })?;
            completed += 1;
            inserted += 1;
        }

        let mut alias_links = 0;
        for (entity, names) in aliases {
            for alias in names {
                store.merge_alias(alias, entity).await.map_err(|source| {
                    tracing::error!(entity = %entity, alias = %alias, error = %source, "Alias write failed");
                    OntologyError::WriteFailed { completed, source }
                })?;
                completed += 1;
                alias_links += 1;
            }
        }

        tracing::info!(
            triples = inserted,
            skipped,
            aliases = alias_links,
            "Inserted triples into graph"
        );
        Ok(WriteOutcome::Inserted {
            triples: inserted,
            skipped,
            aliases: alias_links,
        })
    }

    /// Delete every node and relationship in the store.
    pub async fn reset_all(&self) -> OntologyResult<()> {
        self.store()?.clear().await?;
        tracing::info!("Deleted all existing triples from graph");
        Ok(())
    }

    /// Read back a few stored triples for display
    pub async fn sample_triples(&self, limit: usize) -> OntologyResult<Vec<StoredTriple>> {
        Ok(self.store()?.sample_triples(limit).await?)
    }
}
