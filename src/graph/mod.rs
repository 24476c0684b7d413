//! Property graph store access
//!
//! The pipeline talks to the graph through the [`GraphStore`] trait. The
//! process builds one store at startup and hands an `Arc<dyn GraphStore>` to
//! every component that needs it.
//!
//! - [`Neo4jStore`] - Neo4j over Bolt, backed by a `neo4rs` connection pool
//! - [`MemoryGraph`] - in-process graph for tests and throwaway sessions
//!
//! Schema conventions shared by every implementation:
//!
//! ```text
//! (:ENTITY {name})-[:RELATION_TYPE]->(:ENTITY {name})
//! (:ALIAS {name})-[:ALIAS_OF]->(:ENTITY {name})
//! ```

pub mod memory;
pub mod neo4j;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use memory::MemoryGraph;
pub use neo4j::Neo4jStore;

/// Node label for canonical entities
pub const ENTITY_LABEL: &str = "ENTITY";

/// Node label for alternative names
pub const ALIAS_LABEL: &str = "ALIAS";

/// Errors raised by a graph store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Graph store connection error: {0}")]
    Connection(String),

    #[error("Graph query error: {0}")]
    Query(String),

    #[error("Invalid relationship type: '{0}'")]
    InvalidRelationType(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl StoreError {
    /// Connection problems may clear up on their own; query errors will not.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// One result row. Column order is whatever the store returned; Neo4j rows
/// do not keep projection order, so look columns up by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Value of the first column held
    pub fn first(&self) -> Option<&Value> {
        self.columns.first().map(|(_, v)| v)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Node and relationship counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: u64,
    pub relationships: u64,
}

impl GraphStats {
    pub fn is_empty(&self) -> bool {
        self.nodes == 0 && self.relationships == 0
    }
}

/// A stored `ENTITY -[TYPE]-> ENTITY` edge as read back from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredTriple {
    pub head: String,
    pub relation: String,
    pub tail: String,
}

/// Session-scoped command interface to a property graph.
///
/// Writes are upserts: repeating a call with the same arguments leaves the
/// graph unchanged. Relationship types passed to [`merge_relation`] must
/// already satisfy the identifier grammar; implementations reject anything
/// else with [`StoreError::InvalidRelationType`].
///
/// [`merge_relation`]: GraphStore::merge_relation
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Merge both `ENTITY` nodes and the typed edge between them
    async fn merge_relation(&self, head: &str, rel_type: &str, tail: &str)
        -> Result<(), StoreError>;

    /// Merge an `ALIAS` node and its `ALIAS_OF` edge to the named entity
    async fn merge_alias(&self, alias: &str, entity: &str) -> Result<(), StoreError>;

    /// Run an arbitrary read query and collect every row
    async fn query(&self, cypher: &str) -> Result<Vec<Row>, StoreError>;

    /// Delete every node and relationship
    async fn clear(&self) -> Result<(), StoreError>;

    async fn stats(&self) -> Result<GraphStats, StoreError>;

    /// Trivial read used by the liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Up to `limit` entity-to-entity edges
    async fn sample_triples(&self, limit: usize) -> Result<Vec<StoredTriple>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_first_column() {
        let row: Row = vec![
            ("result".to_string(), json!("Steve Jobs")),
            ("extra".to_string(), json!(1)),
        ]
        .into_iter()
        .collect();
        assert_eq!(row.first(), Some(&json!("Steve Jobs")));
        assert_eq!(row.get("extra"), Some(&json!(1)));
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["result", "extra"]);
    }

    #[test]
    fn test_empty_row() {
        let row = Row::default();
        assert!(row.is_empty());
        assert_eq!(row.first(), None);
    }

    #[test]
    fn test_store_error_recoverable() {
        assert!(StoreError::Connection("refused".into()).is_recoverable());
        assert!(!StoreError::Query("syntax".into()).is_recoverable());
    }
}
