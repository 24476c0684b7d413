//! Neo4j-backed graph store

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query};
use serde_json::{Map, Value};

use super::{GraphStats, GraphStore, Row, StoreError, StoredTriple};
use crate::config::GraphConfig;
use crate::ontology::sanitize::{is_valid_identifier, ALIAS_OF};

/// Neo4j client wrapping a connection pool.
///
/// Each statement borrows a pooled connection for its own duration and
/// returns it when the call completes, on success or failure.
pub struct Neo4jStore {
    graph: Graph,
}

impl Neo4jStore {
    /// Connect to Neo4j and verify the connection with a ping.
    pub async fn connect(config: &GraphConfig) -> Result<Self, StoreError> {
        tracing::info!(uri = %config.uri, user = %config.user, "Connecting to Neo4j");

        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .max_connections(config.max_connections);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let neo4j_config = builder
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { graph };
        store.ping().await?;
        tracing::info!("Neo4j connection established");

        Ok(store)
    }

    async fn run(&self, q: Query) -> Result<(), StoreError> {
        self.graph
            .run(q)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn rows(&self, q: Query) -> Result<Vec<neo4rs::Row>, StoreError> {
        let mut stream = self
            .graph
            .execute(q)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn count(&self, cypher: &str) -> Result<u64, StoreError> {
        let rows = self.rows(query(cypher)).await?;
        let Some(row) = rows.first() else {
            return Ok(0);
        };
        let n: i64 = row
            .get("n")
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(n.max(0) as u64)
    }
}

/// Relationship types cannot be parameterized, so the checked type is
/// interpolated. Backticks let types such as `2ND_WIFE_OF` start with a digit.
fn merge_relation_cypher(rel_type: &str) -> String {
    format!(
        "MERGE (h:ENTITY {{name: $head}}) \
         MERGE (t:ENTITY {{name: $tail}}) \
         MERGE (h)-[:`{rel_type}`]->(t)"
    )
}

fn merge_alias_cypher() -> String {
    format!(
        "MERGE (e:ENTITY {{name: $entity}}) \
         MERGE (a:ALIAS {{name: $alias}}) \
         MERGE (a)-[:`{ALIAS_OF}`]->(e)"
    )
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn merge_relation(
        &self,
        head: &str,
        rel_type: &str,
        tail: &str,
    ) -> Result<(), StoreError> {
        if !is_valid_identifier(rel_type) {
            return Err(StoreError::InvalidRelationType(rel_type.to_string()));
        }

        self.run(
            query(&merge_relation_cypher(rel_type))
                .param("head", head.to_string())
                .param("tail", tail.to_string()),
        )
        .await
    }

    async fn merge_alias(&self, alias: &str, entity: &str) -> Result<(), StoreError> {
        self.run(
            query(&merge_alias_cypher())
                .param("alias", alias.to_string())
                .param("entity", entity.to_string()),
        )
        .await
    }

    async fn query(&self, cypher: &str) -> Result<Vec<Row>, StoreError> {
        let rows = self.rows(query(cypher)).await?;
        rows.iter()
            .map(|row| {
                // Bolt rows decode through a hash map; column order is lost here
                let fields: Map<String, Value> = row
                    .to()
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok(fields.into_iter().collect())
            })
            .collect()
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.run(query("MATCH (n) DETACH DELETE n")).await
    }

    async fn stats(&self) -> Result<GraphStats, StoreError> {
        let nodes = self.count("MATCH (n) RETURN count(n) AS n").await?;
        let relationships = self.count("MATCH ()-[r]->() RETURN count(r) AS n").await?;
        Ok(GraphStats {
            nodes,
            relationships,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    async fn sample_triples(&self, limit: usize) -> Result<Vec<StoredTriple>, StoreError> {
        let q = query(
            "MATCH (h:ENTITY)-[r]->(t:ENTITY) \
             RETURN h.name AS head, type(r) AS relation, t.name AS tail \
             LIMIT $limit",
        )
        .param("limit", limit as i64);

        self.rows(q)
            .await?
            .iter()
            .map(|row| {
                let field = |key: &str| -> Result<String, StoreError> {
                    row.get::<String>(key)
                        .map_err(|e| StoreError::Decode(e.to_string()))
                };
                Ok(StoredTriple {
                    head: field("head")?,
                    relation: field("relation")?,
                    tail: field("tail")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{GraphWriter, QueryExecutor, QueryOutcome};
    use crate::{AliasMap, Triple};
    use serial_test::serial;
    use serde_json::json;
    use std::sync::Arc;

    fn test_config() -> GraphConfig {
        let defaults = GraphConfig::default();
        GraphConfig {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
            user: std::env::var("NEO4J_USER").unwrap_or(defaults.user),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or_default(),
            ..defaults
        }
    }

    async fn empty_store() -> Neo4jStore {
        let store = Neo4jStore::connect(&test_config()).await.unwrap();
        store.clear().await.unwrap();
        store
    }

    #[test]
    fn test_relation_type_is_quoted() {
        let cypher = merge_relation_cypher("2ND_WIFE_OF");
        assert!(cypher.contains("MERGE (h)-[:`2ND_WIFE_OF`]->(t)"));
        assert!(cypher.contains("{name: $head}"));
        assert!(merge_alias_cypher().contains("[:`ALIAS_OF`]"));
    }

    // Integration tests require running Neo4j
    #[tokio::test]
    #[serial]
    #[ignore = "Requires running Neo4j"]
    async fn test_merge_is_idempotent() {
        let store = empty_store().await;
        for _ in 0..2 {
            store
                .merge_relation("Apple Inc.", "FOUNDED_BY", "Steve Jobs")
                .await
                .unwrap();
            store.merge_alias("Apple", "Apple Inc.").await.unwrap();
        }

        let stats = store.stats().await.unwrap();
        assert_eq!(stats, GraphStats { nodes: 3, relationships: 2 });
    }

    #[tokio::test]
    #[serial]
    #[ignore = "Requires running Neo4j"]
    async fn test_clear_leaves_empty_graph() {
        let store = empty_store().await;
        store.merge_relation("A", "KNOWS", "B").await.unwrap();

        store.clear().await.unwrap();

        assert!(store.stats().await.unwrap().is_empty());
    }

    #[tokio::test]
    #[serial]
    #[ignore = "Requires running Neo4j"]
    async fn test_digit_leading_relation_type() {
        let store = Arc::new(empty_store().await);
        let writer = GraphWriter::new(Some(store.clone() as Arc<dyn GraphStore>));
        let triples = vec![
            Triple::new("Steve Jobs", "1st CEO of", "Apple Inc."),
            Triple::new("Apple Inc.", "1976", "Cupertino"),
        ];

        let outcome = writer.insert_triples(&triples, &AliasMap::new()).await.unwrap();

        assert_eq!(outcome.inserted(), 2);
        let sample = store.sample_triples(10).await.unwrap();
        assert!(sample.iter().any(|t| t.relation == "1ST_CEO_OF"));
        assert!(sample.iter().any(|t| t.relation == "1976"));
    }

    #[tokio::test]
    #[serial]
    #[ignore = "Requires running Neo4j"]
    async fn test_multi_column_query_surfaces_result() {
        let store = Arc::new(empty_store().await);
        store
            .merge_relation("Apple Inc.", "FOUNDED_BY", "Steve Jobs")
            .await
            .unwrap();
        let executor = QueryExecutor::new(Some(store as Arc<dyn GraphStore>));

        let outcome = executor
            .execute(
                "MATCH (h:ENTITY {name: 'Apple Inc.'})-[r]->(t:ENTITY) \
                 RETURN type(r) AS relation, h.name AS head, t.name AS result, 1 AS extra",
            )
            .await;

        assert_eq!(outcome, QueryOutcome::Rows(vec![json!("Steve Jobs")]));
    }
}
