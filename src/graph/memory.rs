//! In-process graph store
//!
//! Holds the same `ENTITY`/`ALIAS` schema as Neo4j in memory. Writes follow
//! the same merge semantics. Reads understand the single-hop query shapes the
//! translation prompt asks the model for:
//!
//! ```text
//! MATCH (a:ENTITY {name:"X"})-[:TYPE]->(b:ENTITY) RETURN b.name AS result
//! MATCH (a:ENTITY)-[:TYPE]->(b:ENTITY) WHERE a.name CONTAINS "x" RETURN b.name AS result
//! MATCH (a:ENTITY)-[:TYPE]->(b:ENTITY) WHERE a.name CONTAINS "x"
//!     OR EXISTS { MATCH (x:ALIAS)-[:ALIAS_OF]->(a) WHERE x.name CONTAINS "x" } RETURN b.name AS result
//! MATCH (n) RETURN count(n)
//! MATCH ()-[r]->() RETURN count(r)
//! RETURN 1
//! ```
//!
//! Anything else is rejected with [`StoreError::Query`], the same way a real
//! store reports a query it cannot run.

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use super::{
    GraphStats, GraphStore, Row, StoreError, StoredTriple, ALIAS_LABEL, ENTITY_LABEL,
};
use crate::ontology::sanitize::{is_valid_identifier, ALIAS_OF};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct NodeKey {
    label: &'static str,
    name: String,
}

impl NodeKey {
    fn entity(name: &str) -> Self {
        Self {
            label: ENTITY_LABEL,
            name: name.to_string(),
        }
    }

    fn alias(name: &str) -> Self {
        Self {
            label: ALIAS_LABEL,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    from: NodeKey,
    rel_type: String,
    to: NodeKey,
}

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeSet<NodeKey>,
    /// Insertion order is the row order of query results
    edges: Vec<Edge>,
    /// Remaining successful writes before every write fails
    writes_left: Option<usize>,
}

impl MemoryState {
    fn take_write(&mut self) -> Result<(), StoreError> {
        match self.writes_left.as_mut() {
            Some(0) => Err(StoreError::Connection(
                "memory graph write limit reached".to_string(),
            )),
            Some(n) => {
                *n -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Names of `ALIAS` nodes linked to `entity`
    fn aliases_of<'s>(&'s self, entity: &'s NodeKey) -> impl Iterator<Item = &'s str> + 's {
        self.edges
            .iter()
            .filter(move |e| e.rel_type == ALIAS_OF && e.from.label == ALIAS_LABEL && &e.to == entity)
            .map(|e| e.from.name.as_str())
    }

    fn merge_edge(&mut self, from: NodeKey, rel_type: &str, to: NodeKey) {
        self.nodes.insert(from.clone());
        self.nodes.insert(to.clone());
        let edge = Edge {
            from,
            rel_type: rel_type.to_string(),
            to,
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }
}

/// Graph store kept entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<MemoryState>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every write after the first `n`, simulating a store that goes
    /// away in the middle of a batch.
    pub fn with_write_limit(n: usize) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                writes_left: Some(n),
                ..MemoryState::default()
            }),
        }
    }

    /// Names of all `ENTITY` nodes, sorted
    pub async fn entity_names(&self) -> Vec<String> {
        self.names_with_label(ENTITY_LABEL).await
    }

    /// Names of all `ALIAS` nodes, sorted
    pub async fn alias_names(&self) -> Vec<String> {
        self.names_with_label(ALIAS_LABEL).await
    }

    /// Every edge, including `ALIAS_OF`, in insertion order
    pub async fn relationships(&self) -> Vec<StoredTriple> {
        self.state
            .read()
            .await
            .edges
            .iter()
            .map(|e| StoredTriple {
                head: e.from.name.clone(),
                relation: e.rel_type.clone(),
                tail: e.to.name.clone(),
            })
            .collect()
    }

    async fn names_with_label(&self, label: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .nodes
            .iter()
            .filter(|n| n.label == label)
            .map(|n| n.name.clone())
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraph {
    async fn merge_relation(
        &self,
        head: &str,
        rel_type: &str,
        tail: &str,
    ) -> Result<(), StoreError> {
        if !is_valid_identifier(rel_type) {
            return Err(StoreError::InvalidRelationType(rel_type.to_string()));
        }
        let mut state = self.state.write().await;
        state.take_write()?;
        state.merge_edge(NodeKey::entity(head), rel_type, NodeKey::entity(tail));
        Ok(())
    }

    async fn merge_alias(&self, alias: &str, entity: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.take_write()?;
        state.merge_edge(NodeKey::alias(alias), ALIAS_OF, NodeKey::entity(entity));
        Ok(())
    }

    async fn query(&self, cypher: &str) -> Result<Vec<Row>, StoreError> {
        let state = self.state.read().await;
        evaluate(&state, cypher)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.nodes.clear();
        state.edges.clear();
        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, StoreError> {
        let state = self.state.read().await;
        Ok(GraphStats {
            nodes: state.nodes.len() as u64,
            relationships: state.edges.len() as u64,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn sample_triples(&self, limit: usize) -> Result<Vec<StoredTriple>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .edges
            .iter()
            .filter(|e| e.from.label == ENTITY_LABEL && e.to.label == ENTITY_LABEL)
            .take(limit)
            .map(|e| StoredTriple {
                head: e.from.name.clone(),
                relation: e.rel_type.clone(),
                tail: e.to.name.clone(),
            })
            .collect())
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

fn node_pattern(prefix: &str) -> String {
    format!(
        r#"\(\s*(?P<{prefix}var>\w+)(?:\s*:\s*(?P<{prefix}label>\w+))?\s*(?:\{{\s*name\s*:\s*(?:"(?P<{prefix}dq>[^"]*)"|'(?P<{prefix}sq>[^']*)')\s*\}})?\s*\)"#
    )
}

/// `OR EXISTS { MATCH (x:ALIAS)-[:ALIAS_OF]->(v) WHERE x.name CONTAINS "s" }`
fn alias_exists_pattern() -> String {
    format!(
        r#"(?:\s+OR\s+EXISTS\s*\{{\s*MATCH\s+\(\s*(?P<avar>\w+)\s*:\s*{ALIAS_LABEL}\s*\)\s*-\[\s*:\s*{ALIAS_OF}\s*\]->\s*\(\s*(?P<atarget>\w+)\s*\)\s+WHERE\s+(?P<alower>toLower\(\s*)?(?P<awvar>\w+)\.name\s*\)?\s+CONTAINS\s+(?:toLower\(\s*)?(?:"(?P<adq>[^"]*)"|'(?P<asq>[^']*)')\s*\)?\s*\}})?"#
    )
}

fn single_hop_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = format!(
            r#"(?i)^\s*MATCH\s+{a}\s*-\[\s*\w*\s*:\s*(?P<rel>\w+)\s*\]->\s*{b}(?:\s+WHERE\s+(?P<lower>toLower\(\s*)?(?P<wvar>\w+)\.name\s*\)?\s+CONTAINS\s+(?:toLower\(\s*)?(?:"(?P<wdq>[^"]*)"|'(?P<wsq>[^']*)')\s*\)?{alias})?\s+RETURN\s+(?P<distinct>DISTINCT\s+)?(?P<ret>\w+)\.name(?:\s+AS\s+(?P<col>\w+))?\s*;?\s*$"#,
            a = node_pattern("a"),
            b = node_pattern("b"),
            alias = alias_exists_pattern(),
        );
        Regex::new(&pattern).expect("Invalid regex pattern")
    })
}

fn count_nodes_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*MATCH\s+\(\s*\w*\s*\)\s+RETURN\s+count\(\s*\w+\s*\)(?:\s+AS\s+(?P<col>\w+))?\s*;?\s*$")
            .expect("Invalid regex pattern")
    })
}

fn count_edges_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*MATCH\s+\(\s*\)\s*-\[\s*\w*\s*\]->\s*\(\s*\)\s+RETURN\s+count\(\s*\w+\s*\)(?:\s+AS\s+(?P<col>\w+))?\s*;?\s*$")
            .expect("Invalid regex pattern")
    })
}

fn return_one_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*RETURN\s+1\s*;?\s*$").expect("Invalid regex pattern"))
}

/// Column name given by `AS`, or the default Cypher would pick
fn column(caps: &Captures<'_>, default: &str) -> String {
    caps.name("col")
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| default.to_string())
}

fn quoted<'h>(caps: &Captures<'h>, dq: &str, sq: &str) -> Option<&'h str> {
    caps.name(dq).or_else(|| caps.name(sq)).map(|m| m.as_str())
}

struct NodeFilter<'h> {
    var: &'h str,
    label: Option<&'h str>,
    name: Option<&'h str>,
}

impl NodeFilter<'_> {
    fn from_caps<'h>(caps: &Captures<'h>, prefix: &str) -> NodeFilter<'h> {
        NodeFilter {
            var: caps.name(&format!("{prefix}var")).map_or("", |m| m.as_str()),
            label: caps.name(&format!("{prefix}label")).map(|m| m.as_str()),
            name: quoted(caps, &format!("{prefix}dq"), &format!("{prefix}sq")),
        }
    }

    fn matches(&self, node: &NodeKey) -> bool {
        self.label.map_or(true, |l| l == node.label) && self.name.map_or(true, |n| n == node.name)
    }
}

fn evaluate(state: &MemoryState, cypher: &str) -> Result<Vec<Row>, StoreError> {
    if return_one_re().is_match(cypher) {
        return Ok(vec![Row::new(vec![("1".to_string(), json!(1))])]);
    }
    if let Some(caps) = count_nodes_re().captures(cypher) {
        let col = column(&caps, "count");
        return Ok(vec![Row::new(vec![(col, json!(state.nodes.len()))])]);
    }
    if let Some(caps) = count_edges_re().captures(cypher) {
        let col = column(&caps, "count");
        return Ok(vec![Row::new(vec![(col, json!(state.edges.len()))])]);
    }

    let caps = single_hop_re().captures(cypher).ok_or_else(|| {
        StoreError::Query(format!("unsupported query for memory graph: {cypher}"))
    })?;

    let a = NodeFilter::from_caps(&caps, "a");
    let b = NodeFilter::from_caps(&caps, "b");
    let rel = caps.name("rel").map_or("", |m| m.as_str());
    let ret = caps.name("ret").map_or("", |m| m.as_str());
    let return_from_head = resolve_var(ret, &a, &b)?;

    let contains = match caps.name("wvar") {
        Some(wvar) => Some(Contains {
            on_head: resolve_var(wvar.as_str(), &a, &b)?,
            needle: quoted(&caps, "wdq", "wsq").unwrap_or_default(),
            lower: caps.name("lower").is_some(),
        }),
        None => None,
    };
    let alias_contains = match (caps.name("avar"), caps.name("atarget"), caps.name("awvar")) {
        (Some(avar), Some(target), Some(awvar)) => {
            if avar.as_str() != awvar.as_str() {
                return Err(StoreError::Query(format!(
                    "Variable `{}` not defined",
                    awvar.as_str()
                )));
            }
            Some(Contains {
                on_head: resolve_var(target.as_str(), &a, &b)?,
                needle: quoted(&caps, "adq", "asq").unwrap_or_default(),
                lower: caps.name("alower").is_some(),
            })
        }
        _ => None,
    };

    let col = column(&caps, &format!("{ret}.name"));
    let distinct = caps.name("distinct").is_some();
    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();

    for edge in &state.edges {
        if edge.rel_type != rel || !a.matches(&edge.from) || !b.matches(&edge.to) {
            continue;
        }
        if let Some(filter) = &contains {
            let by_name = filter.hit(&filter.node(edge).name);
            let by_alias = alias_contains.as_ref().is_some_and(|alias| {
                state.aliases_of(alias.node(edge)).any(|name| alias.hit(name))
            });
            if !by_name && !by_alias {
                continue;
            }
        }
        let value = if return_from_head {
            &edge.from.name
        } else {
            &edge.to.name
        };
        if distinct && !seen.insert(value.clone()) {
            continue;
        }
        rows.push(Row::new(vec![(col.clone(), Value::String(value.clone()))]));
    }

    Ok(rows)
}

/// `WHERE <var>.name CONTAINS "needle"`, optionally lowercased on both sides
struct Contains<'h> {
    on_head: bool,
    needle: &'h str,
    lower: bool,
}

impl Contains<'_> {
    fn node<'e>(&self, edge: &'e Edge) -> &'e NodeKey {
        if self.on_head {
            &edge.from
        } else {
            &edge.to
        }
    }

    fn hit(&self, haystack: &str) -> bool {
        if self.lower {
            haystack.to_lowercase().contains(&self.needle.to_lowercase())
        } else {
            haystack.contains(self.needle)
        }
    }
}

/// `true` when `var` names the head node, `false` for the tail node
fn resolve_var(var: &str, a: &NodeFilter<'_>, b: &NodeFilter<'_>) -> Result<bool, StoreError> {
    if var == a.var {
        Ok(true)
    } else if var == b.var {
        Ok(false)
    } else {
        Err(StoreError::Query(format!("Variable `{var}` not defined")))
    }
}
