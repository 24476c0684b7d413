//! Canned model responses and pages

/// Two chunks worth of extraction output with aliases
pub const MUSK_EXTRACTION: &str = r#"```json
[
  ["Elon Musk", "FOUNDED", "Tesla", ["Elon", "Musk"]],
  ["Elon Musk", "FOUNDED", "SpaceX"],
  ["Tesla", "HEADQUARTERED", "Austin"]
]
```"#;

pub const ACTOR_EXTRACTION: &str = r#"[
  ('Pamela Adlon', 'ACTED_IN', 'Better Things'),
  ('Pamela Adlon', 'acted in', 'Californication'),
  ('Pamela Adlon', 'BORN_IN', 'New York City'),
]"#;

pub const PARTIAL_NAME_QUERY: &str = r#"MATCH (p:ENTITY)-[:FOUNDED]->(c:ENTITY) WHERE toLower(p.name) CONTAINS toLower("musk") RETURN DISTINCT c.name AS result"#;

pub const COMBS_EXTRACTION: &str = r#"[
  ["Sean Combs", "FOUNDED", "Bad Boy Records", ["Diddy", "Puff Daddy"]],
  ["Sean Combs", "BORN_IN", "New York City"]
]"#;

/// Resolves "Diddy" only through the `ALIAS` node
pub const ALIAS_QUERY: &str = r#"MATCH (p:ENTITY)-[:FOUNDED]->(c:ENTITY) WHERE toLower(p.name) CONTAINS toLower("Diddy") OR EXISTS { MATCH (a:ALIAS)-[:ALIAS_OF]->(p) WHERE toLower(a.name) CONTAINS toLower("Diddy") } RETURN DISTINCT c.name AS result"#;

pub const ACTED_IN_QUERY: &str = r#"cypher
MATCH (a:ENTITY {name:"Pamela Adlon"})-[:ACTED_IN]->(m:ENTITY) RETURN m.name AS result"#;

pub const ARTICLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Apple</title></head>
<body>
  <nav>Home | About</nav>
  <p>Apple Inc. was founded by Steve Jobs, Steve Wozniak and Ronald Wayne in 1976.</p>
  <p>The company is headquartered in Cupertino, California.</p>
  <footer>Copyright</footer>
</body>
</html>"#;
