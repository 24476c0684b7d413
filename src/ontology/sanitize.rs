//! Relationship type sanitization
//!
//! Neo4j relationship types are interpolated into Cypher text because they
//! cannot be passed as parameters. Every relation label coming out of the
//! language model goes through [`sanitize_relation`] first, which maps it onto
//! the identifier grammar `[A-Z0-9_]`.

/// Reserved relationship type linking an `ALIAS` node to its `ENTITY`.
pub const ALIAS_OF: &str = "ALIAS_OF";

/// Convert a free-form relation label into a relationship type identifier.
///
/// The label is uppercased, then every character outside `[A-Z0-9_]` is
/// replaced with a single `_`. Consecutive underscores are kept and there is
/// no length cap. The empty string maps to the empty string.
///
/// # Examples
///
/// ```
/// use omnigraph::ontology::sanitize_relation;
///
/// assert_eq!(sanitize_relation("born in"), "BORN_IN");
/// assert_eq!(sanitize_relation("co-founded"), "CO_FOUNDED");
/// ```
pub fn sanitize_relation(label: &str) -> String {
    label
        .to_uppercase()
        .chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect()
}

/// Check that `value` is a non-empty identifier usable as a relationship type.
pub fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_relation("born in"), "BORN_IN");
        assert_eq!(sanitize_relation("FOUNDED_BY"), "FOUNDED_BY");
        assert_eq!(sanitize_relation("acted-in"), "ACTED_IN");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_relation(""), "");
        assert!(!is_valid_identifier(""));
    }

    #[test]
    fn test_sanitize_keeps_repeated_underscores() {
        assert_eq!(sanitize_relation("works  at"), "WORKS__AT");
        assert_eq!(sanitize_relation("a.b-c"), "A_B_C");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        // 'é' uppercases to 'É', which is outside the grammar
        assert_eq!(sanitize_relation("née"), "N_E");
        assert_eq!(sanitize_relation("出生"), "__");
    }

    #[test]
    fn test_sanitize_rejects_cypher_injection() {
        let hostile = "KNOWS]->(x) DETACH DELETE x //";
        let safe = sanitize_relation(hostile);
        assert!(is_valid_identifier(&safe));
        assert!(!safe.contains(']'));
    }

    #[test]
    fn test_alias_of_is_valid() {
        assert!(is_valid_identifier(ALIAS_OF));
    }

    proptest! {
        #[test]
        fn prop_output_matches_grammar(label in ".*") {
            let out = sanitize_relation(&label);
            prop_assert!(out.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn prop_idempotent(label in ".*") {
            let once = sanitize_relation(&label);
            prop_assert_eq!(sanitize_relation(&once), once.clone());
        }
    }
}
