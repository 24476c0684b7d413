//! Strict literal parser for model output
//!
//! Models are asked for a list of lists, and usually answer with something
//! that is valid JSON, valid Python, or close to either. This parser accepts
//! the data-only subset both share: quoted strings (single or double quotes,
//! backslash escapes), numbers, and nested lists or tuples, with trailing
//! commas allowed. Nothing is ever evaluated; any other token is an error.

use std::fmt;

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    List(Vec<Literal>),
}

impl Literal {
    /// Scalar values rendered as text; `None` for lists. Floats always keep
    /// a fractional part, so `1e3` reads as `1000.0`, never as an integer.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Literal::Str(s) => Some(s.clone()),
            Literal::Int(i) => Some(i.to_string()),
            Literal::Float(f) => Some(format!("{f:?}")),
            Literal::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Literal::Str(_) => "string",
            Literal::Int(_) => "integer",
            Literal::Float(_) => "float",
            Literal::List(_) => "list",
        }
    }
}

/// Error raised when the input is not a well-formed literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    /// Character offset where parsing stopped
    pub position: usize,
    pub message: String,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.message, self.position)
    }
}

impl std::error::Error for LiteralError {}

/// Maximum nesting depth accepted before giving up.
const MAX_DEPTH: usize = 64;

/// Parse a complete literal. Trailing non-whitespace is an error.
pub fn parse_literal(input: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    parser.skip_ws();
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos < parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(value)
}

/// Parse a literal and require a list (or tuple) at the top level.
pub fn parse_list(input: &str) -> Result<Vec<Literal>, LiteralError> {
    match parse_literal(input)? {
        Literal::List(items) => Ok(items),
        other => Err(LiteralError {
            position: 0,
            message: format!("expected a list at top level, found {}", other.kind()),
        }),
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn error(&self, message: impl Into<String>) -> LiteralError {
        LiteralError {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self, depth: usize) -> Result<Literal, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(self.error("nesting too deep"));
        }
        match self.peek() {
            Some('[') => self.sequence(']', depth),
            Some('(') => self.sequence(')', depth),
            Some(q @ ('"' | '\'')) => self.string(q).map(Literal::Str),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) => Err(self.error(format!("unexpected character '{c}'"))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn sequence(&mut self, close: char, depth: usize) -> Result<Literal, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Literal::List(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(Literal::List(items));
                }
                Some(c) => return Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
                None => return Err(self.error(format!("unclosed sequence, expected '{close}'"))),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error("unterminated string"));
            };
            self.pos += 1;
            match c {
                c if c == quote => return Ok(out),
                '\\' => out.push(self.escape()?),
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, LiteralError> {
        let Some(c) = self.peek() else {
            return Err(self.error("unterminated escape"));
        };
        self.pos += 1;
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'u' => return self.unicode_escape(4),
            'x' => return self.unicode_escape(2),
            // \\, \", \', \/ and unknown escapes keep the character itself
            other => other,
        };
        Ok(decoded)
    }

    fn unicode_escape(&mut self, digits: usize) -> Result<char, LiteralError> {
        let end = self.pos + digits;
        if end > self.chars.len() {
            return Err(self.error("truncated unicode escape"));
        }
        let hex: String = self.chars[self.pos..end].iter().collect();
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("invalid unicode escape '{hex}'")))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid code point {code:#x}")))
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '.' | '_'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if let Ok(i) = text.parse::<i64>() {
            return Ok(Literal::Int(i));
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Literal::Float(f)),
            _ => Err(LiteralError {
                position: start,
                message: format!("invalid number '{text}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Literal {
        Literal::Str(v.to_string())
    }

    #[test]
    fn test_parse_json_style() {
        let parsed = parse_list(r#"[["Elon Musk", "FOUNDED", "Tesla"]]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Literal::List(vec![s("Elon Musk"), s("FOUNDED"), s("Tesla")])]
        );
    }

    #[test]
    fn test_parse_python_style() {
        let parsed = parse_list("[('Javed Akhtar', 'BORN_IN', 'Gwalior',),]").unwrap();
        assert_eq!(
            parsed,
            vec![Literal::List(vec![s("Javed Akhtar"), s("BORN_IN"), s("Gwalior")])]
        );
    }

    #[test]
    fn test_parse_numbers() {
        let parsed = parse_list("[1945, -3, 2.5, 1e3]").unwrap();
        assert_eq!(
            parsed,
            vec![
                Literal::Int(1945),
                Literal::Int(-3),
                Literal::Float(2.5),
                Literal::Float(1000.0)
            ]
        );
    }

    #[test]
    fn test_parse_escapes() {
        let parsed = parse_literal(r#""O\'Neil \"Jr\" é""#).unwrap();
        assert_eq!(parsed, s("O'Neil \"Jr\" é"));
    }

    #[test]
    fn test_rejects_names_and_expressions() {
        assert!(parse_literal("[__import__('os')]").is_err());
        assert!(parse_literal("[True]").is_err());
        assert!(parse_literal("[1 + 2]").is_err());
        assert!(parse_literal("{'a': 1}").is_err());
    }

    #[test]
    fn test_rejects_unbalanced() {
        assert!(parse_list(r#"[["a", "b", "c"]"#).is_err());
        assert!(parse_list(r#"["a", "b"]]"#).is_err());
        assert!(parse_list(r#"["unterminated]"#).is_err());
    }

    #[test]
    fn test_rejects_non_list_top_level() {
        let err = parse_list("'just a string'").unwrap_err();
        assert!(err.message.contains("expected a list"));
        assert!(parse_list("not a list").is_err());
    }

    #[test]
    fn test_rejects_trailing_text() {
        let err = parse_list(r#"[["a","b","c"]] Hope this helps!"#).unwrap_err();
        assert!(err.message.contains("trailing"));
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}{}", "[".repeat(100), "]".repeat(100));
        assert!(parse_literal(&deep).is_err());
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Literal::Int(7).as_text().as_deref(), Some("7"));
        assert_eq!(Literal::Float(1000.0).as_text().as_deref(), Some("1000.0"));
        assert_eq!(Literal::Float(2.5).as_text().as_deref(), Some("2.5"));
        assert_eq!(Literal::List(vec![]).as_text(), None);
    }
}
