use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Literal – a decoded cell
// ---------------------------------------------------------------------------

/// A value decoded from the textual literal stored in a CSV cell.
///
/// The prep scripts write tuple/list-valued columns through pandas, so cells
/// look like `"(0.12, -3.4, 1e-3)"` or `"[1, 2, 3]"`. Scalars, quoted strings,
/// `True`/`False` and `None` are accepted as well.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Bool(bool),
    None,
    Tuple(Vec<Literal>),
    List(Vec<Literal>),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{i}"),
            // `{:?}` keeps the trailing `.0` so the text decodes back to a float.
            Literal::Float(v) => write!(f, "{v:?}"),
            Literal::String(s) => {
                f.write_str("'")?;
                for ch in s.chars() {
                    match ch {
                        '\\' => f.write_str("\\\\")?,
                        '\'' => f.write_str("\\'")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        other => write!(f, "{other}")?,
                    }
                }
                f.write_str("'")
            }
            Literal::Bool(true) => f.write_str("True"),
            Literal::Bool(false) => f.write_str("False"),
            Literal::None => f.write_str("None"),
            Literal::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Literal::List(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl Literal {
    /// Decode the textual literal in `text`.
    pub fn parse(text: &str) -> Result<Literal, LiteralError> {
        if text.trim().is_empty() {
            return Err(LiteralError::Empty);
        }
        let mut parser = Parser {
            src: text,
            pos: 0,
            depth: 0,
        };
        let value = parser.value()?;
        parser.skip_ws();
        if parser.pos < text.len() {
            return Err(LiteralError::Trailing { pos: parser.pos });
        }
        Ok(value)
    }

    /// Types a plain (not literal-encoded) CSV column the way pandas infers
    /// one dtype per column: all integers stay integers, any float or missing
    /// cell among numbers makes the column float, all booleans stay booleans,
    /// anything else is text. Empty cells become `None`.
    pub fn guess_column(cells: &[&str]) -> Vec<Literal> {
        let present = || cells.iter().copied().filter(|s| !s.is_empty());
        let has_missing = cells.iter().any(|s| s.is_empty());
        let fill = |typed: &dyn Fn(&str) -> Literal| -> Vec<Literal> {
            cells
                .iter()
                .map(|s| if s.is_empty() { Literal::None } else { typed(s) })
                .collect()
        };

        if present().next().is_none() {
            return vec![Literal::None; cells.len()];
        }
        if !has_missing && present().all(|s| s.parse::<i64>().is_ok()) {
            return fill(&|s: &str| Literal::Integer(s.parse().unwrap_or_default()));
        }
        if present().all(|s| s.parse::<f64>().is_ok()) {
            return fill(&|s: &str| Literal::Float(s.parse().unwrap_or(f64::NAN)));
        }
        if !has_missing && present().all(|s| parse_bool(s).is_some()) {
            return fill(&|s: &str| Literal::Bool(parse_bool(s).unwrap_or_default()));
        }
        fill(&|s: &str| Literal::String(s.to_string()))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Float(v) => Some(*v),
            Literal::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Elements of a tuple or list.
    pub fn as_sequence(&self) -> Option<&[Literal]> {
        match self {
            Literal::Tuple(items) | Literal::List(items) => Some(items),
            _ => None,
        }
    }

    /// A numeric tuple/list as a coordinate vector, e.g. a heel position.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.as_sequence()?.iter().map(Literal::as_f64).collect()
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Literal::Integer(i) => JsonValue::from(*i),
            Literal::Float(v) => JsonValue::from(*v),
            Literal::String(s) => JsonValue::String(s.clone()),
            Literal::Bool(b) => JsonValue::Bool(*b),
            Literal::None => JsonValue::Null,
            Literal::Tuple(items) | Literal::List(items) => {
                JsonValue::Array(items.iter().map(Literal::to_json).collect())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiteralError {
    #[error("empty cell")]
    Empty,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("trailing input at offset {pos}")]
    Trailing { pos: usize },
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}

/// Deepest tuple/list nesting accepted in one cell.
pub const MAX_NESTING: usize = 100;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> LiteralError {
        match self.peek() {
            Some(ch) => LiteralError::UnexpectedChar { ch, pos: self.pos },
            None => LiteralError::UnexpectedEnd,
        }
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_ws();
        match self.peek() {
            None => Err(LiteralError::UnexpectedEnd),
            Some('(') => {
                self.pos += 1;
                self.nested(Self::parenthesized)
            }
            Some('[') => {
                self.pos += 1;
                self.nested(|p| p.items(']').map(|(items, _)| Literal::List(items)))
            }
            Some(q @ ('\'' | '"')) => {
                self.pos += 1;
                self.string(q).map(Literal::String)
            }
            Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.name(),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        inner: impl FnOnce(&mut Self) -> Result<Literal, LiteralError>,
    ) -> Result<Literal, LiteralError> {
        if self.depth >= MAX_NESTING {
            return Err(LiteralError::TooDeep(MAX_NESTING));
        }
        self.depth += 1;
        let result = inner(self);
        self.depth -= 1;
        result
    }

    /// `()` is the empty tuple, `(x)` is just `x`, `(x,)` and `(x, y)` are tuples.
    fn parenthesized(&mut self) -> Result<Literal, LiteralError> {
        let (mut items, trailing_comma) = self.items(')')?;
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0));
        }
        Ok(Literal::Tuple(items))
    }

    /// Comma-separated values up to `close`. Returns whether a trailing comma was seen.
    fn items(&mut self, close: char) -> Result<(Vec<Literal>, bool), LiteralError> {
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok((items, trailing_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok((items, false));
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, LiteralError> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(LiteralError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(LiteralError::UnexpectedEnd),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('0') => out.push('\0'),
                    Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        let mut is_float = false;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
            self.skip_ws();
        }
        let digits_start = self.pos;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.pos += 1;
                    if matches!(self.peek(), Some('-' | '+')) {
                        self.pos += 1;
                    }
                    continue;
                }
                _ => break,
            }
            self.pos += 1;
        }

        let sign = if self.src[start..digits_start].starts_with('-') { "-" } else { "" };
        let digits: String = self.src[digits_start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let text = format!("{sign}{digits}");
        let invalid = || LiteralError::InvalidNumber(self.src[start..self.pos].to_string());

        if digits.is_empty() {
            return Err(invalid());
        }
        if is_float {
            text.parse::<f64>().map(Literal::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(Literal::Integer).map_err(|_| invalid())
        }
    }

    fn name(&mut self) -> Result<Literal, LiteralError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        match &self.src[start..self.pos] {
            "True" => Ok(Literal::Bool(true)),
            "False" => Ok(Literal::Bool(false)),
            "None" => Ok(Literal::None),
            other => Err(LiteralError::UnknownName(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_tuple() {
        let lit = Literal::parse("(0.12, -3.5, 1e-3)").unwrap();
        assert_eq!(
            lit,
            Literal::Tuple(vec![
                Literal::Float(0.12),
                Literal::Float(-3.5),
                Literal::Float(0.001),
            ])
        );
        assert_eq!(lit.to_f64_vec(), Some(vec![0.12, -3.5, 0.001]));
    }

    #[test]
    fn parses_nested_list_with_mixed_scalars() {
        let lit = Literal::parse("[1, 'a b', None, True, (2,), []]").unwrap();
        assert_eq!(
            lit,
            Literal::List(vec![
                Literal::Integer(1),
                Literal::String("a b".into()),
                Literal::None,
                Literal::Bool(true),
                Literal::Tuple(vec![Literal::Integer(2)]),
                Literal::List(vec![]),
            ])
        );
    }

    #[test]
    fn parentheses_without_comma_are_grouping() {
        assert_eq!(Literal::parse("(5)").unwrap(), Literal::Integer(5));
        assert_eq!(Literal::parse("()").unwrap(), Literal::Tuple(vec![]));
        assert_eq!(
            Literal::parse("(5,)").unwrap(),
            Literal::Tuple(vec![Literal::Integer(5)])
        );
    }

    #[test]
    fn display_text_decodes_to_the_same_value() {
        let value = Literal::Tuple(vec![
            Literal::Float(1.0),
            Literal::Float(-0.25),
            Literal::String("it's".into()),
            Literal::Tuple(vec![Literal::Integer(7)]),
        ]);
        let text = value.to_string();
        assert_eq!(text, "(1.0, -0.25, 'it\\'s', (7,))");
        assert_eq!(Literal::parse(&text).unwrap(), value);
    }

    #[test]
    fn rejects_malformed_cells() {
        assert_eq!(Literal::parse(""), Err(LiteralError::Empty));
        assert_eq!(Literal::parse("(1, 2"), Err(LiteralError::UnexpectedEnd));
        assert_eq!(
            Literal::parse("nan"),
            Err(LiteralError::UnknownName("nan".into()))
        );
        assert!(matches!(
            Literal::parse("1 2"),
            Err(LiteralError::Trailing { pos: 2 })
        ));
        assert!(matches!(
            Literal::parse("-"),
            Err(LiteralError::InvalidNumber(_))
        ));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(
            Literal::parse(&deep),
            Err(LiteralError::TooDeep(MAX_NESTING))
        );

        let ok = format!("{}1,{}", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(Literal::parse(&ok).is_ok());
    }

    #[test]
    fn column_typing_follows_the_whole_column() {
        assert_eq!(
            Literal::guess_column(&["1", "2"]),
            vec![Literal::Integer(1), Literal::Integer(2)]
        );
        assert_eq!(
            Literal::guess_column(&["1", "1.5"]),
            vec![Literal::Float(1.0), Literal::Float(1.5)]
        );
        assert_eq!(
            Literal::guess_column(&["3", ""]),
            vec![Literal::Float(3.0), Literal::None]
        );
        assert_eq!(
            Literal::guess_column(&["True", "false"]),
            vec![Literal::Bool(true), Literal::Bool(false)]
        );
        assert_eq!(
            Literal::guess_column(&["4", "P3", ""]),
            vec![
                Literal::String("4".into()),
                Literal::String("P3".into()),
                Literal::None,
            ]
        );
        assert_eq!(Literal::guess_column(&["", ""]), vec![Literal::None, Literal::None]);
    }
}
