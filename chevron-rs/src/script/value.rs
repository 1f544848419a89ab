//! Runtime value type for the chevron language.
//!
//! Only three kinds of value exist: integers, text, and the "no value"
//! sentinel produced by failed variable lookups.  Every value has a total
//! textual form, which is what substitution and printing operate on.

use std::fmt;

/// The text an [`Value::Unresolved`] renders as.
pub const SENTINEL: &str = "none";

/// A chevron runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    Integer(i64),
    Text(String),
    /// Result of a lookup that found nothing.
    #[default]
    Unresolved,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Unresolved => f.write_str(SENTINEL),
        }
    }
}

impl Value {
    /// Classify a source segment as a literal.
    ///
    /// Double-quoted segments become [`Value::Text`] with the quotes
    /// stripped; decimal integers become [`Value::Integer`], or
    /// [`Value::Text`] when they do not fit in an `i64`.  Anything else is
    /// not a literal and yields `None`.
    pub fn parse_literal(segment: &str) -> Option<Value> {
        if let Some(inner) = unquote(segment) {
            return Some(Value::Text(inner.to_owned()));
        }
        if is_integer_literal(segment) {
            return Some(
                segment
                    .parse()
                    .map(Value::Integer)
                    .unwrap_or_else(|_| Value::Text(segment.to_owned())),
            );
        }
        None
    }

    /// Like [`Value::parse_literal`], but a bare word is taken verbatim as text.
    pub fn from_segment(segment: &str) -> Value {
        Value::parse_literal(segment).unwrap_or_else(|| Value::Text(segment.to_owned()))
    }

    /// Text to write into a statement segment so that reading the segment
    /// back with [`Value::from_segment`] yields this same value.
    ///
    /// Text that would otherwise read back as an integer or lose a pair of
    /// quotes is wrapped in quotes.
    pub fn to_segment(&self) -> String {
        match self {
            Value::Text(s) if Value::from_segment(s) != *self => format!("\"{s}\""),
            other => other.to_string(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Value::Unresolved)
    }

    /// Name of the type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Unresolved => "unresolved",
        }
    }
}

/// Strip one pair of surrounding double quotes, if present.
pub fn unquote(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
}

pub fn is_quoted(segment: &str) -> bool {
    unquote(segment).is_some()
}

/// `true` for an optional `-` followed by one or more ASCII digits.
pub fn is_integer_literal(segment: &str) -> bool {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::from("hello world").to_string(), "hello world");
        assert_eq!(Value::Unresolved.to_string(), "none");
    }

    #[test]
    fn quoted_literal_strips_quotes() {
        assert_eq!(
            Value::parse_literal("\"hello world\""),
            Some(Value::Text("hello world".into()))
        );
    }

    #[test]
    fn integer_literal() {
        assert_eq!(Value::parse_literal("42"), Some(Value::Integer(42)));
        assert_eq!(Value::parse_literal("-3"), Some(Value::Integer(-3)));
    }

    #[test]
    fn bare_word_is_not_literal() {
        assert_eq!(Value::parse_literal("secret"), None);
        assert_eq!(Value::parse_literal("-"), None);
        assert_eq!(Value::parse_literal("\""), None);
    }

    #[test]
    fn integer_overflow_is_text() {
        assert_eq!(
            Value::parse_literal("99999999999999999999"),
            Some(Value::Text("99999999999999999999".into()))
        );
    }

    #[test]
    fn to_segment_reads_back_unchanged() {
        for v in [
            Value::Text("007".into()),
            Value::Text("-3".into()),
            Value::Text("\"quoted\"".into()),
            Value::Text("hello world".into()),
            Value::Integer(7),
        ] {
            assert_eq!(Value::from_segment(&v.to_segment()), v, "{v:?}");
        }
        assert_eq!(Value::Text("007".into()).to_segment(), "\"007\"");
        assert_eq!(Value::Text("hello world".into()).to_segment(), "hello world");
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Integer(1).type_name(), "integer");
        assert_eq!(Value::from("x").type_name(), "text");
        assert_eq!(Value::Unresolved.type_name(), "unresolved");
    }

    #[test]
    fn from_segment_keeps_bare_words() {
        assert_eq!(Value::from_segment("five"), Value::Text("five".into()));
        assert_eq!(Value::from_segment("5"), Value::Integer(5));
    }

    #[test]
    fn default_is_unresolved() {
        assert!(Value::default().is_unresolved());
    }
}
