//! Typed values produced from element content and attributes.

use std::fmt;

use crate::error::ParseErrorKind;

/// The type a piece of raw text is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Text, with surrounding whitespace removed.
    Text,
    /// A real number (`f64`).
    Real,
    /// A non-negative integer (`u64`).
    Integer,
}

impl ValueType {
    /// Convert raw text into a value of this type.
    ///
    /// Surrounding whitespace is ignored for every type.
    pub fn parse(self, raw: &str) -> Result<Value, ParseErrorKind> {
        let text = raw.trim();
        let malformed = || ParseErrorKind::MalformedContent {
            text: raw.to_string(),
            expected: self,
        };
        match self {
            ValueType::Text => Ok(Value::Text(text.to_string())),
            ValueType::Real => text.parse().map(Value::Real).map_err(|_| malformed()),
            ValueType::Integer => text.parse().map(Value::Integer).map_err(|_| malformed()),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Text => "text",
            ValueType::Real => "real",
            ValueType::Integer => "integer",
        })
    }
}

/// A typed value, either parsed from the document or supplied by a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Real(f64),
    Integer(u64),
    Flag(bool),
    /// Deliberately left unspecified (e.g. an auto-positioned coordinate).
    Absent,
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Real(_) => "real",
            Value::Integer(_) => "integer",
            Value::Flag(_) => "flag",
            Value::Absent => "absent",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Real value; integers widen to reals.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Value::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Flag(b) => write!(f, "{b}"),
            Value::Absent => f.write_str("absent"),
        }
    }
}
