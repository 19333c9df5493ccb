//! Conversions from committed values to record field types.

use ssys_machine::{ParseErrorKind, Value};

pub(crate) fn text(key: &'static str, value: Value) -> Result<String, ParseErrorKind> {
    let found = value.kind();
    value.into_text().ok_or(ParseErrorKind::UnexpectedValue {
        key,
        expected: "text",
        found,
    })
}

pub(crate) fn real(key: &'static str, value: &Value) -> Result<f64, ParseErrorKind> {
    value.as_real().ok_or(ParseErrorKind::UnexpectedValue {
        key,
        expected: "real",
        found: value.kind(),
    })
}

pub(crate) fn integer(key: &'static str, value: &Value) -> Result<u64, ParseErrorKind> {
    value.as_integer().ok_or(ParseErrorKind::UnexpectedValue {
        key,
        expected: "integer",
        found: value.kind(),
    })
}

pub(crate) fn flag(key: &'static str, value: &Value) -> Result<bool, ParseErrorKind> {
    value.as_flag().ok_or(ParseErrorKind::UnexpectedValue {
        key,
        expected: "flag",
        found: value.kind(),
    })
}
