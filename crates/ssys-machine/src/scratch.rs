//! Scratch accumulator for compound values.
//!
//! Hold handlers fill the scratch while the elements of one compound value
//! (a jump, a nebula, a coordinate pair) are visited; the commit handler at
//! the compound's close takes everything out at once, leaving the scratch
//! empty for the next compound.

use std::collections::HashMap;

use crate::Value;
use crate::error::ParseErrorKind;

/// Transient key → value storage, live for one compound at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scratch {
    slots: Option<HashMap<&'static str, Value>>,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `key`, replacing any earlier value.
    pub fn hold(&mut self, key: &'static str, value: Value) {
        self.slots.get_or_insert_with(HashMap::new).insert(key, value);
    }

    /// Take every held value and reset the scratch to empty.
    pub fn take(&mut self) -> Taken {
        Taken {
            slots: self.slots.take().unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.as_ref().is_none_or(HashMap::is_empty)
    }

    /// Peek at a held value without taking it.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        self.slots.as_ref()?.get(key)
    }
}

/// Values taken out of a [`Scratch`] by a commit handler.
///
/// Accessors remove the key they read. Required keys fail with
/// [`ParseErrorKind::MissingKey`] instead of falling back to a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taken {
    slots: HashMap<&'static str, Value>,
}

impl Taken {
    /// Remove a key that must have been held.
    pub fn require(&mut self, key: &'static str) -> Result<Value, ParseErrorKind> {
        self.slots
            .remove(key)
            .ok_or(ParseErrorKind::MissingKey { key })
    }

    /// Remove a key that may not have been held.
    pub fn get(&mut self, key: &'static str) -> Option<Value> {
        self.slots.remove(key)
    }

    /// Required real value.
    pub fn real(&mut self, key: &'static str) -> Result<f64, ParseErrorKind> {
        let value = self.require(key)?;
        expect(key, "real", value.as_real(), &value)
    }

    /// Optional real value, `default` when never held.
    pub fn real_or(&mut self, key: &'static str, default: f64) -> Result<f64, ParseErrorKind> {
        match self.get(key) {
            Some(value) => expect(key, "real", value.as_real(), &value),
            None => Ok(default),
        }
    }

    /// Required real value that may be deliberately [`Value::Absent`].
    pub fn real_or_absent(&mut self, key: &'static str) -> Result<Option<f64>, ParseErrorKind> {
        let value = self.require(key)?;
        if value.is_absent() {
            return Ok(None);
        }
        expect(key, "real", value.as_real(), &value).map(Some)
    }

    /// Required text value.
    pub fn text(&mut self, key: &'static str) -> Result<String, ParseErrorKind> {
        match self.require(key)? {
            Value::Text(s) => Ok(s),
            other => Err(ParseErrorKind::UnexpectedValue {
                key,
                expected: "text",
                found: other.kind(),
            }),
        }
    }

    /// Optional flag, `default` when never held.
    pub fn flag_or(&mut self, key: &'static str, default: bool) -> Result<bool, ParseErrorKind> {
        match self.get(key) {
            Some(value) => expect(key, "flag", value.as_flag(), &value),
            None => Ok(default),
        }
    }

    /// Keys that no accessor has consumed yet.
    pub fn remaining(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn expect<T>(
    key: &'static str,
    expected: &'static str,
    converted: Option<T>,
    value: &Value,
) -> Result<T, ParseErrorKind> {
    converted.ok_or(ParseErrorKind::UnexpectedValue {
        key,
        expected,
        found: value.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_take_clears() {
        let mut scratch = Scratch::new();
        assert!(scratch.is_empty());
        scratch.hold("dest", Value::Text("Amaroq".into()));
        scratch.hold("hide", Value::Real(1.25));
        assert!(!scratch.is_empty());

        let mut taken = scratch.take();
        assert!(scratch.is_empty());
        assert_eq!(taken.text("dest"), Ok("Amaroq".into()));
        assert_eq!(taken.real("hide"), Ok(1.25));
        assert!(taken.is_empty());

        // A second take sees nothing from the first compound.
        assert!(scratch.take().is_empty());
    }

    #[test]
    fn test_require_missing_key() {
        let mut taken = Scratch::new().take();
        assert_eq!(
            taken.require("dest"),
            Err(ParseErrorKind::MissingKey { key: "dest" })
        );
    }

    #[test]
    fn test_defaults_only_when_absent() {
        let mut scratch = Scratch::new();
        scratch.hold("exit_only", Value::Flag(true));
        let mut taken = scratch.take();
        assert_eq!(taken.flag_or("exit_only", false), Ok(true));
        assert_eq!(taken.real_or("hide", 1.25), Ok(1.25));
    }

    #[test]
    fn test_absent_sentinel() {
        let mut scratch = Scratch::new();
        scratch.hold("x", Value::Absent);
        scratch.hold("y", Value::Real(0.0));
        let mut taken = scratch.take();
        assert_eq!(taken.real_or_absent("x"), Ok(None));
        assert_eq!(taken.real_or_absent("y"), Ok(Some(0.0)));
    }

    #[test]
    fn test_wrong_type() {
        let mut scratch = Scratch::new();
        scratch.hold("hide", Value::Text("far".into()));
        assert_eq!(
            scratch.take().real("hide"),
            Err(ParseErrorKind::UnexpectedValue {
                key: "hide",
                expected: "real",
                found: "text",
            })
        );
    }

    #[test]
    fn test_hold_overwrites() {
        let mut scratch = Scratch::new();
        scratch.hold("x", Value::Real(1.0));
        scratch.hold("x", Value::Real(2.0));
        assert_eq!(scratch.peek("x"), Some(&Value::Real(2.0)));
    }
}
