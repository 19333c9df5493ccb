//! Content buffer: character data collected for one content-bearing element.

use crate::error::ParseErrorKind;
use crate::{Value, ValueType};

/// Accumulates text between an `expect` and the matching `pull`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBuffer {
    open: Option<(ValueType, String)>,
}

impl ContentBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the buffer for a value of type `ty`, discarding any text
    /// accumulated so far.
    pub fn expect(&mut self, ty: ValueType) {
        self.open = Some((ty, String::new()));
    }

    /// Append text if the buffer is open; otherwise the text is dropped.
    pub fn append(&mut self, text: &str) {
        if let Some((_, buf)) = &mut self.open {
            buf.push_str(text);
        }
    }

    /// Convert the accumulated text and close the buffer.
    ///
    /// The buffer is closed even when conversion fails.
    pub fn pull(&mut self) -> Result<Value, ParseErrorKind> {
        let (ty, text) = self.open.take().ok_or(ParseErrorKind::ContentNotOpen)?;
        ty.parse(&text)
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The type the open buffer expects, if any.
    pub fn expected(&self) -> Option<ValueType> {
        self.open.as_ref().map(|(ty, _)| *ty)
    }

    /// Close the buffer without converting anything.
    pub fn clear(&mut self) {
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_expect_append_pull() {
        let mut buf = ContentBuffer::new();
        buf.expect(ValueType::Real);
        buf.append("80");
        buf.append("00");
        assert_eq!(buf.pull(), Ok(Value::Real(8000.0)));
        assert!(!buf.is_open());
    }

    #[test]
    fn test_append_while_closed_is_dropped() {
        let mut buf = ContentBuffer::new();
        buf.append("ignored");
        buf.expect(ValueType::Text);
        assert_eq!(buf.pull(), Ok(Value::Text(String::new())));
    }

    #[test]
    fn test_expect_discards_previous_text() {
        let mut buf = ContentBuffer::new();
        buf.expect(ValueType::Text);
        buf.append("stale");
        buf.expect(ValueType::Integer);
        buf.append("7");
        assert_eq!(buf.pull(), Ok(Value::Integer(7)));
    }

    #[test]
    fn test_pull_without_expect_fails() {
        let mut buf = ContentBuffer::new();
        assert_eq!(buf.pull(), Err(ParseErrorKind::ContentNotOpen));
    }

    #[test]
    fn test_pull_closes_even_on_error() {
        let mut buf = ContentBuffer::new();
        buf.expect(ValueType::Real);
        buf.append("not a number");
        assert!(buf.pull().is_err());
        assert_eq!(buf.pull(), Err(ParseErrorKind::ContentNotOpen));
    }
}
