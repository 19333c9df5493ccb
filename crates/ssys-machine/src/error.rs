//! Error types for table construction and parsing.

use std::fmt;

use crate::{Span, State, ValueType};

/// A transition table that cannot drive a machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// Two different start states reach the same state on the same trigger,
    /// so leaving that element could return to either of them.
    #[error(
        "ambiguous reverse transition: leaving `{trigger}` from {state} could return to {first} or {second}"
    )]
    AmbiguousReverse {
        trigger: &'static str,
        state: State,
        first: State,
        second: State,
    },
}

/// Which table a trigger was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Enter,
    Leave,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Enter => "entering",
            Direction::Leave => "leaving",
        })
    }
}

/// What went wrong while parsing a document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    /// The element has no transition from the current state.
    #[error("trigger `{trigger}` is not valid in state {state} ({direction} element)")]
    InvalidTrigger {
        trigger: String,
        state: State,
        direction: Direction,
    },
    /// A transition led to a state the table does not declare.
    #[error("dead end: state {state} is not declared in the table")]
    DeadEnd { state: State },
    /// Content could not be converted to the expected type.
    #[error("malformed content {text:?}: expected {expected}")]
    MalformedContent { text: String, expected: ValueType },
    /// An element was entered after the document root was left.
    #[error("element `{trigger}` after the end of the document root")]
    TrailingContent { trigger: String },
    /// The document ended while an element was still open.
    #[error("document ended in state {state}")]
    PrematureEnd { state: State },
    /// Content was pulled while no content buffer was open.
    #[error("no content buffer is open")]
    ContentNotOpen,
    /// A commit expected a scratch key that was never held.
    #[error("scratch key `{key}` was never held")]
    MissingKey { key: &'static str },
    /// A required attribute is missing from the element.
    #[error("missing attribute `{name}`")]
    MissingAttribute { name: &'static str },
    /// A held or committed value has the wrong type.
    #[error("`{key}` holds a {found} value, expected {expected}")]
    UnexpectedValue {
        key: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// A parse was attempted after an earlier error.
    #[error("session already failed")]
    Poisoned,
    /// The event source failed to produce an event.
    #[error("{0}")]
    Source(String),
}

/// A parse failure, with the span of the offending event when known.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Option<Span>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }

    /// Attach a span unless one is already known.
    pub fn or_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self { kind, span: None }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(span) = self.span {
            write!(f, " at offset {}", span.start)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}
