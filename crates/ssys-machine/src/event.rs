//! Events consumed by the state machine.

use std::borrow::Cow;
use std::fmt;

use crate::Span;

/// Document events, in document order.
///
/// An empty element such as `<autopos/>` arrives as an `Enter` immediately
/// followed by its `Leave`.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<'src> {
    /// An element was entered.
    Enter {
        /// Element name; this is the trigger looked up in the open table.
        name: Cow<'src, str>,
        /// Attributes carried by the start tag.
        attributes: Attributes<'src>,
        /// Span of the start tag.
        span: Span,
    },
    /// An element was left.
    Leave {
        /// Element name; this is the trigger looked up in the close table.
        name: Cow<'src, str>,
        /// Span of the end tag.
        span: Span,
    },
    /// Character data between tags.
    Text {
        /// Text after entity expansion.
        text: Cow<'src, str>,
        /// Span of the text run.
        span: Span,
    },
}

impl<'src> Event<'src> {
    /// Build an `Enter` event with no attributes and no span.
    pub fn enter(name: impl Into<Cow<'src, str>>) -> Self {
        Event::Enter {
            name: name.into(),
            attributes: Attributes::new(),
            span: Span::default(),
        }
    }

    /// Build an `Enter` event carrying the given attributes.
    pub fn enter_with<I, K, V>(name: impl Into<Cow<'src, str>>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Cow<'src, str>>,
        V: Into<Cow<'src, str>>,
    {
        Event::Enter {
            name: name.into(),
            attributes: attributes.into_iter().collect(),
            span: Span::default(),
        }
    }

    /// Build a `Leave` event with no span.
    pub fn leave(name: impl Into<Cow<'src, str>>) -> Self {
        Event::Leave {
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Build a `Text` event with no span.
    pub fn text(text: impl Into<Cow<'src, str>>) -> Self {
        Event::Text {
            text: text.into(),
            span: Span::default(),
        }
    }

    /// Get the span for this event.
    pub fn span(&self) -> Span {
        match self {
            Event::Enter { span, .. } | Event::Leave { span, .. } | Event::Text { span, .. } => {
                *span
            }
        }
    }

    /// Replace the span of this event.
    pub fn with_span(mut self, new_span: Span) -> Self {
        match &mut self {
            Event::Enter { span, .. } | Event::Leave { span, .. } | Event::Text { span, .. } => {
                *span = new_span
            }
        }
        self
    }

    /// Detach the event from its source buffer.
    pub fn into_owned(self) -> Event<'static> {
        match self {
            Event::Enter {
                name,
                attributes,
                span,
            } => Event::Enter {
                name: Cow::Owned(name.into_owned()),
                attributes: attributes.into_owned(),
                span,
            },
            Event::Leave { name, span } => Event::Leave {
                name: Cow::Owned(name.into_owned()),
                span,
            },
            Event::Text { text, span } => Event::Text {
                text: Cow::Owned(text.into_owned()),
                span,
            },
        }
    }
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Enter {
                name, attributes, ..
            } => {
                write!(f, "<{name}")?;
                for (key, value) in attributes.iter() {
                    write!(f, " {key}={value:?}")?;
                }
                write!(f, ">")
            }
            Event::Leave { name, .. } => write!(f, "</{name}>"),
            Event::Text { text, .. } => write!(f, "{text:?}"),
        }
    }
}

/// The attribute set of a start tag, in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attributes<'src> {
    pairs: Vec<(Cow<'src, str>, Cow<'src, str>)>,
}

impl<'src> Attributes<'src> {
    /// An empty attribute set.
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append an attribute.
    pub fn push(&mut self, key: impl Into<Cow<'src, str>>, value: impl Into<Cow<'src, str>>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Look up an attribute value by name. The first occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn into_owned(self) -> Attributes<'static> {
        Attributes {
            pairs: self
                .pairs
                .into_iter()
                .map(|(k, v)| (Cow::Owned(k.into_owned()), Cow::Owned(v.into_owned())))
                .collect(),
        }
    }
}

impl<'src, K, V> FromIterator<(K, V)> for Attributes<'src>
where
    K: Into<Cow<'src, str>>,
    V: Into<Cow<'src, str>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
