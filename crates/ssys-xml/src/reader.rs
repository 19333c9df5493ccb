//! The quick-xml backed event iterator.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event as XmlEvent};
use ssys_machine::{Attributes, Event, ParseError, ParseErrorKind, Span};
use tracing::trace;

use crate::ReaderOptions;

/// Iterator over the events of one XML document.
///
/// An empty element (`<autopos/>`) yields an enter event immediately
/// followed by a leave event. Reader errors end the iteration after being
/// yielded once.
pub struct XmlEvents<'src> {
    source: &'src str,
    reader: Reader<&'src [u8]>,
    options: ReaderOptions,
    pending: Option<Event<'static>>,
    done: bool,
}

impl<'src> XmlEvents<'src> {
    /// Read `source` with default options.
    pub fn new(source: &'src str) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: &'src str, options: ReaderOptions) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(options.trim_text);
        Self {
            source,
            reader,
            options,
            pending: None,
            done: false,
        }
    }

    fn offset(&self) -> u32 {
        u32::try_from(self.reader.buffer_position()).unwrap_or(u32::MAX)
    }

    /// Span of the markup between two reader positions, without the
    /// whitespace the reader skipped on the way.
    fn span(&self, start: u32, end: u32) -> Span {
        let skipped = self
            .source
            .get(start as usize..end as usize)
            .map(|text| text.len() - text.trim_start().len())
            .unwrap_or_default();
        Span::new((start + skipped as u32).min(end), end)
    }

    fn fail(
        &mut self,
        kind: ParseErrorKind,
        span: Span,
    ) -> Option<Result<Event<'static>, ParseError>> {
        self.done = true;
        Some(Err(ParseError::new(kind, Some(span))))
    }
}

impl Iterator for XmlEvents<'_> {
    type Item = Result<Event<'static>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(leave) = self.pending.take() {
            return Some(Ok(leave));
        }
        if self.done {
            return None;
        }

        loop {
            let start = self.offset();
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let at = u32::try_from(self.reader.error_position()).unwrap_or(start);
                    return self.fail(ParseErrorKind::Source(err.to_string()), Span::empty(at));
                }
            };
            let span = self.span(start, self.offset());

            let converted = match event {
                XmlEvent::Start(e) => enter(&e, span),
                XmlEvent::Empty(e) => enter(&e, span).map(|event| {
                    if let Event::Enter { name, .. } = &event {
                        self.pending = Some(Event::Leave {
                            name: name.clone(),
                            span: Span::empty(span.end),
                        });
                    }
                    event
                }),
                XmlEvent::End(e) => utf8(e.name().as_ref()).map(|name| Event::Leave {
                    name: name.into(),
                    span,
                }),
                XmlEvent::Text(e) => match e.unescape() {
                    Ok(text) if text.is_empty() => continue,
                    Ok(text) => Ok(Event::Text {
                        text: text.into_owned().into(),
                        span,
                    }),
                    Err(err) => Err(ParseErrorKind::Source(err.to_string())),
                },
                XmlEvent::CData(e) if self.options.keep_cdata => utf8(&e).map(|text| Event::Text {
                    text: text.into(),
                    span,
                }),
                XmlEvent::Eof => {
                    self.done = true;
                    return None;
                }
                other => {
                    trace!(?other, "skipped");
                    continue;
                }
            };

            return match converted {
                Ok(event) => Some(Ok(event)),
                Err(kind) => self.fail(kind, span),
            };
        }
    }
}

fn enter(e: &BytesStart<'_>, span: Span) -> Result<Event<'static>, ParseErrorKind> {
    let name = utf8(e.name().as_ref())?;
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseErrorKind::Source(err.to_string()))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|err| ParseErrorKind::Source(err.to_string()))?;
        attributes.push(key, value.into_owned());
    }
    Ok(Event::Enter {
        name: name.into(),
        attributes,
        span,
    })
}

fn utf8(bytes: &[u8]) -> Result<String, ParseErrorKind> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|err| ParseErrorKind::Source(err.to_string()))
}
