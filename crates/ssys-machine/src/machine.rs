//! The state machine engine.
//!
//! A [`Machine`] is built once from a [`TableBuilder`] and is immutable
//! afterwards, so one machine can serve any number of concurrent parses.
//! Each parse owns a [`Session`] holding the current state, the record under
//! construction and the working storage used by handlers.

use tracing::{debug, trace, warn};

use crate::error::{Direction, ParseError, ParseErrorKind, TableError};
use crate::table::{CloseTable, OpenTable, TableBuilder, reverse};
use crate::{Attributes, ContentBuffer, Event, Handler, Record, Scratch, State, dispatch};

/// An immutable pair of open and close tables for one record type.
#[derive(Debug, Clone)]
pub struct Machine<R: Record> {
    open: OpenTable<R::Field, R::Compound>,
    close: CloseTable<R::Field, R::Compound>,
}

impl<R: Record> Machine<R> {
    /// Build the open table and derive the close table from it.
    ///
    /// Audit findings are logged but only an ambiguous reversal fails.
    pub fn new(builder: TableBuilder<R::Field, R::Compound>) -> Result<Self, TableError> {
        let open = builder.build();
        for issue in open.audit() {
            warn!(%issue, "transition table issue");
        }
        let close = reverse(&open)?;
        debug!(
            states = open.states().len(),
            open = open.len(),
            close = close.len(),
            "machine built"
        );
        Ok(Self { open, close })
    }

    pub fn open_table(&self) -> &OpenTable<R::Field, R::Compound> {
        &self.open
    }

    pub fn close_table(&self) -> &CloseTable<R::Field, R::Compound> {
        &self.close
    }

    /// Start a new parse.
    pub fn session(&self) -> Session<'_, R> {
        Session {
            machine: self,
            state: State::START,
            record: R::default(),
            scratch: Scratch::new(),
            content: ContentBuffer::new(),
            closed: false,
            poisoned: false,
        }
    }

    /// Parse a complete event stream into a record.
    pub fn parse<'src, I>(&self, events: I) -> Result<R, ParseError>
    where
        I: IntoIterator<Item = Result<Event<'src>, ParseError>>,
    {
        let mut session = self.session();
        for event in events {
            session.event(event?)?;
        }
        session.finish()
    }

    /// Parse like [`Machine::parse`], recording every state change.
    pub fn trace<'src, I>(&self, events: I) -> Trace<R>
    where
        I: IntoIterator<Item = Result<Event<'src>, ParseError>>,
    {
        let mut session = self.session();
        let mut steps = Vec::new();
        for event in events {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    return Trace {
                        steps,
                        result: Err(err),
                    };
                }
            };
            let from = session.state();
            let owned = event.clone().into_owned();
            if let Err(err) = session.event(event) {
                return Trace {
                    steps,
                    result: Err(err),
                };
            }
            steps.push(Step {
                event: owned,
                from,
                to: session.state(),
            });
        }
        Trace {
            steps,
            result: session.finish(),
        }
    }
}

/// One event and the state change it caused.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub event: Event<'static>,
    pub from: State,
    pub to: State,
}

/// The result of [`Machine::trace`]: every step that succeeded, then the outcome.
#[derive(Debug)]
pub struct Trace<R> {
    pub steps: Vec<Step>,
    pub result: Result<R, ParseError>,
}

/// The state of one parse.
pub struct Session<'m, R: Record> {
    machine: &'m Machine<R>,
    state: State,
    record: R,
    scratch: Scratch,
    content: ContentBuffer,
    /// The document root has been left; the record is final.
    closed: bool,
    poisoned: bool,
}

impl<R: Record> Session<'_, R> {
    pub fn state(&self) -> State {
        self.state
    }

    /// The record built so far.
    pub fn record(&self) -> &R {
        &self.record
    }

    /// Feed one event. After the first error every later call fails with
    /// [`ParseErrorKind::Poisoned`].
    pub fn event(&mut self, event: Event<'_>) -> Result<(), ParseError> {
        if self.poisoned {
            return Err(ParseErrorKind::Poisoned.into());
        }
        let span = event.span();
        let result = self.step(event);
        if result.is_err() {
            self.poisoned = true;
        }
        result.map_err(|err| ParseError::new(err, Some(span)))
    }

    fn step(&mut self, event: Event<'_>) -> Result<(), ParseErrorKind> {
        let machine = self.machine;
        match event {
            Event::Enter {
                name, attributes, ..
            } => {
                if self.closed {
                    return Err(ParseErrorKind::TrailingContent {
                        trigger: name.into_owned(),
                    });
                }
                let Some(rule) = machine.open.get(self.state, &name) else {
                    return Err(ParseErrorKind::InvalidTrigger {
                        trigger: name.into_owned(),
                        state: self.state,
                        direction: Direction::Enter,
                    });
                };
                trace!(trigger = %name, from = %self.state, to = %rule.enter.next, "enter");
                self.run(&rule.enter.handlers, &attributes)?;
                self.state = rule.enter.next;
                if !machine.open.contains(self.state) {
                    return Err(ParseErrorKind::DeadEnd { state: self.state });
                }
            }
            Event::Leave { name, .. } => {
                let Some(transition) = machine.close.get(self.state, &name) else {
                    return Err(ParseErrorKind::InvalidTrigger {
                        trigger: name.into_owned(),
                        state: self.state,
                        direction: Direction::Leave,
                    });
                };
                trace!(trigger = %name, from = %self.state, to = %transition.next, "leave");
                self.run(&transition.handlers, &Attributes::new())?;
                self.state = transition.next;
                if !machine.close.contains(self.state) {
                    return Err(ParseErrorKind::DeadEnd { state: self.state });
                }
                if self.state == State::START {
                    trace!(root = %name, "document root left");
                    self.closed = true;
                    self.scratch = Scratch::new();
                    self.content.clear();
                }
            }
            Event::Text { text, .. } => {
                if self.content.is_open() {
                    self.content.append(&text);
                } else {
                    trace!(text = %text.trim(), state = %self.state, "text dropped");
                }
            }
        }
        Ok(())
    }

    fn run(
        &mut self,
        handlers: &[Handler<R::Field, R::Compound>],
        attributes: &Attributes<'_>,
    ) -> Result<(), ParseErrorKind> {
        for handler in handlers {
            dispatch(
                handler,
                &mut self.record,
                &mut self.scratch,
                &mut self.content,
                attributes,
            )?;
        }
        Ok(())
    }

    /// End the document and hand back the finished record.
    pub fn finish(self) -> Result<R, ParseError> {
        if self.poisoned {
            return Err(ParseErrorKind::Poisoned.into());
        }
        if self.state != State::START {
            return Err(ParseErrorKind::PrematureEnd { state: self.state }.into());
        }
        Ok(self.record)
    }
}
