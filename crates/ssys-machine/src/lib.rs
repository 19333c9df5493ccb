//! Table-driven state machine for turning document events into typed records.
//!
//! A record type declares its parse as a transition table: for each state,
//! which element may be entered next, which state that leads to, and which
//! handlers run on the way in and on the way out. The close table used for
//! leave events is derived by reversing the open table, so every element
//! that can be entered can also be left, and nothing else.

mod content;
mod error;
mod event;
mod handler;
mod machine;
mod scratch;
mod span;
mod table;
mod value;

pub use content::ContentBuffer;
pub use error::{Direction, ParseError, ParseErrorKind, TableError};
pub use event::{Attributes, Event};
pub use handler::{Assembly, Handler, Record, Source, dispatch};
pub use machine::{Machine, Session, Step, Trace};
pub use scratch::{Scratch, Taken};
pub use span::Span;
pub use table::{
    CloseTable, OpenTable, Rule, RuleBuilder, State, Table, TableBuilder, TableIssue, Transition,
    reverse,
};
pub use value::{Value, ValueType};
