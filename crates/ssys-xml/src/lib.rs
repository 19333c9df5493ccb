//! XML event source for [`ssys_machine`].
//!
//! Wraps `quick-xml` so that a document arrives at the state machine as a
//! flat stream of enter, leave and text events with byte spans. Declarations,
//! comments, processing instructions and doctypes are dropped here.

mod options;
mod reader;

pub use options::ReaderOptions;
pub use reader::XmlEvents;

use ssys_machine::{Event, ParseError};

/// Read a whole document into a list of events, stopping at the first error.
pub fn events(source: &str) -> Result<Vec<Event<'static>>, ParseError> {
    XmlEvents::new(source).collect()
}
