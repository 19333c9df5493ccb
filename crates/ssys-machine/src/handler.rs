//! The handler library and its interpreter.
//!
//! Transitions carry lists of [`Handler`] values rather than closures. A
//! record type names its plain fields with `F` and its one-off compound
//! assembly steps with `C`; [`dispatch`] is the only place handlers are run.

use std::fmt;

use crate::error::ParseErrorKind;
use crate::{Attributes, ContentBuffer, Scratch, Taken, Value, ValueType};

/// Where a hold or commit handler gets its value from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A required attribute of the triggering element.
    Attribute { name: &'static str, ty: ValueType },
    /// An attribute that falls back to `default` when missing.
    OptionalAttribute {
        name: &'static str,
        ty: ValueType,
        default: Value,
    },
    /// A constant supplied by the table.
    Literal(Value),
}

impl Source {
    pub const fn attribute(name: &'static str, ty: ValueType) -> Self {
        Source::Attribute { name, ty }
    }

    pub fn resolve(&self, attributes: &Attributes<'_>) -> Result<Value, ParseErrorKind> {
        match self {
            Source::Attribute { name, ty } => {
                let raw = attributes
                    .get(name)
                    .ok_or(ParseErrorKind::MissingAttribute { name: *name })?;
                ty.parse(raw)
            }
            Source::OptionalAttribute { name, ty, default } => match attributes.get(name) {
                Some(raw) => ty.parse(raw),
                None => Ok(default.clone()),
            },
            Source::Literal(value) => Ok(value.clone()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Attribute { name, ty } => write!(f, "@{name}:{ty}"),
            Source::OptionalAttribute { name, ty, default } => {
                write!(f, "@{name}:{ty}?={default}")
            }
            Source::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// One step of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler<F, C> {
    /// Open the content buffer for a value of the given type.
    ExpectContent(ValueType),
    /// Put a value into the scratch accumulator.
    Hold { key: &'static str, source: Source },
    /// Pull the content buffer into the scratch accumulator.
    HoldPulled(&'static str),
    /// Write a value straight into a record field.
    CommitAttribute { field: F, source: Source },
    /// Pull the content buffer into a record field.
    CommitPulled(F),
    /// Run a record-specific assembly step.
    CommitCompound(C),
}

impl<F: fmt::Debug, C: fmt::Debug> fmt::Display for Handler<F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::ExpectContent(ty) => write!(f, "expect {ty}"),
            Handler::Hold { key, source } => write!(f, "hold {key} <- {source}"),
            Handler::HoldPulled(key) => write!(f, "hold {key} <- content"),
            Handler::CommitAttribute { field, source } => write!(f, "commit {field:?} <- {source}"),
            Handler::CommitPulled(field) => write!(f, "commit {field:?} <- content"),
            Handler::CommitCompound(compound) => write!(f, "assemble {compound:?}"),
        }
    }
}

/// A record built by a machine.
///
/// Records start from [`Default`]; plain fields arrive through
/// [`Record::commit`], and anything assembled from several held values goes
/// through [`Record::assemble`].
pub trait Record: Default {
    type Field: Clone + fmt::Debug + PartialEq;
    type Compound: Clone + fmt::Debug + PartialEq;

    fn commit(&mut self, field: Self::Field, value: Value) -> Result<(), ParseErrorKind>;

    fn assemble(
        &mut self,
        compound: Self::Compound,
        assembly: &mut Assembly<'_, '_>,
    ) -> Result<(), ParseErrorKind>;
}

/// What an assembly step can see.
pub struct Assembly<'a, 'src> {
    pub scratch: &'a mut Scratch,
    pub content: &'a mut ContentBuffer,
    /// Attributes of the triggering element; always empty when leaving.
    pub attributes: &'a Attributes<'src>,
}

impl Assembly<'_, '_> {
    /// Take every held value out of the scratch.
    pub fn take(&mut self) -> Taken {
        self.scratch.take()
    }

    /// Pull the content buffer.
    pub fn pull(&mut self) -> Result<Value, ParseErrorKind> {
        self.content.pull()
    }
}

/// Run one handler against a record and the session's working storage.
pub fn dispatch<R: Record>(
    handler: &Handler<R::Field, R::Compound>,
    record: &mut R,
    scratch: &mut Scratch,
    content: &mut ContentBuffer,
    attributes: &Attributes<'_>,
) -> Result<(), ParseErrorKind> {
    match handler {
        Handler::ExpectContent(ty) => content.expect(*ty),
        Handler::Hold { key, source } => scratch.hold(*key, source.resolve(attributes)?),
        Handler::HoldPulled(key) => scratch.hold(*key, content.pull()?),
        Handler::CommitAttribute { field, source } => {
            record.commit(field.clone(), source.resolve(attributes)?)?
        }
        Handler::CommitPulled(field) => record.commit(field.clone(), content.pull()?)?,
        Handler::CommitCompound(compound) => record.assemble(
            compound.clone(),
            &mut Assembly {
                scratch,
                content,
                attributes,
            },
        )?,
    }
    Ok(())
}
