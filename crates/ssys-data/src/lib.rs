//! Star system and asset records parsed from Naev-style XML data files.
//!
//! Each record type has a transition table ([`ssys::table`],
//! [`asset::table`]) and a shared machine built from it on first use.

pub mod asset;
mod batch;
mod diagnostic;
mod fields;
pub mod ssys;

pub use asset::{Asset, Presence, Services};
pub use batch::{Batch, Failure, load_dir};
pub use diagnostic::{render, write_report};
pub use ssys::{Coords, Jump, Nebula, SSystem};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::Serialize;
use ssys_machine::{Event, Machine, ParseError, TableError, Trace};
use ssys_xml::XmlEvents;

/// Anything that can go wrong turning a file into a record.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid transition table: {0}")]
    Table(#[from] TableError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("unrecognised document root `{0}`")]
    UnknownRoot(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl Error {
    /// The parse failure, if this is one.
    pub fn as_parse(&self) -> Option<&ParseError> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

static SSYS_MACHINE: LazyLock<Result<Machine<SSystem>, TableError>> =
    LazyLock::new(|| Machine::new(ssys::table()));

static ASSET_MACHINE: LazyLock<Result<Machine<Asset>, TableError>> =
    LazyLock::new(|| Machine::new(asset::table()));

/// The shared star system machine.
pub fn ssys_machine() -> Result<&'static Machine<SSystem>, Error> {
    SSYS_MACHINE.as_ref().map_err(|err| Error::Table(err.clone()))
}

/// The shared asset machine.
pub fn asset_machine() -> Result<&'static Machine<Asset>, Error> {
    ASSET_MACHINE.as_ref().map_err(|err| Error::Table(err.clone()))
}

/// Parse a star system file.
pub fn parse_ssys(source: &str) -> Result<SSystem, Error> {
    Ok(ssys_machine()?.parse(XmlEvents::new(source))?)
}

/// Parse an asset file.
pub fn parse_asset(source: &str) -> Result<Asset, Error> {
    Ok(asset_machine()?.parse(XmlEvents::new(source))?)
}

/// The kinds of data file this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    SSystem,
    Asset,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::SSystem, Kind::Asset];

    /// Name of the root element.
    pub fn root(self) -> &'static str {
        match self {
            Kind::SSystem => "ssys",
            Kind::Asset => "asset",
        }
    }

    /// Guess the kind of a document from its root element.
    pub fn detect(source: &str) -> Result<Kind, Error> {
        for event in XmlEvents::new(source) {
            if let Event::Enter { name, .. } = event? {
                return Self::ALL
                    .into_iter()
                    .find(|kind| kind.root() == name)
                    .ok_or_else(|| Error::UnknownRoot(name.into_owned()));
            }
        }
        Err(Error::UnknownRoot(String::new()))
    }

    pub fn parse(self, source: &str) -> Result<Document, Error> {
        Ok(match self {
            Kind::SSystem => Document::SSystem(parse_ssys(source)?),
            Kind::Asset => Document::Asset(parse_asset(source)?),
        })
    }

    /// Parse while recording every state change.
    pub fn trace(self, source: &str) -> Result<Trace<Document>, Error> {
        Ok(match self {
            Kind::SSystem => {
                let trace = ssys_machine()?.trace(XmlEvents::new(source));
                Trace {
                    steps: trace.steps,
                    result: trace.result.map(Document::SSystem),
                }
            }
            Kind::Asset => {
                let trace = asset_machine()?.trace(XmlEvents::new(source));
                Trace {
                    steps: trace.steps,
                    result: trace.result.map(Document::Asset),
                }
            }
        })
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.root() == s)
            .ok_or_else(|| Error::UnknownRoot(s.to_string()))
    }
}

/// A parsed record of either kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Document {
    SSystem(SSystem),
    Asset(Asset),
}

impl Document {
    pub fn kind(&self) -> Kind {
        match self {
            Document::SSystem(_) => Kind::SSystem,
            Document::Asset(_) => Kind::Asset,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Document::SSystem(ssys) => &ssys.name,
            Document::Asset(asset) => &asset.name,
        }
    }
}

/// Parse a document of either kind, picking the machine by root element.
pub fn parse_document(source: &str) -> Result<Document, Error> {
    Kind::detect(source)?.parse(source)
}
