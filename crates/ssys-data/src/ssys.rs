//! Star system records.
//!
//! A star system file looks like this:
//!
//! ```xml
//! <ssys name="Ogat">
//!  <general>
//!   <radius>8000</radius>
//!   <stars>250</stars>
//!   <nebula volatility="0">300</nebula>
//!  </general>
//!  <pos><x>100</x><y>-50</y></pos>
//!  <assets><asset>Ogat Station</asset></assets>
//!  <jumps>
//!   <jump target="Amaroq"><autopos/><hide>1.25</hide></jump>
//!   <jump target="Brumeck"><pos x="120" y="-60"/><exitonly/></jump>
//!  </jumps>
//! </ssys>
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use ssys_machine::{
    Assembly, Handler, ParseErrorKind, Record, Source, State, TableBuilder, Value, ValueType,
};
use tracing::trace;

use crate::fields::{integer, real, text};

/// A position on the galaxy map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Nebula density and volatility. Both are zero when a system has no nebula.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Nebula {
    pub density: f64,
    pub volatility: f64,
}

/// A jump point to another system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Jump {
    /// Explicit position, or `None` when the game places the jump itself.
    pub pos: Option<Coords>,
    /// Detection range threshold.
    pub hide: f64,
    /// The jump can only be used to arrive in this system, not to leave it.
    pub exit_only: bool,
}

impl Jump {
    pub const DEFAULT_HIDE: f64 = 1.25;

    pub fn is_autopos(&self) -> bool {
        self.pos.is_none()
    }
}

impl Default for Jump {
    fn default() -> Self {
        Self {
            pos: None,
            hide: Self::DEFAULT_HIDE,
            exit_only: false,
        }
    }
}

/// A star system.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SSystem {
    pub name: String,
    pub pos: Coords,
    pub radius: f64,
    pub stars: u64,
    pub interference: f64,
    pub nebula: Nebula,
    /// Names of the assets (planets, stations) in this system.
    pub assets: BTreeSet<String>,
    /// Jump points, keyed by destination system name.
    pub jumps: BTreeMap<String, Jump>,
}

/// Fields committed directly from a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Radius,
    Stars,
    Interference,
}

/// Values assembled from several held values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compound {
    Position,
    Nebula,
    AssetName,
    Jump,
}

impl Record for SSystem {
    type Field = Field;
    type Compound = Compound;

    fn commit(&mut self, field: Field, value: Value) -> Result<(), ParseErrorKind> {
        match field {
            Field::Name => self.name = text("name", value)?,
            Field::Radius => self.radius = real("radius", &value)?,
            Field::Stars => self.stars = integer("stars", &value)?,
            Field::Interference => self.interference = real("interference", &value)?,
        }
        Ok(())
    }

    fn assemble(
        &mut self,
        compound: Compound,
        assembly: &mut Assembly<'_, '_>,
    ) -> Result<(), ParseErrorKind> {
        match compound {
            Compound::Position => {
                let mut taken = assembly.take();
                self.pos = Coords::new(taken.real("x")?, taken.real("y")?);
            }
            Compound::Nebula => {
                let density = real("nebula", &assembly.pull()?)?;
                let volatility = assembly.take().real("volatility")?;
                self.nebula = Nebula {
                    density,
                    volatility,
                };
            }
            Compound::AssetName => {
                let name = text("asset", assembly.pull()?)?;
                self.assets.insert(name);
            }
            Compound::Jump => {
                let mut taken = assembly.take();
                let dest = taken.text("dest")?;
                // `<autopos/>` wins over `<pos>`, whichever comes first.
                let autopos = taken.flag_or("autopos", false)?;
                let pos = match (taken.real_or_absent("x")?, taken.real_or_absent("y")?) {
                    _ if autopos => None,
                    (Some(x), Some(y)) => Some(Coords::new(x, y)),
                    (None, None) => None,
                    (Some(_), None) => return Err(half_position("y")),
                    (None, Some(_)) => return Err(half_position("x")),
                };
                let jump = Jump {
                    pos,
                    hide: taken.real_or("hide", Jump::DEFAULT_HIDE)?,
                    exit_only: taken.flag_or("exit_only", false)?,
                };
                trace!(%dest, ?jump, "jump");
                if self.jumps.insert(dest.clone(), jump).is_some() {
                    trace!(%dest, "duplicate jump replaced");
                }
            }
        }
        Ok(())
    }
}

fn half_position(key: &'static str) -> ParseErrorKind {
    ParseErrorKind::UnexpectedValue {
        key,
        expected: "real",
        found: "absent",
    }
}

const SSYS: State = State("ssys");
const GENERAL: State = State("general");
const RADIUS: State = State("radius");
const STARS: State = State("stars");
const INTERFERENCE: State = State("interference");
const NEBULA: State = State("nebula");
const POS: State = State("pos");
const POS_X: State = State("pos.x");
const POS_Y: State = State("pos.y");
const ASSETS: State = State("assets");
const ASSET: State = State("assets.asset");
const JUMPS: State = State("jumps");
const JUMP: State = State("jump");
const JUMP_POS: State = State("jump.pos");
const JUMP_AUTOPOS: State = State("jump.autopos");
const JUMP_HIDE: State = State("jump.hide");
const JUMP_EXITONLY: State = State("jump.exitonly");

/// The transition table for star system files.
pub fn table() -> TableBuilder<Field, Compound> {
    let mut b = TableBuilder::new();

    b.rule(State::START, "ssys", SSYS)
        .enter([Handler::CommitAttribute {
            field: Field::Name,
            source: Source::attribute("name", ValueType::Text),
        }]);

    b.rule(SSYS, "general", GENERAL);
    b.rule(GENERAL, "radius", RADIUS)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::CommitPulled(Field::Radius)]);
    b.rule(GENERAL, "stars", STARS)
        .enter([Handler::ExpectContent(ValueType::Integer)])
        .leave([Handler::CommitPulled(Field::Stars)]);
    b.rule(GENERAL, "interference", INTERFERENCE)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::CommitPulled(Field::Interference)]);
    // Leave events carry no attributes, so volatility is held on the way in.
    b.rule(GENERAL, "nebula", NEBULA)
        .enter([
            Handler::Hold {
                key: "volatility",
                source: Source::OptionalAttribute {
                    name: "volatility",
                    ty: ValueType::Real,
                    default: Value::Real(0.0),
                },
            },
            Handler::ExpectContent(ValueType::Real),
        ])
        .leave([Handler::CommitCompound(Compound::Nebula)]);

    b.rule(SSYS, "pos", POS)
        .leave([Handler::CommitCompound(Compound::Position)]);
    b.rule(POS, "x", POS_X)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::HoldPulled("x")]);
    b.rule(POS, "y", POS_Y)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::HoldPulled("y")]);

    b.rule(SSYS, "assets", ASSETS);
    b.rule(ASSETS, "asset", ASSET)
        .enter([Handler::ExpectContent(ValueType::Text)])
        .leave([Handler::CommitCompound(Compound::AssetName)]);

    b.rule(SSYS, "jumps", JUMPS);
    b.rule(JUMPS, "jump", JUMP)
        .enter([Handler::Hold {
            key: "dest",
            source: Source::attribute("target", ValueType::Text),
        }])
        .leave([Handler::CommitCompound(Compound::Jump)]);
    b.rule(JUMP, "pos", JUMP_POS).enter([
        Handler::Hold {
            key: "x",
            source: Source::attribute("x", ValueType::Real),
        },
        Handler::Hold {
            key: "y",
            source: Source::attribute("y", ValueType::Real),
        },
    ]);
    b.rule(JUMP, "autopos", JUMP_AUTOPOS).enter([
        Handler::Hold {
            key: "autopos",
            source: Source::Literal(Value::Flag(true)),
        },
        Handler::Hold {
            key: "x",
            source: Source::Literal(Value::Absent),
        },
        Handler::Hold {
            key: "y",
            source: Source::Literal(Value::Absent),
        },
    ]);
    b.rule(JUMP, "hide", JUMP_HIDE)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::HoldPulled("hide")]);
    b.rule(JUMP, "exitonly", JUMP_EXITONLY).enter([Handler::Hold {
        key: "exit_only",
        source: Source::Literal(Value::Flag(true)),
    }]);

    b.terminals([
        RADIUS,
        STARS,
        INTERFERENCE,
        NEBULA,
        POS_X,
        POS_Y,
        ASSET,
        JUMP_POS,
        JUMP_AUTOPOS,
        JUMP_HIDE,
        JUMP_EXITONLY,
    ]);
    b
}

#[cfg(test)]
mod tests;
