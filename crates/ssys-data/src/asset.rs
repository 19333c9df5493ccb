//! Asset records: planets, stations and virtual assets.
//!
//! ```xml
//! <asset name="Ogat Station">
//!  <pos><x>100</x><y>-50</y></pos>
//!  <GFX><space>station01.png</space><exterior>station.png</exterior></GFX>
//!  <presence><faction>Empire</faction><value>100</value><range>1</range></presence>
//!  <general>
//!   <class>0</class>
//!   <population>1000</population>
//!   <services><land/><refuel/><bar/><commodity/></services>
//!   <commodities><commodity>Food</commodity></commodities>
//!   <description>A small station.</description>
//!   <bar>A quiet bar.</bar>
//!  </general>
//!  <tech><item>Basic Outfits</item></tech>
//! </asset>
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use ssys_machine::{
    Assembly, Handler, ParseErrorKind, Record, Source, State, TableBuilder, Value, ValueType,
};

use crate::Coords;
use crate::fields::{flag, integer, real, text};

/// Faction presence projected by an asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presence {
    pub faction: Option<String>,
    pub value: f64,
    pub range: u64,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            faction: None,
            value: 100.0,
            range: 0,
        }
    }
}

/// Services offered to landed pilots.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Services {
    /// Who may land: `"any"` for an empty `<land/>`, `None` when nobody can.
    pub land: Option<String>,
    pub refuel: bool,
    pub missions: bool,
    pub outfits: bool,
    pub shipyard: bool,
    /// Bar description, present only when the asset has a bar.
    pub bar: Option<String>,
    /// Traded commodities, present only when the asset has a market.
    pub commodities: Option<BTreeSet<String>>,
}

/// A planet, station or virtual asset.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Asset {
    pub name: String,
    pub pos: Option<Coords>,
    /// Graphics by purpose (`space`, `exterior`).
    pub gfx: BTreeMap<String, String>,
    pub presence: Presence,
    pub world_class: Option<String>,
    pub population: u64,
    pub hide: f64,
    pub description: String,
    pub services: Services,
    pub techs: BTreeSet<String>,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,

    // `<general>` may list the bar description and commodities before or
    // after `<services>`; they are merged when the asset is left.
    #[serde(skip)]
    bar_description: Option<String>,
    #[serde(skip)]
    commodity_names: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    WorldClass,
    Population,
    Hide,
    Description,
    BarDescription,
    CommodityName,
    Land,
    Refuel,
    Missions,
    Outfits,
    Shipyard,
    BarService,
    CommodityService,
    Faction,
    PresenceValue,
    PresenceRange,
    Tech,
    Virtual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compound {
    Position,
    Graphic,
    Finish,
}

impl Record for Asset {
    type Field = Field;
    type Compound = Compound;

    fn commit(&mut self, field: Field, value: Value) -> Result<(), ParseErrorKind> {
        match field {
            Field::Name => self.name = text("name", value)?,
            Field::WorldClass => self.world_class = Some(text("class", value)?),
            Field::Population => self.population = integer("population", &value)?,
            Field::Hide => self.hide = real("hide", &value)?,
            Field::Description => self.description = text("description", value)?,
            Field::BarDescription => self.bar_description = Some(text("bar", value)?),
            Field::CommodityName => {
                let name = text("commodity", value)?;
                self.commodity_names.get_or_insert_default().insert(name);
            }
            Field::Land => {
                let land = text("land", value)?;
                self.services.land = Some(if land.is_empty() { "any".into() } else { land });
            }
            Field::Refuel => self.services.refuel = flag("refuel", &value)?,
            Field::Missions => self.services.missions = flag("missions", &value)?,
            Field::Outfits => self.services.outfits = flag("outfits", &value)?,
            Field::Shipyard => self.services.shipyard = flag("shipyard", &value)?,
            Field::BarService => {
                if flag("bar", &value)? {
                    self.services.bar.get_or_insert_default();
                }
            }
            Field::CommodityService => {
                if flag("commodity", &value)? {
                    self.services.commodities.get_or_insert_default();
                }
            }
            Field::Faction => self.presence.faction = Some(text("faction", value)?),
            Field::PresenceValue => self.presence.value = real("value", &value)?,
            Field::PresenceRange => self.presence.range = integer("range", &value)?,
            Field::Tech => {
                let tech = text("item", value)?;
                self.techs.insert(tech);
            }
            Field::Virtual => self.is_virtual = flag("virtual", &value)?,
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
                self.pos = Some(Coords::new(taken.real("x")?, taken.real("y")?));
            }
            Compound::Graphic => {
                let file = text("gfx", assembly.pull()?)?;
                let purpose = assembly.take().text("purpose")?;
                self.gfx.insert(purpose, file);
            }
            Compound::Finish => {
                // Descriptions for services the asset does not offer are dropped.
                if let Some(description) = self.bar_description.take() {
                    if let Some(bar) = &mut self.services.bar {
                        *bar = description;
                    }
                }
                if let Some(names) = self.commodity_names.take() {
                    if let Some(commodities) = &mut self.services.commodities {
                        *commodities = names;
                    }
                }
            }
        }
        Ok(())
    }
}

const ASSET: State = State("asset");
const POS: State = State("pos");
const POS_X: State = State("pos.x");
const POS_Y: State = State("pos.y");
const GFX: State = State("gfx");
const GFX_SPACE: State = State("gfx.space");
const GFX_EXTERIOR: State = State("gfx.exterior");
const PRESENCE: State = State("presence");
const FACTION: State = State("presence.faction");
const PRESENCE_VALUE: State = State("presence.value");
const PRESENCE_RANGE: State = State("presence.range");
const GENERAL: State = State("general");
const CLASS: State = State("general.class");
const POPULATION: State = State("general.population");
const HIDE: State = State("general.hide");
const DESCRIPTION: State = State("general.description");
const BAR: State = State("general.bar");
const COMMODITIES: State = State("commodities");
const COMMODITY: State = State("commodities.commodity");
const SERVICES: State = State("services");
const LAND: State = State("services.land");
const REFUEL: State = State("services.refuel");
const MISSIONS: State = State("services.missions");
const OUTFITS: State = State("services.outfits");
const SHIPYARD: State = State("services.shipyard");
const BAR_SERVICE: State = State("services.bar");
const COMMODITY_SERVICE: State = State("services.commodity");
const TECH: State = State("tech");
const TECH_ITEM: State = State("tech.item");
const VIRTUAL: State = State("virtual");

/// An element whose text is committed to `field` when it is left.
fn content(
    b: &mut TableBuilder<Field, Compound>,
    from: State,
    trigger: &'static str,
    to: State,
    ty: ValueType,
    field: Field,
) {
    b.rule(from, trigger, to)
        .enter([Handler::ExpectContent(ty)])
        .leave([Handler::CommitPulled(field)]);
}

/// An element whose mere presence sets `field`.
fn marker(
    b: &mut TableBuilder<Field, Compound>,
    from: State,
    trigger: &'static str,
    to: State,
    field: Field,
) {
    b.rule(from, trigger, to).enter([Handler::CommitAttribute {
        field,
        source: Source::Literal(Value::Flag(true)),
    }]);
}

/// The transition table for asset files.
pub fn table() -> TableBuilder<Field, Compound> {
    let mut b = TableBuilder::new();

    b.rule(State::START, "asset", ASSET)
        .enter([Handler::CommitAttribute {
            field: Field::Name,
            source: Source::attribute("name", ValueType::Text),
        }])
        .leave([Handler::CommitCompound(Compound::Finish)]);

    b.rule(ASSET, "pos", POS)
        .leave([Handler::CommitCompound(Compound::Position)]);
    b.rule(POS, "x", POS_X)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::HoldPulled("x")]);
    b.rule(POS, "y", POS_Y)
        .enter([Handler::ExpectContent(ValueType::Real)])
        .leave([Handler::HoldPulled("y")]);

    b.rule(ASSET, "GFX", GFX);
    for (trigger, to) in [("space", GFX_SPACE), ("exterior", GFX_EXTERIOR)] {
        b.rule(GFX, trigger, to)
            .enter([
                Handler::Hold {
                    key: "purpose",
                    source: Source::Literal(Value::Text(trigger.into())),
                },
                Handler::ExpectContent(ValueType::Text),
            ])
            .leave([Handler::CommitCompound(Compound::Graphic)]);
    }

    b.rule(ASSET, "presence", PRESENCE);
    content(&mut b, PRESENCE, "faction", FACTION, ValueType::Text, Field::Faction);
    content(&mut b, PRESENCE, "value", PRESENCE_VALUE, ValueType::Real, Field::PresenceValue);
    content(&mut b, PRESENCE, "range", PRESENCE_RANGE, ValueType::Integer, Field::PresenceRange);

    b.rule(ASSET, "general", GENERAL);
    content(&mut b, GENERAL, "class", CLASS, ValueType::Text, Field::WorldClass);
    content(&mut b, GENERAL, "population", POPULATION, ValueType::Integer, Field::Population);
    content(&mut b, GENERAL, "hide", HIDE, ValueType::Real, Field::Hide);
    content(&mut b, GENERAL, "description", DESCRIPTION, ValueType::Text, Field::Description);
    content(&mut b, GENERAL, "bar", BAR, ValueType::Text, Field::BarDescription);
    b.rule(GENERAL, "commodities", COMMODITIES);
    content(&mut b, COMMODITIES, "commodity", COMMODITY, ValueType::Text, Field::CommodityName);

    b.rule(GENERAL, "services", SERVICES);
    content(&mut b, SERVICES, "land", LAND, ValueType::Text, Field::Land);
    marker(&mut b, SERVICES, "refuel", REFUEL, Field::Refuel);
    marker(&mut b, SERVICES, "missions", MISSIONS, Field::Missions);
    marker(&mut b, SERVICES, "outfits", OUTFITS, Field::Outfits);
    marker(&mut b, SERVICES, "shipyard", SHIPYARD, Field::Shipyard);
    marker(&mut b, SERVICES, "bar", BAR_SERVICE, Field::BarService);
    marker(&mut b, SERVICES, "commodity", COMMODITY_SERVICE, Field::CommodityService);

    b.rule(ASSET, "tech", TECH);
    content(&mut b, TECH, "item", TECH_ITEM, ValueType::Text, Field::Tech);

    marker(&mut b, ASSET, "virtual", VIRTUAL, Field::Virtual);

    b.terminals([
        POS_X,
        POS_Y,
        GFX_SPACE,
        GFX_EXTERIOR,
        FACTION,
        PRESENCE_VALUE,
        PRESENCE_RANGE,
        CLASS,
        POPULATION,
        HIDE,
        DESCRIPTION,
        BAR,
        COMMODITY,
        LAND,
        REFUEL,
        MISSIONS,
        OUTFITS,
        SHIPYARD,
        BAR_SERVICE,
        COMMODITY_SERVICE,
        TECH_ITEM,
        VIRTUAL,
    ]);
    b
}
