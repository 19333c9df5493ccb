use super::*;
use crate::{Error, parse_ssys, ssys_machine};
use facet_testhelpers::test;
use ssys_machine::{Direction, Event, ParseError};

const OGAT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ssys name="Ogat">
 <general>
  <radius>8000</radius>
 </general>
 <pos>
  <x>100</x>
  <y>-50</y>
 </pos>
 <assets>
  <asset>Ogat Station</asset>
 </assets>
 <jumps>
  <jump target="Amaroq">
   <autopos/>
  </jump>
  <jump target="Brumeck">
   <pos x="120" y="-60"/>
   <exitonly/>
  </jump>
 </jumps>
</ssys>
"#;

fn parse_error(source: &str) -> ParseError {
    match parse_ssys(source) {
        Err(Error::Parse(err)) => err,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_ogat() {
    let ogat = parse_ssys(OGAT).unwrap();
    assert_eq!(
        ogat,
        SSystem {
            name: "Ogat".into(),
            pos: Coords::new(100.0, -50.0),
            radius: 8000.0,
            stars: 0,
            interference: 0.0,
            nebula: Nebula::default(),
            assets: BTreeSet::from(["Ogat Station".to_string()]),
            jumps: BTreeMap::from([
                (
                    "Amaroq".to_string(),
                    Jump {
                        pos: None,
                        hide: 1.25,
                        exit_only: false,
                    },
                ),
                (
                    "Brumeck".to_string(),
                    Jump {
                        pos: Some(Coords::new(120.0, -60.0)),
                        hide: 1.25,
                        exit_only: true,
                    },
                ),
            ]),
        }
    );
}

#[test]
fn test_general_values() {
    let source = r#"<ssys name="Hakoi">
 <general>
  <radius>12500.5</radius>
  <stars>300</stars>
  <interference>20</interference>
  <nebula volatility="15.5">250</nebula>
 </general>
 <pos><x>0</x><y>0</y></pos>
</ssys>"#;
    let hakoi = parse_ssys(source).unwrap();
    assert_eq!(hakoi.radius, 12500.5);
    assert_eq!(hakoi.stars, 300);
    assert_eq!(hakoi.interference, 20.0);
    assert_eq!(
        hakoi.nebula,
        Nebula {
            density: 250.0,
            volatility: 15.5,
        }
    );
}

#[test]
fn test_nebula_without_volatility() {
    let source = r#"<ssys name="Sol"><general><nebula>400</nebula></general></ssys>"#;
    assert_eq!(
        parse_ssys(source).unwrap().nebula,
        Nebula {
            density: 400.0,
            volatility: 0.0,
        }
    );
}

#[test]
fn test_defaults_when_elements_absent() {
    let sol = parse_ssys(r#"<ssys name="Sol"><general/></ssys>"#).unwrap();
    assert_eq!(
        sol,
        SSystem {
            name: "Sol".into(),
            ..SSystem::default()
        }
    );
}

#[test]
fn test_autopos_differs_from_origin() {
    let source = r#"<ssys name="Sol">
 <jumps>
  <jump target="Alpha"><autopos/></jump>
  <jump target="Beta"><pos x="0" y="0"/></jump>
 </jumps>
</ssys>"#;
    let sol = parse_ssys(source).unwrap();
    assert!(sol.jumps["Alpha"].is_autopos());
    assert_eq!(sol.jumps["Beta"].pos, Some(Coords::new(0.0, 0.0)));
    assert_ne!(sol.jumps["Alpha"], sol.jumps["Beta"]);
}

#[test]
fn test_autopos_wins_over_pos() {
    for jump in [
        r#"<jump target="Alpha"><autopos/><pos x="1" y="2"/></jump>"#,
        r#"<jump target="Alpha"><pos x="1" y="2"/><autopos/></jump>"#,
    ] {
        let source = format!(r#"<ssys name="Sol"><jumps>{jump}</jumps></ssys>"#);
        let sol = parse_ssys(&source).unwrap();
        assert!(sol.jumps["Alpha"].is_autopos(), "{jump}");
    }
}

#[test]
fn test_jump_hide() {
    let source = r#"<ssys name="Sol">
 <jumps>
  <jump target="Alpha"><autopos/><hide>0.5</hide></jump>
 </jumps>
</ssys>"#;
    assert_eq!(parse_ssys(source).unwrap().jumps["Alpha"].hide, 0.5);
}

#[test]
fn test_duplicate_jump_later_wins() {
    let source = r#"<ssys name="Sol">
 <jumps>
  <jump target="Alpha"><pos x="1" y="2"/></jump>
  <jump target="Alpha"><autopos/><exitonly/></jump>
 </jumps>
</ssys>"#;
    let sol = parse_ssys(source).unwrap();
    assert_eq!(sol.jumps.len(), 1);
    assert_eq!(
        sol.jumps["Alpha"],
        Jump {
            pos: None,
            hide: Jump::DEFAULT_HIDE,
            exit_only: true,
        }
    );
}

#[test]
fn test_duplicate_assets_collapse() {
    let source = r#"<ssys name="Sol">
 <assets><asset>Earth</asset><asset>Mars</asset><asset> Earth </asset></assets>
</ssys>"#;
    let sol = parse_ssys(source).unwrap();
    assert_eq!(
        sol.assets.into_iter().collect::<Vec<_>>(),
        vec!["Earth", "Mars"]
    );
}

#[test]
fn test_jump_without_position() {
    let source = r#"<ssys name="Sol"><jumps><jump target="Alpha"/></jumps></ssys>"#;
    let err = parse_error(source);
    assert_eq!(err.kind, ParseErrorKind::MissingKey { key: "x" });
}

#[test]
fn test_jump_without_target() {
    let source = r#"<ssys name="Sol"><jumps><jump><autopos/></jump></jumps></ssys>"#;
    let err = parse_error(source);
    assert_eq!(err.kind, ParseErrorKind::MissingAttribute { name: "target" });
}

#[test]
fn test_missing_name() {
    let err = parse_error("<ssys/>");
    assert_eq!(err.kind, ParseErrorKind::MissingAttribute { name: "name" });
}

#[test]
fn test_malformed_radius() {
    let source = r#"<ssys name="Ogat"><general><radius>small</radius></general></ssys>"#;
    let err = parse_error(source);
    assert_eq!(
        err.kind,
        ParseErrorKind::MalformedContent {
            text: "small".into(),
            expected: ValueType::Real,
        }
    );
}

#[test]
fn test_unknown_element() {
    let source = r#"<ssys name="Ogat"><general><moons>3</moons></general></ssys>"#;
    let err = parse_error(source);
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidTrigger {
            trigger: "moons".into(),
            state: GENERAL,
            direction: Direction::Enter,
        }
    );
    let span = err.span.unwrap();
    assert_eq!(span.slice(source), Some("<moons>"));
}

#[test]
fn test_invalid_trigger_leaves_record_untouched() {
    let machine = ssys_machine().unwrap();
    let mut session = machine.session();
    for event in [
        Event::enter_with("ssys", [("name", "Ogat")]),
        Event::enter("general"),
        Event::enter("radius"),
        Event::text("8000"),
        Event::leave("radius"),
    ] {
        session.event(event).unwrap();
    }
    let before = session.record().clone();
    assert!(session.event(Event::enter("radius2")).is_err());
    assert!(session.event(Event::leave("general")).is_err());
    assert_eq!(session.record(), &before);
    assert_eq!(before.radius, 8000.0);
}

#[test]
fn test_second_root_is_rejected() {
    let source = r#"<ssys name="A"><assets><asset>X</asset></assets></ssys>
<ssys name="B"><jumps><jump target="Q"><autopos/></jump></jumps></ssys>"#;
    let err = parse_error(source);
    assert_eq!(
        err.kind,
        ParseErrorKind::TrailingContent {
            trigger: "ssys".into()
        }
    );
    assert_eq!(err.span.unwrap().slice(source), Some(r#"<ssys name="B">"#));
}

#[test]
fn test_premature_end() {
    let events = vec![
        Ok(Event::enter_with("ssys", [("name", "Ogat")])),
        Ok(Event::enter("jumps")),
    ];
    let err = ssys_machine().unwrap().parse(events).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::PrematureEnd { state: JUMPS });
}

#[test]
fn test_table_is_clean() {
    let machine = ssys_machine().unwrap();
    assert!(machine.open_table().audit().is_empty());
    assert_eq!(machine.open_table().len(), machine.close_table().len());
}
