use std::collections::HashMap;

use proptest::prelude::*;
use ssys_machine::{State, TableBuilder, TableError, reverse};

const STATES: [&str; 6] = ["start", "a", "b", "c", "d", "e"];
const TRIGGERS: [&str; 4] = ["pos", "jump", "hide", "asset"];

fn rules() -> impl Strategy<Value = Vec<(usize, usize, usize)>> {
    prop::collection::vec(
        (0..STATES.len(), 0..TRIGGERS.len(), 1..STATES.len()),
        0..24,
    )
}

proptest! {
    /// Reversal succeeds exactly when no two start states share a trigger
    /// and result state, and then every open entry has its inverse.
    #[test]
    fn reverse_inverts_open_table(rules in rules()) {
        let mut b = TableBuilder::<(), ()>::new();
        b.terminals(STATES.iter().map(|label| State(*label)));
        for (from, trigger, to) in rules {
            b.rule(State(STATES[from]), TRIGGERS[trigger], State(STATES[to]));
        }
        let open = b.build();

        let mut sources: HashMap<(State, &str), Vec<State>> = HashMap::new();
        for (from, trigger, rule) in open.entries() {
            sources.entry((rule.enter.next, trigger)).or_default().push(from);
        }
        let ambiguous = sources.values().any(|froms| froms.len() > 1);

        match reverse(&open) {
            Ok(close) => {
                prop_assert!(!ambiguous);
                prop_assert_eq!(close.len(), open.len());
                for (from, trigger, rule) in open.entries() {
                    let back = close.get(rule.enter.next, trigger);
                    prop_assert_eq!(back.map(|t| t.next), Some(from));
                }
                for state in open.states() {
                    prop_assert!(close.contains(state));
                }
            }
            Err(TableError::AmbiguousReverse { trigger, state, first, second }) => {
                prop_assert!(ambiguous);
                prop_assert_ne!(first, second);
                prop_assert!(sources[&(state, trigger)].contains(&first));
                prop_assert!(sources[&(state, trigger)].contains(&second));
            }
        }
    }
}
