//! Transition tables and their reversal.
//!
//! A table is authored once, as a set of rules of the form
//! `(state, trigger) -> (enter handlers, next state, leave handlers)`.
//! The open table answers "which transition fires when element `trigger`
//! is entered in `state`". The close table answers the same question for
//! leaving an element, and is derived from the open table by [`reverse`]:
//! leaving `trigger` in `next` returns to `state` and runs the leave
//! handlers declared on the rule.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::Handler;
use crate::error::TableError;
use tracing::{debug, trace};

/// An opaque label for "where in the document structure" the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State(pub &'static str);

impl State {
    /// Before the document root has been entered, and after it has been left.
    pub const START: State = State("start");

    pub const fn new(label: &'static str) -> Self {
        State(label)
    }

    pub fn label(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Handlers to run, in order, and the state to move to afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<F, C> {
    pub handlers: Vec<Handler<F, C>>,
    pub next: State,
}

/// An open-table entry: the enter transition plus the handlers to run when
/// the same element is left again.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<F, C> {
    pub enter: Transition<F, C>,
    pub leave: Vec<Handler<F, C>>,
}

/// `state → trigger → entry`.
#[derive(Debug, Clone)]
pub struct Table<E> {
    states: HashMap<State, HashMap<&'static str, E>>,
}

/// Table consulted on element-enter events.
pub type OpenTable<F, C> = Table<Rule<F, C>>;

/// Table consulted on element-leave events, derived by [`reverse`].
pub type CloseTable<F, C> = Table<Transition<F, C>>;

impl<E> Table<E> {
    fn empty() -> Self {
        Self {
            states: HashMap::new(),
        }
    }

    /// Look up the entry for `trigger` in `state`.
    pub fn get(&self, state: State, trigger: &str) -> Option<&E> {
        self.states.get(&state)?.get(trigger)
    }

    /// Whether `state` is declared in this table.
    pub fn contains(&self, state: State) -> bool {
        self.states.contains_key(&state)
    }

    /// Declared states, sorted by label.
    pub fn states(&self) -> Vec<State> {
        let mut states: Vec<_> = self.states.keys().copied().collect();
        states.sort();
        states
    }

    /// Entries of one state, sorted by trigger.
    pub fn triggers(&self, state: State) -> Vec<(&'static str, &E)> {
        let mut entries: Vec<_> = self
            .states
            .get(&state)
            .into_iter()
            .flatten()
            .map(|(trigger, entry)| (*trigger, entry))
            .collect();
        entries.sort_by_key(|(trigger, _)| *trigger);
        entries
    }

    /// Every `(state, trigger, entry)`, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (State, &'static str, &E)> {
        self.states.iter().flat_map(|(state, triggers)| {
            triggers
                .iter()
                .map(move |(trigger, entry)| (*state, *trigger, entry))
        })
    }

    /// Number of `(state, trigger)` entries.
    pub fn len(&self) -> usize {
        self.states.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An authoring finding that does not prevent a machine from being built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableIssue {
    /// A declared state that no chain of transitions from [`State::START`] reaches.
    Unreachable(State),
    /// A rule leads to a state that is never declared; entering it fails as a dead end.
    UndeclaredTarget {
        from: State,
        trigger: &'static str,
        to: State,
    },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::Unreachable(state) => write!(f, "state {state} is unreachable"),
            TableIssue::UndeclaredTarget { from, trigger, to } => {
                write!(f, "{from} --{trigger}--> {to}: target is not declared")
            }
        }
    }
}

impl<F, C> OpenTable<F, C> {
    /// Check the table for unreachable states and undeclared targets.
    pub fn audit(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();

        for (from, trigger, rule) in self.entries() {
            if !self.contains(rule.enter.next) {
                issues.push(TableIssue::UndeclaredTarget {
                    from,
                    trigger,
                    to: rule.enter.next,
                });
            }
        }

        let mut seen = HashSet::from([State::START]);
        let mut queue = VecDeque::from([State::START]);
        while let Some(state) = queue.pop_front() {
            for (_, rule) in self.triggers(state) {
                if seen.insert(rule.enter.next) {
                    queue.push_back(rule.enter.next);
                }
            }
        }
        issues.extend(
            self.states()
                .into_iter()
                .filter(|state| !seen.contains(state))
                .map(TableIssue::Unreachable),
        );

        issues.sort();
        issues
    }
}

/// Derive the close table from an open table.
///
/// For every open entry `(s, t) -> s'` the close table gets `(s', t) -> s`,
/// carrying the rule's leave handlers. Fails if two different states both
/// reach `s'` on `t`. Every state declared in the open table is declared in
/// the close table too, even when nothing can be left from it.
pub fn reverse<F: Clone, C: Clone>(open: &OpenTable<F, C>) -> Result<CloseTable<F, C>, TableError> {
    let mut close = CloseTable::empty();
    for state in open.states.keys() {
        close.states.entry(*state).or_default();
    }

    for (from, trigger, rule) in open.entries() {
        let back = close.states.entry(rule.enter.next).or_default();
        if let Some(existing) = back.get(trigger) {
            return Err(TableError::AmbiguousReverse {
                trigger,
                state: rule.enter.next,
                first: existing.next,
                second: from,
            });
        }
        trace!(%from, trigger, to = %rule.enter.next, "reversed");
        back.insert(
            trigger,
            Transition {
                handlers: rule.leave.clone(),
                next: from,
            },
        );
    }

    Ok(close)
}

/// Builder for an [`OpenTable`].
///
/// [`State::START`] is always declared. States reached by a rule but with
/// no rules of their own must be declared with [`TableBuilder::terminal`].
#[derive(Debug, Clone)]
pub struct TableBuilder<F, C> {
    declared: Vec<State>,
    rules: Vec<(State, &'static str, Rule<F, C>)>,
}

impl<F, C> TableBuilder<F, C> {
    pub fn new() -> Self {
        Self {
            declared: vec![State::START],
            rules: Vec::new(),
        }
    }

    /// Declare that entering `trigger` in `from` moves to `to`.
    pub fn rule(&mut self, from: State, trigger: &'static str, to: State) -> RuleBuilder<'_, F, C> {
        let index = self.rules.len();
        self.rules.push((
            from,
            trigger,
            Rule {
                enter: Transition {
                    handlers: Vec::new(),
                    next: to,
                },
                leave: Vec::new(),
            },
        ));
        RuleBuilder {
            rule: &mut self.rules[index].2,
        }
    }

    /// Declare a state that has no outgoing transitions.
    pub fn terminal(&mut self, state: State) -> &mut Self {
        self.declared.push(state);
        self
    }

    /// Declare several terminal states at once.
    pub fn terminals(&mut self, states: impl IntoIterator<Item = State>) -> &mut Self {
        self.declared.extend(states);
        self
    }

    /// Finish authoring. A later rule for the same `(state, trigger)` replaces an earlier one.
    pub fn build(self) -> OpenTable<F, C> {
        let mut open = OpenTable::empty();
        for state in self.declared {
            open.states.entry(state).or_default();
        }
        for (from, trigger, rule) in self.rules {
            if open
                .states
                .entry(from)
                .or_default()
                .insert(trigger, rule)
                .is_some()
            {
                debug!(%from, trigger, "rule replaced by a later declaration");
            }
        }
        open
    }
}

impl<F, C> Default for TableBuilder<F, C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets the handlers of a rule being declared.
pub struct RuleBuilder<'a, F, C> {
    rule: &'a mut Rule<F, C>,
}

impl<F, C> RuleBuilder<'_, F, C> {
    /// Handlers to run, in order, when the element is entered.
    pub fn enter(self, handlers: impl IntoIterator<Item = Handler<F, C>>) -> Self {
        self.rule.enter.handlers.extend(handlers);
        self
    }

    /// Handlers to run, in order, when the element is left.
    pub fn leave(self, handlers: impl IntoIterator<Item = Handler<F, C>>) -> Self {
        self.rule.leave.extend(handlers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use crate::{Source, ValueType};

    const A: State = State("a");
    const B: State = State("b");
    const C: State = State("c");

    type Builder = TableBuilder<&'static str, ()>;

    #[test]
    fn test_reverse_simple() {
        let mut b = Builder::new();
        b.rule(State::START, "root", A);
        b.rule(A, "child", B)
            .enter([Handler::ExpectContent(ValueType::Real)])
            .leave([Handler::CommitPulled("field")]);
        b.terminal(B);
        let open = b.build();

        let close = reverse(&open).unwrap();
        assert_eq!(close.len(), open.len());

        let back = close.get(B, "child").unwrap();
        assert_eq!(back.next, A);
        assert_eq!(back.handlers, vec![Handler::CommitPulled("field")]);
        assert_eq!(close.get(A, "root").unwrap().next, State::START);

        // Every open state is a close state, including the start state.
        for state in open.states() {
            assert!(close.contains(state), "{state} missing from close table");
        }
    }

    #[test]
    fn test_reverse_same_trigger_different_results() {
        // `pos` under two parents is fine as long as the results differ.
        let mut b = Builder::new();
        b.rule(State::START, "root", A);
        b.rule(A, "pos", B);
        b.rule(A, "jump", C);
        b.rule(C, "pos", State("jump_pos"));
        b.terminals([B, State("jump_pos")]);
        let close = reverse(&b.build()).unwrap();
        assert_eq!(close.get(B, "pos").unwrap().next, A);
        assert_eq!(close.get(State("jump_pos"), "pos").unwrap().next, C);
    }

    #[test]
    fn test_reverse_ambiguous() {
        let mut b = Builder::new();
        b.rule(State::START, "root", A);
        b.rule(A, "x", C);
        b.rule(B, "x", C);
        b.terminals([B, C]);
        let err = reverse(&b.build()).unwrap_err();
        let TableError::AmbiguousReverse {
            trigger,
            state,
            first,
            second,
        } = err;
        assert_eq!(trigger, "x");
        assert_eq!(state, C);
        let mut starts = [first, second];
        starts.sort();
        assert_eq!(starts, [A, B]);
    }

    #[test]
    fn test_audit() {
        let mut b = Builder::new();
        b.rule(State::START, "root", A);
        b.rule(A, "child", B);
        b.rule(C, "orphan", A);
        let issues = b.build().audit();
        assert_eq!(
            issues,
            vec![
                TableIssue::Unreachable(C),
                TableIssue::UndeclaredTarget {
                    from: A,
                    trigger: "child",
                    to: B,
                },
            ]
        );
    }

    #[test]
    fn test_later_rule_replaces_earlier() {
        let mut b = Builder::new();
        b.rule(State::START, "root", A);
        b.rule(State::START, "root", B)
            .enter([Handler::Hold {
                key: "k",
                source: Source::Literal(crate::Value::Flag(true)),
            }]);
        b.terminals([A, B]);
        let open = b.build();
        let rule = open.get(State::START, "root").unwrap();
        assert_eq!(rule.enter.next, B);
        assert_eq!(rule.enter.handlers.len(), 1);
    }
}
