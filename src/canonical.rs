//! This module normalizes an `Automaton` into canonical form: exactly one accepting state,
//! the starting state numbered 1, the accepting state numbered 2, the remaining states numbered
//! from 3 in declaration order, and an alphabet ordered `"0"`, `"1"`, blank, rest.
//!
//! Only a [`CanonicalAutomaton`] can be handed to the encoder.

use crate::automaton::{Automaton, Label, State, StateRole};
use crate::types::{Direction, GoedelError, StateId, Symbol, Transition, TuringMachineDefinition};
use log::debug;
use std::collections::HashMap;
use std::ops::Deref;

/// An automaton in canonical form. Dereferences to the underlying [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalAutomaton(Automaton);

impl Deref for CanonicalAutomaton {
    type Target = Automaton;

    fn deref(&self) -> &Automaton {
        &self.0
    }
}

impl CanonicalAutomaton {
    pub fn into_inner(self) -> Automaton {
        self.0
    }

    /// Returns the symbol id of `label`.
    pub fn symbol(&self, label: &str) -> Result<Symbol, GoedelError> {
        self.alphabet
            .iter()
            .position(|s| s == label)
            .map(|i| i + 1)
            .ok_or_else(|| GoedelError::UnknownSymbol(label.to_string()))
    }

    /// Returns the transition table with symbols resolved to ids, in encoding order.
    pub fn transitions(&self) -> Result<Vec<Transition>, GoedelError> {
        let mut transitions = Vec::with_capacity(self.transition_count());

        for state in &self.states {
            for (target, label) in state.labels() {
                transitions.push(Transition::new(
                    state.id,
                    self.symbol(&label.read)?,
                    target,
                    self.symbol(&label.write)?,
                    label.direction,
                ));
            }
        }

        Ok(transitions)
    }

    /// Returns the initial tape with symbols resolved to ids.
    pub fn tape(&self) -> Result<Vec<Symbol>, GoedelError> {
        self.input.iter().map(|label| self.symbol(label)).collect()
    }
}

/// Normalizes `automaton` into canonical form.
///
/// Runs the single-accept reduction, renumbers the states, and reorders the alphabet, in that
/// order. Canonicalizing a canonical automaton returns an equal automaton.
///
/// # Returns
///
/// * `Ok(CanonicalAutomaton)` on success.
/// * `Err(GoedelError::MissingStartState)` or `Err(GoedelError::MultipleStartStates)` unless
///   exactly one state is starting.
/// * `Err(GoedelError::MissingAcceptState)` if no state is accepting.
/// * `Err(GoedelError::UndefinedState)` if a transition targets an unknown state.
pub fn canonicalize(automaton: &Automaton) -> Result<CanonicalAutomaton, GoedelError> {
    let starting = automaton.starting_states();
    match starting.len() {
        0 => return Err(GoedelError::MissingStartState),
        1 => {}
        _ => return Err(GoedelError::MultipleStartStates(starting)),
    }

    if automaton.accepting_states().is_empty() {
        return Err(GoedelError::MissingAcceptState);
    }

    let reduced = reduce_accepting_states(automaton);
    let mapping = id_mapping(&reduced);
    let mut canonical = remap_ids(reduced, &mapping)?;
    canonical.alphabet = reorder_alphabet(&canonical.alphabet, &canonical.blank);

    debug!(
        "canonicalized '{}': {} states, {} symbols",
        canonical.name,
        canonical.states.len(),
        canonical.alphabet.len()
    );

    Ok(CanonicalAutomaton(canonical))
}

/// Collapses all accepting states into a single new sink state.
///
/// Every previously accepting state gets a transition into the sink for each symbol it does
/// not read yet, writing the symbol back and moving right, and stops accepting. An automaton
/// with a single accepting state is returned unchanged, unless that state is also the start.
pub fn reduce_accepting_states(automaton: &Automaton) -> Automaton {
    let accepting = automaton.accepting_states();
    let start_accepts = automaton.states.iter().any(|s| s.role == StateRole::StartAndAccept);

    if accepting.len() < 2 && !start_accepts {
        return automaton.clone();
    }

    let mut reduced = automaton.clone();
    let sink = State::new(automaton.max_id() + 1, StateRole::Accept);

    for state in reduced.states.iter_mut().filter(|s| s.role.is_accept()) {
        let read = state.read_symbols();
        let unused: Vec<Label> = automaton
            .alphabet
            .iter()
            .filter(|symbol| !read.contains(symbol.as_str()))
            .map(|symbol| Label::new(symbol, symbol, Direction::Right))
            .collect();

        for label in unused {
            state.add_transition(sink.id, label);
        }

        state.role = state.role.without_accept();
    }

    debug!(
        "merged {} accepting states into sink q{}",
        accepting.len(),
        sink.id
    );
    reduced.states.push(sink);

    reduced
}

/// Maps the starting state to 1, the accepting state to 2, and all others upwards from 3.
///
/// Expects exactly one starting and one accepting state, which must be different.
fn id_mapping(automaton: &Automaton) -> HashMap<StateId, StateId> {
    let mut mapping = HashMap::new();

    if let Some(start) = automaton.states.iter().find(|s| s.role.is_start()) {
        mapping.insert(start.id, TuringMachineDefinition::STARTING_STATE);
    }
    if let Some(accept) = automaton.states.iter().find(|s| s.role.is_accept()) {
        mapping.insert(accept.id, TuringMachineDefinition::ACCEPTING_STATE);
    }

    for state in automaton.states.iter().filter(|s| s.role == StateRole::Neither) {
        let next = mapping.len() + 1;
        mapping.entry(state.id).or_insert(next);
    }

    mapping
}

/// Rewrites every state id and transition target through `mapping`.
fn remap_ids(
    mut automaton: Automaton,
    mapping: &HashMap<StateId, StateId>,
) -> Result<Automaton, GoedelError> {
    let lookup = |id: StateId| mapping.get(&id).copied().ok_or(GoedelError::UndefinedState(id));

    for state in automaton.states.iter_mut() {
        state.id = lookup(state.id)?;
        state.name = format!("q{}", state.id);

        for group in state.transitions.iter_mut() {
            group.target = lookup(group.target)?;
        }
    }

    Ok(automaton)
}

/// Orders the alphabet as `"0"`, `"1"`, blank, followed by the remaining symbols in their
/// original order. `"0"` and `"1"` occupy their slots even when the alphabet lacks them.
pub fn reorder_alphabet(alphabet: &[String], blank: &str) -> Vec<String> {
    let mut reordered = vec!["0".to_string(), "1".to_string(), blank.to_string()];

    for symbol in alphabet {
        if !reordered.contains(symbol) {
            reordered.push(symbol.clone());
        }
    }

    reordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::fixtures::two_accepting_states;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_reorder_alphabet() {
        assert_eq!(
            reorder_alphabet(&labels(&["_", "a", "1", "b", "0"]), "_"),
            labels(&["0", "1", "_", "a", "b"])
        );
        assert_eq!(
            reorder_alphabet(&labels(&["#", "x"]), "#"),
            labels(&["0", "1", "#", "x"])
        );
    }

    #[test]
    fn test_reduce_single_accepting_state_is_noop() {
        let mut automaton = two_accepting_states();
        automaton.states[3].role = StateRole::Neither;

        assert_eq!(reduce_accepting_states(&automaton), automaton);
    }

    #[test]
    fn test_reduce_accepting_states() {
        let reduced = reduce_accepting_states(&two_accepting_states());

        assert_eq!(reduced.states.len(), 5);
        assert_eq!(reduced.accepting_states(), vec![41]);

        let sink = reduced.state(41).unwrap();
        assert!(sink.transitions.is_empty());
        assert_eq!(sink.role, StateRole::Accept);

        // Both former accepting states now move to the sink on every symbol.
        for id in [20, 40] {
            let state = reduced.state(id).unwrap();
            assert_eq!(state.role, StateRole::Neither);
            assert_eq!(state.transitions.len(), 1);
            assert_eq!(state.transitions[0].target, 41);
            assert_eq!(
                state.transitions[0].labels,
                vec![
                    Label::new("_", "_", Direction::Right),
                    Label::new("0", "0", Direction::Right),
                    Label::new("1", "1", Direction::Right),
                ]
            );
        }
    }

    #[test]
    fn test_reduce_only_fills_unused_symbols() {
        let mut automaton = two_accepting_states();
        automaton.states[0].add_transition(10, Label::new("0", "1", Direction::Left));
        // Reads every symbol already, so no sink edge is added.
        for symbol in ["_", "0", "1"] {
            automaton.states[3].add_transition(30, Label::new(symbol, symbol, Direction::Left));
        }

        let reduced = reduce_accepting_states(&automaton);

        let z = reduced.state(20).unwrap();
        let to_sink: Vec<_> = z.labels().filter(|(t, _)| *t == 41).collect();
        assert_eq!(to_sink.len(), 2);
        assert!(to_sink.iter().all(|(_, l)| l.read != "0"));

        let y = reduced.state(40).unwrap();
        assert!(y.labels().all(|(t, _)| t == 30));
        assert_eq!(y.role, StateRole::Neither);
    }

    #[test]
    fn test_canonicalize_numbering() {
        let canonical = canonicalize(&two_accepting_states()).unwrap();

        // Declaration order is kept: z, s, w, y, sink.
        let ids: Vec<_> = canonical.states.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![3, 1, 4, 5, 2]);

        let names: Vec<_> = canonical.states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["q3", "q1", "q4", "q5", "q2"]);

        assert_eq!(canonical.starting_states(), vec![1]);
        assert_eq!(canonical.accepting_states(), vec![2]);
        assert_eq!(canonical.alphabet, labels(&["0", "1", "_"]));
        assert_eq!(canonical.name, "Prefix");
        assert_eq!(canonical.description, "starts with 0 or 11");
    }

    #[test]
    fn test_canonical_transitions() {
        let canonical = canonicalize(&two_accepting_states()).unwrap();
        let transitions = canonical.transitions().unwrap();

        assert_eq!(
            transitions,
            vec![
                Transition::new(3, 3, 2, 3, Direction::Right),
                Transition::new(3, 1, 2, 1, Direction::Right),
                Transition::new(3, 2, 2, 2, Direction::Right),
                Transition::new(1, 1, 3, 1, Direction::Right),
                Transition::new(1, 2, 4, 2, Direction::Right),
                Transition::new(4, 2, 5, 2, Direction::Right),
                Transition::new(5, 3, 2, 3, Direction::Right),
                Transition::new(5, 1, 2, 1, Direction::Right),
                Transition::new(5, 2, 2, 2, Direction::Right),
            ]
        );
        assert_eq!(canonical.tape().unwrap(), vec![2, 2]);
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        let once = canonicalize(&two_accepting_states()).unwrap();
        let twice = canonicalize(&once).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_canonicalize_splits_accepting_start() {
        let mut start = State::new(5, StateRole::StartAndAccept);
        start.add_transition(5, Label::new("1", "1", Direction::Right));
        let automaton = Automaton {
            name: "Ones".to_string(),
            description: String::new(),
            alphabet: labels(&["_", "1"]),
            blank: "_".to_string(),
            states: vec![start],
            input: vec![],
        };

        let canonical = canonicalize(&automaton).unwrap();

        assert_eq!(canonical.states.len(), 2);
        assert_eq!(canonical.states[0].id, 1);
        assert_eq!(canonical.states[0].role, StateRole::Start);
        assert_eq!(canonical.states[1].id, 2);
        assert_eq!(canonical.states[1].role, StateRole::Accept);
        assert_eq!(
            canonical.transitions().unwrap(),
            vec![
                Transition::new(1, 2, 1, 2, Direction::Right),
                Transition::new(1, 3, 2, 3, Direction::Right),
            ]
        );
    }

    #[test]
    fn test_canonicalize_missing_roles() {
        let mut automaton = two_accepting_states();
        automaton.states[1].role = StateRole::Neither;
        assert_eq!(
            canonicalize(&automaton),
            Err(GoedelError::MissingStartState)
        );

        let mut automaton = two_accepting_states();
        automaton.states[2].role = StateRole::Start;
        assert_eq!(
            canonicalize(&automaton),
            Err(GoedelError::MultipleStartStates(vec![10, 30]))
        );

        let mut automaton = two_accepting_states();
        automaton.states[0].role = StateRole::Neither;
        automaton.states[3].role = StateRole::Neither;
        assert_eq!(
            canonicalize(&automaton),
            Err(GoedelError::MissingAcceptState)
        );
    }

    #[test]
    fn test_canonicalize_undefined_target() {
        let mut automaton = two_accepting_states();
        automaton.states[2].add_transition(99, Label::new("0", "0", Direction::Left));

        assert_eq!(
            canonicalize(&automaton),
            Err(GoedelError::UndefinedState(99))
        );
    }

    #[test]
    fn test_unknown_symbol() {
        let mut automaton = two_accepting_states();
        automaton.input.push("x".to_string());
        let canonical = canonicalize(&automaton).unwrap();

        assert_eq!(
            canonical.tape(),
            Err(GoedelError::UnknownSymbol("x".to_string()))
        );
    }
}
