//! This module provides functions for analyzing automata before they are canonicalized and
//! encoded. It catches descriptions that cannot yield a valid Gödel number: missing or
//! ambiguous roles, dangling state references, unknown symbols, and non-determinism.

use crate::automaton::Automaton;
use crate::canonical::reorder_alphabet;
use crate::types::{GoedelError, StateId};
use log::warn;
use std::collections::HashSet;

/// Represents the problems that can be found while analyzing an automaton.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// No state is marked as starting.
    MissingStartState,
    /// More than one state is marked as starting.
    MultipleStartStates(Vec<StateId>),
    /// No state is marked as accepting.
    MissingAcceptState,
    /// The same id is used by several states.
    DuplicateStates(Vec<StateId>),
    /// Transitions point to ids no state has.
    UndefinedTargets(Vec<StateId>),
    /// Labels or tape cells use symbols outside the alphabet.
    UnknownSymbols(Vec<String>),
    /// The blank is one of the input symbols `"0"` and `"1"`.
    InvalidBlank(String),
    /// A state has more than one transition for the same symbol.
    NonDeterministic { state: StateId, symbol: String },
}

impl AnalysisError {
    /// Attaches the canonical symbol id of `symbol` for error reporting.
    fn into_error(self, automaton: &Automaton) -> GoedelError {
        match self {
            AnalysisError::NonDeterministic { state, symbol } => {
                let alphabet = reorder_alphabet(&automaton.alphabet, &automaton.blank);
                let symbol = alphabet
                    .iter()
                    .position(|s| *s == symbol)
                    .map_or(0, |i| i + 1);
                GoedelError::NonDeterministic { state, symbol }
            }
            error => error.into(),
        }
    }
}

impl From<AnalysisError> for GoedelError {
    /// Converts an `AnalysisError` into a `GoedelError` without alphabet context.
    ///
    /// Non-determinism is reported with symbol `0` since the canonical symbol id is unknown.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NonDeterministic { state, .. } => {
                GoedelError::NonDeterministic { state, symbol: 0 }
            }
            AnalysisError::MissingStartState => GoedelError::MissingStartState,
            AnalysisError::MultipleStartStates(ids) => GoedelError::MultipleStartStates(ids),
            AnalysisError::MissingAcceptState => GoedelError::MissingAcceptState,
            AnalysisError::DuplicateStates(ids) => {
                GoedelError::DuplicateState(ids.first().copied().unwrap_or_default())
            }
            AnalysisError::UndefinedTargets(ids) => {
                GoedelError::UndefinedState(ids.first().copied().unwrap_or_default())
            }
            AnalysisError::UnknownSymbols(symbols) => {
                GoedelError::UnknownSymbol(symbols.into_iter().next().unwrap_or_default())
            }
            AnalysisError::InvalidBlank(blank) => GoedelError::InvalidBlankSymbol(blank),
        }
    }
}

/// Analyzes an `Automaton` for problems that would prevent encoding it.
///
/// The checks run in a fixed order and the first failing one is reported. States that cannot
/// be reached from the start are only logged, since they do not affect the encoding.
///
/// # Arguments
///
/// * `automaton` - A reference to the `Automaton` to be analyzed.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(GoedelError)` describing the first problem found.
pub fn analyze(automaton: &Automaton) -> Result<(), GoedelError> {
    let first_error = [
        check_roles,
        check_duplicate_states,
        check_undefined_targets,
        check_blank,
        check_symbols,
        check_determinism,
    ]
    .iter()
    .find_map(|check| check(automaton).err());

    if let Some(error) = first_error {
        return Err(error.into_error(automaton));
    }

    let unreachable = unreachable_states(automaton);
    if !unreachable.is_empty() {
        warn!(
            "'{}' has states unreachable from the start: {:?}",
            automaton.name, unreachable
        );
    }

    Ok(())
}

/// Checks that exactly one state starts and at least one accepts.
fn check_roles(automaton: &Automaton) -> Result<(), AnalysisError> {
    let starting = automaton.starting_states();
    match starting.len() {
        0 => return Err(AnalysisError::MissingStartState),
        1 => {}
        _ => return Err(AnalysisError::MultipleStartStates(starting)),
    }

    if automaton.accepting_states().is_empty() {
        return Err(AnalysisError::MissingAcceptState);
    }

    Ok(())
}

/// Checks that no two states share an id.
fn check_duplicate_states(automaton: &Automaton) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    let mut duplicates: Vec<StateId> = automaton
        .states
        .iter()
        .filter(|s| !seen.insert(s.id))
        .map(|s| s.id)
        .collect();

    if !duplicates.is_empty() {
        duplicates.sort();
        duplicates.dedup();
        return Err(AnalysisError::DuplicateStates(duplicates));
    }

    Ok(())
}

/// Checks that every transition targets an existing state.
fn check_undefined_targets(automaton: &Automaton) -> Result<(), AnalysisError> {
    let defined: HashSet<StateId> = automaton.states.iter().map(|s| s.id).collect();

    let mut undefined: Vec<StateId> = automaton
        .states
        .iter()
        .flat_map(|s| s.transitions.iter())
        .map(|group| group.target)
        .filter(|target| !defined.contains(target))
        .collect();

    if !undefined.is_empty() {
        undefined.sort();
        undefined.dedup();
        return Err(AnalysisError::UndefinedTargets(undefined));
    }

    Ok(())
}

/// Checks that the blank is distinct from the input symbols.
fn check_blank(automaton: &Automaton) -> Result<(), AnalysisError> {
    match automaton.blank.as_str() {
        "0" | "1" => Err(AnalysisError::InvalidBlank(automaton.blank.clone())),
        _ => Ok(()),
    }
}

/// Checks that the blank, every label, and every initial tape cell belong to the alphabet.
fn check_symbols(automaton: &Automaton) -> Result<(), AnalysisError> {
    let alphabet: HashSet<&str> = automaton.alphabet.iter().map(String::as_str).collect();

    let used = std::iter::once(automaton.blank.as_str())
        .chain(automaton.states.iter().flat_map(|s| {
            s.labels()
                .flat_map(|(_, label)| [label.read.as_str(), label.write.as_str()])
        }))
        .chain(automaton.input.iter().map(String::as_str));

    let mut unknown = Vec::new();
    for symbol in used {
        if !alphabet.contains(symbol) && !unknown.iter().any(|u| u == symbol) {
            unknown.push(symbol.to_string());
        }
    }

    if !unknown.is_empty() {
        return Err(AnalysisError::UnknownSymbols(unknown));
    }

    Ok(())
}

/// Checks that no state reads the same symbol in two transitions.
fn check_determinism(automaton: &Automaton) -> Result<(), AnalysisError> {
    for state in &automaton.states {
        let mut read = HashSet::new();
        for (_, label) in state.labels() {
            if !read.insert(label.read.as_str()) {
                return Err(AnalysisError::NonDeterministic {
                    state: state.id,
                    symbol: label.read.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Returns the states that no sequence of transitions leads to from the starting state,
/// sorted by id.
pub fn unreachable_states(automaton: &Automaton) -> Vec<StateId> {
    let mut visited = HashSet::new();
    let mut queue = automaton.starting_states();

    while let Some(id) = queue.pop() {
        if !visited.insert(id) {
            continue;
        }

        if let Some(state) = automaton.state(id) {
            for group in &state.transitions {
                if !visited.contains(&group.target) {
                    queue.push(group.target);
                }
            }
        }
    }

    let mut unreachable: Vec<StateId> = automaton
        .states
        .iter()
        .map(|s| s.id)
        .filter(|id| !visited.contains(id))
        .collect();
    unreachable.sort();
    unreachable
}
