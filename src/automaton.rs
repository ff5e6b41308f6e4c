//! This module defines `Automaton`, the loose description of a Turing Machine used for
//! interchange. States carry arbitrary ids and names, symbols are labels, and the blank is
//! named explicitly. The canonicalizer turns an `Automaton` into the form the encoder needs.

use crate::types::{Direction, StateId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The role a state plays in its automaton.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateRole {
    /// The state the machine starts in.
    Start,
    /// An accepting state.
    Accept,
    /// A starting state that also accepts. Canonicalization always splits this role.
    StartAndAccept,
    /// Any other state.
    #[default]
    Neither,
}

impl StateRole {
    /// Builds a role from the start/final flags used by the interchange format.
    pub fn from_flags(start: bool, accept: bool) -> Self {
        match (start, accept) {
            (true, true) => StateRole::StartAndAccept,
            (true, false) => StateRole::Start,
            (false, true) => StateRole::Accept,
            (false, false) => StateRole::Neither,
        }
    }

    pub fn is_start(self) -> bool {
        matches!(self, StateRole::Start | StateRole::StartAndAccept)
    }

    pub fn is_accept(self) -> bool {
        matches!(self, StateRole::Accept | StateRole::StartAndAccept)
    }

    /// Returns the same role with the accepting part removed.
    pub fn without_accept(self) -> Self {
        StateRole::from_flags(self.is_start(), false)
    }
}

/// One `read -> write, direction` label of a transition group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub read: String,
    pub write: String,
    pub direction: Direction,
}

impl Label {
    pub fn new(read: &str, write: &str, direction: Direction) -> Self {
        Self {
            read: read.to_string(),
            write: write.to_string(),
            direction,
        }
    }
}

/// All transitions from one state to the same target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionGroup {
    pub target: StateId,
    pub labels: Vec<Label>,
}

/// A state of an automaton together with its outgoing transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    pub role: StateRole,
    pub transitions: Vec<TransitionGroup>,
}

impl State {
    pub fn new(id: StateId, role: StateRole) -> Self {
        Self {
            id,
            name: format!("q{id}"),
            role,
            transitions: Vec::new(),
        }
    }

    /// Adds a transition to `target`, joining an existing group for that target.
    pub fn add_transition(&mut self, target: StateId, label: Label) {
        match self.transitions.iter_mut().find(|g| g.target == target) {
            Some(group) => group.labels.push(label),
            None => self.transitions.push(TransitionGroup {
                target,
                labels: vec![label],
            }),
        }
    }

    /// Returns every label of this state paired with its target.
    pub fn labels(&self) -> impl Iterator<Item = (StateId, &Label)> {
        self.transitions
            .iter()
            .flat_map(|group| group.labels.iter().map(move |label| (group.target, label)))
    }

    /// Returns the symbols this state already has a transition for.
    pub fn read_symbols(&self) -> HashSet<&str> {
        self.labels().map(|(_, label)| label.read.as_str()).collect()
    }
}

/// A Turing Machine description with arbitrary ids and symbol labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automaton {
    /// Opaque name, passed through unchanged.
    pub name: String,
    /// Opaque description, passed through unchanged.
    pub description: String,
    /// The tape alphabet, blank included.
    pub alphabet: Vec<String>,
    /// The blank symbol's label.
    pub blank: String,
    pub states: Vec<State>,
    /// The initial tape as labels.
    pub input: Vec<String>,
}

impl Automaton {
    /// Looks up a state by id.
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|s| s.id == id)
    }

    /// Returns the ids of all starting states in declaration order.
    pub fn starting_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| s.role.is_start())
            .map(|s| s.id)
            .collect()
    }

    /// Returns the ids of all accepting states in declaration order.
    pub fn accepting_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| s.role.is_accept())
            .map(|s| s.id)
            .collect()
    }

    /// The highest state id in use, or 0 for an automaton without states.
    pub fn max_id(&self) -> StateId {
        self.states.iter().map(|s| s.id).max().unwrap_or(0)
    }

    /// Counts the labels over all states.
    pub fn transition_count(&self) -> usize {
        self.states.iter().map(|s| s.labels().count()).sum()
    }
}
