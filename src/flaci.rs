//! This module reads and writes the FLACI JSON export of a Turing Machine, the interchange
//! format automata are drawn and shared in. Its first stack alphabet symbol is the blank and
//! `simulationInput` holds the initial tape.

use crate::automaton::{Automaton, Label, State, StateRole};
use crate::types::{Direction, GoedelError, StateId, TuringMachineDefinition, BLANK_LABEL};
use serde::{Deserialize, Serialize};

/// The name given to automata created from a Gödel number.
pub const EXPORT_NAME: &str = "UTM Export";
/// Horizontal distance between two exported states.
const STATE_SPACING: f64 = 100.0;
const STATE_RADIUS: f64 = 30.0;

/// The only automaton type this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlaciType {
    #[serde(rename = "TM")]
    TuringMachine,
}

/// Head movement as written by FLACI. `N` (no move) has no Gödel encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlaciDirection {
    L,
    R,
    N,
}

impl From<Direction> for FlaciDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => FlaciDirection::L,
            Direction::Right => FlaciDirection::R,
        }
    }
}

impl TryFrom<FlaciDirection> for Direction {
    type Error = GoedelError;

    fn try_from(direction: FlaciDirection) -> Result<Self, Self::Error> {
        match direction {
            FlaciDirection::L => Ok(Direction::Left),
            FlaciDirection::R => Ok(Direction::Right),
            FlaciDirection::N => Err(GoedelError::UnsupportedDirection("N".to_string())),
        }
    }
}

/// A `[read, write, direction]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaciLabel(pub String, pub String, pub FlaciDirection);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlaciTransition {
    pub source: StateId,
    pub target: StateId,
    #[serde(rename = "x", default)]
    pub x: f64,
    #[serde(rename = "y", default)]
    pub y: f64,
    pub labels: Vec<FlaciLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlaciState {
    #[serde(rename = "ID")]
    pub id: StateId,
    pub name: String,
    #[serde(rename = "x", default)]
    pub x: f64,
    #[serde(rename = "y", default)]
    pub y: f64,
    #[serde(rename = "Final")]
    pub accept: bool,
    pub start: bool,
    #[serde(default)]
    pub radius: f64,
    pub transitions: Vec<FlaciTransition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlaciAutomaton {
    /// The input alphabet. Not used for encoding.
    pub alphabet: Vec<String>,
    /// The tape alphabet. The first symbol is the blank.
    pub stack_alphabet: Vec<String>,
    pub states: Vec<FlaciState>,
    #[serde(rename = "acceptCache", default)]
    pub accept_cache: Vec<i64>,
    #[serde(rename = "simulationInput", default)]
    pub simulation_input: Vec<String>,
    #[serde(rename = "lastInputs", default)]
    pub last_inputs: Vec<Vec<String>>,
}

/// A FLACI Turing Machine document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flaci {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: FlaciType,
    pub automaton: FlaciAutomaton,
}

impl Flaci {
    /// Parses a FLACI document.
    ///
    /// # Returns
    ///
    /// * `Ok(Flaci)` if the JSON matches the schema.
    /// * `Err(GoedelError::FormatError)` if it does not, if the stack alphabet is empty, or if
    ///   the initial tape holds an empty label.
    pub fn from_json(json: &str) -> Result<Self, GoedelError> {
        let flaci: Flaci =
            serde_json::from_str(json).map_err(|e| GoedelError::FormatError(e.to_string()))?;

        if flaci.automaton.stack_alphabet.is_empty() {
            return Err(GoedelError::FormatError(
                "StackAlphabet must contain at least the blank symbol".to_string(),
            ));
        }
        if flaci.automaton.simulation_input.iter().any(String::is_empty) {
            return Err(GoedelError::FormatError(
                "simulationInput must not contain empty symbols".to_string(),
            ));
        }

        Ok(flaci)
    }

    pub fn to_json(&self) -> Result<String, GoedelError> {
        serde_json::to_string_pretty(self).map_err(|e| GoedelError::FormatError(e.to_string()))
    }

    /// Lays out a decoded machine as a FLACI document.
    ///
    /// States are placed on a line, transitions between the same pair of states share one
    /// arrow, and the blank moves to the front of the stack alphabet.
    pub fn from_definition(tm: &TuringMachineDefinition) -> Self {
        let label = |symbol| tm.label(symbol).unwrap_or(BLANK_LABEL).to_string();

        let states = tm
            .states
            .iter()
            .map(|&id| {
                let x = id as f64 * STATE_SPACING;
                let y = STATE_SPACING;
                let mut transitions: Vec<FlaciTransition> = Vec::new();

                for t in tm.transitions.iter().filter(|t| t.from == id) {
                    let entry = FlaciLabel(label(t.read), label(t.write), t.direction.into());
                    match transitions.iter_mut().find(|g| g.target == t.to) {
                        Some(group) => group.labels.push(entry),
                        None => transitions.push(FlaciTransition {
                            source: id,
                            target: t.to,
                            x,
                            y,
                            labels: vec![entry],
                        }),
                    }
                }

                FlaciState {
                    id,
                    name: format!("q{id}"),
                    x,
                    y,
                    accept: id == tm.accepting_state(),
                    start: id == tm.starting_state(),
                    radius: STATE_RADIUS,
                    transitions,
                }
            })
            .collect();

        let blank = label(tm.blank);
        let stack_alphabet = std::iter::once(blank.clone())
            .chain(tm.alphabet.iter().filter(|&s| *s != blank).cloned())
            .collect();

        Flaci {
            name: EXPORT_NAME.to_string(),
            description: format!("Exported from Gödel number 0x{:x}", tm.goedel),
            kind: FlaciType::TuringMachine,
            automaton: FlaciAutomaton {
                alphabet: vec!["0".to_string(), "1".to_string()],
                stack_alphabet,
                states,
                accept_cache: Vec::new(),
                simulation_input: tm.initial_tape_labels(),
                last_inputs: Vec::new(),
            },
        }
    }
}

impl TryFrom<Flaci> for Automaton {
    type Error = GoedelError;

    /// Drops the layout and keeps the machine.
    ///
    /// Fails with `UndefinedState` if a transition is listed under a state other than its
    /// source, and with `UnsupportedDirection` for `N` moves.
    fn try_from(flaci: Flaci) -> Result<Self, Self::Error> {
        let automaton = flaci.automaton;
        let blank = automaton
            .stack_alphabet
            .first()
            .cloned()
            .ok_or_else(|| GoedelError::FormatError("StackAlphabet is empty".to_string()))?;

        let mut states = Vec::with_capacity(automaton.states.len());
        for fs in automaton.states {
            let mut state = State::new(fs.id, StateRole::from_flags(fs.start, fs.accept));
            state.name = fs.name;

            for transition in fs.transitions {
                if transition.source != fs.id {
                    return Err(GoedelError::UndefinedState(transition.source));
                }
                for FlaciLabel(read, write, direction) in transition.labels {
                    let label = Label {
                        read,
                        write,
                        direction: direction.try_into()?,
                    };
                    state.add_transition(transition.target, label);
                }
            }

            states.push(state);
        }

        Ok(Automaton {
            name: flaci.name,
            description: flaci.description,
            alphabet: automaton.stack_alphabet,
            blank,
            states,
            input: automaton.simulation_input,
        })
    }
}
