//! This module defines the core data structures and types shared by the codec, the
//! canonicalizer, and the execution engine: symbols, transitions, decoded machine
//! definitions, execution outcomes, and the crate-wide error type.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Index into an ordered alphabet. `1` is `"0"`, `2` is `"1"`, `3` is the blank after decode.
pub type Symbol = usize;
/// Numeric state identifier. Canonical machines start in `1` and accept in `2`.
pub type StateId = usize;

/// The symbol id of the label `"0"`.
pub const ZERO_SYMBOL: Symbol = 1;
/// The symbol id of the label `"1"`.
pub const ONE_SYMBOL: Symbol = 2;
/// The symbol id of the blank in every decoded machine.
pub const BLANK_SYMBOL: Symbol = 3;
/// The label shown for the blank symbol of a decoded machine.
pub const BLANK_LABEL: &str = "⌴";
/// The maximum allowed size for a digit string or an automaton description in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default number of steps `run` executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// The numeral systems a Gödel number can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base {
    Binary,
    Decimal,
    Hexadecimal,
}

impl Base {
    /// Returns the radix of this base.
    pub fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Decimal => 10,
            Base::Hexadecimal => 16,
        }
    }

    /// Checks whether `c` is a digit of this base. Hex digits are case-insensitive.
    pub fn is_digit(self, c: char) -> bool {
        match self {
            Base::Binary => matches!(c, '0' | '1'),
            Base::Decimal => c.is_ascii_digit(),
            Base::Hexadecimal => c.is_ascii_hexdigit(),
        }
    }

    /// Describes the accepted digit set, used in error messages.
    pub fn digits(self) -> &'static str {
        match self {
            Base::Binary => "0s and 1s",
            Base::Decimal => "digits 0-9",
            Base::Hexadecimal => "digits 0-9 and letters a-f",
        }
    }
}

impl TryFrom<u32> for Base {
    type Error = GoedelError;

    fn try_from(radix: u32) -> Result<Self, Self::Error> {
        match radix {
            2 => Ok(Base::Binary),
            10 => Ok(Base::Decimal),
            16 => Ok(Base::Hexadecimal),
            _ => Err(GoedelError::UnsupportedBase(radix)),
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left. Encoded as a single `0`.
    Left,
    /// Move the head one position to the right. Encoded as `00`.
    Right,
}

impl Direction {
    /// Decodes a direction from the length of its run of zeros.
    pub fn from_run_length(length: usize) -> Self {
        if length == 1 {
            Direction::Left
        } else {
            Direction::Right
        }
    }

    /// The number of zeros this direction occupies in an encoding.
    pub fn run_length(self) -> usize {
        match self {
            Direction::Left => 1,
            Direction::Right => 2,
        }
    }
}

/// A single transition `(from, read) -> (to, write, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    pub from: StateId,
    pub read: Symbol,
    pub to: StateId,
    pub write: Symbol,
    pub direction: Direction,
}

impl Transition {
    pub fn new(
        from: StateId,
        read: Symbol,
        to: StateId,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        Self {
            from,
            read,
            to,
            write,
            direction,
        }
    }
}

/// The canonical, decoded form of a Turing Machine.
///
/// Decoded machines always start in [`TuringMachineDefinition::STARTING_STATE`] and accept in
/// [`TuringMachineDefinition::ACCEPTING_STATE`]. A definition is never mutated while it runs;
/// share it between configurations through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuringMachineDefinition {
    /// The Gödel number this machine was derived from, including the initial tape.
    pub goedel: BigUint,
    /// The encoding of the transition table alone, i.e. `goedel` without the `111` suffix.
    pub goedel_without_input: BigUint,
    /// Every state mentioned by a transition plus the start and accept states, ascending.
    pub states: Vec<StateId>,
    /// Symbol labels; the label of symbol `s` is `alphabet[s - 1]`.
    pub alphabet: Vec<String>,
    /// The blank symbol.
    pub blank: Symbol,
    /// The transition table in encoding order.
    pub transitions: Vec<Transition>,
    /// The initial tape, starting at position 0.
    pub initial_tape: Vec<Symbol>,
}

impl TuringMachineDefinition {
    /// The state every canonical machine starts in.
    pub const STARTING_STATE: StateId = 1;
    /// The only accepting state of a canonical machine.
    pub const ACCEPTING_STATE: StateId = 2;

    pub fn starting_state(&self) -> StateId {
        Self::STARTING_STATE
    }

    pub fn accepting_state(&self) -> StateId {
        Self::ACCEPTING_STATE
    }

    /// Finds the transition for `state` reading `symbol`, if any.
    pub fn transition(&self, state: StateId, symbol: Symbol) -> Option<&Transition> {
        self.transitions
            .iter()
            .find(|t| t.from == state && t.read == symbol)
    }

    /// Returns the label of `symbol`, or `None` if it is outside the alphabet.
    pub fn label(&self, symbol: Symbol) -> Option<&str> {
        symbol
            .checked_sub(1)
            .and_then(|i| self.alphabet.get(i))
            .map(String::as_str)
    }

    /// Returns the initial tape rendered with the alphabet labels.
    pub fn initial_tape_labels(&self) -> Vec<String> {
        self.initial_tape
            .iter()
            .map(|&s| self.label(s).unwrap_or(BLANK_LABEL).to_string())
            .collect()
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition was applied and the machine keeps running.
    Continue,
    /// No transition matched; the machine has halted.
    Halt(Halt),
}

/// How a machine halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// Halted in the accepting state.
    Accepted,
    /// Halted in any other state.
    Rejected,
}

/// Represents the errors that can occur while parsing, encoding, or running a machine.
///
/// The `Display` output of each variant is a stable message meant to be shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoedelError {
    #[error("Please enter a number")]
    EmptyInput,
    #[error("Input should only contain {}", .base.digits())]
    InvalidDigitForBase { base: Base },
    #[error("Input is longer than {0} digits")]
    InputTooLong(usize),
    #[error("Unsupported base: {0}")]
    UnsupportedBase(u32),
    #[error("Input is not a valid Gödel number")]
    NotAGoedelNumber,
    #[error("Initial tape is missing. Add it after the delimiter 111")]
    MissingInitialTape,
    #[error("Turing Machine is non-deterministic: state q{state} has more than one transition for symbol {symbol}")]
    NonDeterministic { state: StateId, symbol: Symbol },
    #[error("Symbol {0} cannot be given a label")]
    AlphabetTooLarge(Symbol),
    #[error("No starting state found")]
    MissingStartState,
    #[error("More than one starting state found: {0:?}")]
    MultipleStartStates(Vec<StateId>),
    #[error("No accepting state found")]
    MissingAcceptState,
    #[error("Transition references undefined state: {0}")]
    UndefinedState(StateId),
    #[error("State id {0} is used more than once")]
    DuplicateState(StateId),
    #[error("Symbol '{0}' is not part of the alphabet")]
    UnknownSymbol(String),
    #[error("Unsupported direction: {0}")]
    UnsupportedDirection(String),
    #[error("The blank symbol must not be '{0}'")]
    InvalidBlankSymbol(String),
    #[error("Tape symbol '{0}' cannot be encoded, only '0' and '1' are allowed on the initial tape")]
    UnencodableTapeSymbol(String),
    #[error("A machine without transitions cannot be encoded")]
    NoTransitions,
    #[error("The machine has already halted")]
    AlreadyHalted,
    #[error("Program not found: {0}")]
    ProgramNotFound(String),
    #[error("File error: {0}")]
    FileError(String),
    #[error("Automaton format error: {0}")]
    FormatError(String),
}
