//! This crate encodes deterministic single-tape Turing Machines as Gödel numbers and runs them.
//! It includes modules for parsing and validating numbers in several bases, decoding them into
//! machine definitions, canonicalizing and encoding automata, exchanging automata as FLACI
//! JSON, and executing definitions step by step.

pub mod analyzer;
pub mod automaton;
pub mod canonical;
pub mod encoder;
pub mod flaci;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the automaton description types.
pub use automaton::{Automaton, Label, State, StateRole, TransitionGroup};
/// Re-exports the canonicalizer.
pub use canonical::{canonicalize, CanonicalAutomaton};
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, encode, encode_definition, export, GoedelNumber};
/// Re-exports the FLACI document type.
pub use flaci::Flaci;
/// Re-exports the `AutomatonLoader` struct from the loader module.
pub use loader::AutomatonLoader;
/// Re-exports the execution engine from the machine module.
pub use machine::{execute, execute_for, run, Configuration, Execution};
/// Re-exports the number parsing functions from the parser module.
pub use parser::{parse, parse_number, validate};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the shared types and constants from the types module.
pub use types::{
    Base, Direction, GoedelError, Halt, StateId, Step, Symbol, Transition,
    TuringMachineDefinition, MAX_EXECUTION_STEPS, MAX_PROGRAM_SIZE,
};
