//! This module defines `Configuration`, a running snapshot of a single-tape Turing Machine, and
//! `Execution`, a lazy iterator over the configurations of one run.
//!
//! The tape is unbounded in both directions. It is stored as two vectors split at the origin:
//! `tape_right[i]` holds absolute position `i`, `tape_left[j]` holds absolute position `-j - 1`.
//! Cells that were never written read as the blank symbol.

use crate::types::{
    Direction, GoedelError, Halt, StateId, Step, Symbol, Transition, TuringMachineDefinition,
    BLANK_LABEL, MAX_EXECUTION_STEPS,
};
use log::trace;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

/// A snapshot of a running machine.
///
/// A configuration only changes through [`Configuration::step`]. Once it has finished it can no
/// longer be stepped; `accepted` implies `finished`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    definition: Arc<TuringMachineDefinition>,
    tape_right: Vec<Symbol>,
    tape_left: Vec<Symbol>,
    state: StateId,
    position: i64,
    steps: usize,
    finished: bool,
    accepted: bool,
}

impl Configuration {
    /// Creates the initial configuration of `definition`, with its initial tape at position 0.
    pub fn new(definition: Arc<TuringMachineDefinition>) -> Self {
        let tape = definition.initial_tape.clone();
        Self::with_tape(definition, tape)
    }

    /// Creates an initial configuration with a different initial tape.
    pub fn with_tape(definition: Arc<TuringMachineDefinition>, tape: Vec<Symbol>) -> Self {
        Self {
            state: definition.starting_state(),
            definition,
            tape_right: tape,
            tape_left: Vec::new(),
            position: 0,
            steps: 0,
            finished: false,
            accepted: false,
        }
    }

    /// Executes a single step.
    ///
    /// Reads the symbol under the head and applies the matching transition. If there is none,
    /// the machine halts, accepting exactly when it is in the accepting state.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if a transition was applied.
    /// * `Ok(Step::Halt(_))` if no transition matched and the machine has now finished.
    /// * `Err(GoedelError::AlreadyHalted)` if the machine had finished before the call.
    pub fn step(&mut self) -> Result<Step, GoedelError> {
        if self.finished {
            return Err(GoedelError::AlreadyHalted);
        }

        let transition = match self.transition().copied() {
            Some(t) => t,
            None => {
                self.finished = true;
                self.accepted = self.state == self.definition.accepting_state();
                trace!(
                    "halted in q{} after {} steps (accepted: {})",
                    self.state,
                    self.steps,
                    self.accepted
                );
                return Ok(Step::Halt(self.halt_kind()));
            }
        };

        self.write(transition.write);
        self.position += match transition.direction {
            Direction::Left => -1,
            Direction::Right => 1,
        };
        self.state = transition.to;
        self.steps += 1;

        trace!(
            "step {}: q{} -> q{} at {}",
            self.steps,
            transition.from,
            transition.to,
            self.position
        );

        Ok(Step::Continue)
    }

    /// Runs until the machine halts or [`MAX_EXECUTION_STEPS`] steps have been taken.
    pub fn run(&mut self) -> Step {
        self.run_for(MAX_EXECUTION_STEPS)
    }

    /// Runs until the machine halts or `max_steps` more transitions have been applied.
    ///
    /// Returns `Step::Continue` if the budget ran out first. A finished configuration is left
    /// untouched.
    pub fn run_for(&mut self, max_steps: usize) -> Step {
        let limit = self.steps.saturating_add(max_steps);

        loop {
            if let Some(halt) = self.halt() {
                return Step::Halt(halt);
            }
            if self.steps >= limit {
                return Step::Continue;
            }
            // Cannot fail: the configuration has not finished.
            if let Ok(Step::Halt(halt)) = self.step() {
                return Step::Halt(halt);
            }
        }
    }

    /// Finds the transition for the current state and the symbol under the head.
    pub fn transition(&self) -> Option<&Transition> {
        self.definition.transition(self.state, self.symbol())
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> Symbol {
        self.read(0)
    }

    /// Returns the symbol `offset` cells away from the head without moving it.
    pub fn read(&self, offset: i64) -> Symbol {
        self.position
            .checked_add(offset)
            .map_or(self.definition.blank, |position| self.symbol_at(position))
    }

    /// Returns the symbol at absolute tape `position`.
    pub fn symbol_at(&self, position: i64) -> Symbol {
        // -(p + 1) is in range for every negative p, including i64::MIN.
        let cell = match position {
            p if p >= 0 => usize::try_from(p).ok().and_then(|i| self.tape_right.get(i)),
            p => usize::try_from(-(p + 1)).ok().and_then(|i| self.tape_left.get(i)),
        };

        cell.copied().unwrap_or(self.definition.blank)
    }

    /// Writes `symbol` under the head, growing the tape with blanks as needed.
    fn write(&mut self, symbol: Symbol) {
        let blank = self.definition.blank;
        let (tape, index) = if self.position >= 0 {
            (&mut self.tape_right, self.position as usize)
        } else {
            (&mut self.tape_left, (-self.position - 1) as usize)
        };

        if index >= tape.len() {
            tape.resize(index + 1, blank);
        }
        tape[index] = symbol;
    }

    /// Restores the initial configuration.
    pub fn reset(&mut self) {
        *self = Self::new(Arc::clone(&self.definition));
    }

    /// Returns how the machine halted, or `None` while it is still running.
    pub fn halt(&self) -> Option<Halt> {
        self.finished.then(|| self.halt_kind())
    }

    fn halt_kind(&self) -> Halt {
        if self.accepted {
            Halt::Accepted
        } else {
            Halt::Rejected
        }
    }

    pub fn definition(&self) -> &Arc<TuringMachineDefinition> {
        &self.definition
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// The written cells at positions `0, 1, 2, ...`.
    pub fn tape_right(&self) -> &[Symbol] {
        &self.tape_right
    }

    /// The written cells at positions `-1, -2, -3, ...`.
    pub fn tape_left(&self) -> &[Symbol] {
        &self.tape_left
    }
}

/// Prints the state, step count, and every written cell, with the head cell bracketed.
///
/// `q4 @12: 0 1 [⌴] 1`
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = (-(self.tape_left.len() as i64)).min(self.position);
        let last = (self.tape_right.len() as i64 - 1).max(self.position);

        write!(f, "q{} @{}:", self.state, self.steps)?;
        for position in first..=last {
            let label = self
                .definition
                .label(self.symbol_at(position))
                .unwrap_or(BLANK_LABEL);

            if position == self.position {
                write!(f, " [{label}]")?;
            } else {
                write!(f, " {label}")?;
            }
        }

        Ok(())
    }
}

/// A lazy, pull-based sequence of the configurations of one run.
///
/// Yields the initial configuration, one configuration per applied transition, and finally the
/// halted configuration. Nothing is computed ahead of the consumer, so a run is bounded or
/// cancelled by simply not pulling further. Machines that never halt yield forever unless the
/// run was started with a step limit.
#[derive(Debug, Clone)]
pub struct Execution {
    next: Option<Configuration>,
    limit: Option<usize>,
}

impl Execution {
    /// Starts a fresh run of `definition`.
    pub fn new(definition: Arc<TuringMachineDefinition>) -> Self {
        Self::from_configuration(Configuration::new(definition))
    }

    /// Continues a run from `configuration`.
    pub fn from_configuration(configuration: Configuration) -> Self {
        Self {
            next: Some(configuration),
            limit: None,
        }
    }

    /// Stops the run once `max_steps` more transitions have been applied.
    ///
    /// The last configuration yielded is the one [`Configuration::run_for`] would leave behind.
    pub fn with_limit(mut self, max_steps: usize) -> Self {
        self.limit = self
            .next
            .as_ref()
            .map(|configuration| configuration.steps().saturating_add(max_steps));
        self
    }
}

impl Iterator for Execution {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        let current = self.next.take()?;

        let within_limit = self.limit.is_none_or(|limit| current.steps() < limit);
        if !current.is_finished() && within_limit {
            let mut successor = current.clone();
            if successor.step().is_ok() {
                self.next = Some(successor);
            }
        }

        Some(current)
    }
}

impl FusedIterator for Execution {}

/// Starts a fresh, lazy run of `definition`.
pub fn execute(definition: Arc<TuringMachineDefinition>) -> Execution {
    Execution::new(definition)
}

/// Starts a fresh, lazy run of `definition` that applies at most `max_steps` transitions.
pub fn execute_for(definition: Arc<TuringMachineDefinition>, max_steps: usize) -> Execution {
    Execution::new(definition).with_limit(max_steps)
}

/// Runs `definition` from its initial configuration for at most `max_steps` transitions and
/// returns the last configuration. Check [`Configuration::is_finished`] to tell a halted machine
/// from an exhausted budget.
pub fn run(definition: Arc<TuringMachineDefinition>, max_steps: usize) -> Configuration {
    let mut configuration = Configuration::new(definition);
    configuration.run_for(max_steps);
    configuration
}
