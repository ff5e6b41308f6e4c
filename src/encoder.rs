//! This module converts between Gödel numbers and Turing Machine transition tables.
//!
//! A transition `(from, read, to, write, direction)` is written as runs of zeros separated by
//! single ones: `0^from 1 0^read 1 0^to 1 0^write 1 0^direction`. Transitions are joined by
//! `11`, the table is prefixed by `1`, and `111` separates it from the initial tape, which is
//! written one bit per cell.

use crate::analyzer::analyze;
use crate::automaton::Automaton;
use crate::canonical::{canonicalize, CanonicalAutomaton};
use crate::types::{
    Base, Direction, GoedelError, Symbol, Transition, TuringMachineDefinition, BLANK_LABEL,
    BLANK_SYMBOL, ONE_SYMBOL, ZERO_SYMBOL,
};
use log::debug;
use num_bigint::BigUint;
use std::collections::{BTreeSet, HashSet};

/// The separator between the transition table and the initial tape.
const TAPE_DELIMITER: &str = "111";
/// The separator between two transitions.
const TRANSITION_DELIMITER: &str = "11";
/// The separator between the fields of a transition.
const FIELD_DELIMITER: char = '1';

/// A Gödel number together with the number of its transition table alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoedelNumber {
    /// The full encoding, including `111` and the initial tape.
    pub goedel: BigUint,
    /// The encoding of the transition table without the tape suffix.
    pub goedel_without_input: BigUint,
}

impl GoedelNumber {
    /// Formats the full encoding in `base`.
    pub fn to_string_radix(&self, base: Base) -> String {
        self.goedel.to_str_radix(base.radix())
    }

    /// Formats the table-only encoding in `base`.
    pub fn without_input_radix(&self, base: Base) -> String {
        self.goedel_without_input.to_str_radix(base.radix())
    }
}

/// Encodes a canonical automaton into its Gödel number.
///
/// Symbols are numbered by their position in the canonical alphabet and transitions are
/// emitted in state declaration order. The initial tape may only contain `"0"` and `"1"`.
///
/// # Returns
///
/// * `Ok(GoedelNumber)` with and without the initial tape.
/// * `Err(GoedelError::UnencodableTapeSymbol)` if the initial tape holds any other symbol.
/// * `Err(GoedelError::UnknownSymbol)` if a label is missing from the alphabet.
/// * `Err(GoedelError::NoTransitions)` if the automaton has no transitions.
/// * `Err(GoedelError::AlphabetTooLarge)` if a transition uses a symbol that decoding could not
///   label.
pub fn encode(automaton: &CanonicalAutomaton) -> Result<GoedelNumber, GoedelError> {
    let transitions = automaton.transitions()?;
    let tape = automaton
        .input
        .iter()
        .map(|label| match label.as_str() {
            "0" | "1" => Ok(label.as_str()),
            _ => Err(GoedelError::UnencodableTapeSymbol(label.clone())),
        })
        .collect::<Result<String, _>>()?;

    debug!(
        "encoding '{}' with {} transitions",
        automaton.name,
        transitions.len()
    );

    encode_table(&transitions, &tape)
}

/// Checks, canonicalizes, and encodes `automaton`.
///
/// # Returns
///
/// * `Ok(GoedelNumber)` on success.
/// * `Err(GoedelError)` with the first problem found by [`analyze`], [`canonicalize`], or
///   [`encode`].
pub fn export(automaton: &Automaton) -> Result<GoedelNumber, GoedelError> {
    analyze(automaton)?;
    encode(&canonicalize(automaton)?)
}

/// Re-encodes a decoded definition. Decoding the result yields an equal definition.
pub fn encode_definition(tm: &TuringMachineDefinition) -> Result<GoedelNumber, GoedelError> {
    let tape = encode_tape(&tm.initial_tape).map_err(|symbol| {
        let label = tm.label(symbol).map_or_else(|| symbol.to_string(), str::to_string);
        GoedelError::UnencodableTapeSymbol(label)
    })?;

    encode_table(&tm.transitions, &tape)
}

/// Writes one bit per tape cell, or returns the first symbol other than `"0"` and `"1"`.
fn encode_tape(tape: &[Symbol]) -> Result<String, Symbol> {
    tape.iter()
        .map(|&symbol| match symbol {
            ZERO_SYMBOL => Ok('0'),
            ONE_SYMBOL => Ok('1'),
            _ => Err(symbol),
        })
        .collect()
}

/// Writes the bit string for `transitions` followed by the `tape` bits and converts both
/// encodings to integers.
fn encode_table(transitions: &[Transition], tape: &str) -> Result<GoedelNumber, GoedelError> {
    if transitions.is_empty() {
        return Err(GoedelError::NoTransitions);
    }

    let max_symbol = transitions
        .iter()
        .map(|t| t.read.max(t.write))
        .max()
        .unwrap_or(BLANK_SYMBOL);
    symbol_label(max_symbol)?;

    let table = transitions
        .iter()
        .map(encode_transition)
        .collect::<Vec<_>>()
        .join(TRANSITION_DELIMITER);

    let without_input = format!("1{table}");
    let full = format!("{without_input}{TAPE_DELIMITER}{tape}");

    Ok(GoedelNumber {
        goedel: from_binary(&full),
        goedel_without_input: from_binary(&without_input),
    })
}

/// Encodes one transition as five runs of zeros.
fn encode_transition(t: &Transition) -> String {
    [t.from, t.read, t.to, t.write, t.direction.run_length()]
        .iter()
        .map(|&n| "0".repeat(n))
        .collect::<Vec<_>>()
        .join("1")
}

/// Converts a string of `0`s and `1`s starting with `1` into an integer.
fn from_binary(bits: &str) -> BigUint {
    BigUint::parse_bytes(bits.as_bytes(), 2).unwrap_or_default()
}

/// Decodes a Gödel number into a `TuringMachineDefinition`.
///
/// The number is expected to match the grammar already; see [`crate::parser::validate`].
/// Decoding only re-checks what it needs to split the number apart.
///
/// # Returns
///
/// * `Ok(TuringMachineDefinition)` starting in state 1 and accepting in state 2.
/// * `Err(GoedelError::NonDeterministic)` if two transitions share a state and read symbol.
/// * `Err(GoedelError::NotAGoedelNumber)` if the number cannot be split into transitions.
/// * `Err(GoedelError::AlphabetTooLarge)` if a symbol id is beyond the labelling scheme.
pub fn decode(goedel: &BigUint) -> Result<TuringMachineDefinition, GoedelError> {
    let binary = goedel.to_str_radix(2);
    let encoding = binary
        .strip_prefix('1')
        .ok_or(GoedelError::NotAGoedelNumber)?;

    let delimiter = encoding
        .find(TAPE_DELIMITER)
        .ok_or(GoedelError::NotAGoedelNumber)?;
    let table = &encoding[..delimiter];
    let tape = &encoding[delimiter + TAPE_DELIMITER.len()..];

    let mut transitions = Vec::new();
    let mut seen = HashSet::new();
    let mut states = BTreeSet::from([
        TuringMachineDefinition::STARTING_STATE,
        TuringMachineDefinition::ACCEPTING_STATE,
    ]);
    let mut max_symbol = BLANK_SYMBOL;

    for group in table.split(TRANSITION_DELIMITER) {
        let transition = decode_transition(group)?;

        if !seen.insert((transition.from, transition.read)) {
            return Err(GoedelError::NonDeterministic {
                state: transition.from,
                symbol: transition.read,
            });
        }

        states.insert(transition.from);
        states.insert(transition.to);
        max_symbol = max_symbol.max(transition.read).max(transition.write);
        transitions.push(transition);
    }

    let alphabet = (1..=max_symbol)
        .map(symbol_label)
        .collect::<Result<Vec<_>, _>>()?;

    let initial_tape = tape
        .chars()
        .map(|bit| if bit == '1' { ONE_SYMBOL } else { ZERO_SYMBOL })
        .collect();

    debug!(
        "decoded {} transitions over {} states and {} symbols",
        transitions.len(),
        states.len(),
        alphabet.len()
    );

    Ok(TuringMachineDefinition {
        goedel: goedel.clone(),
        goedel_without_input: from_binary(&format!("1{table}")),
        states: states.into_iter().collect(),
        alphabet,
        blank: BLANK_SYMBOL,
        transitions,
        initial_tape,
    })
}

/// Splits one transition into its five fields and reads their run lengths.
fn decode_transition(group: &str) -> Result<Transition, GoedelError> {
    let fields: Vec<usize> = group.split(FIELD_DELIMITER).map(str::len).collect();

    match fields[..] {
        [from, read, to, write, direction]
            if from > 0 && read > 0 && to > 0 && write > 0 && matches!(direction, 1 | 2) =>
        {
            Ok(Transition::new(
                from,
                read,
                to,
                write,
                Direction::from_run_length(direction),
            ))
        }
        _ => Err(GoedelError::NotAGoedelNumber),
    }
}

/// Returns the label a decoded machine uses for `symbol`.
///
/// Symbols 1 to 3 are `"0"`, `"1"` and the blank; later symbols are labelled `a` to `z`,
/// then `aa` to `zz`.
pub fn symbol_label(symbol: Symbol) -> Result<String, GoedelError> {
    const LETTERS: usize = 26;
    let letter = |i: usize| char::from(b'a' + i as u8);

    match symbol {
        ZERO_SYMBOL => Ok("0".to_string()),
        ONE_SYMBOL => Ok("1".to_string()),
        BLANK_SYMBOL => Ok(BLANK_LABEL.to_string()),
        0 => Err(GoedelError::AlphabetTooLarge(symbol)),
        _ => {
            let index = symbol - BLANK_SYMBOL - 1;
            if index < LETTERS {
                Ok(letter(index).to_string())
            } else if index < LETTERS + LETTERS * LETTERS {
                let index = index - LETTERS;
                Ok(format!("{}{}", letter(index / LETTERS), letter(index % LETTERS)))
            } else {
                Err(GoedelError::AlphabetTooLarge(symbol))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::fixtures::two_accepting_states;
    use crate::canonical::canonicalize;
    use crate::parser::{parse, validate};

    const SHIFT_BINARY: &str = "10101000101001101001010010011000101000010100110001001010010011000010100001010011000010010000100100110000100010010001001111001";

    fn binary(n: &BigUint) -> String {
        n.to_str_radix(2)
    }

    #[test]
    fn test_decode_transitions() {
        let tm = decode(&from_binary(SHIFT_BINARY)).unwrap();

        assert_eq!(
            tm.transitions,
            vec![
                Transition::new(1, 1, 3, 1, Direction::Right),
                Transition::new(1, 2, 1, 2, Direction::Right),
                Transition::new(3, 1, 4, 1, Direction::Right),
                Transition::new(3, 2, 1, 2, Direction::Right),
                Transition::new(4, 1, 4, 1, Direction::Right),
                Transition::new(4, 2, 4, 2, Direction::Right),
                Transition::new(4, 3, 2, 3, Direction::Right),
            ]
        );
        assert_eq!(tm.states, vec![1, 2, 3, 4]);
        assert_eq!(tm.alphabet, vec!["0", "1", BLANK_LABEL]);
        assert_eq!(tm.initial_tape, vec![2, 1, 1, 2]);
        assert_eq!(tm.blank, BLANK_SYMBOL);
        assert_eq!(
            binary(&tm.goedel_without_input),
            SHIFT_BINARY.strip_suffix("1111001").unwrap()
        );
    }

    #[test]
    fn test_decode_states_include_unreferenced_accept() {
        // A single transition q1 -0-> q1.
        let tm = decode(&from_binary("1010101010111")).unwrap();
        assert_eq!(tm.states, vec![1, 2]);
        assert_eq!(tm.transitions[0].direction, Direction::Left);
        assert!(tm.initial_tape.is_empty());
    }

    #[test]
    fn test_decode_alphabet_labels() {
        // q1 reads symbol 5 and writes symbol 4.
        let tm = decode(&from_binary("1010000010100001001110")).unwrap();
        assert_eq!(tm.alphabet, vec!["0", "1", BLANK_LABEL, "a", "b"]);
        assert_eq!(tm.initial_tape, vec![1]);
    }

    #[test]
    fn test_decode_rejects_malformed_numbers() {
        assert_eq!(
            decode(&from_binary("1010")),
            Err(GoedelError::NotAGoedelNumber)
        );
        assert_eq!(
            decode(&from_binary("1010101000111")),
            Err(GoedelError::NotAGoedelNumber)
        );
    }

    #[test]
    fn test_symbol_labels() {
        assert_eq!(symbol_label(1).unwrap(), "0");
        assert_eq!(symbol_label(2).unwrap(), "1");
        assert_eq!(symbol_label(3).unwrap(), BLANK_LABEL);
        assert_eq!(symbol_label(4).unwrap(), "a");
        assert_eq!(symbol_label(29).unwrap(), "z");
        assert_eq!(symbol_label(30).unwrap(), "aa");
        assert_eq!(symbol_label(31).unwrap(), "ab");
        assert_eq!(symbol_label(705).unwrap(), "zz");
        assert_eq!(symbol_label(706), Err(GoedelError::AlphabetTooLarge(706)));
        assert_eq!(symbol_label(0), Err(GoedelError::AlphabetTooLarge(0)));
    }

    #[test]
    fn test_encode_single_transition() {
        let mut automaton = two_accepting_states();
        automaton.states.retain(|s| s.id == 10 || s.id == 30);
        automaton.states[0].transitions.truncate(1);
        automaton.states[0].transitions[0].target = 30;
        automaton.states[0].transitions[0].labels[0] =
            crate::automaton::Label::new("1", "1", Direction::Right);
        automaton.states[1].transitions.clear();
        automaton.states[1].role = crate::automaton::StateRole::Accept;
        automaton.input = vec!["1".to_string()];

        let canonical = canonicalize(&automaton).unwrap();
        let number = encode(&canonical).unwrap();

        assert_eq!(binary(&number.goedel), "101001001001001111");
        assert_eq!(number.to_string_radix(Base::Decimal), "168527");
        assert_eq!(binary(&number.goedel_without_input), "10100100100100");
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let canonical = canonicalize(&two_accepting_states()).unwrap();
        let number = encode(&canonical).unwrap();

        assert!(validate(&number.goedel).is_ok());
        assert_eq!(
            validate(&number.goedel_without_input),
            Err(GoedelError::MissingInitialTape)
        );

        let tm = decode(&number.goedel).unwrap();
        assert_eq!(tm.transitions, canonical.transitions().unwrap());
        assert_eq!(tm.initial_tape, vec![2, 2]);
        assert_eq!(tm.states, vec![1, 2, 3, 4, 5]);
        assert_eq!(tm.goedel_without_input, number.goedel_without_input);
    }

    #[test]
    fn test_encode_definition_reproduces_number() {
        let tm = parse(SHIFT_BINARY, Base::Binary).unwrap();
        let number = encode_definition(&tm).unwrap();

        assert_eq!(binary(&number.goedel), SHIFT_BINARY);
        assert_eq!(number.goedel_without_input, tm.goedel_without_input);
    }

    #[test]
    fn test_encode_unencodable_tape_symbol() {
        let mut automaton = two_accepting_states();
        automaton.input = vec!["0".to_string(), "_".to_string()];
        let canonical = canonicalize(&automaton).unwrap();

        assert_eq!(
            encode(&canonical),
            Err(GoedelError::UnencodableTapeSymbol("_".to_string()))
        );

        let mut tm = parse(SHIFT_BINARY, Base::Binary).unwrap();
        tm.initial_tape.push(BLANK_SYMBOL);
        assert_eq!(
            encode_definition(&tm),
            Err(GoedelError::UnencodableTapeSymbol(BLANK_LABEL.to_string()))
        );
    }

    #[test]
    fn test_encode_rejects_unlabelled_symbols() {
        let mut automaton = two_accepting_states();
        automaton
            .alphabet
            .extend((0..710).map(|i| format!("s{i}")));
        automaton.states[1]
            .add_transition(20, crate::automaton::Label::new("s709", "s709", Direction::Left));

        assert_eq!(export(&automaton), Err(GoedelError::AlphabetTooLarge(713)));

        // The last symbol that still has a label.
        let mut automaton = two_accepting_states();
        automaton
            .alphabet
            .extend((0..702).map(|i| format!("s{i}")));
        automaton.states[1]
            .add_transition(20, crate::automaton::Label::new("s701", "s701", Direction::Left));

        let number = export(&automaton).unwrap();
        let tm = decode(&number.goedel).unwrap();
        assert_eq!(tm.alphabet.len(), 705);
        assert_eq!(tm.alphabet[704], "zz");
    }

    #[test]
    fn test_encode_without_transitions() {
        let mut automaton = two_accepting_states();
        for state in automaton.states.iter_mut() {
            state.transitions.clear();
        }
        automaton.states.retain(|s| s.id != 40);
        let canonical = canonicalize(&automaton).unwrap();

        assert_eq!(encode(&canonical), Err(GoedelError::NoTransitions));
    }

    #[test]
    fn test_export_checks_automaton() {
        let mut automaton = two_accepting_states();
        automaton.blank = "0".to_string();

        assert_eq!(
            export(&automaton),
            Err(GoedelError::InvalidBlankSymbol("0".to_string()))
        );
    }

    #[test]
    fn test_export_preserves_behaviour() {
        let inputs: Vec<String> = (0..=3u32)
            .flat_map(|len| {
                (0..1u32 << len).map(move |n| {
                    (0..len)
                        .map(|i| if (n >> i) & 1 == 1 { '1' } else { '0' })
                        .collect()
                })
            })
            .collect();
        assert_eq!(inputs.len(), 15);

        for input in inputs {
            let mut automaton = two_accepting_states();
            automaton.input = input.chars().map(String::from).collect();

            let number = export(&automaton).unwrap();
            let tm = std::sync::Arc::new(decode(&number.goedel).unwrap());
            let configuration = crate::machine::run(tm, 100);

            let expected = input.starts_with('0') || input.starts_with("11");
            assert!(configuration.is_finished());
            assert_eq!(configuration.is_accepted(), expected, "input {input:?}");
        }
    }
}
