//! This module turns untrusted user input into Turing Machine definitions. It parses digit
//! strings in base 2, 10, or 16 into big integers and validates their binary expansion
//! against the Gödel number grammar in `goedel.pest` before handing them to the decoder.

use crate::{
    encoder::decode,
    types::{Base, GoedelError, TuringMachineDefinition, MAX_PROGRAM_SIZE},
};
use log::debug;
use num_bigint::BigUint;
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the Gödel number grammar defined in `goedel.pest`.
#[derive(PestParser)]
#[grammar = "goedel.pest"]
pub struct GoedelParser;

/// The grammatical classes a binary string can fall into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// A transition table followed by `111` and an initial tape.
    Complete,
    /// A transition table without the `111` delimiter.
    MissingTape,
    /// Anything else.
    Invalid,
}

/// Parses a Gödel number written in `base` into a `TuringMachineDefinition`.
///
/// This is the main entry point for importing a machine. The input is parsed into an integer,
/// its binary expansion is checked against the grammar, and the result is decoded.
///
/// # Arguments
///
/// * `input` - The digits of the number, without prefix or whitespace.
/// * `base` - The base the digits are written in.
///
/// # Returns
///
/// * `Ok(TuringMachineDefinition)` if the input encodes a deterministic machine.
/// * `Err(GoedelError::EmptyInput)` or `Err(GoedelError::InvalidDigitForBase)` for bad digits.
/// * `Err(GoedelError::NotAGoedelNumber)` or `Err(GoedelError::MissingInitialTape)` for
///   grammar violations.
/// * `Err(GoedelError::NonDeterministic)` if two transitions share a state and symbol.
pub fn parse(input: &str, base: Base) -> Result<TuringMachineDefinition, GoedelError> {
    let goedel = parse_number(input, base)?;

    validate(&goedel)?;

    decode(&goedel)
}

/// Parses a digit string into an arbitrary-precision unsigned integer.
///
/// Every character must be a digit of `base`; hexadecimal digits are case-insensitive.
/// Inputs longer than [`MAX_PROGRAM_SIZE`] are refused.
pub fn parse_number(input: &str, base: Base) -> Result<BigUint, GoedelError> {
    if input.is_empty() {
        return Err(GoedelError::EmptyInput);
    }
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(GoedelError::InputTooLong(MAX_PROGRAM_SIZE));
    }

    if !input.chars().all(|c| base.is_digit(c)) {
        return Err(GoedelError::InvalidDigitForBase { base });
    }

    BigUint::parse_bytes(input.as_bytes(), base.radix())
        .ok_or(GoedelError::InvalidDigitForBase { base })
}

/// Classifies a binary digit string against the Gödel number grammar.
pub fn classify(binary: &str) -> Encoding {
    if GoedelParser::parse(Rule::goedel, binary).is_ok() {
        Encoding::Complete
    } else if GoedelParser::parse(Rule::goedel_without_input, binary).is_ok() {
        Encoding::MissingTape
    } else {
        Encoding::Invalid
    }
}

/// Checks that `goedel` is a syntactically valid Gödel number including an initial tape.
pub fn validate(goedel: &BigUint) -> Result<(), GoedelError> {
    let binary = goedel.to_str_radix(2);

    match classify(&binary) {
        Encoding::Complete => Ok(()),
        Encoding::MissingTape => Err(GoedelError::MissingInitialTape),
        Encoding::Invalid => {
            debug!("rejected {} bit number", binary.len());
            Err(GoedelError::NotAGoedelNumber)
        }
    }
}

/// Formats `number` in `base`, the inverse of [`parse_number`].
pub fn format_number(number: &BigUint, base: Base) -> String {
    number.to_str_radix(base.radix())
}
