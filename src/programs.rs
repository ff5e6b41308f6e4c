use crate::parser::parse;
use crate::types::{Base, GoedelError, TuringMachineDefinition};
use log::warn;
use std::sync::{Arc, RwLock};

// Embedded machines, written as binary Gödel numbers
const PROGRAM_TEXTS: [(&str, &str); 2] = [
    ("Binary Shift", include_str!("../machines/binary-shift.goedel")),
    ("Square", include_str!("../machines/square.goedel")),
];

/// A named, decoded built-in machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub definition: Arc<TuringMachineDefinition>,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Decodes the embedded machines, unless that already happened.
    pub fn load() -> Result<(), GoedelError> {
        let lock_error = || GoedelError::FileError("Failed to acquire write lock".to_string());

        let mut programs = PROGRAMS.write().map_err(|_| lock_error())?;
        if !programs.is_empty() {
            return Ok(());
        }

        for (name, text) in PROGRAM_TEXTS {
            match parse(text.trim(), Base::Binary) {
                Ok(definition) => programs.push(Program {
                    name: name.to_string(),
                    definition: Arc::new(definition),
                }),
                Err(e) => warn!("Failed to decode built-in machine '{name}': {e}"),
            }
        }

        Ok(())
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, GoedelError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| GoedelError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| GoedelError::ProgramNotFound(format!("index {index}")))
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, GoedelError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| GoedelError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|program| program.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| GoedelError::ProgramNotFound(format!("'{name}'")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|program| program.name.clone())
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, GoedelError> {
        let program = Self::get_program_by_index(index)?;
        let tm = &program.definition;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            goedel: tm.goedel.to_str_radix(16),
            initial_tape: tm.initial_tape_labels().concat(),
            state_count: tm.states.len(),
            symbol_count: tm.alphabet.len(),
            transition_count: tm.transitions.len(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .enumerate()
                    .filter(|(_, program)| {
                        program.name.to_lowercase().contains(&query.to_lowercase())
                    })
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Get the binary Gödel number of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, GoedelError> {
        PROGRAM_TEXTS
            .get(index)
            .map(|(_, text)| text.trim())
            .ok_or_else(|| GoedelError::ProgramNotFound(format!("index {index}")))
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    /// The Gödel number in hexadecimal.
    pub goedel: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub symbol_count: usize,
    pub transition_count: usize,
}
