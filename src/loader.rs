//! This module provides the `AutomatonLoader` struct, responsible for loading automata from
//! FLACI JSON files and strings, and Gödel numbers stored as text files.

use crate::automaton::Automaton;
use crate::flaci::Flaci;
use crate::parser::parse;
use crate::types::{Base, GoedelError, TuringMachineDefinition, MAX_PROGRAM_SIZE};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// `AutomatonLoader` is a utility struct for loading Turing Machine descriptions.
/// It loads FLACI exports from individual files or strings, discovers all `.json` files
/// within a directory, and reads Gödel numbers from text files.
pub struct AutomatonLoader;

impl AutomatonLoader {
    /// Loads a single automaton from a FLACI JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.json` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is successfully read and converted.
    /// * `Err(GoedelError::FileError)` if the file cannot be read or is too large.
    /// * `Err(GoedelError::FormatError)` if the content is not a FLACI Turing Machine.
    pub fn load_automaton(path: &Path) -> Result<Automaton, GoedelError> {
        let content = read_limited(path)?;
        Self::load_automaton_from_string(&content)
    }

    /// Loads a single automaton from FLACI JSON content.
    pub fn load_automaton_from_string(content: &str) -> Result<Automaton, GoedelError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(GoedelError::FileError(format!(
                "Automaton exceeds {MAX_PROGRAM_SIZE} bytes"
            )));
        }

        Automaton::try_from(Flaci::from_json(content)?)
    }

    /// Loads a Gödel number written in `base` from a text file and decodes it.
    ///
    /// Surrounding whitespace is ignored.
    pub fn load_definition(path: &Path, base: Base) -> Result<TuringMachineDefinition, GoedelError> {
        let content = read_limited(path)?;
        parse(content.trim(), base)
    }

    /// Loads every FLACI file (`.json` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Automaton), GoedelError>>` - one entry per `.json` file, holding
    ///   either its path and automaton or the error that occurred while loading it.
    pub fn load_automata(directory: &Path) -> Vec<Result<(PathBuf, Automaton), GoedelError>> {
        if !directory.exists() {
            return vec![Err(GoedelError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(GoedelError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(GoedelError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                debug!("loading automaton from {}", path.display());
                match Self::load_automaton(&path) {
                    Ok(automaton) => Some(Ok((path, automaton))),
                    Err(e) => Some(Err(GoedelError::FileError(format!(
                        "Failed to load automaton from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

/// Reads a file to a string, refusing files larger than [`MAX_PROGRAM_SIZE`].
fn read_limited(path: &Path) -> Result<String, GoedelError> {
    let error = |e: std::io::Error| {
        GoedelError::FileError(format!("Failed to read file {}: {}", path.display(), e))
    };

    let size = fs::metadata(path).map_err(error)?.len();
    if size > MAX_PROGRAM_SIZE as u64 {
        return Err(GoedelError::FileError(format!(
            "File {} exceeds {} bytes",
            path.display(),
            MAX_PROGRAM_SIZE
        )));
    }

    fs::read_to_string(path).map_err(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::export;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const SHIFT_BINARY: &str = "10101000101001101001010010011000101000010100110001001010010011000010100001010011000010010000100100110000100010010001001111001";

    fn shift_json() -> String {
        let tm = parse(SHIFT_BINARY, Base::Binary).unwrap();
        Flaci::from_definition(&tm).to_json().unwrap()
    }

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_automaton() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("shift.json");
        write_file(&file_path, &shift_json());

        let automaton = AutomatonLoader::load_automaton(&file_path).unwrap();
        assert_eq!(automaton.states.len(), 4);
        assert_eq!(automaton.input, vec!["1", "0", "0", "1"]);

        let number = export(&automaton).unwrap();
        assert_eq!(number.goedel.to_str_radix(2), SHIFT_BINARY);
    }

    #[test]
    fn test_load_invalid_automaton() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.json");
        write_file(&file_path, "This is not a valid automaton");

        let result = AutomatonLoader::load_automaton(&file_path);
        assert!(matches!(result, Err(GoedelError::FormatError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = AutomatonLoader::load_automaton(&dir.path().join("missing.json"));

        assert!(matches!(result, Err(GoedelError::FileError(_))));
    }

    #[test]
    fn test_load_oversized_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("huge.json");
        write_file(&file_path, &" ".repeat(MAX_PROGRAM_SIZE + 1));

        let result = AutomatonLoader::load_automaton(&file_path);
        assert!(matches!(result, Err(GoedelError::FileError(_))));

        let result = AutomatonLoader::load_automaton_from_string(&" ".repeat(MAX_PROGRAM_SIZE + 1));
        assert!(matches!(result, Err(GoedelError::FileError(_))));
    }

    #[test]
    fn test_load_definition() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("shift.goedel");
        write_file(&file_path, &format!("{SHIFT_BINARY}\n"));

        let tm = AutomatonLoader::load_definition(&file_path, Base::Binary).unwrap();
        assert_eq!(tm.transitions.len(), 7);

        write_file(&file_path, "12");
        assert_eq!(
            AutomatonLoader::load_definition(&file_path, Base::Binary),
            Err(GoedelError::InvalidDigitForBase { base: Base::Binary })
        );
    }

    #[test]
    fn test_load_automata_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.json"), &shift_json());
        write_file(&dir.path().join("invalid.json"), "{}");
        // Not a .json file, ignored.
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let results = AutomatonLoader::load_automata(dir.path());

        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_automata_missing_directory() {
        let dir = tempdir().unwrap();
        let results = AutomatonLoader::load_automata(&dir.path().join("nowhere"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
