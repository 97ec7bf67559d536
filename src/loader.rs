//! Loading `.tmc` decision programs from files, strings, and directories.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ast::Program;
use crate::parser::parse;
use crate::types::TurcError;

/// Utility for reading `.tmc` sources into parsed [`Program`]s.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads and parses a single `.tmc` file.
    pub fn load_program(path: &Path) -> Result<Program, TurcError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TurcError::File(format!("failed to read {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Parses a program from in-memory source text.
    pub fn load_program_from_string(content: &str) -> Result<Program, TurcError> {
        parse(content)
    }

    /// Loads every `.tmc` file in `directory`. Non-`.tmc` entries and
    /// subdirectories are skipped; each file yields its own result so one
    /// bad program does not hide the others.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TurcError>> {
        if !directory.exists() {
            return vec![Err(TurcError::File(format!(
                "directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TurcError::File(format!(
                    "failed to read directory {}: {}",
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
                        return Some(Err(TurcError::File(format!(
                            "failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();
                if path.is_dir() || path.extension().is_none_or(|ext| ext != "tmc") {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(program) => Some(Ok((path, program))),
                    Err(e) => Some(Err(e)),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("anbn.tmc");

        let content = "alphabet input: [a, b]\nn = count(a)\nreturn count(b) == n";
        let mut file = File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.input_alphabet.len(), 2);
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ProgramLoader::load_program(Path::new("/nonexistent/x.tmc"));
        assert!(matches!(result, Err(TurcError::File(_))));
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("broken.tmc");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(b"this is not a program!").unwrap();

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TurcError::Parse(_))));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        let valid = dir.path().join("valid.tmc");
        File::create(&valid)
            .unwrap()
            .write_all(b"alphabet input: [a]\naccept")
            .unwrap();

        let invalid = dir.path().join("invalid.tmc");
        File::create(&invalid)
            .unwrap()
            .write_all(b"???")
            .unwrap();

        let ignored = dir.path().join("notes.txt");
        File::create(&ignored)
            .unwrap()
            .write_all(b"not a program")
            .unwrap();

        let results = ProgramLoader::load_programs(dir.path());
        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let results = ProgramLoader::load_programs(Path::new("/nonexistent-dir"));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
