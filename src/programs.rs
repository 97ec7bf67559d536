//! A registry of demo decision programs embedded in the binary.

use std::sync::RwLock;

use crate::ast::Program;
use crate::parser::parse;
use crate::types::TurcError;

/// Demo sources bundled with the crate, name to `.tmc` text.
const DEMO_SOURCES: [(&str, &str); 3] = [
    ("anbn", include_str!("../demos/anbn.tmc")),
    ("triangular", include_str!("../demos/triangular.tmc")),
    ("starts-ends-with-a", include_str!("../demos/starts-ends-with-a.tmc")),
];

lazy_static::lazy_static! {
    static ref PROGRAMS: RwLock<Vec<(String, Program)>> = RwLock::new(Vec::new());
}

/// Summary of one registered demo.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub name: String,
    pub input_alphabet_size: usize,
    pub statement_count: usize,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded demos into the registry. Idempotent.
    pub fn load() -> Result<(), TurcError> {
        let mut guard = PROGRAMS
            .write()
            .map_err(|_| TurcError::File("program registry lock poisoned".to_string()))?;
        if !guard.is_empty() {
            return Ok(());
        }
        for (name, source) in DEMO_SOURCES {
            let program = parse(source)?;
            guard.push((name.to_string(), program));
        }
        Ok(())
    }

    pub fn count() -> usize {
        let _ = Self::load();
        PROGRAMS.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn names() -> Vec<String> {
        let _ = Self::load();
        PROGRAMS
            .read()
            .map(|programs| programs.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn get_by_name(name: &str) -> Result<Program, TurcError> {
        let _ = Self::load();
        PROGRAMS
            .read()
            .map_err(|_| TurcError::File("program registry lock poisoned".to_string()))?
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .ok_or_else(|| TurcError::File(format!("demo program '{}' not found", name)))
    }

    /// The original source text of a demo.
    pub fn source_by_name(name: &str) -> Option<&'static str> {
        DEMO_SOURCES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, src)| *src)
    }

    pub fn info(name: &str) -> Result<ProgramInfo, TurcError> {
        let program = Self::get_by_name(name)?;
        Ok(ProgramInfo {
            name: name.to_string(),
            input_alphabet_size: program.input_alphabet.len(),
            statement_count: program.body.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::simulator::Simulator;

    #[test]
    fn test_all_demos_parse_compile_and_validate() {
        for name in ProgramManager::names() {
            let program = ProgramManager::get_by_name(&name).unwrap();
            let machine = compile(&program)
                .unwrap_or_else(|e| panic!("demo '{}' failed to compile: {}", name, e));
            machine
                .validate()
                .unwrap_or_else(|e| panic!("demo '{}' is invalid: {}", name, e));
        }
    }

    #[test]
    fn test_demo_count_and_names() {
        assert_eq!(ProgramManager::count(), 3);
        let names = ProgramManager::names();
        assert!(names.contains(&"anbn".to_string()));
        assert!(names.contains(&"triangular".to_string()));
    }

    #[test]
    fn test_anbn_demo_runs() {
        let program = ProgramManager::get_by_name("anbn").unwrap();
        let machine = compile(&program).unwrap();
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        assert!(sim.run("abab").accepted);
        assert!(!sim.run("aab").accepted);
    }

    #[test]
    fn test_unknown_demo_is_an_error() {
        assert!(ProgramManager::get_by_name("nonexistent").is_err());
    }

    #[test]
    fn test_info() {
        let info = ProgramManager::info("anbn").unwrap();
        assert_eq!(info.name, "anbn");
        assert_eq!(info.input_alphabet_size, 2);
        assert_eq!(info.statement_count, 2);
    }
}
