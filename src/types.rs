//! Core data types shared by the whole crate: tape symbols, head directions,
//! transitions, run results, and the error types surfaced to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::Rule;

/// The blank tape symbol.
pub const BLANK: Symbol = '_';
/// Read-side wildcard: matches any symbol when no exact entry exists.
/// On the write side it means "preserve the symbol that was read".
/// The code generator never emits it; the simulator supports it for
/// hand-written machines.
pub const WILDCARD: Symbol = '?';
/// Default simulator step budget.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// A tape symbol is a single ASCII character.
pub type Symbol = char;

/// States are opaque identifiers; the string names exist for debuggability
/// and for the YAML output. Equality is the only operation the core needs.
pub type State = String;

/// A head movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left (clamped at cell 0).
    Left,
    /// Move the head one cell to the right.
    Right,
    /// Keep the head where it is.
    Stay,
}

/// One entry of the transition table: on reading `read`, write `write`,
/// move `dir`, and continue in `next`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub read: Symbol,
    pub write: Symbol,
    pub dir: Direction,
    pub next: State,
}

/// Outcome of a full simulator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Whether the machine halted in the accept state.
    pub accepted: bool,
    /// Number of transitions taken.
    pub steps: usize,
    /// Tape contents at the end, with leading and trailing blanks trimmed.
    pub final_tape: String,
    /// True when the step budget ran out before the machine halted.
    pub hit_limit: bool,
}

/// A snapshot of the simulator between steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tape: Vec<Symbol>,
    pub head: usize,
    pub state: State,
}

/// Errors raised while lowering a source program to a machine. These are the
/// only user-visible failures: they are reported before any machine exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("unsupported assignment to '{0}': only 'x = x + y' is compiled")]
    UnsupportedAssignment(String),
    #[error("unsupported initializer for '{0}': expected a literal, a variable, or count(c)")]
    UnsupportedInitializer(String),
    #[error("for loop must start at literal 1")]
    ForLoopStart,
    #[error("for loop end must be a variable")]
    ForLoopEnd,
    #[error("for loop variable '{0}' is already declared")]
    ForLoopVarRedeclared(String),
    #[error("unsupported condition: expected 'count(c) == v' or 'x == y'")]
    UnsupportedCondition,
    #[error("break outside of loop")]
    BreakOutsideLoop,
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),
}

/// Errors surfaced by the crate's public entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TurcError {
    /// The source program did not match the grammar.
    #[error("parse error: {0}")]
    Parse(#[from] Box<pest::error::Error<Rule>>),
    /// A statement or expression could not be lowered.
    #[error("lowering error: {0}")]
    Lowering(#[from] LoweringError),
    /// A finished machine violates a structural invariant. This indicates a
    /// compiler bug rather than a user error.
    #[error("invalid machine: {0}")]
    Validation(String),
    /// A source file could not be read.
    #[error("file error: {0}")]
    File(String),
}
