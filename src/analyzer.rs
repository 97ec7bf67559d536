//! Structural validation of a finished machine. The checks here guard the
//! invariants the lowering pipeline and the simulator both rely on; any
//! failure points at a bug in whatever constructed the machine, not at the
//! source program.

use crate::machine::Machine;
use crate::types::{State, Symbol, TurcError, WILDCARD};

/// A structural defect found in a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// A designated state (start, accept, reject) is not in the state set.
    MissingDesignatedState(State),
    /// The transition table has a row for an unregistered state.
    UnknownSourceState(State),
    /// A transition reads or writes a symbol outside the tape alphabet.
    UnknownSymbol(Symbol),
    /// A transition targets an unregistered state.
    UnknownTargetState(State),
    /// Accept or reject has outgoing transitions.
    HaltStateHasTransitions(State),
}

impl From<AnalysisError> for TurcError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::MissingDesignatedState(s) => {
                TurcError::Validation(format!("designated state '{}' not in state set", s))
            }
            AnalysisError::UnknownSourceState(s) => {
                TurcError::Validation(format!("delta references unknown state '{}'", s))
            }
            AnalysisError::UnknownSymbol(c) => {
                TurcError::Validation(format!("delta references unknown symbol '{}'", c))
            }
            AnalysisError::UnknownTargetState(s) => {
                TurcError::Validation(format!("transition targets unknown state '{}'", s))
            }
            AnalysisError::HaltStateHasTransitions(s) => {
                TurcError::Validation(format!("halting state '{}' has outgoing transitions", s))
            }
        }
    }
}

/// Checks every structural invariant of `machine`, returning the first
/// violation found. Pure: the machine is never modified.
pub fn analyze(machine: &Machine) -> Result<(), AnalysisError> {
    check_designated_states(machine)?;
    check_delta(machine)?;
    check_halting_sinks(machine)?;
    Ok(())
}

/// Checks that the three designated states (start, accept, reject) are all
/// registered in the machine's state set.
///
/// # Arguments
///
/// * `machine` - A reference to the `Machine` to check.
///
/// # Returns
///
/// * `Ok(())` if every designated state is registered.
/// * `Err(AnalysisError::MissingDesignatedState)` for the first one missing.
fn check_designated_states(machine: &Machine) -> Result<(), AnalysisError> {
    for state in [&machine.start, &machine.accept, &machine.reject] {
        if !machine.states.contains(state) {
            return Err(AnalysisError::MissingDesignatedState(state.clone()));
        }
    }
    Ok(())
}

/// Checks every transition table entry: the source state and target state
/// must be registered, and the read and write symbols must belong to the
/// tape alphabet. The wildcard is exempt on both sides, since hand-written
/// machines may use it without declaring it.
///
/// # Arguments
///
/// * `machine` - A reference to the `Machine` to check.
///
/// # Returns
///
/// * `Ok(())` if every entry is closed over the state set and tape alphabet.
/// * `Err(AnalysisError::UnknownSourceState)`, `Err(AnalysisError::UnknownSymbol)`,
///   or `Err(AnalysisError::UnknownTargetState)` for the first dangling
///   reference found.
fn check_delta(machine: &Machine) -> Result<(), AnalysisError> {
    for (state, row) in &machine.delta {
        if !machine.states.contains(state) {
            return Err(AnalysisError::UnknownSourceState(state.clone()));
        }
        for (&read, transition) in row {
            if read != WILDCARD && !machine.tape_alphabet.contains(&read) {
                return Err(AnalysisError::UnknownSymbol(read));
            }
            if transition.write != WILDCARD && !machine.tape_alphabet.contains(&transition.write) {
                return Err(AnalysisError::UnknownSymbol(transition.write));
            }
            if !machine.states.contains(&transition.next) {
                return Err(AnalysisError::UnknownTargetState(transition.next.clone()));
            }
        }
    }
    Ok(())
}

/// Checks that accept and reject are genuine halting sinks: neither may
/// carry outgoing transitions, or a run could continue past a halt.
///
/// # Arguments
///
/// * `machine` - A reference to the `Machine` to check.
///
/// # Returns
///
/// * `Ok(())` if both sinks are outgoing-free.
/// * `Err(AnalysisError::HaltStateHasTransitions)` naming the offending sink.
fn check_halting_sinks(machine: &Machine) -> Result<(), AnalysisError> {
    for sink in [&machine.accept, &machine.reject] {
        if machine.delta.get(sink).is_some_and(|row| !row.is_empty()) {
            return Err(AnalysisError::HaltStateHasTransitions(sink.clone()));
        }
    }
    Ok(())
}
