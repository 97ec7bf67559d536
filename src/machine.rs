//! The deterministic single-tape machine model: state and alphabet sets, the
//! transition table, the three designated states, and the finalisation step
//! that closes a machine under its structural invariants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::analyzer;
use crate::types::{Direction, State, Symbol, Transition, TurcError, BLANK};

/// A deterministic single-tape Turing machine.
///
/// The transition table maps a state to a map from read-symbol to
/// [`Transition`]; ordered maps keep every walk over the machine (and the
/// emitted YAML) deterministic. Accept and reject are halting sinks and
/// never carry outgoing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub states: BTreeSet<State>,
    /// Symbols that may appear in an input string. Never contains the blank.
    pub input_alphabet: BTreeSet<Symbol>,
    /// Symbols that may appear on the tape. Always contains the blank after
    /// finalisation.
    pub tape_alphabet: BTreeSet<Symbol>,
    pub start: State,
    pub accept: State,
    pub reject: State,
    pub delta: BTreeMap<State, BTreeMap<Symbol, Transition>>,
}

impl Machine {
    /// Adds a transition, registering both endpoint states and both symbols
    /// as a side effect.
    ///
    /// Adding the same `(from, read)` pair twice overwrites the earlier
    /// entry. Lowering uses this for default-then-specialise wiring, but no
    /// construct depends on the overwrite for its semantics.
    pub fn add_transition(
        &mut self,
        from: &str,
        read: Symbol,
        write: Symbol,
        dir: Direction,
        to: &str,
    ) {
        self.states.insert(from.to_string());
        self.states.insert(to.to_string());
        self.tape_alphabet.insert(read);
        self.tape_alphabet.insert(write);
        self.delta.entry(from.to_string()).or_default().insert(
            read,
            Transition {
                read,
                write,
                dir,
                next: to.to_string(),
            },
        );
    }

    /// Returns true if `(state, read)` already has an entry.
    pub fn has_transition(&self, state: &str, read: Symbol) -> bool {
        self.delta
            .get(state)
            .is_some_and(|row| row.contains_key(&read))
    }

    /// Closes the machine under its invariants: the blank belongs to the
    /// tape alphabet, the input alphabet is a subset of the tape alphabet,
    /// and the three designated states are registered. Idempotent.
    pub fn finalize(&mut self) {
        self.tape_alphabet.insert(BLANK);
        for s in self.input_alphabet.clone() {
            self.tape_alphabet.insert(s);
        }
        self.states.insert(self.start.clone());
        self.states.insert(self.accept.clone());
        self.states.insert(self.reject.clone());
    }

    /// Checks the structural invariants, returning a descriptive error for
    /// the first violation found. A failure after [`Machine::finalize`]
    /// indicates a bug in whatever built the machine.
    pub fn validate(&self) -> Result<(), TurcError> {
        analyzer::analyze(self).map_err(Into::into)
    }

    /// Total number of transition entries.
    pub fn transition_count(&self) -> usize {
        self.delta.values().map(|row| row.len()).sum()
    }
}
