//! The lowering driver: owns the machine under construction, the fresh-state
//! counter, the variable table, and the break-target stack, and walks a
//! parsed program into a finished transition table.
//!
//! Statement lowering lives in [`crate::stmt`], the reusable sub-machine
//! templates in [`crate::emit`]. Everything shares one convention: a
//! lowering function takes an entry state with no outgoing transitions,
//! appends transitions, and returns an exit state with no outgoing
//! transitions. On entering a statement's exit state the head is back at
//! cell 1 and every transient mark has been restored; only the raw
//! head-operation statements and the halting statements are exempt.

use std::collections::{BTreeMap, HashMap};

use crate::ast::{Expr, Program};
use crate::layout::{mark_of, LEFT_END, MARKED, ONE, SEP};
use crate::machine::Machine;
use crate::stmt;
use crate::types::{Direction, LoweringError, State, Symbol, TurcError, BLANK};

/// A declared variable: which region of the tape holds its unary tally.
#[derive(Debug, Clone, Copy)]
pub struct VarInfo {
    pub region: usize,
}

/// Compilation context. Lives for the duration of one [`compile`] call.
pub struct Compiler {
    pub(crate) tm: Machine,
    counter: usize,
    vars: HashMap<String, VarInfo>,
    next_region: usize,
    pub(crate) break_targets: Vec<State>,
}

/// Compiles a program to a deterministic single-tape machine.
///
/// The returned machine is finalised but not validated; callers that want
/// the structural guarantee run [`Machine::validate`] themselves.
pub fn compile(program: &Program) -> Result<Machine, TurcError> {
    Compiler::new().compile(program)
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            tm: Machine::default(),
            counter: 0,
            vars: HashMap::new(),
            next_region: 0,
            break_targets: Vec::new(),
        }
    }

    fn compile(mut self, program: &Program) -> Result<Machine, TurcError> {
        self.setup_alphabet(program);

        self.tm.start = self.fresh("start");
        self.tm.accept = "qA".to_string();
        self.tm.reject = "qR".to_string();
        self.tm.states.insert(self.tm.accept.clone());
        self.tm.states.insert(self.tm.reject.clone());

        let start = self.tm.start.clone();
        let at_input = self.emit_preamble(&start);
        let last = stmt::lower_stmts(&mut self, &program.body, at_input)?;

        // Whatever falls off the end of the program accepts.
        if !self.is_sink(&last) {
            let accept = self.tm.accept.clone();
            self.wire(&last, &accept);
        }

        self.tm.finalize();
        Ok(self.tm)
    }

    /// Seeds the tape alphabet: the input symbols, the layout symbols, the
    /// uppercase mark of every lowercase input letter, and any extra markers
    /// the program declares.
    fn setup_alphabet(&mut self, program: &Program) {
        self.tm.input_alphabet = program.input_alphabet.clone();
        self.tm.tape_alphabet = program.input_alphabet.clone();
        self.tm
            .tape_alphabet
            .extend([BLANK, SEP, ONE, MARKED, LEFT_END]);
        for &s in &program.input_alphabet {
            if s.is_ascii_lowercase() {
                self.tm.tape_alphabet.insert(mark_of(s));
            }
        }
        self.tm.tape_alphabet.extend(program.markers.iter().copied());
    }

    /// Returns a fresh state name. The monotone counter is the only
    /// compiler-wide mutable scalar; names matter only for debugging and
    /// the YAML output.
    pub(crate) fn fresh(&mut self, hint: &str) -> State {
        let state = format!("{}{}", hint, self.counter);
        self.counter += 1;
        state
    }

    /// The tape alphabet as a snapshot, for iterating while mutating delta.
    pub(crate) fn alphabet(&self) -> Vec<Symbol> {
        self.tm.tape_alphabet.iter().copied().collect()
    }

    pub(crate) fn add(
        &mut self,
        from: &State,
        read: Symbol,
        write: Symbol,
        dir: Direction,
        to: &State,
    ) {
        self.tm.add_transition(from, read, write, dir, to);
    }

    /// Wires every symbol `from` does not yet handle to `to` (write-same,
    /// Stay). Used for joins, loop-backs, and completion.
    pub(crate) fn wire(&mut self, from: &State, to: &State) {
        for s in self.alphabet() {
            if !self.tm.has_transition(from, s) {
                self.add(from, s, s, Direction::Stay, to);
            }
        }
    }

    /// True for states no statement may be lowered after: the halting sinks
    /// and any live break target.
    pub(crate) fn is_sink(&self, state: &State) -> bool {
        *state == self.tm.accept
            || *state == self.tm.reject
            || self.break_targets.contains(state)
    }

    pub(crate) fn accept_state(&self) -> State {
        self.tm.accept.clone()
    }

    pub(crate) fn reject_state(&self) -> State {
        self.tm.reject.clone()
    }

    /// Declares `name` if new; either way returns its region.
    pub(crate) fn declare_var(&mut self, name: &str) -> VarInfo {
        if let Some(&info) = self.vars.get(name) {
            return info;
        }
        let info = VarInfo {
            region: self.next_region,
        };
        self.next_region += 1;
        self.vars.insert(name.to_string(), info);
        info
    }

    pub(crate) fn is_declared(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Looks up a declared variable. Referencing an undeclared name is a
    /// lowering error: no region on the tape could ever hold it.
    pub(crate) fn lookup_var(&self, name: &str) -> Result<VarInfo, LoweringError> {
        self.vars
            .get(name)
            .copied()
            .ok_or_else(|| LoweringError::UnknownVariable(name.to_string()))
    }

    /// Emits the preamble: shift the input one cell right and write the
    /// sentinel at cell 0. One carry state per non-blank, non-sentinel tape
    /// symbol; the displaced symbol rides in the state. Exit: head on
    /// cell 1, tape `>[input]`.
    fn emit_preamble(&mut self, start: &State) -> State {
        let at_input = self.fresh("pre_done");
        let rewind = self.fresh("pre_rw");

        let mut carries: BTreeMap<Symbol, State> = BTreeMap::new();
        for s in self.alphabet() {
            if s != BLANK && s != LEFT_END {
                let carry = self.fresh("pre_c");
                carries.insert(s, carry);
            }
        }

        for s in self.alphabet() {
            if s == BLANK {
                // Empty input: the sentinel is all there is to write.
                self.add(start, BLANK, LEFT_END, Direction::Right, &at_input);
            } else if s != LEFT_END {
                let carry = carries[&s].clone();
                self.add(start, s, LEFT_END, Direction::Right, &carry);
            }
        }

        for (carried, carry) in carries.clone() {
            for next in self.alphabet() {
                if next == BLANK {
                    self.add(&carry, BLANK, carried, Direction::Left, &rewind);
                } else if next != LEFT_END {
                    let next_carry = carries[&next].clone();
                    self.add(&carry, next, carried, Direction::Right, &next_carry);
                }
            }
        }

        for s in self.alphabet() {
            if s == LEFT_END {
                self.add(&rewind, s, s, Direction::Right, &at_input);
            } else {
                self.add(&rewind, s, s, Direction::Left, &rewind);
            }
        }

        at_input
    }

    /// Evaluates an initialiser expression into `dest`, which must be the
    /// tail region of the tape (every `let` arranges exactly that).
    pub(crate) fn compile_expr(
        &mut self,
        expr: &Expr,
        dest: &str,
        entry: State,
    ) -> Result<State, TurcError> {
        match expr {
            Expr::Int(value) => Ok(self.emit_literal(entry, *value)),
            Expr::Count(symbol) => Ok(self.emit_count(entry, *symbol)),
            Expr::Var(name) => {
                let src = self.lookup_var(name)?;
                Ok(self.emit_copy_to_tail(entry, src.region))
            }
            Expr::Bin { .. } => {
                Err(LoweringError::UnsupportedInitializer(dest.to_string()).into())
            }
        }
    }

    /// Writes `value` many `1`s at the tape tail: one scan-to-blank-and-
    /// write state per unit. Zero is an empty region, nothing to emit.
    fn emit_literal(&mut self, entry: State, value: u32) -> State {
        let mut current = entry;
        for _ in 0..value {
            let next = self.fresh("lit");
            for s in self.alphabet() {
                if s == BLANK {
                    self.add(&current, s, ONE, Direction::Right, &next);
                } else {
                    self.add(&current, s, s, Direction::Right, &current);
                }
            }
            current = next;
        }
        current
    }

    /// Tallies occurrences of `symbol` in the input into the tail region:
    /// mark an occurrence, walk to the tape end, write a `1`, rewind,
    /// repeat. A final sweep restores the input; later counts of the same
    /// symbol must see it unchanged. Entry: cell 1. Exit: on the `#` or
    /// blank that ends the input.
    fn emit_count(&mut self, entry: State, symbol: Symbol) -> State {
        let marked = mark_of(symbol);
        let write = self.fresh("cnt_write");
        let back = self.fresh("cnt_back");
        let done = self.fresh("cnt_done");

        // The entry state is the scan loop itself.
        for s in self.alphabet() {
            if s == symbol {
                self.add(&entry, s, marked, Direction::Right, &write);
            } else if s == SEP || s == BLANK {
                self.add(&entry, s, s, Direction::Stay, &done);
            } else {
                self.add(&entry, s, s, Direction::Right, &entry);
            }
        }

        for s in self.alphabet() {
            if s == BLANK {
                self.add(&write, s, ONE, Direction::Left, &back);
            } else {
                self.add(&write, s, s, Direction::Right, &write);
            }
        }

        for s in self.alphabet() {
            if s == LEFT_END {
                self.add(&back, s, s, Direction::Right, &entry);
            } else {
                self.add(&back, s, s, Direction::Left, &back);
            }
        }

        self.emit_restore_input(done, symbol)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}
