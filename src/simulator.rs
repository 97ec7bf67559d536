//! Executes a machine against an input string, either in one shot under a
//! step budget or step by step for inspection.
//!
//! The tape is left-bounded (Sipser model): cells are indexed 0, 1, 2, ...,
//! and a Left move from cell 0 leaves the head at cell 0. Generated code
//! relies on this to make every leftward scan that stops on the sentinel
//! terminate.

use crate::machine::Machine;
use crate::types::{Config, Direction, RunResult, State, Symbol, BLANK, DEFAULT_STEP_LIMIT, WILDCARD};

/// A simulator for one machine. Reusable: [`Simulator::run`] resets all
/// execution state, so consecutive runs are independent.
pub struct Simulator<'a> {
    machine: &'a Machine,
    max_steps: usize,
    tape: Vec<Symbol>,
    head: usize,
    state: State,
    steps: usize,
    halted: bool,
}

impl<'a> Simulator<'a> {
    /// Creates a simulator with the default step budget.
    pub fn new(machine: &'a Machine) -> Self {
        Self::with_limit(machine, DEFAULT_STEP_LIMIT)
    }

    /// Creates a simulator with an explicit step budget.
    pub fn with_limit(machine: &'a Machine, max_steps: usize) -> Self {
        Self {
            machine,
            max_steps,
            tape: Vec::new(),
            head: 0,
            state: machine.start.clone(),
            steps: 0,
            halted: false,
        }
    }

    /// Runs the machine on `input` until it halts or the step budget is
    /// exhausted.
    ///
    /// Every failure mode is expressed in the result: a missing transition
    /// is an implicit reject, a timeout sets `hit_limit`. Nothing is thrown.
    pub fn run(&mut self, input: &str) -> RunResult {
        self.reset(input);

        while !self.halted && self.steps < self.max_steps {
            self.step();
        }

        RunResult {
            accepted: self.accepted(),
            steps: self.steps,
            final_tape: self.trimmed_tape(),
            hit_limit: self.steps >= self.max_steps && !self.halted,
        }
    }

    /// Loads `input` onto a fresh tape: cell 0 gets the first character, the
    /// tape grows rightward with blanks on demand. An empty input starts as
    /// a single blank cell. The head returns to cell 0 in the start state.
    pub fn reset(&mut self, input: &str) {
        self.tape = input.chars().collect();
        if self.tape.is_empty() {
            self.tape.push(BLANK);
        }
        self.head = 0;
        self.state = self.machine.start.clone();
        self.steps = 0;
        self.halted = false;
    }

    /// Performs one transition. Returns false once the machine has halted.
    ///
    /// A missing `(state, read)` entry halts in the reject state without
    /// counting a step. An exact read entry takes priority over a wildcard
    /// entry; a wildcard write preserves the symbol that was read.
    pub fn step(&mut self) -> bool {
        if self.halted {
            return false;
        }
        if self.state == self.machine.accept || self.state == self.machine.reject {
            self.halted = true;
            return false;
        }

        let current = self.tape.get(self.head).copied().unwrap_or(BLANK);

        let transition = self
            .machine
            .delta
            .get(&self.state)
            .and_then(|row| row.get(&current).or_else(|| row.get(&WILDCARD)));

        let transition = match transition {
            Some(t) => t.clone(),
            None => {
                // Implicit reject.
                self.state = self.machine.reject.clone();
                self.halted = true;
                return false;
            }
        };

        while self.head >= self.tape.len() {
            self.tape.push(BLANK);
        }

        let write = if transition.write == WILDCARD {
            current
        } else {
            transition.write
        };
        self.tape[self.head] = write;

        match transition.dir {
            Direction::Left => self.head = self.head.saturating_sub(1),
            Direction::Right => {
                self.head += 1;
                if self.head >= self.tape.len() {
                    self.tape.push(BLANK);
                }
            }
            Direction::Stay => {}
        }

        self.state = transition.next;
        self.steps += 1;

        if self.state == self.machine.accept || self.state == self.machine.reject {
            self.halted = true;
        }

        !self.halted
    }

    /// True once the machine has reached accept or reject (or an implicit
    /// reject).
    pub fn halted(&self) -> bool {
        self.halted
    }

    /// True when the machine has halted in the accept state.
    pub fn accepted(&self) -> bool {
        self.halted && self.state == self.machine.accept
    }

    /// Number of transitions taken since the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// A snapshot of the current tape, head position, and state.
    pub fn config(&self) -> Config {
        Config {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state.clone(),
        }
    }

    fn trimmed_tape(&self) -> String {
        let start = self.tape.iter().position(|&c| c != BLANK);
        let end = self.tape.iter().rposition(|&c| c != BLANK);
        match (start, end) {
            (Some(s), Some(e)) => self.tape[s..=e].iter().collect(),
            _ => String::new(),
        }
    }
}
