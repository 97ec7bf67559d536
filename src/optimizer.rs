//! Optional post-passes over a finished machine. Both preserve the
//! accept/reject behaviour exactly: dead-state elimination removes states
//! the start state can never reach, and equivalent-state merging collapses
//! states with identical transition tables.

use std::collections::BTreeSet;

use crate::machine::Machine;
use crate::types::State;

/// Which passes to run.
#[derive(Debug, Clone)]
pub struct OptConfig {
    pub eliminate_dead_states: bool,
    pub merge_equivalent_states: bool,
}

impl Default for OptConfig {
    fn default() -> Self {
        Self {
            eliminate_dead_states: true,
            merge_equivalent_states: true,
        }
    }
}

/// Runs the configured passes and re-finalises the machine.
pub fn optimize(machine: &mut Machine, config: &OptConfig) {
    if config.eliminate_dead_states {
        eliminate_dead_states(machine);
    }
    if config.merge_equivalent_states {
        merge_equivalent_states(machine);
    }
    machine.finalize();
}

/// Removes states unreachable from the start state. The halting sinks are
/// always kept. Returns the number of states removed.
pub fn eliminate_dead_states(machine: &mut Machine) -> usize {
    let mut reachable = BTreeSet::new();
    let mut queue = vec![machine.start.clone()];
    reachable.insert(machine.start.clone());

    while let Some(state) = queue.pop() {
        if let Some(row) = machine.delta.get(&state) {
            for transition in row.values() {
                if reachable.insert(transition.next.clone()) {
                    queue.push(transition.next.clone());
                }
            }
        }
    }

    reachable.insert(machine.accept.clone());
    reachable.insert(machine.reject.clone());

    let dead: Vec<State> = machine
        .states
        .iter()
        .filter(|s| !reachable.contains(*s))
        .cloned()
        .collect();

    for state in &dead {
        machine.states.remove(state);
        machine.delta.remove(state);
    }
    dead.len()
}

/// Collapses pairs of states with identical transition tables until a
/// fixpoint. Start, accept, and reject are never merged away. Returns the
/// number of merges performed.
pub fn merge_equivalent_states(machine: &mut Machine) -> usize {
    let mut merged = 0;

    loop {
        let candidates: Vec<State> = machine
            .states
            .iter()
            .filter(|s| {
                **s != machine.start && **s != machine.accept && **s != machine.reject
            })
            .filter(|s| machine.delta.contains_key(*s))
            .cloned()
            .collect();

        let mut found: Option<(State, State)> = None;
        'search: for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                if machine.delta[a] == machine.delta[b] {
                    found = Some((a.clone(), b.clone()));
                    break 'search;
                }
            }
        }

        let Some((keep, drop)) = found else {
            break;
        };

        for row in machine.delta.values_mut() {
            for transition in row.values_mut() {
                if transition.next == drop {
                    transition.next = keep.clone();
                }
            }
        }
        machine.delta.remove(&drop);
        machine.states.remove(&drop);
        merged += 1;
    }

    merged
}
