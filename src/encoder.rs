//! Emits a finished machine as a YAML document for the external simulator.
//!
//! The format is a fixed interoperation contract and must stay byte-stable:
//! keys `states`, `input_alphabet`, `tape_alphabet_extra` (omitted when
//! empty), the three designated states, and `delta` as a nested mapping
//! from state to read-symbol to `[next_state, write_symbol, direction]`.
//! The halting sinks are omitted from `delta`. Ordered sets and maps make
//! the output deterministic.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::machine::Machine;
use crate::types::{Direction, Symbol, BLANK, WILDCARD};

/// Renders `machine` as YAML.
pub fn encode(machine: &Machine) -> String {
    let mut out = String::new();

    let states = machine
        .states
        .iter()
        .map(|s| escape(s))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "states: [{}]", states);

    let input = machine
        .input_alphabet
        .iter()
        .map(|&s| symbol_to_str(s))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "input_alphabet: [{}]", input);

    // Tape symbols beyond the input alphabet and the blank.
    let extra: BTreeSet<Symbol> = machine
        .tape_alphabet
        .iter()
        .copied()
        .filter(|s| *s != BLANK && !machine.input_alphabet.contains(s))
        .collect();
    if !extra.is_empty() {
        let extra = extra
            .iter()
            .map(|&s| symbol_to_str(s))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(out, "tape_alphabet_extra: [{}]", extra);
    }

    let _ = writeln!(out, "start_state: {}", escape(&machine.start));
    let _ = writeln!(out, "accept_state: {}", escape(&machine.accept));
    let _ = writeln!(out, "reject_state: {}", escape(&machine.reject));

    let _ = writeln!(out, "\ndelta:");
    for (state, row) in &machine.delta {
        if *state == machine.accept || *state == machine.reject {
            continue;
        }
        let _ = writeln!(out, "  {}:", escape(state));
        for (&read, transition) in row {
            let _ = writeln!(
                out,
                "    {}: [{}, {}, {}]",
                symbol_to_str(read),
                escape(&transition.next),
                symbol_to_str(transition.write),
                dir_to_str(transition.dir),
            );
        }
    }

    out
}

fn dir_to_str(dir: Direction) -> &'static str {
    match dir {
        Direction::Left => "L",
        Direction::Right => "R",
        Direction::Stay => "S",
    }
}

fn symbol_to_str(symbol: Symbol) -> String {
    if symbol == BLANK {
        return "_".to_string();
    }
    if symbol == WILDCARD {
        return "'?'".to_string();
    }
    escape(&symbol.to_string())
}

/// Single-quotes a scalar when it contains a character YAML would
/// otherwise interpret.
fn escape(text: &str) -> String {
    let needs_quote = text
        .chars()
        .any(|c| ":#'\"[]{}!|>*&".contains(c));
    if needs_quote {
        format!("'{}'", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_machine() -> Machine {
        let mut m = Machine {
            start: "q0".to_string(),
            accept: "qA".to_string(),
            reject: "qR".to_string(),
            ..Machine::default()
        };
        m.input_alphabet.extend(['a', 'b']);
        m.add_transition("q0", 'a', 'X', Direction::Right, "qA");
        m.add_transition("q0", BLANK, BLANK, Direction::Stay, "qR");
        m.finalize();
        m
    }

    #[test]
    fn test_encode_small_machine() {
        let yaml = encode(&small_machine());
        let expected = "\
states: [q0, qA, qR]
input_alphabet: [a, b]
tape_alphabet_extra: [X]
start_state: q0
accept_state: qA
reject_state: qR

delta:
  q0:
    _: [qR, _, S]
    a: [qA, X, R]
";
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_encode_quotes_special_symbols() {
        let mut m = small_machine();
        m.add_transition("q0", '>', '>', Direction::Right, "q1");
        m.add_transition("q1", '#', '#', Direction::Stay, "qA");
        let yaml = encode(&m);
        assert!(yaml.contains("'>': [q1, '>', R]"));
        assert!(yaml.contains("'#': [qA, '#', S]"));
        assert!(yaml.contains("'>'"));
    }

    #[test]
    fn test_encode_wildcard_symbol() {
        let mut m = small_machine();
        m.add_transition("q0", WILDCARD, WILDCARD, Direction::Stay, "qR");
        let yaml = encode(&m);
        assert!(yaml.contains("'?': [qR, '?', S]"));
    }

    #[test]
    fn test_encode_omits_halting_sinks_from_delta() {
        let yaml = encode(&small_machine());
        assert!(!yaml.contains("  qA:"));
        assert!(!yaml.contains("  qR:"));
    }

    #[test]
    fn test_encode_omits_empty_extra_alphabet() {
        let mut m = Machine {
            start: "q0".to_string(),
            accept: "qA".to_string(),
            reject: "qR".to_string(),
            ..Machine::default()
        };
        m.input_alphabet.insert('a');
        m.add_transition("q0", 'a', 'a', Direction::Stay, "qA");
        m.finalize();
        let yaml = encode(&m);
        assert!(!yaml.contains("tape_alphabet_extra"));
    }
}
