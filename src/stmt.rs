//! Statement lowering: walks the program tree and composes the primitive
//! emitters into the final machine, threading an entry/exit state pair
//! through each construct.
//!
//! Exit contract: unless a statement unconditionally halts, entering its
//! exit state means the head is on cell 1 and the tape carries no transient
//! marks. The raw head-operation statements (`scan`, `write`, `left`,
//! `right`, `if <symbol>`) are the deliberate exception; their bodies run
//! with the head wherever the preceding step left it.

use crate::ast::{BinOp, Expr, Stmt};
use crate::compiler::Compiler;
use crate::layout::{mark_of, LEFT_END, MARKED, ONE, SEP};
use crate::types::{Direction, LoweringError, State, Symbol, TurcError, BLANK};

pub(crate) fn lower_stmts(
    c: &mut Compiler,
    stmts: &[Stmt],
    entry: State,
) -> Result<State, TurcError> {
    let mut current = entry;
    for stmt in stmts {
        current = lower_stmt(c, stmt, current)?;
        // A halt or a break leaves the block; whatever follows is dead and
        // must not grow transitions out of a sink.
        if c.is_sink(&current) {
            break;
        }
    }
    Ok(current)
}

pub(crate) fn lower_stmt(c: &mut Compiler, stmt: &Stmt, entry: State) -> Result<State, TurcError> {
    match stmt {
        Stmt::Let { name, init } => lower_let(c, name, init, entry),
        Stmt::Assign { name, value } => lower_assign(c, name, value, entry),
        Stmt::For {
            var,
            start,
            end,
            body,
        } => lower_for(c, var, start, end, body, entry),
        Stmt::If {
            cond,
            then_body,
            else_body,
        } => lower_if(c, cond, then_body, else_body, entry),
        Stmt::IfCurrent {
            branches,
            else_body,
        } => lower_if_current(c, branches, else_body, entry),
        Stmt::Return(expr) => lower_if(
            c,
            expr,
            std::slice::from_ref(&Stmt::Accept),
            std::slice::from_ref(&Stmt::Reject),
            entry,
        ),
        Stmt::Accept => {
            let accept = c.accept_state();
            c.wire(&entry, &accept);
            Ok(accept)
        }
        Stmt::Reject => {
            let reject = c.reject_state();
            c.wire(&entry, &reject);
            Ok(reject)
        }
        Stmt::Scan { dir, stop } => Ok(c.emit_scan(entry, *dir, stop)),
        Stmt::Write(symbol) => {
            let done = c.fresh("write_done");
            for s in c.alphabet() {
                c.add(&entry, s, *symbol, Direction::Stay, &done);
            }
            Ok(done)
        }
        Stmt::Move(dir) => {
            let done = c.fresh("move_done");
            for s in c.alphabet() {
                c.add(&entry, s, s, *dir, &done);
            }
            Ok(done)
        }
        Stmt::Loop(body) => lower_loop(c, body, entry),
        Stmt::Break => lower_break(c, entry),
        Stmt::Inc(name) => {
            let var = c.lookup_var(name)?;
            Ok(c.emit_increment(entry, var.region))
        }
        Stmt::Append { src, dst } => {
            let src = c.lookup_var(src)?;
            let dst = c.lookup_var(dst)?;
            Ok(c.emit_append(entry, src.region, dst.region))
        }
    }
}

/// `let name = expr`: scan to the first blank, plant a `#` (a new, empty
/// region at the tape tail), rewind, evaluate the initialiser into it.
fn lower_let(c: &mut Compiler, name: &str, init: &Expr, entry: State) -> Result<State, TurcError> {
    c.declare_var(name);

    let go_back = c.fresh("let_back");
    let eval = c.fresh("let_eval");

    for s in c.alphabet() {
        if s == BLANK {
            c.add(&entry, s, SEP, Direction::Left, &go_back);
        } else {
            c.add(&entry, s, s, Direction::Right, &entry);
        }
    }
    for s in c.alphabet() {
        if s == LEFT_END {
            c.add(&go_back, s, s, Direction::Right, &eval);
        } else {
            c.add(&go_back, s, s, Direction::Left, &go_back);
        }
    }

    let done = c.compile_expr(init, name, eval)?;
    Ok(c.emit_rewind(done))
}

/// `x = x + y` appends y's tally to x's region without consuming y. Every
/// other assignment shape is rejected here.
fn lower_assign(
    c: &mut Compiler,
    name: &str,
    value: &Expr,
    entry: State,
) -> Result<State, TurcError> {
    if let Expr::Bin {
        op: BinOp::Add,
        lhs,
        rhs,
    } = value
    {
        if let (Expr::Var(l), Expr::Var(r)) = (lhs.as_ref(), rhs.as_ref()) {
            if l == name {
                let src = c.lookup_var(r)?;
                let dst = c.lookup_var(name)?;
                return Ok(c.emit_append(entry, src.region, dst.region));
            }
        }
    }
    Err(LoweringError::UnsupportedAssignment(name.to_string()).into())
}

/// `for i in 1..n { body }`: declare `i`, plant its region at the tape
/// tail, then loop: increment `i`, compare |i| <= |n|, run the body while
/// it holds. The body's exit rewinds and returns to the loop head.
fn lower_for(
    c: &mut Compiler,
    var: &str,
    start: &Expr,
    end: &Expr,
    body: &[Stmt],
    entry: State,
) -> Result<State, TurcError> {
    if !matches!(start, Expr::Int(1)) {
        return Err(LoweringError::ForLoopStart.into());
    }
    let n = match end {
        Expr::Var(name) => c.lookup_var(name)?,
        _ => return Err(LoweringError::ForLoopEnd.into()),
    };

    // The counter always gets a fresh, empty tail region. A reused name
    // would inherit its old tally (restore sweeps un-mark, they never
    // zero), so redeclaration is rejected outright.
    if c.is_declared(var) {
        return Err(LoweringError::ForLoopVarRedeclared(var.to_string()).into());
    }
    let i = c.declare_var(var);
    let loop_head = c.fresh("for_head");

    let setup_rw = c.fresh("for_rw");
    for s in c.alphabet() {
        if s == BLANK {
            c.add(&entry, s, SEP, Direction::Left, &setup_rw);
        } else {
            c.add(&entry, s, s, Direction::Right, &entry);
        }
    }
    for s in c.alphabet() {
        if s == LEFT_END {
            c.add(&setup_rw, s, s, Direction::Right, &loop_head);
        } else {
            c.add(&setup_rw, s, s, Direction::Left, &setup_rw);
        }
    }

    let body_st = c.fresh("for_body");
    let exit_st = c.fresh("for_exit");

    let after_inc = c.emit_increment(loop_head.clone(), i.region);
    c.emit_compare_le(after_inc, i.region, n.region, &body_st, &exit_st);

    let body_done = lower_stmts(c, body, body_st)?;
    if !c.is_sink(&body_done) {
        let rw = c.emit_rewind(body_done);
        c.wire(&rw, &loop_head);
    }

    Ok(exit_st)
}

/// Equality conditional. `x == y` compares two regions; `count(c) == v`
/// runs the fused interleaved matching of input symbols against a region.
fn lower_if(
    c: &mut Compiler,
    cond: &Expr,
    then_body: &[Stmt],
    else_body: &[Stmt],
    entry: State,
) -> Result<State, TurcError> {
    let (lhs, rhs) = match cond {
        Expr::Bin {
            op: BinOp::Eq,
            lhs,
            rhs,
        } => (lhs.as_ref(), rhs.as_ref()),
        _ => return Err(LoweringError::UnsupportedCondition.into()),
    };

    let then_st = c.fresh("then");
    let else_st = c.fresh("else");
    let end_st = c.fresh("endif");

    match (lhs, rhs) {
        (Expr::Count(symbol), Expr::Var(name)) => {
            let var = c.lookup_var(name)?;
            lower_count_eq(c, *symbol, var.region, entry, &then_st, &else_st);
        }
        (Expr::Var(x), Expr::Var(y)) => {
            let a = c.lookup_var(x)?;
            let b = c.lookup_var(y)?;
            c.emit_compare_equal(entry, a.region, b.region, &then_st, &else_st);
        }
        _ => return Err(LoweringError::UnsupportedCondition.into()),
    }

    let then_done = lower_stmts(c, then_body, then_st)?;
    let else_done = lower_stmts(c, else_body, else_st)?;

    if !c.is_sink(&then_done) {
        c.wire(&then_done, &end_st);
    }
    if !c.is_sink(&else_done) {
        c.wire(&else_done, &end_st);
    }

    Ok(c.emit_rewind(end_st))
}

/// The fused `count(c) == v` comparison: interleaves "find the next
/// unmarked `c` in the input" with "find the next unmarked `1` in region
/// v". Whichever runs out first decides the branch; running out together
/// is equality.
///
/// Both the input marks and the region marks are restored on *both* paths
/// before control reaches the branches. (The system this reimplements left
/// the marks in place, observable only by a later count of the same
/// symbol; restoring keeps the statement-boundary invariant unconditional.)
fn lower_count_eq(
    c: &mut Compiler,
    symbol: Symbol,
    region: usize,
    entry: State,
    then_st: &State,
    else_st: &State,
) {
    let marked = mark_of(symbol);
    let found = c.fresh("meq_found");
    let input_done = c.fresh("meq_nomore");
    let eq_pre = c.fresh("meq_eq");
    let ne_pre = c.fresh("meq_ne");

    // Entry doubles as the input scan loop, starting from cell 1.
    for s in c.alphabet() {
        if s == symbol {
            c.add(&entry, s, marked, Direction::Stay, &found);
        } else if s == SEP || s == BLANK {
            c.add(&entry, s, s, Direction::Stay, &input_done);
        } else {
            c.add(&entry, s, s, Direction::Right, &entry);
        }
    }

    // Pair the marked input symbol with an unmarked 1 in the region.
    let rw = c.emit_rewind(found);
    let in_v = c.emit_navigate_to_region(rw, region);
    let matched = c.fresh("meq_matched");
    for s in c.alphabet() {
        if s == ONE {
            c.add(&in_v, s, MARKED, Direction::Stay, &matched);
        } else if s == MARKED {
            c.add(&in_v, s, s, Direction::Right, &in_v);
        } else {
            // The region ran out first: more c's than v.
            c.add(&in_v, s, s, Direction::Stay, &ne_pre);
        }
    }
    let next_round = c.emit_rewind(matched);
    c.wire(&next_round, &entry);

    // Input exhausted: equal exactly when no unmarked 1 remains in v.
    let rw_chk = c.emit_rewind(input_done);
    let check = c.emit_navigate_to_region(rw_chk, region);
    for s in c.alphabet() {
        if s == ONE {
            c.add(&check, s, s, Direction::Stay, &ne_pre);
        } else if s == MARKED {
            c.add(&check, s, s, Direction::Right, &check);
        } else {
            c.add(&check, s, s, Direction::Stay, &eq_pre);
        }
    }

    let eq_input = c.emit_restore_input(eq_pre, symbol);
    let eq_done = c.emit_restore_region(eq_input, region);
    c.wire(&eq_done, then_st);

    let ne_input = c.emit_restore_input(ne_pre, symbol);
    let ne_done = c.emit_restore_region(ne_input, region);
    c.wire(&ne_done, else_st);
}

/// Branch on the symbol currently under the head. Branch bodies run from
/// the current position; unhandled symbols take the else branch (or fall
/// straight through).
fn lower_if_current(
    c: &mut Compiler,
    branches: &[(Symbol, Vec<Stmt>)],
    else_body: &[Stmt],
    entry: State,
) -> Result<State, TurcError> {
    let end = c.fresh("ifc_end");

    for (symbol, body) in branches {
        let head = c.fresh("branch");
        c.add(&entry, *symbol, *symbol, Direction::Stay, &head);
        let done = lower_stmts(c, body, head)?;
        if !c.is_sink(&done) {
            c.wire(&done, &end);
        }
    }

    if else_body.is_empty() {
        c.wire(&entry, &end);
    } else {
        let else_head = c.fresh("ifc_else");
        c.wire(&entry, &else_head);
        let done = lower_stmts(c, else_body, else_head)?;
        if !c.is_sink(&done) {
            c.wire(&done, &end);
        }
    }

    Ok(end)
}

/// `loop { body }`: push a fresh exit as the break target, wire the body's
/// exit back to the head, pop. Exits only through `break`, `accept`, or
/// `reject`.
fn lower_loop(c: &mut Compiler, body: &[Stmt], entry: State) -> Result<State, TurcError> {
    let head = c.fresh("loop_head");
    let exit = c.fresh("loop_exit");

    c.wire(&entry, &head);
    c.break_targets.push(exit.clone());
    let body_done = lower_stmts(c, body, head.clone())?;
    if !c.is_sink(&body_done) {
        c.wire(&body_done, &head);
    }
    c.break_targets.pop();

    Ok(exit)
}

fn lower_break(c: &mut Compiler, entry: State) -> Result<State, TurcError> {
    let target = c
        .break_targets
        .last()
        .cloned()
        .ok_or(LoweringError::BreakOutsideLoop)?;
    c.wire(&entry, &target);
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::machine::Machine;
    use crate::parser::parse;
    use crate::simulator::Simulator;

    fn compile_source(source: &str) -> Machine {
        let program = parse(source).unwrap();
        let machine = compile(&program).unwrap();
        machine.validate().unwrap();
        machine
    }

    /// All strings over `alphabet` of length <= `max_len`, shortest first.
    fn all_strings(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut result = vec![String::new()];
        let mut current = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for s in &current {
                for &c in alphabet {
                    let mut ns = s.clone();
                    ns.push(c);
                    result.push(ns.clone());
                    next.push(ns);
                }
            }
            current = next;
        }
        result
    }

    fn verify_exhaustive(
        machine: &Machine,
        alphabet: &[char],
        max_len: usize,
        oracle: impl Fn(&str) -> bool,
    ) {
        let mut sim = Simulator::with_limit(machine, 10_000_000);
        for input in all_strings(alphabet, max_len) {
            let expected = oracle(&input);
            let result = sim.run(&input);
            assert!(!result.hit_limit, "step limit hit on {:?}", input);
            assert_eq!(
                result.accepted, expected,
                "input {:?}: oracle says {}, machine says {}",
                input,
                if expected { "accept" } else { "reject" },
                if result.accepted { "accept" } else { "reject" },
            );
        }
    }

    fn is_anbn_by_count(s: &str) -> bool {
        s.chars().filter(|&c| c == 'a').count() == s.chars().filter(|&c| c == 'b').count()
    }

    fn is_triangular(s: &str) -> bool {
        let mut n = 0usize;
        let mut m = 0usize;
        let mut in_b = false;
        for c in s.chars() {
            match c {
                'a' if !in_b => n += 1,
                'a' => return false,
                'b' => {
                    in_b = true;
                    m += 1;
                }
                _ => return false,
            }
        }
        m == n * (n + 1) / 2
    }

    #[test]
    fn test_preamble_shifts_input_and_writes_sentinel() {
        let machine = compile_source("alphabet input: [a, b, c]\naccept");
        let mut sim = Simulator::new(&machine);
        let result = sim.run("abc");
        assert!(result.accepted);
        assert_eq!(result.final_tape, ">abc");

        let result = sim.run("");
        assert!(result.accepted);
        assert_eq!(result.final_tape, ">");
    }

    #[test]
    fn test_empty_program_accepts_everything() {
        let machine = compile_source("alphabet input: [a, b]");
        let mut sim = Simulator::new(&machine);
        for input in ["", "a", "ab", "bbbb"] {
            assert!(sim.run(input).accepted);
        }
    }

    #[test]
    fn test_count_a_equals_count_b_scenarios() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             return count(b) == n",
        );
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        assert!(sim.run("aabb").accepted);
        assert!(!sim.run("aab").accepted);
        // Counting ignores order.
        assert!(sim.run("abba").accepted);
    }

    #[test]
    fn test_exhaustive_count_a_equals_count_b() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             return count(b) == n",
        );
        verify_exhaustive(&machine, &['a', 'b'], 8, is_anbn_by_count);
    }

    #[test]
    fn test_count_is_non_destructive() {
        // If the restore sweep were broken, the second count(a) would see
        // zero a's and reject any input containing one.
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             return count(a) == n",
        );
        verify_exhaustive(&machine, &['a', 'b'], 8, |_| true);
    }

    #[test]
    fn test_let_copy_and_compare_equal() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             m = n\n\
             if m == n { accept }\n\
             reject",
        );
        verify_exhaustive(&machine, &['a', 'b'], 6, |_| true);
    }

    #[test]
    fn test_literal_initializer_comparison() {
        let machine = compile_source(
            "alphabet input: [a]\n\
             n = count(a)\n\
             three = 3\n\
             if n == three { accept }\n\
             reject",
        );
        verify_exhaustive(&machine, &['a'], 6, |s| s.len() == 3);
    }

    #[test]
    fn test_triangular_via_loop_break() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             \n\
             scan right for [b, _]\n\
             if b {\n\
               scan right for [a, _]\n\
               if a { reject }\n\
             }\n\
             \n\
             n = count(a)\n\
             m = count(b)\n\
             sum = 0\n\
             i = 0\n\
             z = 0\n\
             \n\
             if n == z {\n\
               if sum == m { accept }\n\
               reject\n\
             }\n\
             \n\
             loop {\n\
               inc i\n\
               append i -> sum\n\
               if i == n { break }\n\
             }\n\
             \n\
             if sum == m { accept }\n\
             reject",
        );
        verify_exhaustive(&machine, &['a', 'b'], 8, is_triangular);
    }

    #[test]
    fn test_triangular_scenarios() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             scan right for [b, _]\n\
             if b {\n\
               scan right for [a, _]\n\
               if a { reject }\n\
             }\n\
             n = count(a)\n\
             m = count(b)\n\
             sum = 0\n\
             i = 0\n\
             z = 0\n\
             if n == z {\n\
               if sum == m { accept }\n\
               reject\n\
             }\n\
             loop {\n\
               inc i\n\
               append i -> sum\n\
               if i == n { break }\n\
             }\n\
             if sum == m { accept }\n\
             reject",
        );
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        assert!(sim.run("aaabbbbbb").accepted, "a^3 b^6 is T(3)");
        assert!(!sim.run("aaabbbbb").accepted, "a^3 b^5 is not triangular");
        assert!(sim.run("").accepted, "T(0) = 0");
    }

    #[test]
    fn test_triangular_via_for_loop() {
        // Same language, built from the bounded for-loop instead of
        // loop/break: sum accumulates 1 + 2 + ... + n.
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             sum = 0\n\
             for i in 1..n {\n\
               sum = sum + i\n\
             }\n\
             return count(b) == sum",
        );
        verify_exhaustive(&machine, &['a', 'b'], 7, |s| {
            let n = s.chars().filter(|&c| c == 'a').count();
            let m = s.chars().filter(|&c| c == 'b').count();
            m == n * (n + 1) / 2
        });
    }

    #[test]
    fn test_for_loop_with_zero_bound_skips_body() {
        // With no a's, |i| = 1 > 0 on the first comparison: the body never
        // runs and nothing is appended to sum.
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             sum = 0\n\
             for i in 1..n {\n\
               sum = sum + n\n\
             }\n\
             z = 0\n\
             if sum == z { accept }\n\
             reject",
        );
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        assert!(sim.run("").accepted);
        assert!(sim.run("bb").accepted);
        assert!(!sim.run("a").accepted);
    }

    #[test]
    fn test_counting_loop_terminates() {
        // loop { inc i; if i == n break } terminates whenever the input has
        // at least one 'a'.
        let machine = compile_source(
            "alphabet input: [a]\n\
             n = count(a)\n\
             i = 0\n\
             loop {\n\
               inc i\n\
               if i == n { break }\n\
             }\n\
             accept",
        );
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        for input in ["a", "aa", "aaaaa"] {
            let result = sim.run(input);
            assert!(result.accepted, "{:?} should terminate and accept", input);
            assert!(!result.hit_limit);
        }
    }

    #[test]
    fn test_starts_and_ends_with_a() {
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             if a {\n\
               scan right for [_]\n\
               left\n\
               if a { accept }\n\
               reject\n\
             }\n\
             reject",
        );
        verify_exhaustive(&machine, &['a', 'b'], 10, |s| {
            !s.is_empty() && s.starts_with('a') && s.ends_with('a')
        });
    }

    #[test]
    fn test_marks_are_restored_at_statement_boundaries() {
        // Ends in a plain accept, so the final tape is the layout as the
        // last statement left it: no 'I', no uppercase marks.
        let machine = compile_source(
            "alphabet input: [a, b]\n\
             n = count(a)\n\
             m = count(b)\n\
             if n == m { accept }\n\
             accept",
        );
        let mut sim = Simulator::with_limit(&machine, 10_000_000);
        for input in ["", "a", "ab", "aabab", "bbb"] {
            let result = sim.run(input);
            assert!(result.accepted);
            for c in result.final_tape.chars() {
                assert!(
                    !('A'..='Z').contains(&c),
                    "unrestored mark {:?} on {:?} -> {:?}",
                    c,
                    input,
                    result.final_tape
                );
            }
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let src = "alphabet input: [a, b]\n\
                   n = count(a)\n\
                   return count(b) == n";
        let program = parse(src).unwrap();
        let first = compile(&program).unwrap();
        let second = compile(&program).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_markers_enter_tape_alphabet() {
        let machine = compile_source(
            "alphabet input: [a]\n\
             markers: [$]\n\
             accept",
        );
        assert!(machine.tape_alphabet.contains(&'$'));
    }

    #[test]
    fn test_lowering_error_break_outside_loop() {
        let program = parse("alphabet input: [a]\nbreak").unwrap();
        let result = compile(&program);
        assert_eq!(
            result.unwrap_err(),
            TurcError::Lowering(LoweringError::BreakOutsideLoop)
        );
    }

    #[test]
    fn test_lowering_error_unsupported_assignment() {
        let program = parse(
            "alphabet input: [a]\n\
             x = 0\n\
             y = 0\n\
             x = y + y",
        )
        .unwrap();
        let result = compile(&program);
        assert_eq!(
            result.unwrap_err(),
            TurcError::Lowering(LoweringError::UnsupportedAssignment("x".to_string()))
        );
    }

    #[test]
    fn test_lowering_error_for_loop_shapes() {
        let program = parse(
            "alphabet input: [a]\n\
             n = count(a)\n\
             for i in 2..n { accept }",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::ForLoopStart)
        );

        let program = parse(
            "alphabet input: [a]\n\
             for i in 1..3 { accept }",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::ForLoopEnd)
        );
    }

    #[test]
    fn test_lowering_error_for_loop_var_redeclared() {
        // A previously bound name cannot be a loop counter: its region
        // would start from the stale tally instead of from empty.
        let program = parse(
            "alphabet input: [a]\n\
             n = count(a)\n\
             i = 0\n\
             for i in 1..n { }",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::ForLoopVarRedeclared("i".to_string()))
        );

        // The same applies to two sequential loops sharing a counter name.
        let program = parse(
            "alphabet input: [a]\n\
             n = count(a)\n\
             for i in 1..n { }\n\
             for i in 1..n { }",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::ForLoopVarRedeclared("i".to_string()))
        );
    }

    #[test]
    fn test_lowering_error_unsupported_condition() {
        let program = parse(
            "alphabet input: [a]\n\
             n = count(a)\n\
             if n == 3 { accept }",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::UnsupportedCondition)
        );
    }

    #[test]
    fn test_lowering_error_unknown_variable() {
        let program = parse(
            "alphabet input: [a]\n\
             return count(a) == ghost",
        )
        .unwrap();
        assert_eq!(
            compile(&program).unwrap_err(),
            TurcError::Lowering(LoweringError::UnknownVariable("ghost".to_string()))
        );
    }

    #[test]
    fn test_accept_and_reject_sinks_stay_closed() {
        let machine = compile_source(
            "alphabet input: [a]\n\
             accept\n\
             reject",
        );
        assert!(machine.delta.get("qA").is_none());
        assert!(machine.delta.get("qR").is_none());
    }
}
