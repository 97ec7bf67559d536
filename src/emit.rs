//! Primitive emitters: parameterised sub-machine templates spliced into the
//! machine under construction. Each takes an entry state with no outgoing
//! transitions, appends a block of transitions, and returns a fresh exit
//! state.
//!
//! Shared contract: at entry and at exit every transient mark on the tape
//! is restored. The only emitters that carry marks across internal
//! boundaries are the matching loops of the comparators and of
//! copy/append, and those are always closed off by restore sweeps before
//! control leaves them.

use crate::compiler::Compiler;
use crate::layout::{mark_of, LEFT_END, MARKED, ONE, SEP};
use crate::types::{Direction, State, Symbol, BLANK};

use std::collections::BTreeSet;

impl Compiler {
    /// Scan-to-sentinel: one Left step, scan Left to `>`, one Right step.
    /// Exit: head on cell 1. Terminates because the tape is left-bounded:
    /// a Left move on cell 0 stays on the sentinel, which stops the scan.
    pub(crate) fn emit_rewind(&mut self, entry: State) -> State {
        let scan = self.fresh("rw");
        let at_start = self.fresh("rw_done");

        for s in self.alphabet() {
            self.add(&entry, s, s, Direction::Left, &scan);
        }
        for s in self.alphabet() {
            if s == LEFT_END {
                self.add(&scan, s, s, Direction::Right, &at_start);
            } else {
                self.add(&scan, s, s, Direction::Left, &scan);
            }
        }

        at_start
    }

    /// Scan-to-symbol-set: move `dir` until a stop symbol is under the
    /// head, then stay there.
    pub(crate) fn emit_scan(
        &mut self,
        entry: State,
        dir: Direction,
        stop: &BTreeSet<Symbol>,
    ) -> State {
        let done = self.fresh("scan_done");
        for s in self.alphabet() {
            if stop.contains(&s) {
                self.add(&entry, s, s, Direction::Stay, &done);
            } else {
                self.add(&entry, s, s, dir, &entry);
            }
        }
        done
    }

    /// Navigate-to-region: from cell 1, pass `region + 1` separators. A
    /// chain of scan-through-separator stages; stopping on blank is
    /// permitted (the region is empty or at the tape tail). Exit: head on
    /// the first cell of the region.
    pub(crate) fn emit_navigate_to_region(&mut self, entry: State, region: usize) -> State {
        let mut current = entry;
        for _ in 0..=region {
            let next = self.fresh("nav");
            for s in self.alphabet() {
                if s == SEP {
                    self.add(&current, s, s, Direction::Right, &next);
                } else if s == BLANK {
                    self.add(&current, s, s, Direction::Stay, &next);
                } else {
                    self.add(&current, s, s, Direction::Right, &current);
                }
            }
            current = next;
        }
        current
    }

    /// Restore-region: rewind, navigate to the region, sweep Right turning
    /// every `I` back into `1`, stop at the next `#` or blank, rewind.
    pub(crate) fn emit_restore_region(&mut self, entry: State, region: usize) -> State {
        let at_start = self.emit_rewind(entry);
        let sweep = self.emit_navigate_to_region(at_start, region);
        let done = self.fresh("rst_done");

        for s in self.alphabet() {
            if s == MARKED {
                self.add(&sweep, s, ONE, Direction::Right, &sweep);
            } else if s == ONE {
                self.add(&sweep, s, s, Direction::Right, &sweep);
            } else {
                self.add(&sweep, s, s, Direction::Stay, &done);
            }
        }

        self.emit_rewind(done)
    }

    /// Restore-input: rewind, then sweep Right turning every mark of
    /// `symbol` back into `symbol`, stopping at the first `#` or blank.
    /// Exit: head on that `#` or blank.
    pub(crate) fn emit_restore_input(&mut self, entry: State, symbol: Symbol) -> State {
        let marked = mark_of(symbol);
        let sweep = self.emit_rewind(entry);
        let done = self.fresh("rsti_done");

        for s in self.alphabet() {
            if s == marked {
                self.add(&sweep, s, symbol, Direction::Right, &sweep);
            } else if s == SEP || s == BLANK {
                self.add(&sweep, s, s, Direction::Stay, &done);
            } else {
                self.add(&sweep, s, s, Direction::Right, &sweep);
            }
        }

        done
    }

    /// Copy-region into the tape tail: mark the next unprocessed `1` of
    /// `src`, walk Right to the first blank, write a `1`, rewind, repeat;
    /// then restore `src`. Net effect: the tail region grows by |src| and
    /// `src` is unchanged. Entry: cell 1. Exit: cell 1.
    pub(crate) fn emit_copy_to_tail(&mut self, entry: State, src: usize) -> State {
        let find = self.emit_navigate_to_region(entry.clone(), src);
        let write = self.fresh("cpy_write");
        let back = self.fresh("cpy_back");
        let done = self.fresh("cpy_done");

        for s in self.alphabet() {
            if s == ONE {
                self.add(&find, s, MARKED, Direction::Right, &write);
            } else if s == MARKED {
                self.add(&find, s, s, Direction::Right, &find);
            } else {
                self.add(&find, s, s, Direction::Stay, &done);
            }
        }

        for s in self.alphabet() {
            if s == BLANK {
                self.add(&write, s, ONE, Direction::Left, &back);
            } else {
                self.add(&write, s, s, Direction::Right, &write);
            }
        }

        // Rewind and re-enter the navigation for the next unprocessed 1.
        for s in self.alphabet() {
            if s == LEFT_END {
                self.add(&back, s, s, Direction::Right, &entry);
            } else {
                self.add(&back, s, s, Direction::Left, &back);
            }
        }

        self.emit_restore_region(done, src)
    }

    /// Increment-region by insert-and-shift: navigate to the end of the
    /// region; on blank (last region) just write the `1`; on `#` write the
    /// `1` and carry the displaced cell rightward. One carry state per
    /// symbol that can sit right of a region end (`#`, `1`, `I`); the shift
    /// ends when a carry deposits into blank. Separator count and order are
    /// preserved. Entry: cell 1. Exit: cell 1.
    pub(crate) fn emit_increment(&mut self, entry: State, region: usize) -> State {
        let in_region = self.emit_navigate_to_region(entry, region);
        let at_end = self.fresh("ins_end");
        let done = self.fresh("ins_done");
        let carry_sep = self.fresh("ins_csep");
        let carry_one = self.fresh("ins_cone");
        let carry_mark = self.fresh("ins_cmark");

        for s in self.alphabet() {
            if s == ONE || s == MARKED {
                self.add(&in_region, s, s, Direction::Right, &in_region);
            } else {
                self.add(&in_region, s, s, Direction::Stay, &at_end);
            }
        }

        self.add(&at_end, BLANK, ONE, Direction::Stay, &done);
        self.add(&at_end, SEP, ONE, Direction::Right, &carry_sep);

        for (carry, carried) in [
            (carry_sep.clone(), SEP),
            (carry_one.clone(), ONE),
            (carry_mark.clone(), MARKED),
        ] {
            self.add(&carry, BLANK, carried, Direction::Stay, &done);
            self.add(&carry, SEP, carried, Direction::Right, &carry_sep);
            self.add(&carry, ONE, carried, Direction::Right, &carry_one);
            self.add(&carry, MARKED, carried, Direction::Right, &carry_mark);
        }

        self.emit_rewind(done)
    }

    /// Compare-equal: one-to-one matching between two unary regions. Marks
    /// a `1` in `a`, rewinds, marks a `1` in `b`, rewinds, repeats; when
    /// `a` runs out, `b` must have no unmarked `1` left. Both regions are
    /// restored before control reaches either caller-supplied exit, so the
    /// tape is observably unchanged. Entry: cell 1; exits entered at
    /// cell 1.
    pub(crate) fn emit_compare_equal(
        &mut self,
        entry: State,
        a: usize,
        b: usize,
        if_eq: &State,
        if_ne: &State,
    ) {
        let found_a = self.fresh("ceq_found");
        let matched = self.fresh("ceq_matched");
        let a_done = self.fresh("ceq_a_done");
        let eq_pre = self.fresh("ceq_eq");
        let ne_pre = self.fresh("ceq_ne");

        let in_a = self.emit_navigate_to_region(entry.clone(), a);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&in_a, s, MARKED, Direction::Stay, &found_a);
            } else if s == MARKED {
                self.add(&in_a, s, s, Direction::Right, &in_a);
            } else {
                self.add(&in_a, s, s, Direction::Stay, &a_done);
            }
        }

        let rw_b = self.emit_rewind(found_a);
        let in_b = self.emit_navigate_to_region(rw_b, b);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&in_b, s, MARKED, Direction::Stay, &matched);
            } else if s == MARKED {
                self.add(&in_b, s, s, Direction::Right, &in_b);
            } else {
                // b exhausted before a: unequal.
                self.add(&in_b, s, s, Direction::Stay, &ne_pre);
            }
        }

        // Next pair: rewind and fall back into the region-a navigation.
        let next_round = self.emit_rewind(matched);
        self.wire(&next_round, &entry);

        // a exhausted: equal exactly when b has no unmarked 1 either.
        let rw_chk = self.emit_rewind(a_done);
        let check_b = self.emit_navigate_to_region(rw_chk, b);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&check_b, s, s, Direction::Stay, &ne_pre);
            } else if s == MARKED {
                self.add(&check_b, s, s, Direction::Right, &check_b);
            } else {
                self.add(&check_b, s, s, Direction::Stay, &eq_pre);
            }
        }

        let eq_restored_a = self.emit_restore_region(eq_pre, a);
        let eq_restored = self.emit_restore_region(eq_restored_a, b);
        self.wire(&eq_restored, if_eq);

        let ne_restored_a = self.emit_restore_region(ne_pre, a);
        let ne_restored = self.emit_restore_region(ne_restored_a, b);
        self.wire(&ne_restored, if_ne);
    }

    /// Ordered comparator for the for-loop: pairs `1`s of `a` against `1`s
    /// of `b`. If `a` is exhausted first (or both together), |a| <= |b|;
    /// if `b` is exhausted first, |a| > |b|. Both regions are restored on
    /// both paths, so every loop iteration starts from a clean tape.
    pub(crate) fn emit_compare_le(
        &mut self,
        entry: State,
        a: usize,
        b: usize,
        if_le: &State,
        if_gt: &State,
    ) {
        let found_a = self.fresh("cle_found");
        let matched = self.fresh("cle_matched");
        let le_pre = self.fresh("cle_le");
        let gt_pre = self.fresh("cle_gt");

        let in_a = self.emit_navigate_to_region(entry.clone(), a);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&in_a, s, MARKED, Direction::Stay, &found_a);
            } else if s == MARKED {
                self.add(&in_a, s, s, Direction::Right, &in_a);
            } else {
                self.add(&in_a, s, s, Direction::Stay, &le_pre);
            }
        }

        let rw_b = self.emit_rewind(found_a);
        let in_b = self.emit_navigate_to_region(rw_b, b);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&in_b, s, MARKED, Direction::Stay, &matched);
            } else if s == MARKED {
                self.add(&in_b, s, s, Direction::Right, &in_b);
            } else {
                self.add(&in_b, s, s, Direction::Stay, &gt_pre);
            }
        }

        let next_round = self.emit_rewind(matched);
        self.wire(&next_round, &entry);

        let le_restored_a = self.emit_restore_region(le_pre, a);
        let le_restored = self.emit_restore_region(le_restored_a, b);
        self.wire(&le_restored, if_le);

        let gt_restored_a = self.emit_restore_region(gt_pre, a);
        let gt_restored = self.emit_restore_region(gt_restored_a, b);
        self.wire(&gt_restored, if_gt);
    }

    /// Append-non-destructive: add |src| `1`s to `dst` without consuming
    /// `src`. Marks one `1` of `src`, rewinds, insert-and-shifts one `1`
    /// into `dst`, repeats; restores `src` when it is exhausted. Entry:
    /// cell 1. Exit: cell 1.
    pub(crate) fn emit_append(&mut self, entry: State, src: usize, dst: usize) -> State {
        let found = self.fresh("app_found");
        let src_done = self.fresh("app_done");

        let find = self.emit_navigate_to_region(entry.clone(), src);
        for s in self.alphabet() {
            if s == ONE {
                self.add(&find, s, MARKED, Direction::Stay, &found);
            } else if s == MARKED {
                self.add(&find, s, s, Direction::Right, &find);
            } else {
                self.add(&find, s, s, Direction::Stay, &src_done);
            }
        }

        let rw = self.emit_rewind(found);
        let inserted = self.emit_increment(rw, dst);
        self.wire(&inserted, &entry);

        self.emit_restore_region(src_done, src)
    }
}
