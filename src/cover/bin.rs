//! Coverage bins and their compilation into boolean formula fragments.
//!
//! Compiling a bin yields clauses defining a single output variable that
//! is true exactly when the sampled bits satisfy the bin, in the frame's
//! current numbering.

use super::{BinId, CoverGroup};
use crate::interval::IntervalSet;
use crate::plit;
use logic_form::{Clause, Lit};

/// Fresh solver-variable allocator the frame builder hands to the
/// compiler. Starts at the solver's current variable count; the frame
/// builder materializes the variables once compilation is done.
#[derive(Debug)]
pub struct VarAlloc {
    next: usize,
}

impl VarAlloc {
    pub fn new(next: usize) -> Self {
        Self { next }
    }

    #[inline]
    pub fn fresh(&mut self) -> usize {
        let v = self.next;
        self.next += 1;
        v
    }

    #[inline]
    pub fn num_var(&self) -> usize {
        self.next
    }
}

#[derive(Debug)]
pub struct StateBin {
    pub name: String,
    pub excluded: bool,
    /// index of the sampled variable
    pub var: usize,
    pub msb: usize,
    pub lsb: usize,
    pub values: IntervalSet,
    out: Option<usize>,
    hits: usize,
}

impl StateBin {
    pub fn new(
        name: impl Into<String>,
        excluded: bool,
        var: usize,
        msb: usize,
        lsb: usize,
        values: IntervalSet,
    ) -> Self {
        Self {
            name: name.into(),
            excluded,
            var,
            msb,
            lsb,
            values,
            out: None,
            hits: 0,
        }
    }
}

#[derive(Debug)]
pub struct CrossBin {
    pub name: String,
    pub excluded: bool,
    /// selection tuples, one constituent state bin per crossed coverpoint
    pub products: Vec<Vec<BinId>>,
    out: Option<usize>,
    hits: usize,
}

impl CrossBin {
    pub fn new(name: impl Into<String>, excluded: bool, products: Vec<Vec<BinId>>) -> Self {
        Self {
            name: name.into(),
            excluded,
            products,
            out: None,
            hits: 0,
        }
    }
}

#[derive(Debug)]
pub enum Bin {
    State(StateBin),
    Cross(CrossBin),
}

impl Bin {
    pub fn name(&self) -> &str {
        match self {
            Bin::State(b) => &b.name,
            Bin::Cross(b) => &b.name,
        }
    }

    pub fn excluded(&self) -> bool {
        match self {
            Bin::State(b) => b.excluded,
            Bin::Cross(b) => b.excluded,
        }
    }

    /// The bin's output variable in the frame it was last compiled for.
    pub fn out(&self) -> Option<usize> {
        match self {
            Bin::State(b) => b.out,
            Bin::Cross(b) => b.out,
        }
    }

    pub fn set_out(&mut self, var: usize) {
        match self {
            Bin::State(b) => b.out = Some(var),
            Bin::Cross(b) => b.out = Some(var),
        }
    }

    pub fn reset_out(&mut self) {
        match self {
            Bin::State(b) => b.out = None,
            Bin::Cross(b) => b.out = None,
        }
    }

    pub fn hits(&self) -> usize {
        match self {
            Bin::State(b) => b.hits,
            Bin::Cross(b) => b.hits,
        }
    }

    pub fn hit(&mut self) {
        match self {
            Bin::State(b) => b.hits += 1,
            Bin::Cross(b) => b.hits += 1,
        }
    }
}

impl CoverGroup {
    /// Compile the clauses defining `id`'s output variable for the current
    /// frame. The output variable must have been assigned beforehand.
    /// Constituent state bins of a cross are compiled at most once per
    /// frame, cached through their own output variable, since the same bin
    /// may appear in several products.
    pub fn compile_bin(&mut self, id: BinId, alloc: &mut VarAlloc, clauses: &mut Vec<Clause>) {
        match self.bin(id) {
            Bin::State(b) => {
                let out = b.out.expect("bin output variable not assigned");
                self.compile_state(b, out, alloc, clauses);
            }
            Bin::Cross(_) => self.compile_cross(id, alloc, clauses),
        }
    }

    fn compile_state(
        &self,
        bin: &StateBin,
        out: usize,
        alloc: &mut VarAlloc,
        clauses: &mut Vec<Clause>,
    ) {
        assert!(!bin.values.is_empty(), "bin {} has an empty value set", bin.name);
        let bits = self.variable(bin.var).bit_vars(bin.msb, bin.lsb);
        let mut intervals = Vec::new();
        for (lo, hi) in bin.values.iter() {
            let v = alloc.fresh();
            if lo == hi {
                let lits: Vec<Lit> = bits
                    .iter()
                    .enumerate()
                    .map(|(j, &b)| plit(b, lo >> j & 1 == 1))
                    .collect();
                gen_and(&lits, v, clauses);
            } else {
                gen_range(&bits, lo, hi, v, alloc, clauses);
            }
            intervals.push(plit(v, true));
        }
        gen_or(&intervals, out, clauses);
    }

    fn compile_cross(&mut self, id: BinId, alloc: &mut VarAlloc, clauses: &mut Vec<Clause>) {
        let Bin::Cross(cross) = self.bin(id) else {
            unreachable!()
        };
        let out = cross.out.expect("bin output variable not assigned");
        let products = cross.products.clone();
        let mut product_lits = Vec::with_capacity(products.len());
        for tuple in products {
            let mut members = Vec::with_capacity(tuple.len());
            for m in tuple {
                let mv = match self.bin(m).out() {
                    Some(v) => v,
                    None => {
                        let v = alloc.fresh();
                        self.bin_mut(m).set_out(v);
                        let Bin::State(sb) = self.bin(m) else {
                            panic!("cross product member {} is not a state bin", self.bin(m).name())
                        };
                        self.compile_state(sb, v, alloc, clauses);
                        v
                    }
                };
                members.push(plit(mv, true));
            }
            let p = alloc.fresh();
            gen_and(&members, p, clauses);
            product_lits.push(plit(p, true));
        }
        gen_or(&product_lits, out, clauses);
    }
}

/// out <-> AND(lits)
fn gen_and(lits: &[Lit], out: usize, clauses: &mut Vec<Clause>) {
    for &l in lits {
        clauses.push(Clause::from([l, plit(out, false)]));
    }
    let mut last: Clause = lits.iter().map(|&l| !l).collect();
    last.push(plit(out, true));
    clauses.push(last);
}

/// out <-> OR(lits)
fn gen_or(lits: &[Lit], out: usize, clauses: &mut Vec<Clause>) {
    for &l in lits {
        clauses.push(Clause::from([!l, plit(out, true)]));
    }
    let mut last: Clause = lits.iter().copied().collect();
    last.push(plit(out, false));
    clauses.push(last);
}

/// out <-> a & b
fn gen_and2(a: usize, b: usize, out: usize, clauses: &mut Vec<Clause>) {
    clauses.push(Clause::from([plit(a, true), plit(out, false)]));
    clauses.push(Clause::from([plit(b, true), plit(out, false)]));
    clauses.push(Clause::from([plit(a, false), plit(b, false), plit(out, true)]));
}

/// out <-> value in [lo, hi], built from two bit-serial comparator cones.
fn gen_range(
    bits: &[usize],
    lo: u64,
    hi: u64,
    out: usize,
    alloc: &mut VarAlloc,
    clauses: &mut Vec<Clause>,
) {
    let top = bits.len() - 1;
    let to_bits = |v: u64| -> Vec<bool> { (0..bits.len()).map(|j| v >> j & 1 == 1).collect() };
    let mut set = Vec::new();
    gen_le(bits, &to_bits(hi), top, &mut set);
    let le = flatten_clauses(&set, alloc, clauses);
    set.clear();
    gen_ge(bits, &to_bits(lo), top, &mut set);
    let ge = flatten_clauses(&set, alloc, clauses);
    gen_and2(le, ge, out, clauses);
}

/// Extend the clause set (a conjunction of disjunctions over the bit
/// literals) asserting "bits[0..=i] <= bound[0..=i]", walking from the
/// most significant bit down. A zero bound bit requires the bit low and
/// conjoins it in; a one bound bit lets a low bit satisfy everything
/// below, so its negation distributes into every clause.
fn gen_le(bits: &[usize], bound: &[bool], i: usize, set: &mut Vec<Vec<Lit>>) {
    if i == 0 {
        if bound[0] {
            set.push(vec![plit(bits[0], true), plit(bits[0], false)]);
        } else {
            set.push(vec![plit(bits[0], false)]);
        }
        return;
    }
    gen_le(bits, bound, i - 1, set);
    if bound[i] {
        clause_distrib(plit(bits[i], false), set);
    } else {
        clause_union(plit(bits[i], false), set);
    }
}

/// Mirror of [`gen_le`] for "bits[0..=i] >= bound[0..=i]".
fn gen_ge(bits: &[usize], bound: &[bool], i: usize, set: &mut Vec<Vec<Lit>>) {
    if i == 0 {
        if bound[0] {
            set.push(vec![plit(bits[0], true)]);
        } else {
            set.push(vec![plit(bits[0], true), plit(bits[0], false)]);
        }
        return;
    }
    gen_ge(bits, bound, i - 1, set);
    if bound[i] {
        clause_union(plit(bits[i], true), set);
    } else {
        clause_distrib(plit(bits[i], true), set);
    }
}

fn clause_union(l: Lit, set: &mut Vec<Vec<Lit>>) {
    set.push(vec![l]);
}

fn clause_distrib(l: Lit, set: &mut Vec<Vec<Lit>>) {
    for c in set.iter_mut() {
        c.push(l);
    }
}

/// Flatten a clause set into one literal through small gates, one OR per
/// clause and a single AND over them, instead of multiplying the set out
/// into raw clauses.
fn flatten_clauses(set: &[Vec<Lit>], alloc: &mut VarAlloc, clauses: &mut Vec<Clause>) -> usize {
    let mut ors = Vec::with_capacity(set.len());
    for c in set {
        let o = alloc.fresh();
        gen_or(c, o, clauses);
        ors.push(plit(o, true));
    }
    let out = alloc.fresh();
    gen_and(&ors, out, clauses);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{CoverGroup, CoverVariable, VarKind};
    use satif::Satif;

    /// Covergroup with one `width`-bit variable seated on solver vars
    /// `0..width`.
    fn group_with_variable(width: usize) -> CoverGroup {
        let mut g = CoverGroup::new();
        let mut v = CoverVariable::new("v", VarKind::Pi, width);
        for b in 0..width {
            v.bind_bit(b, b);
        }
        v.freeze_origin().unwrap();
        g.add_variable(v);
        g
    }

    /// Compile `id` into a fresh minisat instance; returns the solver and
    /// the bin's output variable.
    fn compile(g: &mut CoverGroup, id: usize, width: usize) -> (minisat::Solver, usize) {
        let mut solver = minisat::Solver::new();
        while solver.num_var() < width {
            solver.new_var();
        }
        let mut alloc = VarAlloc::new(solver.num_var());
        let out = alloc.fresh();
        g.bin_mut(id).set_out(out);
        let mut clauses = Vec::new();
        g.compile_bin(id, &mut alloc, &mut clauses);
        while solver.num_var() < alloc.num_var() {
            solver.new_var();
        }
        for c in clauses.iter() {
            solver.add_clause(c);
        }
        (solver, out)
    }

    fn check_membership(width: usize, values: IntervalSet) {
        let mut g = group_with_variable(width);
        let id = g.add_bin(Bin::State(StateBin::new("b", false, 0, width - 1, 0, values.clone())));
        let (mut solver, out) = compile(&mut g, id, width);
        for v in 0..1u64 << width {
            let assumps: Vec<_> = (0..width).map(|j| plit(j, v >> j & 1 == 1)).collect();
            assert!(solver.solve(&assumps));
            assert_eq!(
                solver.sat_value(plit(out, true)),
                Some(values.contains(v)),
                "value {v} of width {width}"
            );
        }
    }

    #[test]
    fn single_value() {
        let mut s = IntervalSet::new();
        s.insert(5);
        check_membership(4, s);
    }

    #[test]
    fn range() {
        let mut s = IntervalSet::new();
        s.insert_range(5, 10);
        check_membership(4, s);
    }

    #[test]
    fn range_boundaries() {
        // lo = hi
        let mut s = IntervalSet::new();
        s.insert_range(9, 9);
        check_membership(4, s.clone());
        // lo = 0
        let mut s = IntervalSet::new();
        s.insert_range(0, 6);
        check_membership(4, s);
        // hi = max: degenerates to always true
        let mut s = IntervalSet::new();
        s.insert_range(0, 15);
        check_membership(4, s);
        // hi = max - 1
        let mut s = IntervalSet::new();
        s.insert_range(3, 14);
        check_membership(4, s);
    }

    #[test]
    fn union_of_intervals() {
        let mut s = IntervalSet::new();
        s.insert(0);
        s.insert(2);
        s.insert_range(7, 12);
        check_membership(4, s);
    }

    #[test]
    fn one_bit_variable() {
        let mut s = IntervalSet::new();
        s.insert(1);
        check_membership(1, s);
    }

    #[test]
    fn cross_two_by_two() {
        // two 1-bit coverpoints of two bins each; products pair the equal
        // bins, so the cross holds exactly when a == b
        let mut g = CoverGroup::new();
        for (name, base) in [("a", 0usize), ("b", 1usize)] {
            let mut v = CoverVariable::new(name, VarKind::Pi, 1);
            v.bind_bit(0, base);
            v.freeze_origin().unwrap();
            g.add_variable(v);
        }
        let mut bins = Vec::new();
        for var in 0..2 {
            for val in 0..2u64 {
                let mut s = IntervalSet::new();
                s.insert(val);
                bins.push(g.add_bin(Bin::State(StateBin::new(
                    format!("v{var}[{val}]"),
                    false,
                    var,
                    0,
                    0,
                    s,
                ))));
            }
        }
        let products = vec![vec![bins[0], bins[2]], vec![bins[1], bins[3]]];
        let id = g.add_bin(Bin::Cross(CrossBin::new("axb", false, products)));

        let mut solver = minisat::Solver::new();
        while solver.num_var() < 2 {
            solver.new_var();
        }
        let mut alloc = VarAlloc::new(solver.num_var());
        let out = alloc.fresh();
        g.bin_mut(id).set_out(out);
        let mut clauses = Vec::new();
        g.compile_bin(id, &mut alloc, &mut clauses);
        while solver.num_var() < alloc.num_var() {
            solver.new_var();
        }
        for c in clauses.iter() {
            solver.add_clause(c);
        }
        // every constituent got compiled exactly once
        for &b in bins.iter() {
            assert!(g.bin(b).out().is_some());
        }
        for a in 0..2u64 {
            for b in 0..2u64 {
                let assumps = vec![plit(0, a == 1), plit(1, b == 1)];
                assert!(solver.solve(&assumps));
                assert_eq!(solver.sat_value(plit(out, true)), Some(a == b), "a={a} b={b}");
            }
        }
    }

    #[test]
    fn cross_of_all_tuples_is_total() {
        // crossing every tuple of the 2x2 grid accepts any assignment
        let mut g = CoverGroup::new();
        for (name, base) in [("a", 0usize), ("b", 1usize)] {
            let mut v = CoverVariable::new(name, VarKind::Pi, 1);
            v.bind_bit(0, base);
            v.freeze_origin().unwrap();
            g.add_variable(v);
        }
        let mut bins = Vec::new();
        for var in 0..2 {
            for val in 0..2u64 {
                let mut s = IntervalSet::new();
                s.insert(val);
                bins.push(g.add_bin(Bin::State(StateBin::new(
                    format!("v{var}[{val}]"),
                    false,
                    var,
                    0,
                    0,
                    s,
                ))));
            }
        }
        let products = vec![
            vec![bins[0], bins[2]],
            vec![bins[0], bins[3]],
            vec![bins[1], bins[2]],
            vec![bins[1], bins[3]],
        ];
        let id = g.add_bin(Bin::Cross(CrossBin::new("axb", false, products)));
        let mut solver = minisat::Solver::new();
        while solver.num_var() < 2 {
            solver.new_var();
        }
        let mut alloc = VarAlloc::new(solver.num_var());
        let out = alloc.fresh();
        g.bin_mut(id).set_out(out);
        let mut clauses = Vec::new();
        g.compile_bin(id, &mut alloc, &mut clauses);
        while solver.num_var() < alloc.num_var() {
            solver.new_var();
        }
        for c in clauses.iter() {
            solver.add_clause(c);
        }
        for a in 0..2u64 {
            for b in 0..2u64 {
                let assumps = vec![plit(0, a == 1), plit(1, b == 1)];
                assert!(solver.solve(&assumps));
                assert_eq!(solver.sat_value(plit(out, true)), Some(true));
            }
        }
    }
}
