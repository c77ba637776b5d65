//! Bounded-unrolling test-generation controller.
//!
//! Drives the circuit's per-frame formula and the uncovered bins' output
//! literals into an incremental solver and searches for models according
//! to one of five strategies.

mod frame;
mod grouped;
mod incremental;
mod mspsat;
mod noninc;
mod report;
mod single;

use crate::circuit::Circuit;
use crate::cover::{BinId, CoverGroup};
use crate::plit;
use crate::statistic::Statistic;
use crate::{Options, Strategy};
use logic_form::Lit;
use rand::rngs::StdRng;
use rand::SeedableRng;
use satif::Satif;
use std::collections::HashMap;
use std::fs;

pub struct Summary {
    pub models: usize,
    pub solved: usize,
    pub unsolved: Vec<String>,
}

pub struct Tpg {
    pub options: Options,
    circuit: Circuit,
    cover: CoverGroup,
    solver: Box<dyn Satif>,

    /// bins still searched for
    uncovered: Vec<BinId>,
    /// grouped strategies: disjoint partition of `uncovered`
    groups: Vec<Vec<BinId>>,
    /// initial_var[t] is the first solver variable of frame t
    initial_var: Vec<usize>,
    /// bin2var[t] maps an uncovered bin to its output variable in frame t
    bin2var: Vec<HashMap<BinId, usize>>,
    /// per-frame disable variable retracting the frame's blocking clause
    frame_constr: Vec<usize>,
    /// per-frame AllSAT diversification variables
    allsat_constr: Vec<Vec<usize>>,
    /// per-frame group variables; index 0 is the frame's top disable
    group_constr: Vec<Vec<usize>>,
    /// recorded input sequences, for the non-incremental strategy
    patterns: Vec<Vec<Vec<bool>>>,

    rng: StdRng,
    pub statistic: Statistic,
}

impl Tpg {
    pub fn new(options: Options, circuit: Circuit, cover: CoverGroup) -> Self {
        let solver = new_solver(&options);
        let rng = StdRng::seed_from_u64(options.rseed);
        let statistic = Statistic::new(&options.circuit);
        let mut tpg = Self {
            options,
            circuit,
            cover,
            solver,
            uncovered: Vec::new(),
            groups: Vec::new(),
            initial_var: vec![0],
            bin2var: Vec::new(),
            frame_constr: Vec::new(),
            allsat_constr: Vec::new(),
            group_constr: Vec::new(),
            patterns: Vec::new(),
            rng,
            statistic,
        };
        tpg.select_targets();
        tpg
    }

    pub fn run(&mut self) -> Summary {
        let total = self.uncovered.len();
        let models = match self.options.strategy {
            Strategy::Incremental => self.run_incremental(),
            Strategy::Grouped => self.run_grouped(),
            Strategy::Mspsat => self.run_mspsat(),
            Strategy::NonIncremental => self.run_non_incremental(),
            Strategy::Single => self.run_single(),
        };
        self.statistic.num_model = models;
        let unsolved: Vec<String> = self
            .uncovered
            .iter()
            .map(|&b| self.cover.bin(b).name().to_string())
            .collect();
        Summary {
            models,
            solved: total - unsolved.len(),
            unsolved,
        }
    }

    /// The working set of target bins: the names listed in the bins file,
    /// or every non-excluded bin when no file is given or it cannot be
    /// read (the documented fallback). Grouped strategies also partition
    /// the set, by coverpoint/cross or randomly by `--rand-group`.
    fn select_targets(&mut self) {
        self.uncovered.clear();
        self.groups.clear();
        let listed = self.options.bins.as_ref().and_then(|path| {
            match fs::read_to_string(path) {
                Ok(text) => Some(text),
                Err(e) => {
                    log::warn!("cannot open bins file {path}: {e}");
                    None
                }
            }
        });
        match listed {
            Some(text) => {
                for line in text.lines() {
                    let name: String = line.chars().filter(|c| !c.is_whitespace()).collect();
                    if name.is_empty() {
                        continue;
                    }
                    match self.cover.find_bin(&name) {
                        Ok(b) => self.uncovered.push(b),
                        Err(e) => {
                            // a requested bin missing from the model is fatal
                            panic!("{e}");
                        }
                    }
                }
            }
            None => {
                if self.options.bins.is_some() {
                    log::warn!("falling back to every bin");
                }
                let mut push_group = |bins: &[BinId], cover: &CoverGroup,
                                      uncovered: &mut Vec<BinId>,
                                      groups: &mut Vec<Vec<BinId>>| {
                    let selected: Vec<BinId> = bins
                        .iter()
                        .copied()
                        .filter(|&b| !cover.bin(b).excluded())
                        .collect();
                    uncovered.extend_from_slice(&selected);
                    if !selected.is_empty() {
                        groups.push(selected);
                    }
                };
                for p in self.cover.points() {
                    push_group(&p.bins, &self.cover, &mut self.uncovered, &mut self.groups);
                }
                for c in self.cover.crosses() {
                    push_group(&c.bins, &self.cover, &mut self.uncovered, &mut self.groups);
                }
            }
        }
        if let Some(k) = self.options.rand_group {
            use rand::seq::SliceRandom;
            self.uncovered.shuffle(&mut self.rng);
            self.groups = self
                .uncovered
                .chunks(k as usize)
                .map(|c| c.to_vec())
                .collect();
        }
        if self.options.strategy == Strategy::Grouped
            && self.groups.is_empty()
            && !self.uncovered.is_empty()
        {
            log::warn!("bin selection carries no grouping; grouped search will find nothing");
        }
    }

    pub(super) fn new_solver(&self) -> Box<dyn Satif> {
        new_solver(&self.options)
    }

    /// Materialize solver variables up to `n`.
    pub(super) fn grow_to(&mut self, n: usize) {
        while self.solver.num_var() < n {
            self.solver.new_var();
        }
    }

    pub(super) fn add_clause(&mut self, lits: &[Lit]) {
        self.statistic.num_clause += 1;
        self.solver.add_clause(lits);
    }

    /// Whether `var` is assigned true in the current model.
    pub(super) fn model_true(&self, var: usize) -> bool {
        self.solver.sat_value(plit(var, true)) == Some(true)
    }

    pub(super) fn bin_var(&self, frame: usize, bin: BinId) -> usize {
        self.bin2var[frame][&bin]
    }

    /// Harvest one model against the bins in `bins`: bump hit counts of
    /// the bins whose literal is true and return the bins that remain
    /// uncovered, honoring the hit threshold. With `count` false the hit
    /// counters are left untouched (a model may be examined against two
    /// lists but must be counted once).
    pub(super) fn harvest(&mut self, frame: usize, bins: &[BinId], count: bool) -> Vec<BinId> {
        let thr = self.options.cov_threshold;
        let mut remaining = Vec::with_capacity(bins.len());
        for &b in bins {
            let var = self.bin_var(frame, b);
            if self.model_true(var) {
                if count {
                    self.cover.bin_mut(b).hit();
                    log::info!(
                        "bin {} hit at frame {frame}, solver var {var}",
                        self.cover.bin(b).name()
                    );
                }
                if thr != 0 && self.cover.bin(b).hits() < thr {
                    remaining.push(b);
                }
            } else {
                remaining.push(b);
            }
        }
        remaining
    }

    /// Add one AllSAT diversification clause for `frame`: a fresh
    /// retraction variable disjoined with the negated primary-input
    /// assignment of the preceding frame (empty at frame 0, whose inputs
    /// are pinned). The frame base advances past the new variable.
    pub(super) fn add_diversify(&mut self, frame: usize) {
        let mut lits = Vec::new();
        if frame > 0 {
            let base = self.initial_var[frame - 1];
            for &w in self.circuit.pi() {
                let var = w + base;
                lits.push(plit(var, !self.model_true(var)));
            }
        }
        let aux = self.solver.num_var();
        self.solver.new_var();
        lits.push(plit(aux, true));
        self.allsat_constr[frame].push(aux);
        self.add_clause(&lits);
        self.set_next_base(frame, self.solver.num_var());
    }

    /// Permanently assert frame `frame`'s pending AllSAT variables,
    /// retracting their clauses.
    pub(super) fn retract_diversify(&mut self, frame: usize) {
        if self.options.cov_threshold == 0 {
            return;
        }
        for aux in self.allsat_constr[frame].clone() {
            self.add_clause(&[plit(aux, true)]);
        }
    }

    pub(super) fn ensure_allsat_frames(&mut self, frame: usize) {
        if self.options.cov_threshold == 0 {
            return;
        }
        while self.allsat_constr.len() <= frame + 1 {
            self.allsat_constr.push(Vec::new());
        }
    }

    /// Fix frame `t+1`'s base at `n`, discarding any stale later bases.
    pub(super) fn set_next_base(&mut self, t: usize, n: usize) {
        self.initial_var.truncate(t + 1);
        self.initial_var.push(n);
    }

    pub(super) fn log_progress(&self, depth: usize) {
        log::info!(
            "depth {depth}: {} unsolved bins, {} solver variables, {} clauses, {} solve calls",
            self.uncovered.len(),
            self.solver.num_var(),
            self.statistic.num_clause,
            self.statistic.num_solve
        );
    }

    pub fn statistic(&self) {
        println!("{:#?}", self.statistic);
    }

    pub fn cover(&self) -> &CoverGroup {
        &self.cover
    }

    pub fn num_uncovered(&self) -> usize {
        self.uncovered.len()
    }
}

fn new_solver(options: &Options) -> Box<dyn Satif> {
    if options.minisat {
        Box::new(minisat::Solver::new())
    } else {
        Box::new(cadical::Solver::new())
    }
}

#[cfg(test)]
mod tests {
    use crate::plit;
    use satif::Satif;

    #[test]
    fn retraction_is_idempotent() {
        // asserting a disable variable twice leaves the solver exactly as
        // satisfiable as asserting it once
        let mut solver = minisat::Solver::new();
        let d = solver.num_var();
        solver.new_var();
        let x = solver.num_var();
        solver.new_var();
        solver.add_clause(&[plit(d, true), plit(x, true)]);
        solver.add_clause(&[plit(d, true)]);
        assert!(solver.solve(&[plit(x, false)]));
        assert!(!solver.solve(&[plit(d, false)]));
        solver.add_clause(&[plit(d, true)]);
        assert!(solver.solve(&[plit(x, false)]));
        assert!(!solver.solve(&[plit(d, false)]));
    }
}
