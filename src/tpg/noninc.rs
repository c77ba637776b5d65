//! Non-incremental strategy: every probe constructs a brand-new solver,
//! discarding all learned clauses, and rebuilds frames 0..=depth from
//! scratch with variable numbering reset to the origin. Found input
//! sequences are excluded by explicit blocking clauses, since no
//! assumption mechanism survives across instances.

use super::Tpg;
use satif::Satif;
use crate::plit;
use std::time::Instant;

impl Tpg {
    pub(super) fn run_non_incremental(&mut self) -> usize {
        self.patterns.clear();
        let mut models = 0;
        let start = Instant::now();
        let mut depth = 0;
        while !self.uncovered.is_empty() && depth <= self.options.max_depth {
            log::info!("depth {depth}: elapsed {:?}", start.elapsed());
            loop {
                if self.uncovered.is_empty() {
                    break;
                }
                self.solver = self.new_solver();
                for t in 0..=depth {
                    self.insert_frame_noninc(t, depth);
                }
                if self.options.cov_threshold != 0 {
                    self.add_pattern_blocking(depth);
                }
                self.statistic.num_solve += 1;
                if !self.solver.solve(&[]) {
                    self.statistic.solve_sat.fail();
                    // patterns are frame-local
                    self.patterns.clear();
                    break;
                }
                self.statistic.solve_sat.success();
                models += 1;

                let remaining = self.harvest(depth, &self.uncovered.clone(), true);
                if remaining.len() < self.uncovered.len() {
                    self.uncovered = remaining;
                }
                self.statistic.avg_uncovered += self.uncovered.len();
                self.record_values(depth);
                if self.options.cov_threshold != 0 {
                    self.record_pattern(depth);
                }
            }
            depth += 1;
        }
        models
    }

    /// One blocking clause per recorded input sequence. Frame 0 has no
    /// free inputs (they are pinned low), so its only pattern is excluded
    /// by requiring any input high, which closes the frame.
    fn add_pattern_blocking(&mut self, depth: usize) {
        if self.patterns.is_empty() {
            return;
        }
        if depth == 0 {
            let lits: Vec<_> = self
                .circuit
                .pi()
                .iter()
                .map(|&w| plit(w, true))
                .collect();
            if lits.is_empty() {
                // no free inputs at all: the frame is exhausted
                let f = self.solver.num_var();
                self.solver.new_var();
                self.add_clause(&[plit(f, true)]);
                self.add_clause(&[plit(f, false)]);
            } else {
                self.add_clause(&lits);
            }
            return;
        }
        for pattern in self.patterns.clone() {
            let mut lits = Vec::new();
            for (t, frame_bits) in pattern.iter().enumerate().take(depth) {
                let base = self.initial_var[t];
                for (j, &w) in self.circuit.pi().to_vec().iter().enumerate() {
                    lits.push(plit(w + base, !frame_bits[j]));
                }
            }
            self.add_clause(&lits);
        }
    }

    /// Record the model's primary-input assignment over frames
    /// 0..depth-1 (frame 0's inputs are pinned and recorded as zeros).
    fn record_pattern(&mut self, depth: usize) {
        let num_pi = self.circuit.pi().len();
        if depth == 0 {
            self.patterns.push(vec![vec![false; num_pi]]);
            return;
        }
        let mut pattern = Vec::with_capacity(depth);
        for t in 0..depth {
            let base = self.initial_var[t];
            let bits: Vec<bool> = self
                .circuit
                .pi()
                .iter()
                .map(|&w| self.model_true(w + base))
                .collect();
            pattern.push(bits);
        }
        self.patterns.push(pattern);
    }
}
