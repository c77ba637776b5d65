//! Default strategy: one persistent, growing solver instance. Each frame
//! is searched to exhaustion under the assumption of its disable literal;
//! exhausted frames are retracted by asserting the literal and the run
//! moves one frame deeper.

use super::Tpg;
use satif::Satif;
use crate::plit;
use std::time::Instant;

impl Tpg {
    pub(super) fn run_incremental(&mut self) -> usize {
        let mut models = 0;
        let start = Instant::now();
        let mut depth = 0;
        while !self.uncovered.is_empty() && depth <= self.options.max_depth {
            log::info!("depth {depth}: elapsed {:?}", start.elapsed());
            self.log_progress(depth);
            self.insert_frame(depth);
            self.ensure_allsat_frames(depth);
            let mut assumps = vec![plit(self.frame_constr[depth], false)];
            loop {
                self.statistic.num_solve += 1;
                if !self.solver.solve(&assumps) {
                    self.statistic.solve_sat.fail();
                    break;
                }
                self.statistic.solve_sat.success();
                models += 1;

                // rebuild the frame's blocking clause from the bins that
                // are still open after this model
                let d = self.frame_constr[depth];
                let remaining = self.harvest(depth, &self.uncovered.clone(), true);
                if remaining.len() < self.uncovered.len() {
                    let mut lits = vec![plit(d, true)];
                    for &b in remaining.iter() {
                        lits.push(plit(self.bin_var(depth, b), true));
                    }
                    self.add_clause(&lits);
                    self.uncovered = remaining;
                }
                self.statistic.avg_uncovered += self.uncovered.len();
                self.record_values(depth);

                if self.options.cov_threshold != 0 {
                    self.add_diversify(depth);
                    assumps = vec![plit(self.frame_constr[depth], false)];
                    for &a in self.allsat_constr[depth].iter() {
                        assumps.push(plit(a, false));
                    }
                }
                if self.uncovered.is_empty() {
                    log::info!("all bins covered");
                    break;
                }
            }
            // retract the exhausted frame's constraints for good
            self.add_clause(&[plit(self.frame_constr[depth], true)]);
            self.retract_diversify(depth);
            depth += 1;
        }
        models
    }
}
