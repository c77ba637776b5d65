//! MSPSAT strategy: within a frame, repeatedly assume one randomly chosen
//! unchecked bin and solve. A model may retire many bins at once; an
//! UNSAT answer only drops the assumed bin from this frame's working
//! list, leaving it to be retried at later frames.

use super::Tpg;
use satif::Satif;
use crate::plit;
use rand::seq::SliceRandom;
use std::time::Instant;

impl Tpg {
    pub(super) fn run_mspsat(&mut self) -> usize {
        let mut models = 0;
        let start = Instant::now();
        let mut depth = 0;
        while !self.uncovered.is_empty() && depth <= self.options.max_depth {
            log::info!("depth {depth}: elapsed {:?}", start.elapsed());
            self.log_progress(depth);
            self.insert_frame(depth);
            self.ensure_allsat_frames(depth);

            let mut unchecked = self.uncovered.clone();
            while !unchecked.is_empty() {
                unchecked.shuffle(&mut self.rng);
                let target = *unchecked.last().unwrap();
                let assumps = vec![plit(self.bin_var(depth, target), true)];
                self.statistic.num_solve += 1;
                if !self.solver.solve(&assumps) {
                    self.statistic.solve_sat.fail();
                    // uncoverable alone under this frame's constraints;
                    // not provably uncoverable, so only the frame-local
                    // working list drops it
                    unchecked.pop();
                    continue;
                }
                self.statistic.solve_sat.success();
                models += 1;

                let remaining = self.harvest(depth, &unchecked, true);
                if remaining.len() < unchecked.len() {
                    unchecked = remaining;
                }
                // bins already checked this frame may be retired by the
                // same model; their hits were counted above, never twice
                let open = self.harvest(depth, &self.uncovered.clone(), false);
                if open.len() < self.uncovered.len() {
                    self.uncovered = open;
                }
                self.statistic.avg_uncovered += self.uncovered.len();
                self.record_values(depth);

                if self.options.cov_threshold != 0 {
                    self.add_diversify(depth);
                }
                if self.uncovered.is_empty() {
                    log::info!("all bins covered");
                    break;
                }
            }
            self.retract_diversify(depth);
            depth += 1;
        }
        models
    }
}
