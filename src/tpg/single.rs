//! Single-bin strategy: each bin gets its own solver instance, grown
//! frame by frame from depth 0 under the assumption of the bin's output
//! literal, independent of every other bin.

use super::Tpg;
use satif::Satif;
use crate::plit;
use std::time::Instant;

impl Tpg {
    pub(super) fn run_single(&mut self) -> usize {
        let mut models = 0;
        let start = Instant::now();
        let mut unsolved = Vec::new();
        for &bin in self.uncovered.clone().iter() {
            log::info!(
                "bin {}: elapsed {:?}",
                self.cover.bin(bin).name(),
                start.elapsed()
            );
            self.solver = self.new_solver();
            for depth in 0..=self.options.max_depth {
                self.insert_frame_single(depth, bin);
                let var = self.bin_var(depth, bin);
                self.statistic.num_solve += 1;
                if self.solver.solve(&[plit(var, true)]) {
                    self.statistic.solve_sat.success();
                    models += 1;
                    self.cover.bin_mut(bin).hit();
                    log::info!(
                        "bin {} hit at frame {depth}",
                        self.cover.bin(bin).name()
                    );
                    self.record_values(depth);
                    break;
                }
                self.statistic.solve_sat.fail();
                if depth == self.options.max_depth {
                    unsolved.push(bin);
                }
            }
        }
        self.uncovered = unsolved;
        models
    }
}
