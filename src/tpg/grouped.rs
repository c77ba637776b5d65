//! Grouped strategy: the frame's blocking clause is split per group with
//! one auxiliary variable each, so a group drops out as soon as all its
//! bins are retired. The outer assumption is over the frame's single top
//! variable.

use super::Tpg;
use satif::Satif;
use crate::plit;
use std::time::Instant;

impl Tpg {
    pub(super) fn run_grouped(&mut self) -> usize {
        let mut models = 0;
        let start = Instant::now();
        let mut depth = 0;
        while !self.uncovered.is_empty() && depth <= self.options.max_depth {
            log::info!("depth {depth}: elapsed {:?}", start.elapsed());
            self.log_progress(depth);
            self.insert_frame_grouped(depth);
            self.ensure_allsat_frames(depth);
            let top = self.group_constr[depth][0];
            let mut assumps = vec![plit(top, false)];
            loop {
                self.statistic.num_solve += 1;
                if !self.solver.solve(&assumps) {
                    self.statistic.solve_sat.fail();
                    break;
                }
                self.statistic.solve_sat.success();
                models += 1;

                let mut still_open = Vec::new();
                for i in 0..self.groups.len() {
                    let gvar = self.group_constr[depth][i + 1];
                    let group = self.groups[i].clone();
                    let remaining = self.harvest(depth, &group, true);
                    if remaining.len() < group.len() {
                        let mut lits = vec![plit(gvar, false)];
                        for &b in remaining.iter() {
                            lits.push(plit(self.bin_var(depth, b), true));
                        }
                        self.add_clause(&lits);
                        self.groups[i] = remaining.clone();
                    }
                    still_open.extend(remaining);
                }
                if still_open.len() < self.uncovered.len() {
                    self.uncovered = still_open;
                }
                self.statistic.avg_uncovered += self.uncovered.len();
                self.record_values(depth);

                if self.options.cov_threshold != 0 {
                    self.add_diversify(depth);
                    assumps = vec![plit(top, false)];
                    for &a in self.allsat_constr[depth].iter() {
                        assumps.push(plit(a, false));
                    }
                }
                if self.uncovered.is_empty() {
                    log::info!("all bins covered");
                    break;
                }
            }
            self.add_clause(&[plit(top, true)]);
            self.retract_diversify(depth);
            depth += 1;
        }
        models
    }
}
