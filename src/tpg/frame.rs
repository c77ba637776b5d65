//! Frame materialization: re-emits the circuit's formula at a frame's
//! base offset, wires flip-flops to the previous frame, pins the reset
//! and initial state, and compiles the frame's uncovered bins.

use super::Tpg;
use satif::Satif;
use crate::circuit::{DffPort, GateKind};
use crate::cover::{BinId, VarAlloc};
use crate::plit;
use logic_form::{Clause, Lit};
use std::collections::HashMap;

impl Tpg {
    /// Emit the circuit's clauses for frame `t`: every combinational
    /// gate's template rebased to the frame, flip-flop outputs tied to the
    /// previous frame's drivers, and the frame's reset/initial pins.
    pub(super) fn load_frame_base(&mut self, t: usize) {
        let base = self.initial_var[t];
        self.grow_to(base + self.circuit.num_wires());
        self.statistic.num_frame = self.statistic.num_frame.max(t + 1);

        for g in 0..self.circuit.gates().len() {
            let gate = &self.circuit.gates()[g];
            if gate.kind == GateKind::Dff {
                if t >= 1 {
                    self.connect_dff(g, t);
                }
                continue;
            }
            let cnf = gate.cnf.clone();
            for clause in cnf {
                let lits: Vec<Lit> = clause.iter().map(|&l| rel_lit(l, base)).collect();
                self.add_clause(&lits);
            }
        }
        self.add_frame_constraints(t);
    }

    /// Tie the flip-flop's state outputs at frame `t` to its driver at
    /// frame `t-1`, for true, complemented and dual-rail outputs.
    fn connect_dff(&mut self, gate: usize, t: usize) {
        let g = &self.circuit.gates()[gate];
        let ports: Vec<(usize, DffPort)> = g
            .outputs
            .iter()
            .copied()
            .zip(g.dff_ports.iter().copied())
            .collect();
        let d = match g.inputs.first() {
            Some(&d) => d,
            None => panic!("unknown flip-flop port configuration: no driver"),
        };
        if ports.is_empty() || ports.len() > 2 {
            panic!(
                "unknown flip-flop port configuration: {} state outputs",
                ports.len()
            );
        }
        let prev = plit(d + self.initial_var[t - 1], true);
        let base = self.initial_var[t];
        for (w, port) in ports {
            let cur = plit(w + base, true);
            match port {
                DffPort::Q => {
                    self.add_clause(&[!cur, prev]);
                    self.add_clause(&[cur, !prev]);
                }
                DffPort::Qn => {
                    self.add_clause(&[!cur, !prev]);
                    self.add_clause(&[cur, prev]);
                }
            }
        }
    }

    /// Frame 0 pins every primary input and every state bit low and
    /// asserts the reset; later frames re-pin the reset to its inactive
    /// level, once per frame.
    fn add_frame_constraints(&mut self, t: usize) {
        let base = self.initial_var[t];
        if t == 0 {
            for &w in self.circuit.pi().to_vec().iter() {
                self.add_clause(&[plit(w, false)]);
            }
            for &w in self.circuit.ppi().to_vec().iter() {
                self.add_clause(&[plit(w, false)]);
            }
        }
        // reset active at frame 0, released afterwards
        let level = if t == 0 {
            !self.options.neg_reset
        } else {
            self.options.neg_reset
        };
        for &w in self.circuit.rst().to_vec().iter() {
            self.add_clause(&[plit(w + base, level)]);
        }
    }

    /// The frame's bin pass: reset every bin's output variable, move the
    /// sampled variables to this frame's numbering, then compile `bins`,
    /// recording their output variables in the frame's map.
    ///
    /// `reset_origin` restarts the variable numbering from the frame-0
    /// snapshot at t = 0 (non-incremental and single-bin strategies
    /// rebuild past frames in fresh solver instances).
    pub(super) fn set_bin_cnf(&mut self, t: usize, reset_origin: bool, bins: &[BinId]) {
        self.cover.reset_outputs();
        if t == 0 {
            if reset_origin {
                self.cover.reset_variables_to_origin();
            }
        } else {
            let delta = self.initial_var[t] - self.initial_var[t - 1];
            self.cover.shift_variables(delta);
        }

        let mut alloc = VarAlloc::new(self.solver.num_var());
        self.cover.seat_locals(&mut alloc);
        self.cover.record_seats(t);

        let mut map = HashMap::with_capacity(bins.len());
        for &b in bins {
            let out = alloc.fresh();
            self.cover.bin_mut(b).set_out(out);
            map.insert(b, out);
        }
        self.bin2var.truncate(t);
        self.bin2var.push(map);

        let mut clauses: Vec<Clause> = Vec::new();
        for &b in bins {
            self.cover.compile_bin(b, &mut alloc, &mut clauses);
        }
        self.grow_to(alloc.num_var());
        for c in clauses {
            self.add_clause(&c);
        }
    }

    /// Frame construction for the flat incremental strategies: circuit,
    /// bins, then the frame-disable variable `D_t` and its blocking
    /// clause `D_t | (uncovered bin literals)`.
    pub(super) fn insert_frame(&mut self, t: usize) {
        self.load_frame_base(t);
        let bins = self.uncovered.clone();
        self.set_bin_cnf(t, false, &bins);

        let d = self.solver.num_var();
        self.solver.new_var();
        self.frame_constr.truncate(t);
        self.frame_constr.push(d);
        let mut lits = vec![plit(d, true)];
        for &b in bins.iter() {
            lits.push(plit(self.bin_var(t, b), true));
        }
        self.add_clause(&lits);

        self.set_next_base(t, self.solver.num_var());
    }

    /// Grouped frame construction: one variable per group plus a leading
    /// frame disable; the top clause requires one of them, each group
    /// variable implies one of its group's bins.
    pub(super) fn insert_frame_grouped(&mut self, t: usize) {
        self.load_frame_base(t);
        let bins = self.uncovered.clone();
        self.set_bin_cnf(t, false, &bins);

        let mut vars = Vec::with_capacity(self.groups.len() + 1);
        for _ in 0..=self.groups.len() {
            let v = self.solver.num_var();
            self.solver.new_var();
            vars.push(v);
        }
        let top: Vec<Lit> = vars.iter().map(|&v| plit(v, true)).collect();
        self.add_clause(&top);
        for (i, group) in self.groups.clone().iter().enumerate() {
            let mut lits = vec![plit(vars[i + 1], false)];
            for &b in group.iter() {
                lits.push(plit(self.bin_var(t, b), true));
            }
            self.add_clause(&lits);
        }
        self.group_constr.truncate(t);
        self.group_constr.push(vars);

        self.set_next_base(t, self.solver.num_var());
    }

    /// Frame construction for the non-incremental strategy: built into a
    /// fresh solver with numbering reset to the origin, and at the probe's
    /// final frame a plain clause requiring some uncovered bin (there is
    /// no assumption mechanism to retract across instances).
    pub(super) fn insert_frame_noninc(&mut self, t: usize, maxframe: usize) {
        self.load_frame_base(t);
        let bins = self.uncovered.clone();
        self.set_bin_cnf(t, true, &bins);

        if t == maxframe {
            let lits: Vec<Lit> = bins.iter().map(|&b| plit(self.bin_var(t, b), true)).collect();
            self.add_clause(&lits);
        }
        self.set_next_base(t, self.solver.num_var());
    }

    /// Frame construction for the single-bin strategy: only `bin` is
    /// compiled; it is targeted by assumption, so no constraint clause.
    pub(super) fn insert_frame_single(&mut self, t: usize, bin: BinId) {
        self.load_frame_base(t);
        self.set_bin_cnf(t, true, &[bin]);
        self.set_next_base(t, self.solver.num_var());
    }
}

#[inline]
fn rel_lit(l: i32, base: usize) -> Lit {
    plit(l.unsigned_abs() as usize - 1 + base, l > 0)
}
