//! Coverage model: sampled variables, coverpoints, crosses and their bins.

mod bin;
pub mod parse;

pub use bin::{Bin, CrossBin, StateBin, VarAlloc};

use crate::error::{Error, Result};

/// Index of a bin in the covergroup's arena.
pub type BinId = usize;

/// More automatically created bins than this collapse into ranged bins.
pub const AUTO_BIN_MAX: u64 = 100000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// bound to primary-input wires
    Pi,
    /// bound to flip-flop state wires
    Ppi,
    /// free variables, seated on fresh solver variables every frame
    Local,
}

const UNBOUND: usize = usize::MAX;

/// A sampled variable. `vars` is the variable's per-bit solver variable
/// list in the active frame's numbering; it is process-wide mutable state
/// scoped to one run and only the frame builder may move it, in frame
/// order. `origin` keeps the frame-0 numbering for restarts.
#[derive(Debug)]
pub struct CoverVariable {
    pub name: String,
    pub kind: VarKind,
    pub width: usize,
    vars: Vec<usize>,
    origin: Vec<usize>,
    /// per-frame snapshot of `vars`, for model decoding
    seats: Vec<Vec<usize>>,
    /// decoded value per frame of the most recent model
    values: Vec<u64>,
}

impl CoverVariable {
    pub fn new(name: impl Into<String>, kind: VarKind, width: usize) -> Self {
        assert!(width > 0 && width < 64);
        Self {
            name: name.into(),
            kind,
            width,
            vars: vec![UNBOUND; width],
            origin: vec![UNBOUND; width],
            seats: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn bind_bit(&mut self, bit: usize, var: usize) {
        self.vars[bit] = var;
    }

    /// Freeze the current binding as the frame-0 numbering. Every bit of a
    /// circuit-bound variable must have been bound.
    pub fn freeze_origin(&mut self) -> Result<()> {
        if self.kind != VarKind::Local {
            if let Some(bit) = self.vars.iter().position(|&v| v == UNBOUND) {
                return Err(Error::UnboundVariableBit {
                    name: self.name.clone(),
                    bit,
                });
            }
        }
        self.origin = self.vars.clone();
        Ok(())
    }

    /// Shift every bit by the frame delta. Local variables are re-seated
    /// instead.
    pub fn shift(&mut self, delta: usize) {
        if self.kind == VarKind::Local {
            return;
        }
        for v in self.vars.iter_mut() {
            *v += delta;
        }
    }

    pub fn reset_to_origin(&mut self) {
        self.vars = self.origin.clone();
    }

    /// Seat a local variable on fresh solver variables for this frame.
    pub fn seat(&mut self, alloc: &mut VarAlloc) {
        if self.kind == VarKind::Local {
            for v in self.vars.iter_mut() {
                *v = alloc.fresh();
            }
        }
    }

    /// Record the current numbering as frame `t`'s seat.
    pub fn record_seat(&mut self, t: usize) {
        self.seats.truncate(t);
        self.seats.push(self.vars.clone());
    }

    pub fn seat_at(&self, t: usize) -> &[usize] {
        &self.seats[t]
    }

    pub fn set_value(&mut self, t: usize, value: u64) {
        while self.values.len() <= t {
            self.values.push(0);
        }
        self.values[t] = value;
    }

    pub fn value(&self, t: usize) -> u64 {
        self.values[t]
    }

    /// Solver variables of the slice `[msb:lsb]`, least significant first.
    pub fn bit_vars(&self, msb: usize, lsb: usize) -> Vec<usize> {
        self.vars[lsb..=msb].to_vec()
    }
}

#[derive(Debug)]
pub struct CoverPoint {
    pub name: String,
    /// index of the sampled variable
    pub var: usize,
    pub msb: usize,
    pub lsb: usize,
    pub bins: Vec<BinId>,
}

impl CoverPoint {
    /// Largest value representable by the sampled slice.
    pub fn max_value(&self) -> u64 {
        (1u64 << (self.msb - self.lsb + 1)) - 1
    }
}

#[derive(Debug)]
pub struct Cross {
    pub name: String,
    /// coverpoint indices in cross order
    pub points: Vec<usize>,
    pub bins: Vec<BinId>,
}

#[derive(Debug, Default)]
pub struct CoverGroup {
    pub name: String,
    variables: Vec<CoverVariable>,
    points: Vec<CoverPoint>,
    crosses: Vec<Cross>,
    bins: Vec<Bin>,
}

impl CoverGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, var: CoverVariable) -> usize {
        self.variables.push(var);
        self.variables.len() - 1
    }

    pub fn add_point(&mut self, point: CoverPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    pub fn add_cross(&mut self, cross: Cross) -> usize {
        self.crosses.push(cross);
        self.crosses.len() - 1
    }

    pub fn add_bin(&mut self, bin: Bin) -> BinId {
        self.bins.push(bin);
        self.bins.len() - 1
    }

    #[inline]
    pub fn variable(&self, idx: usize) -> &CoverVariable {
        &self.variables[idx]
    }

    #[inline]
    pub fn variable_mut(&mut self, idx: usize) -> &mut CoverVariable {
        &mut self.variables[idx]
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn find_variable(&self, name: &str) -> Result<usize> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| Error::VariableNotFound(name.to_string()))
    }

    #[inline]
    pub fn point(&self, idx: usize) -> &CoverPoint {
        &self.points[idx]
    }

    pub fn points(&self) -> &[CoverPoint] {
        &self.points
    }

    pub fn find_point(&self, name: &str) -> Option<usize> {
        self.points.iter().position(|p| p.name == name)
    }

    pub fn crosses(&self) -> &[Cross] {
        &self.crosses
    }

    #[inline]
    pub fn bin(&self, id: BinId) -> &Bin {
        &self.bins[id]
    }

    #[inline]
    pub fn bin_mut(&mut self, id: BinId) -> &mut Bin {
        &mut self.bins[id]
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn find_bin(&self, name: &str) -> Result<BinId> {
        self.bins
            .iter()
            .position(|b| b.name() == name)
            .ok_or_else(|| Error::BinNotFound(name.to_string()))
    }

    /// Every bin's output variable back to uncompiled, before a new
    /// frame's compilation.
    pub fn reset_outputs(&mut self) {
        for b in self.bins.iter_mut() {
            b.reset_out();
        }
    }

    /// Move every circuit-bound variable to the new frame's numbering.
    pub fn shift_variables(&mut self, delta: usize) {
        for v in self.variables.iter_mut() {
            v.shift(delta);
        }
    }

    pub fn reset_variables_to_origin(&mut self) {
        for v in self.variables.iter_mut() {
            v.reset_to_origin();
        }
    }

    pub fn seat_locals(&mut self, alloc: &mut VarAlloc) {
        for v in self.variables.iter_mut() {
            v.seat(alloc);
        }
    }

    pub fn record_seats(&mut self, t: usize) {
        for v in self.variables.iter_mut() {
            v.record_seat(t);
        }
    }
}
