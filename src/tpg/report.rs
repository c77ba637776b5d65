//! Model inspection: decodes the sampled variables' per-frame values
//! from the current model and logs the input/state trace.

use super::Tpg;
use std::fmt::Write;

impl Tpg {
    /// Decode every sampled variable's integer value at every frame of
    /// the model just found and record it on the variable. The per-frame
    /// variable seats are used, since the live literal lists only carry
    /// the newest frame's numbering.
    pub(super) fn record_values(&mut self, frame: usize) {
        for i in 0..self.cover.num_variables() {
            for t in 0..=frame {
                let bits = self.cover.variable(i).seat_at(t).to_vec();
                let mut value = 0u64;
                for (j, &var) in bits.iter().enumerate() {
                    if self.model_true(var) {
                        value |= 1 << j;
                    }
                }
                self.cover.variable_mut(i).set_value(t, value);
            }
        }
        if log::log_enabled!(log::Level::Debug) {
            self.log_trace(frame);
        }
    }

    fn log_trace(&self, frame: usize) {
        let mut table = String::new();
        let _ = write!(table, "{:>14}", "depth:");
        for t in 0..=frame {
            let _ = write!(table, "{t:>5}");
        }
        for &w in self.circuit.rst() {
            let _ = write!(table, "\n{:>13}:", self.circuit.wire(w).name);
            for t in 0..=frame {
                let v = self.model_true(w + self.initial_var[t]) as u8;
                let _ = write!(table, "{v:>5}");
            }
        }
        for i in 0..self.cover.num_variables() {
            let var = self.cover.variable(i);
            let _ = write!(table, "\n{:>13}:", var.name);
            for t in 0..=frame {
                let _ = write!(table, "{:>5}", var.value(t));
            }
        }
        log::debug!("model trace\n{table}");
    }
}
