//! Structural gate-level circuit model: wires, gates, flip-flop port
//! topology and per-gate CNF clause templates.

mod cnf;
pub mod parse;

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    /// primary input
    Pi,
    /// primary output
    Po,
    /// pseudo primary input (flip-flop state output)
    Ppi,
    /// pseudo primary output (flip-flop driver)
    Ppo,
    Normal,
    Clk,
    Rst,
}

#[derive(Debug)]
pub struct Wire {
    pub name: String,
    pub kind: WireKind,
    /// frame-local solver variable of this wire, 0-based
    pub var: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    Buf,
    Inv,
    And2,
    And3,
    Or2,
    Or3,
    Nand2,
    Nand3,
    Nand4,
    Nor2,
    Nor3,
    Xor2,
    Xnor2,
    /// (!s0 & a) | (s0 & b)
    Mx2,
    /// !((a0 | a1) & b0)
    Oai21,
    /// !((a0 & a1) | b0)
    Aoi21,
    Const0,
    Const1,
    Dff,
}

/// Which state output a flip-flop wire carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DffPort {
    Q,
    Qn,
}

#[derive(Debug)]
pub struct Gate {
    pub kind: GateKind,
    /// input wire indices; for flip-flops the D driver is always first
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    /// per-output state port of a flip-flop, parallel to `outputs`
    pub dff_ports: Vec<DffPort>,
    /// clause template in frame-local numbering: 1-based variables with
    /// signed polarity, one inner vector per clause. Empty for flip-flops,
    /// whose connection clauses span two frames and are emitted by the
    /// frame builder instead.
    pub cnf: Vec<Vec<i32>>,
}

#[derive(Debug, Default)]
pub struct Circuit {
    pub name: String,
    wires: Vec<Wire>,
    gates: Vec<Gate>,
    name_map: HashMap<String, usize>,
    pi: Vec<usize>,
    po: Vec<usize>,
    ppi: Vec<usize>,
    ppo: Vec<usize>,
    clk: Vec<usize>,
    rst: Vec<usize>,
}

impl Circuit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a wire; its solver variable is its creation index. Re-declaring
    /// a name (`output` then `wire` for the same net) returns the existing
    /// wire unchanged.
    pub fn add_wire(&mut self, name: impl Into<String>, kind: WireKind) -> usize {
        let name = name.into();
        if let Some(&var) = self.name_map.get(&name) {
            return var;
        }
        let var = self.wires.len();
        self.name_map.insert(name.clone(), var);
        self.wires.push(Wire { name, kind, var });
        var
    }

    pub fn add_gate(&mut self, kind: GateKind, inputs: Vec<usize>, outputs: Vec<usize>) -> usize {
        self.add_dff_gate(kind, inputs, outputs, Vec::new())
    }

    pub fn add_dff_gate(
        &mut self,
        kind: GateKind,
        inputs: Vec<usize>,
        outputs: Vec<usize>,
        dff_ports: Vec<DffPort>,
    ) -> usize {
        self.gates.push(Gate {
            kind,
            inputs,
            outputs,
            dff_ports,
            cnf: Vec::new(),
        });
        self.gates.len() - 1
    }

    #[inline]
    pub fn wire(&self, idx: usize) -> &Wire {
        &self.wires[idx]
    }

    pub fn find_wire(&self, name: &str) -> Option<usize> {
        self.name_map.get(name).copied()
    }

    pub fn set_wire_kind(&mut self, idx: usize, kind: WireKind) {
        self.wires[idx].kind = kind;
    }

    #[inline]
    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }

    #[inline]
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    #[inline]
    pub fn pi(&self) -> &[usize] {
        &self.pi
    }

    #[inline]
    pub fn po(&self) -> &[usize] {
        &self.po
    }

    #[inline]
    pub fn ppi(&self) -> &[usize] {
        &self.ppi
    }

    #[inline]
    pub fn ppo(&self) -> &[usize] {
        &self.ppo
    }

    #[inline]
    pub fn clk(&self) -> &[usize] {
        &self.clk
    }

    #[inline]
    pub fn rst(&self) -> &[usize] {
        &self.rst
    }

    /// Rebuild the per-kind wire lists. Called once the parser has settled
    /// every wire's final kind (flip-flop connection turns wires into
    /// PPI/PPO).
    pub fn classify_wires(&mut self) {
        self.pi.clear();
        self.po.clear();
        self.ppi.clear();
        self.ppo.clear();
        self.clk.clear();
        self.rst.clear();
        for w in self.wires.iter() {
            match w.kind {
                WireKind::Pi => self.pi.push(w.var),
                WireKind::Po => self.po.push(w.var),
                WireKind::Ppi => self.ppi.push(w.var),
                WireKind::Ppo => self.ppo.push(w.var),
                WireKind::Clk => self.clk.push(w.var),
                WireKind::Rst => self.rst.push(w.var),
                WireKind::Normal => (),
            }
        }
    }

    /// Generate every combinational gate's clause template.
    pub fn build_cnf(&mut self) {
        for gate in self.gates.iter_mut() {
            gate.cnf = cnf::template(gate);
        }
    }
}
