//! End-to-end runs of the search strategies on small hand-built and
//! parsed models.

use ctgen::circuit::{parse as netlist, Circuit, DffPort, GateKind, WireKind};
use ctgen::cover::{
    parse as covspec, Bin, CoverGroup, CoverPoint, CoverVariable, CrossBin, StateBin, VarKind,
};
use ctgen::interval::IntervalSet;
use ctgen::{Options, Strategy, Tpg};

fn values(vals: &[u64]) -> IntervalSet {
    let mut s = IntervalSet::new();
    for &v in vals {
        s.insert(v);
    }
    s
}

fn range(lo: u64, hi: u64) -> IntervalSet {
    let mut s = IntervalSet::new();
    s.insert_range(lo, hi);
    s
}

fn empty_circuit() -> Circuit {
    let mut c = Circuit::new("empty");
    c.classify_wires();
    c.build_cnf();
    c
}

fn opts(strategy: Strategy, max_depth: usize) -> Options {
    let mut o = Options::default();
    o.strategy = strategy;
    o.max_depth = max_depth;
    o
}

/// A free (LOCAL) variable of `width` bits with one bin per value.
fn value_bins_group(width: usize) -> CoverGroup {
    let mut g = CoverGroup::new();
    let mut v = CoverVariable::new("v", VarKind::Local, width);
    v.freeze_origin().unwrap();
    let var = g.add_variable(v);
    let mut bins = Vec::new();
    for val in 0..1u64 << width {
        bins.push(g.add_bin(Bin::State(StateBin::new(
            format!("v[{val}]"),
            false,
            var,
            width - 1,
            0,
            values(&[val]),
        ))));
    }
    g.add_point(CoverPoint {
        name: "cp_v".to_string(),
        var,
        msb: width - 1,
        lsb: 0,
        bins,
    });
    g
}

#[test]
fn four_value_bins_covered_at_frame_zero() {
    let mut tpg = Tpg::new(opts(Strategy::Incremental, 0), empty_circuit(), value_bins_group(2));
    let summary = tpg.run();
    assert_eq!(summary.models, 4);
    assert_eq!(summary.solved, 4);
    assert!(summary.unsolved.is_empty());
    // disjoint single-value bins: every model retires exactly one
    assert_eq!(tpg.statistic.num_solve, 4);
}

#[test]
fn range_bin_records_a_value_in_range() {
    let mut g = CoverGroup::new();
    let mut v = CoverVariable::new("v", VarKind::Local, 4);
    v.freeze_origin().unwrap();
    let var = g.add_variable(v);
    let id = g.add_bin(Bin::State(StateBin::new("mid", false, var, 3, 0, range(5, 10))));
    g.add_point(CoverPoint {
        name: "cp".to_string(),
        var,
        msb: 3,
        lsb: 0,
        bins: vec![id],
    });
    let mut tpg = Tpg::new(opts(Strategy::Incremental, 0), empty_circuit(), g);
    let summary = tpg.run();
    assert_eq!(summary.solved, 1);
    assert!(summary.unsolved.is_empty());
    let val = tpg.cover().variable(0).value(0);
    assert!((5..=10).contains(&val), "recorded {val}");
}

/// One primary input; bound 1-bit variable with a bin per value. The
/// input is pinned low at frame 0, so bin {1} is unsatisfiable alone
/// there; MSPSAT must drop it for the frame only and retire it at frame 1.
#[test]
fn mspsat_retries_dropped_bin_at_later_frame() {
    let mut c = Circuit::new("pi");
    let w = c.add_wire("in", WireKind::Pi);
    c.classify_wires();
    c.build_cnf();
    let mut g = CoverGroup::new();
    let mut v = CoverVariable::new("in", VarKind::Pi, 1);
    v.bind_bit(0, w);
    v.freeze_origin().unwrap();
    let var = g.add_variable(v);
    let b0 = g.add_bin(Bin::State(StateBin::new("low", false, var, 0, 0, values(&[0]))));
    let b1 = g.add_bin(Bin::State(StateBin::new("high", false, var, 0, 0, values(&[1]))));
    g.add_point(CoverPoint {
        name: "cp_in".to_string(),
        var,
        msb: 0,
        lsb: 0,
        bins: vec![b0, b1],
    });
    let mut tpg = Tpg::new(opts(Strategy::Mspsat, 1), c, g);
    let summary = tpg.run();
    assert_eq!(summary.models, 2);
    assert_eq!(summary.solved, 2);
    assert!(summary.unsolved.is_empty());
    // one UNSAT probe for the pinned bin, two models
    assert_eq!(tpg.statistic.num_solve, 3);
}

/// d -> DFF -> q. q is pinned at frame 0 and driven by the pinned input
/// at frame 1, so q = 1 first becomes reachable at frame 2.
#[test]
fn state_bin_needs_two_frames() {
    let mut c = Circuit::new("ff");
    let d = c.add_wire("d", WireKind::Pi);
    let q = c.add_wire("q", WireKind::Ppi);
    c.add_dff_gate(GateKind::Dff, vec![d], vec![q], vec![DffPort::Q]);
    c.classify_wires();
    c.build_cnf();
    let mut g = CoverGroup::new();
    let mut v = CoverVariable::new("q", VarKind::Ppi, 1);
    v.bind_bit(0, q);
    v.freeze_origin().unwrap();
    let var = g.add_variable(v);
    let id = g.add_bin(Bin::State(StateBin::new("set", false, var, 0, 0, values(&[1]))));
    g.add_point(CoverPoint {
        name: "cp_q".to_string(),
        var,
        msb: 0,
        lsb: 0,
        bins: vec![id],
    });
    let mut tpg = Tpg::new(opts(Strategy::Incremental, 2), c, g);
    let summary = tpg.run();
    assert_eq!(summary.models, 1);
    assert!(summary.unsolved.is_empty());
    assert_eq!(tpg.statistic.num_solve, 3);
    assert_eq!(tpg.cover().variable(0).value(2), 1);
}

/// Threshold 2 with diversification: frame 0 admits exactly one input
/// assignment, so after one model the frame closes; the second hit lands
/// at frame 1.
#[test]
fn threshold_two_needs_two_models() {
    let mut g = CoverGroup::new();
    let mut v = CoverVariable::new("v", VarKind::Local, 1);
    v.freeze_origin().unwrap();
    let var = g.add_variable(v);
    let id = g.add_bin(Bin::State(StateBin::new("set", false, var, 0, 0, values(&[1]))));
    g.add_point(CoverPoint {
        name: "cp".to_string(),
        var,
        msb: 0,
        lsb: 0,
        bins: vec![id],
    });
    let mut o = opts(Strategy::Incremental, 1);
    o.cov_threshold = 2;
    let mut tpg = Tpg::new(o, empty_circuit(), g);
    let summary = tpg.run();
    assert_eq!(summary.models, 2);
    assert_eq!(summary.solved, 1);
    assert!(summary.unsolved.is_empty());
}

/// Two primary inputs (pinned at frame 0), a free variable, and a cross
/// requiring both to be 1: every strategy covers the whole model within
/// one extra frame.
fn mixed_model() -> (Circuit, CoverGroup) {
    let mut c = Circuit::new("mixed");
    let a0 = c.add_wire("a[0]", WireKind::Pi);
    let a1 = c.add_wire("a[1]", WireKind::Pi);
    c.classify_wires();
    c.build_cnf();
    let mut g = CoverGroup::new();
    let mut va = CoverVariable::new("a", VarKind::Pi, 2);
    va.bind_bit(0, a0);
    va.bind_bit(1, a1);
    va.freeze_origin().unwrap();
    let va = g.add_variable(va);
    let mut vm = CoverVariable::new("m", VarKind::Local, 2);
    vm.freeze_origin().unwrap();
    let vm = g.add_variable(vm);
    let mut a_bins = Vec::new();
    let mut m_bins = Vec::new();
    for val in 0..4u64 {
        a_bins.push(g.add_bin(Bin::State(StateBin::new(
            format!("a[{val}]"),
            false,
            va,
            1,
            0,
            values(&[val]),
        ))));
        m_bins.push(g.add_bin(Bin::State(StateBin::new(
            format!("m[{val}]"),
            false,
            vm,
            1,
            0,
            values(&[val]),
        ))));
    }
    let cross_bin = g.add_bin(Bin::Cross(CrossBin::new(
        "both_one",
        false,
        vec![vec![a_bins[1], m_bins[1]]],
    )));
    g.add_point(CoverPoint {
        name: "cp_a".to_string(),
        var: va,
        msb: 1,
        lsb: 0,
        bins: a_bins,
    });
    g.add_point(CoverPoint {
        name: "cp_m".to_string(),
        var: vm,
        msb: 1,
        lsb: 0,
        bins: m_bins,
    });
    g.add_cross(ctgen::cover::Cross {
        name: "axm".to_string(),
        points: vec![0, 1],
        bins: vec![cross_bin],
    });
    (c, g)
}

#[test]
fn every_strategy_covers_the_mixed_model() {
    for strategy in [
        Strategy::Incremental,
        Strategy::Grouped,
        Strategy::Mspsat,
        Strategy::NonIncremental,
        Strategy::Single,
    ] {
        let (c, g) = mixed_model();
        let mut tpg = Tpg::new(opts(strategy, 1), c, g);
        let summary = tpg.run();
        assert!(
            summary.unsolved.is_empty(),
            "{strategy:?} left {:?} unsolved",
            summary.unsolved
        );
        assert_eq!(summary.solved, 9, "{strategy:?}");
    }
}

#[test]
fn random_grouping_covers_the_mixed_model() {
    let (c, g) = mixed_model();
    let mut o = opts(Strategy::Grouped, 1);
    o.rand_group = Some(2);
    o.rseed = 7;
    let mut tpg = Tpg::new(o, c, g);
    let summary = tpg.run();
    assert!(summary.unsolved.is_empty());
}

#[test]
fn missing_bins_file_falls_back_to_every_bin() {
    let (c, g) = mixed_model();
    let mut o = opts(Strategy::Incremental, 1);
    o.bins = Some("/nonexistent/bins.list".to_string());
    let tpg = Tpg::new(o, c, g);
    assert_eq!(tpg.num_uncovered(), 9);
}

const COUNTER: &str = "
module counter2 (clk, rst, en, count);
  input clk, rst, en;
  output [1:0] count;
  wire [1:0] count;
  wire n1, n2, n3;

  XOR2X1 U1 (.A(count[0]), .B(en), .Y(n1));
  AND2X1 U2 (.A(count[0]), .B(en), .Y(n2));
  XOR2X1 U3 (.A(count[1]), .B(n2), .Y(n3));
  DFFRX1 R0 (.D(n1), .CK(clk), .RN(rst), .Q(count[0]));
  DFFRX1 R1 (.D(n3), .CK(clk), .RN(rst), .Q(count[1]));
endmodule
";

const COUNTER_COVER: &str = "
bit [1:0] count; // PPI
bit en; // PI

covergroup cg @(posedge clk);
  cp_count: coverpoint count {
    bins zero  = {0};
    bins one   = {1};
    bins two   = {2};
    bins three = {3};
  }
  cp_en: coverpoint en;
  x: cross cp_count, cp_en {
    bins c = binsof(cp_count) intersect {[2:3]} && binsof(cp_en.auto[1]);
  }
endgroup
";

/// Full frontend-to-controller run: a 2-bit enabled counter must walk
/// through all four values and the high-count-while-enabled cross.
#[test_log::test]
fn counter_walks_through_every_bin() {
    let circuit = netlist::parse_str("counter2.v", COUNTER).unwrap();
    let cover = covspec::parse_str(&circuit, "counter.cg", COUNTER_COVER).unwrap();
    // 4 explicit + 2 auto + 1 cross
    assert_eq!(cover.num_bins(), 7);
    let mut tpg = Tpg::new(opts(Strategy::Incremental, 4), circuit, cover);
    let summary = tpg.run();
    assert!(summary.unsolved.is_empty(), "unsolved: {:?}", summary.unsolved);
    assert_eq!(summary.solved, 7);
}

/// The same model solved by the minisat backend.
#[test_log::test]
fn counter_with_minisat_backend() {
    let circuit = netlist::parse_str("counter2.v", COUNTER).unwrap();
    let cover = covspec::parse_str(&circuit, "counter.cg", COUNTER_COVER).unwrap();
    let mut o = opts(Strategy::Incremental, 4);
    o.minisat = true;
    let mut tpg = Tpg::new(o, circuit, cover);
    assert!(tpg.run().unsolved.is_empty());
}

/// Excluded bins are modeled but never selected as targets.
#[test]
fn ignored_bins_are_not_searched() {
    let circuit = empty_circuit();
    let spec = "
bit [1:0] v; // LOCAL
covergroup cg;
  cp: coverpoint v {
    bins lo = {[0:1]};
    ignore_bins hi = {[2:3]};
  }
endgroup
";
    let cover = covspec::parse_str(&circuit, "cg", spec).unwrap();
    assert_eq!(cover.num_bins(), 2);
    let tpg = Tpg::new(opts(Strategy::Incremental, 0), circuit, cover);
    assert_eq!(tpg.num_uncovered(), 1);
}
