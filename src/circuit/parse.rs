//! Structural-Verilog netlist frontend.
//!
//! Accepts the flat gate-level subset emitted by synthesis: `input` /
//! `output` / `wire` declarations (with `[h:l]` vectors), `assign`
//! aliases and constants, and standard-cell instantiations like
//! `NAND2X1 U3 (.A(n1), .B(n2), .Y(n3));`.

use super::{Circuit, DffPort, GateKind, WireKind};
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

pub fn parse_file(path: impl AsRef<Path>) -> Result<Circuit> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_str(&path.to_string_lossy(), &text)
}

pub fn parse_str(file: &str, text: &str) -> Result<Circuit> {
    let mut circuit = Circuit::new(file);
    let mut dffs: Vec<(usize, usize, Vec<(String, String)>)> = Vec::new();

    for (lno, stmt) in statements(text) {
        let stmt = stmt.trim();
        if stmt.is_empty() || stmt == "endmodule" {
            continue;
        }
        if let Some(rest) = stmt.strip_prefix("module") {
            let name = rest.split(['(', ' ']).find(|s| !s.is_empty()).unwrap_or("");
            circuit.name = name.to_string();
            continue;
        }
        if let Some(rest) = strip_decl(stmt, "input") {
            each_declared(rest, file, lno, |name| {
                circuit.add_wire(name, input_kind(name));
                Ok(())
            })?;
        } else if let Some(rest) = strip_decl(stmt, "output") {
            each_declared(rest, file, lno, |name| {
                circuit.add_wire(name, WireKind::Po);
                Ok(())
            })?;
        } else if let Some(rest) = strip_decl(stmt, "wire") {
            each_declared(rest, file, lno, |name| {
                circuit.add_wire(name, WireKind::Normal);
                Ok(())
            })?;
        } else if let Some(rest) = stmt.strip_prefix("assign") {
            parse_assign(&mut circuit, rest.trim(), file, lno)?;
        } else {
            parse_instance(&mut circuit, &mut dffs, stmt, file, lno)?;
        }
    }

    // Flip-flop connections reclassify their wires, so they are resolved
    // after every declaration has been seen.
    for (gate, lno, ports) in dffs {
        connect_dff(&mut circuit, gate, ports, file, lno)?;
    }
    circuit.classify_wires();
    circuit.build_cnf();
    Ok(circuit)
}

/// Split the source into `;`-terminated statements, tracking the line each
/// one starts on. Line comments are dropped.
fn statements(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut start = 1;
    for (idx, line) in text.lines().enumerate() {
        let line = match line.find("//") {
            Some(p) => &line[..p],
            None => line,
        };
        for c in line.chars() {
            if cur.trim().is_empty() {
                start = idx + 1;
            }
            if c == ';' {
                out.push((start, std::mem::take(&mut cur)));
            } else {
                cur.push(c);
            }
        }
        cur.push(' ');
    }
    let tail = cur.trim();
    if !tail.is_empty() {
        out.push((start, tail.to_string()));
    }
    out
}

fn strip_decl<'a>(stmt: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = stmt.strip_prefix(keyword)?;
    if rest.starts_with(|c: char| c.is_whitespace() || c == '[') {
        Some(rest.trim_start())
    } else {
        None
    }
}

/// Inputs named after the clock or the reset get their own kinds.
fn input_kind(name: &str) -> WireKind {
    let lower = name.to_ascii_lowercase();
    if lower.contains("clk") || lower.contains("clock") {
        WireKind::Clk
    } else if lower.contains("rst") || lower.contains("reset") {
        WireKind::Rst
    } else {
        WireKind::Pi
    }
}

/// Expand a declaration list: an optional `[h:l]` range prefixes the name
/// that follows it, producing one wire per bit named `name[i]`.
fn each_declared(
    rest: &str,
    file: &str,
    lno: usize,
    mut f: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    for tok in rest.split(',') {
        let tok: String = tok.chars().filter(|c| !c.is_whitespace()).collect();
        if tok.is_empty() {
            continue;
        }
        if let Some(body) = tok.strip_prefix('[') {
            let (range, name) = body
                .split_once(']')
                .ok_or_else(|| Error::parse(file, lno, format!("malformed range in `{tok}`")))?;
            let (h, l) = range
                .split_once(':')
                .ok_or_else(|| Error::parse(file, lno, format!("malformed range in `{tok}`")))?;
            let h: usize = h
                .parse()
                .map_err(|_| Error::parse(file, lno, format!("bad bound in `{tok}`")))?;
            let l: usize = l
                .parse()
                .map_err(|_| Error::parse(file, lno, format!("bad bound in `{tok}`")))?;
            for i in l..=h {
                f(&format!("{name}[{i}]"))?;
            }
        } else {
            f(&tok)?;
        }
    }
    Ok(())
}

fn wire_of(circuit: &Circuit, name: &str) -> Result<usize> {
    circuit
        .find_wire(name)
        .ok_or_else(|| Error::WireNotFound(name.to_string()))
}

fn parse_assign(circuit: &mut Circuit, rest: &str, file: &str, lno: usize) -> Result<()> {
    let (lhs, rhs) = rest
        .split_once('=')
        .ok_or_else(|| Error::parse(file, lno, "malformed assign"))?;
    let out = wire_of(circuit, lhs.trim())?;
    let rhs = rhs.trim();
    if rhs.ends_with("'b0") || rhs == "0" {
        circuit.add_gate(GateKind::Const0, vec![], vec![out]);
    } else if rhs.ends_with("'b1") || rhs == "1" {
        circuit.add_gate(GateKind::Const1, vec![], vec![out]);
    } else {
        let inp = wire_of(circuit, rhs)?;
        circuit.add_gate(GateKind::Buf, vec![inp], vec![out]);
    }
    Ok(())
}

fn parse_instance(
    circuit: &mut Circuit,
    dffs: &mut Vec<(usize, usize, Vec<(String, String)>)>,
    stmt: &str,
    file: &str,
    lno: usize,
) -> Result<()> {
    let head = stmt
        .split_whitespace()
        .next()
        .ok_or_else(|| Error::parse(file, lno, "empty statement"))?;
    let kind = gate_kind(head)
        .ok_or_else(|| Error::parse(file, lno, format!("unknown gate type `{head}`")))?;

    let ports = port_list(stmt, file, lno)?;
    if kind == GateKind::Dff {
        // resolved after all declarations
        let gate = circuit.add_dff_gate(GateKind::Dff, vec![], vec![], vec![]);
        dffs.push((gate, lno, ports));
        return Ok(());
    }

    // the output is the port named Y/Z/OUT, or failing that the last one
    let out_idx = ports
        .iter()
        .position(|(p, _)| is_output_port(p))
        .unwrap_or(ports.len() - 1);
    let mut inputs: Vec<(String, usize)> = Vec::new();
    let mut output = None;
    for (k, (port, wire)) in ports.into_iter().enumerate() {
        if wire == "1'b0" || wire == "1'b1" {
            log::warn!("{file}:{lno}: constant port {port} ignored");
            continue;
        }
        let w = wire_of(circuit, &wire)?;
        if k == out_idx {
            output = Some(w);
        } else {
            inputs.push((port, w));
        }
    }
    let output = output.ok_or_else(|| Error::parse(file, lno, "instance has no output port"))?;
    order_inputs(kind, &mut inputs);
    let inputs = inputs.into_iter().map(|(_, w)| w).collect();
    circuit.add_gate(kind, inputs, vec![output]);
    Ok(())
}

fn is_output_port(port: &str) -> bool {
    matches!(port, "Y" | "Z" | "OUT")
}

/// Put named inputs into the order the clause templates expect.
fn order_inputs(kind: GateKind, inputs: &mut [(String, usize)]) {
    let canon: &[&str] = match kind {
        GateKind::Mx2 => &["A", "B", "S0"],
        GateKind::Oai21 | GateKind::Aoi21 => &["A0", "A1", "B0"],
        _ => &["A", "B", "C", "D"],
    };
    inputs.sort_by_key(|(name, _)| canon.iter().position(|p| p == name).unwrap_or(usize::MAX));
}

fn port_list(stmt: &str, file: &str, lno: usize) -> Result<Vec<(String, String)>> {
    let mut ports = Vec::new();
    let mut rest = stmt;
    while let Some(dot) = rest.find('.') {
        rest = &rest[dot + 1..];
        let open = rest
            .find('(')
            .ok_or_else(|| Error::parse(file, lno, "malformed port connection"))?;
        let close = rest
            .find(')')
            .ok_or_else(|| Error::parse(file, lno, "malformed port connection"))?;
        let port: String = rest[..open].chars().filter(|c| !c.is_whitespace()).collect();
        let wire: String = rest[open + 1..close]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        ports.push((port, wire));
        rest = &rest[close + 1..];
    }
    if ports.is_empty() {
        return Err(Error::parse(file, lno, "instance has no port connections"));
    }
    Ok(ports)
}

fn connect_dff(
    circuit: &mut Circuit,
    gate: usize,
    ports: Vec<(String, String)>,
    file: &str,
    lno: usize,
) -> Result<()> {
    let mut d = None;
    let mut outputs = Vec::new();
    let mut dff_ports = Vec::new();
    let mut others = Vec::new();
    for (port, wire) in ports {
        let w = wire_of(circuit, &wire)?;
        match port.as_str() {
            "Q" => {
                outputs.push(w);
                dff_ports.push(DffPort::Q);
            }
            "QN" => {
                outputs.push(w);
                dff_ports.push(DffPort::Qn);
            }
            "D" => d = Some(w),
            _ => others.push(w),
        }
    }
    let d = d.ok_or_else(|| Error::parse(file, lno, "flip-flop without D port"))?;
    if outputs.is_empty() {
        return Err(Error::parse(file, lno, "flip-flop without Q/QN port"));
    }
    // state outputs become pseudo primary inputs, the driver a pseudo
    // primary output (unless it is a true primary input)
    for &o in outputs.iter() {
        circuit.set_wire_kind(o, WireKind::Ppi);
    }
    if circuit.wire(d).kind != WireKind::Pi {
        circuit.set_wire_kind(d, WireKind::Ppo);
    }
    let mut inputs = vec![d];
    inputs.extend(others);
    let g = &mut circuit.gates[gate];
    g.inputs = inputs;
    g.outputs = outputs;
    g.dff_ports = dff_ports;
    Ok(())
}

/// Map a cell name to its gate kind, stripping drive-strength suffixes:
/// `NAND2X1` and `NAND2X2` are both NAND2.
fn gate_kind(name: &str) -> Option<GateKind> {
    let mut name = name;
    loop {
        if let Some(kind) = lookup_kind(name) {
            return Some(kind);
        }
        match name.rfind('X') {
            Some(p) if p > 0 => name = &name[..p],
            _ => return None,
        }
    }
}

fn lookup_kind(name: &str) -> Option<GateKind> {
    Some(match name {
        "BUF" | "CLKBUF" => GateKind::Buf,
        "INV" => GateKind::Inv,
        "AND2" => GateKind::And2,
        "AND3" => GateKind::And3,
        "OR2" => GateKind::Or2,
        "OR3" => GateKind::Or3,
        "NAND2" => GateKind::Nand2,
        "NAND3" => GateKind::Nand3,
        "NAND4" => GateKind::Nand4,
        "NOR2" => GateKind::Nor2,
        "NOR3" => GateKind::Nor3,
        "XOR2" => GateKind::Xor2,
        "XNOR2" => GateKind::Xnor2,
        "MX2" => GateKind::Mx2,
        "OAI21" => GateKind::Oai21,
        "AOI21" => GateKind::Aoi21,
        "DFF" | "DFFR" | "DFFS" | "DFFSR" | "DFFHQ" | "DFFRHQ" | "DFFTR" => GateKind::Dff,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETLIST: &str = "
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

    #[test]
    fn parses_counter() {
        let c = parse_str("counter2.v", NETLIST).unwrap();
        assert_eq!(c.name, "counter2");
        assert_eq!(c.clk().len(), 1);
        assert_eq!(c.rst().len(), 1);
        assert_eq!(c.pi(), &[c.find_wire("en").unwrap()][..]);
        assert_eq!(c.ppi().len(), 2);
        assert_eq!(c.num_gates(), 5);
        let dff = c.gates().iter().find(|g| g.kind == GateKind::Dff).unwrap();
        assert_eq!(dff.inputs[0], c.find_wire("n1").unwrap());
        assert_eq!(dff.dff_ports, vec![DffPort::Q]);
    }

    #[test]
    fn drive_strength_and_assigns() {
        let src = "
module t (a, y);
  input a;
  output y;
  wire c0, b;
  assign c0 = 1'b0;
  assign b = a;
  NAND2X4 U1 (.A(a), .B(b), .Y(y));
endmodule
";
        let c = parse_str("t.v", src).unwrap();
        assert_eq!(c.num_gates(), 3);
        assert!(c.gates().iter().any(|g| g.kind == GateKind::Const0));
        assert!(c.gates().iter().any(|g| g.kind == GateKind::Nand2));
    }

    #[test]
    fn unknown_gate_rejected() {
        let src = "module t (y); output y; FOOBAR U1 (.Y(y)); endmodule";
        assert!(parse_str("t.v", src).is_err());
    }
}
