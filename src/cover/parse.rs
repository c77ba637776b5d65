//! Covergroup specification frontend.
//!
//! Accepts the SystemVerilog-flavoured subset:
//!
//! ```text
//! bit [3:0] count; // PPI
//! covergroup cg @(posedge clk);
//!   cp_count: coverpoint count {
//!     bins low  = {0,1,[2:5]};
//!     bins high = {[6:$]};
//!   }
//!   coverpoint mode;
//!   axb: cross cp_count, mode {
//!     bins corner = binsof(cp_count.low) && binsof(mode) intersect {0} ||
//!                   binsof(cp_count.high);
//!   }
//! endgroup
//! ```
//!
//! Variable declarations carry their circuit binding as a trailing
//! comment: `PI` and `PPI` bind by wire name and bit index, `LOCAL`
//! variables stay free.

use super::{
    Bin, BinId, CoverGroup, CoverPoint, CoverVariable, Cross, CrossBin, StateBin, VarKind,
    AUTO_BIN_MAX,
};
use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::interval::IntervalSet;
use std::fs;
use std::path::Path;

pub fn parse_file(circuit: &Circuit, path: impl AsRef<Path>) -> Result<CoverGroup> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_str(circuit, &path.to_string_lossy(), &text)
}

pub fn parse_str(circuit: &Circuit, file: &str, text: &str) -> Result<CoverGroup> {
    let mut group = CoverGroup::new();
    let mut reader = Reader::new(file, text);
    while let Some((lno, line)) = reader.next_line() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("bit") {
            parse_variable(circuit, &mut group, &line, file, lno)?;
        } else if let Some(rest) = line.strip_prefix("covergroup") {
            let end = rest.find(['@', ';']).unwrap_or(rest.len());
            group.name = rest[..end].to_string();
        } else if is_decl(&line, "coverpoint") {
            parse_point(&mut group, &mut reader, line, lno)?;
        } else if is_decl(&line, "cross") {
            parse_cross(&mut group, &mut reader, line, lno)?;
        } else if line.starts_with("endgroup") {
            continue;
        } else {
            log::warn!("{file}:{lno}: skipping unrecognized line `{line}`");
        }
    }
    Ok(group)
}

/// Yields lines with every blank stripped, like the rest of the parser
/// expects.
struct Reader<'a> {
    file: &'a str,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Reader<'a> {
    fn new(file: &'a str, text: &'a str) -> Self {
        Self {
            file,
            lines: text.lines().enumerate(),
        }
    }

    fn next_line(&mut self) -> Option<(usize, String)> {
        self.lines
            .next()
            .map(|(i, l)| (i + 1, l.chars().filter(|c| !c.is_whitespace()).collect()))
    }

    /// Next line, joined with its continuations until it ends with `;`
    /// or consists of the closing `}`.
    fn next_item(&mut self) -> Result<(usize, String)> {
        let (lno, mut s) = self
            .next_line()
            .ok_or_else(|| Error::parse(self.file, 0, "unexpected end of file in bin list"))?;
        if s.starts_with('}') {
            return Ok((lno, s));
        }
        while !s.ends_with(';') {
            let (_, cont) = self
                .next_line()
                .ok_or_else(|| Error::parse(self.file, lno, "unterminated bin"))?;
            s.push_str(&cont);
        }
        Ok((lno, s))
    }
}

fn is_decl(line: &str, keyword: &str) -> bool {
    if line.starts_with(keyword) {
        return true;
    }
    match line.split_once(':') {
        Some((_, rest)) => rest.starts_with(keyword),
        None => false,
    }
}

fn parse_variable(
    circuit: &Circuit,
    group: &mut CoverGroup,
    line: &str,
    file: &str,
    lno: usize,
) -> Result<()> {
    let (decl, kind) = line
        .split_once("//")
        .ok_or_else(|| Error::parse(file, lno, "variable declaration without type comment"))?;
    let kind = match kind {
        "PI" => VarKind::Pi,
        "PPI" => VarKind::Ppi,
        "LOCAL" => VarKind::Local,
        other => {
            return Err(Error::parse(file, lno, format!("unknown variable type `{other}`")))
        }
    };
    let decl = decl
        .strip_prefix("bit")
        .ok_or_else(|| Error::parse(file, lno, "expected `bit` declaration"))?;
    let (width, name) = if let Some(body) = decl.strip_prefix('[') {
        let (range, rest) = body
            .split_once(']')
            .ok_or_else(|| Error::parse(file, lno, "malformed bit range"))?;
        let (h, l) = range
            .split_once(':')
            .ok_or_else(|| Error::parse(file, lno, "malformed bit range"))?;
        let h: usize = h
            .parse()
            .map_err(|_| Error::parse(file, lno, "bad bit range bound"))?;
        let l: usize = l
            .parse()
            .map_err(|_| Error::parse(file, lno, "bad bit range bound"))?;
        if h < l {
            return Err(Error::parse(file, lno, "bit range msb below lsb"));
        }
        if l != 0 {
            log::warn!("{file}:{lno}: lsb of `{rest}` is not 0");
        }
        (h - l + 1, rest)
    } else {
        (1, decl)
    };
    let name = name.trim_end_matches(';');
    if width == 0 || width >= 64 {
        return Err(Error::parse(file, lno, format!("unsupported bit width {width}")));
    }
    let mut var = CoverVariable::new(name, kind, width);

    let wires = match kind {
        VarKind::Pi => circuit.pi(),
        VarKind::Ppi => circuit.ppi(),
        VarKind::Local => &[],
    };
    for &w in wires {
        let wname = &circuit.wire(w).name;
        let (base, bit) = match wname.split_once('[') {
            Some((base, idx)) => {
                let idx = idx
                    .trim_end_matches(']')
                    .parse::<usize>()
                    .map_err(|_| Error::WireNotFound(wname.clone()))?;
                (base, idx)
            }
            None => (wname.as_str(), 0),
        };
        if base == name {
            if bit >= width {
                return Err(Error::parse(
                    file,
                    lno,
                    format!("wire {wname} outside the declared width of {name}"),
                ));
            }
            var.bind_bit(bit, w);
        }
    }
    var.freeze_origin()?;
    group.add_variable(var);
    Ok(())
}

/// Parse `NAME: coverpoint VAR[slice]` with an optional `{ bins ... }`
/// body; without a body every value of the slice gets an automatic bin.
fn parse_point(
    group: &mut CoverGroup,
    reader: &mut Reader,
    line: String,
    lno: usize,
) -> Result<()> {
    let file = reader.file.to_string();
    let implicit = line.ends_with(';');
    let line = line.trim_end_matches([';', '{']);
    let (name, expr) = match line.split_once(':') {
        Some((name, rest)) => {
            let expr = rest
                .strip_prefix("coverpoint")
                .ok_or_else(|| Error::parse(&file, lno, "expected `coverpoint`"))?;
            (name.to_string(), expr)
        }
        None => {
            let expr = line
                .strip_prefix("coverpoint")
                .ok_or_else(|| Error::parse(&file, lno, "expected `coverpoint`"))?;
            (expr.to_string(), expr)
        }
    };
    let pidx = create_point(group, name, expr, &file, lno)?;
    if implicit {
        let max = group.point(pidx).max_value();
        let mut all = IntervalSet::new();
        all.insert_range(0, max);
        add_value_bins(group, pidx, "auto", &all, false);
        return Ok(());
    }
    loop {
        let (blno, item) = reader.next_item()?;
        if item.starts_with('}') {
            break;
        }
        parse_bin(group, pidx, &item, &file, blno)?;
    }
    Ok(())
}

/// Create a coverpoint over `expr`, which is a variable name with an
/// optional `[msb:lsb]` or `[idx]` slice.
fn create_point(
    group: &mut CoverGroup,
    name: String,
    expr: &str,
    file: &str,
    lno: usize,
) -> Result<usize> {
    let (var_name, msb, lsb) = match expr.split_once('[') {
        Some((base, slice)) => {
            let slice = slice.trim_end_matches(']');
            let (msb, lsb) = match slice.split_once(':') {
                Some((m, l)) => (
                    m.parse::<usize>()
                        .map_err(|_| Error::parse(file, lno, "bad slice bound"))?,
                    l.parse::<usize>()
                        .map_err(|_| Error::parse(file, lno, "bad slice bound"))?,
                ),
                None => {
                    let i = slice
                        .parse::<usize>()
                        .map_err(|_| Error::parse(file, lno, "bad slice index"))?;
                    (i, i)
                }
            };
            (base, msb, lsb)
        }
        None => {
            let var = group.find_variable(expr)?;
            let width = group.variable(var).width;
            (expr, width - 1, 0)
        }
    };
    if msb < lsb {
        return Err(Error::parse(file, lno, "slice msb below lsb"));
    }
    let var = group.find_variable(var_name)?;
    Ok(group.add_point(CoverPoint {
        name,
        var,
        msb,
        lsb,
        bins: Vec::new(),
    }))
}

fn parse_bin(
    group: &mut CoverGroup,
    pidx: usize,
    item: &str,
    file: &str,
    lno: usize,
) -> Result<()> {
    let mut s = item;
    if s.starts_with("wildcard") {
        return Err(Error::Unsupported("wildcard bins".to_string()));
    }
    let mut excluded = false;
    if let Some(rest) = s.strip_prefix("ignore_") {
        excluded = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix("illegal_") {
        excluded = true;
        s = rest;
    }
    let s = s
        .strip_prefix("bins")
        .ok_or_else(|| Error::parse(file, lno, "expected `bins`"))?;
    if !s.contains('{') {
        return Err(Error::Unsupported("transition bins".to_string()));
    }
    let (name, values) = s
        .split_once('=')
        .ok_or_else(|| Error::parse(file, lno, "malformed bin"))?;
    let max = group.point(pidx).max_value();
    let values = parse_values(values, max, file, lno)?;
    if values.is_empty() {
        return Err(Error::parse(file, lno, "bin with an empty value set"));
    }

    if let Some(base) = name.strip_suffix("[]") {
        // a bin vector, one bin per value
        add_value_bins(group, pidx, base, &values, excluded);
        return Ok(());
    }
    if name.contains('[') {
        return Err(Error::Unsupported("fixed-size bin vectors".to_string()));
    }
    let point = group.point(pidx);
    let bin = StateBin::new(name, excluded, point.var, point.msb, point.lsb, values);
    let id = group.add_bin(Bin::State(bin));
    group.points[pidx].bins.push(id);
    Ok(())
}

/// One bin per value of `values`, named `base[v]`; beyond the auto-bin
/// cap the values collapse into equally sized ranged bins instead.
fn add_value_bins(
    group: &mut CoverGroup,
    pidx: usize,
    base: &str,
    values: &IntervalSet,
    excluded: bool,
) {
    let point = group.point(pidx);
    let (var, msb, lsb) = (point.var, point.msb, point.lsb);
    let count = values.count();
    let mut add = |name: String, vals: IntervalSet| {
        let id = group.add_bin(Bin::State(StateBin::new(name, excluded, var, msb, lsb, vals)));
        group.points[pidx].bins.push(id);
    };
    if count <= AUTO_BIN_MAX {
        for (lo, hi) in values.iter() {
            for v in lo..=hi {
                let mut single = IntervalSet::new();
                single.insert(v);
                add(format!("{base}[{v}]"), single);
            }
        }
    } else {
        let size = count / AUTO_BIN_MAX;
        for k in 0..AUTO_BIN_MAX {
            let l_pos = k * size;
            let h_pos = if k == AUTO_BIN_MAX - 1 {
                count - 1
            } else {
                l_pos + size - 1
            };
            let (lo, hi) = (values.nth(l_pos), values.nth(h_pos));
            add(format!("{base}[{lo}:{hi}]"), values.clip(lo, hi));
        }
    }
}

/// Parse `{v, [l:h], [$:h], [l:$]}`; open bounds clamp to 0 and to the
/// slice maximum.
fn parse_values(s: &str, max: u64, file: &str, lno: usize) -> Result<IntervalSet> {
    let open = s
        .find('{')
        .ok_or_else(|| Error::parse(file, lno, "expected `{`"))?;
    let close = s
        .find('}')
        .ok_or_else(|| Error::parse(file, lno, "expected `}`"))?;
    let mut out = IntervalSet::new();
    for item in s[open + 1..close].split(',') {
        if item.is_empty() {
            continue;
        }
        let (lo, hi) = parse_value_item(item, max, file, lno)?;
        if lo > hi {
            return Err(Error::parse(file, lno, format!("empty range `{item}`")));
        }
        if hi > max {
            return Err(Error::parse(
                file,
                lno,
                format!("value {hi} exceeds the slice maximum {max}"),
            ));
        }
        out.insert_range(lo, hi);
    }
    Ok(out)
}

fn parse_value_item(item: &str, max: u64, file: &str, lno: usize) -> Result<(u64, u64)> {
    if let Some(body) = item.strip_prefix('[') {
        let body = body.trim_end_matches(']');
        let (l, h) = body
            .split_once(':')
            .ok_or_else(|| Error::parse(file, lno, format!("malformed range `{item}`")))?;
        let lo = if l == "$" {
            0
        } else {
            l.parse()
                .map_err(|_| Error::parse(file, lno, format!("bad value `{l}`")))?
        };
        let hi = if h == "$" {
            max
        } else {
            h.parse()
                .map_err(|_| Error::parse(file, lno, format!("bad value `{h}`")))?
        };
        Ok((lo, hi))
    } else {
        let v = item
            .parse()
            .map_err(|_| Error::parse(file, lno, format!("bad value `{item}`")))?;
        Ok((v, v))
    }
}

/// Parse `NAME: cross cp_a, cp_b` with an optional bin body. Crossing a
/// raw variable creates an implicit coverpoint with automatic bins.
fn parse_cross(
    group: &mut CoverGroup,
    reader: &mut Reader,
    line: String,
    lno: usize,
) -> Result<()> {
    let file = reader.file.to_string();
    let implicit = line.ends_with(';');
    let line = line.trim_end_matches([';', '{']);
    let (name, expr) = match line.split_once(':') {
        Some((name, rest)) => {
            let expr = rest
                .strip_prefix("cross")
                .ok_or_else(|| Error::parse(&file, lno, "expected `cross`"))?;
            (name.to_string(), expr)
        }
        None => {
            let expr = line
                .strip_prefix("cross")
                .ok_or_else(|| Error::parse(&file, lno, "expected `cross`"))?;
            (expr.to_string(), expr)
        }
    };
    let mut points = Vec::new();
    for tok in expr.split(',') {
        if tok.is_empty() {
            continue;
        }
        let pidx = match group.find_point(tok) {
            Some(p) => p,
            None => {
                // a bare variable: build a coverpoint for it on the fly
                let pidx = create_point(group, tok.to_string(), tok, &file, lno)?;
                let max = group.point(pidx).max_value();
                let mut all = IntervalSet::new();
                all.insert_range(0, max);
                add_value_bins(group, pidx, "auto", &all, false);
                pidx
            }
        };
        points.push(pidx);
    }
    let cidx = group.add_cross(Cross {
        name,
        points,
        bins: Vec::new(),
    });
    if implicit {
        log::warn!("{file}:{lno}: cross without user-specified bins has no targets");
        return Ok(());
    }
    loop {
        let (blno, item) = reader.next_item()?;
        if item.starts_with('}') {
            break;
        }
        parse_cross_bin(group, cidx, &item, &file, blno)?;
    }
    Ok(())
}

fn parse_cross_bin(
    group: &mut CoverGroup,
    cidx: usize,
    item: &str,
    file: &str,
    lno: usize,
) -> Result<()> {
    let mut s = item;
    let mut excluded = false;
    if let Some(rest) = s.strip_prefix("ignore_bins") {
        excluded = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix("illegal_bins") {
        excluded = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix("bins") {
        s = rest;
    }
    let (name, spec) = s
        .split_once('=')
        .ok_or_else(|| Error::parse(file, lno, "malformed cross bin"))?;
    let spec = spec.trim_end_matches(';');
    let points = group.crosses[cidx].points.clone();
    let products = eval_selection(group, &points, spec, file, lno)?;
    let id = group.add_bin(Bin::Cross(CrossBin::new(name, excluded, products)));
    group.crosses[cidx].bins.push(id);
    Ok(())
}

/// Evaluate a cross selection into its product tuples. `||` separates
/// unioned selections; within one, `&&`-joined `binsof` terms each narrow
/// one coverpoint, and coverpoints left unnamed contribute all their bins.
fn eval_selection(
    group: &CoverGroup,
    points: &[usize],
    spec: &str,
    file: &str,
    lno: usize,
) -> Result<Vec<Vec<BinId>>> {
    let mut products = Vec::new();
    for segment in spec.split("||") {
        let mut chosen: Vec<Option<Vec<BinId>>> = vec![None; points.len()];
        for sel in segment.split("&&") {
            let (negative, sel) = match sel.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, sel),
            };
            let body = sel
                .strip_prefix("binsof(")
                .ok_or_else(|| Error::parse(file, lno, format!("expected `binsof` in `{sel}`")))?;
            let close = body
                .find(')')
                .ok_or_else(|| Error::parse(file, lno, "unclosed `binsof`"))?;
            let target = &body[..close];
            let rest = &body[close + 1..];
            let (point_name, bin_name) = match target.split_once('.') {
                Some((p, b)) => (p, Some(b)),
                None => (target, None),
            };
            let slot = points
                .iter()
                .position(|&p| group.point(p).name == point_name)
                .ok_or_else(|| Error::CoverPointNotFound(point_name.to_string()))?;
            if chosen[slot].is_some() {
                return Err(Error::parse(
                    file,
                    lno,
                    format!("coverpoint {point_name} selected twice"),
                ));
            }
            let point = group.point(points[slot]);
            let selected = if let Some(bin_name) = bin_name {
                point
                    .bins
                    .iter()
                    .copied()
                    .filter(|&b| group.bin(b).name() == bin_name)
                    .collect()
            } else if let Some(body) = rest.strip_prefix("intersect") {
                select_intersect(group, point, body, negative, file, lno)?
            } else {
                point.bins.clone()
            };
            chosen[slot] = Some(selected);
        }
        let chosen: Vec<Vec<BinId>> = chosen
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.unwrap_or_else(|| group.point(points[i]).bins.clone()))
            .collect();
        // mixed-radix enumeration, first coverpoint varying fastest
        let total: usize = chosen.iter().map(|c| c.len()).product();
        for mut t in 0..total {
            let mut tuple = Vec::with_capacity(chosen.len());
            for c in chosen.iter() {
                tuple.push(c[t % c.len()]);
                t /= c.len();
            }
            products.push(tuple);
        }
    }
    Ok(products)
}

/// `intersect {…}` bin selection: a bin qualifies when its value set
/// reaches below an open `[$:h]` bound, above an open `[l:$]` bound, or
/// meets any closed item; negation selects the complement.
fn select_intersect(
    group: &CoverGroup,
    point: &CoverPoint,
    body: &str,
    negative: bool,
    file: &str,
    lno: usize,
) -> Result<Vec<BinId>> {
    let open = body
        .find('{')
        .ok_or_else(|| Error::parse(file, lno, "expected `{` after intersect"))?;
    let close = body
        .find('}')
        .ok_or_else(|| Error::parse(file, lno, "expected `}` after intersect"))?;
    let mut le: Option<u64> = None;
    let mut ge: Option<u64> = None;
    let mut explicit = IntervalSet::new();
    for item in body[open + 1..close].split(',') {
        if item.is_empty() {
            continue;
        }
        if let Some(ib) = item.strip_prefix('[') {
            let ib = ib.trim_end_matches(']');
            let (l, h) = ib
                .split_once(':')
                .ok_or_else(|| Error::parse(file, lno, format!("malformed range `{item}`")))?;
            if l == "$" {
                let h: u64 = h
                    .parse()
                    .map_err(|_| Error::parse(file, lno, format!("bad value `{h}`")))?;
                le = Some(le.map_or(h, |cur| cur.min(h)));
                continue;
            }
            if h == "$" {
                let l: u64 = l
                    .parse()
                    .map_err(|_| Error::parse(file, lno, format!("bad value `{l}`")))?;
                ge = Some(ge.map_or(l, |cur| cur.max(l)));
                continue;
            }
            let l: u64 = l
                .parse()
                .map_err(|_| Error::parse(file, lno, format!("bad value `{l}`")))?;
            let h: u64 = h
                .parse()
                .map_err(|_| Error::parse(file, lno, format!("bad value `{h}`")))?;
            explicit.insert_range(l, h);
        } else {
            let v: u64 = item
                .parse()
                .map_err(|_| Error::parse(file, lno, format!("bad value `{item}`")))?;
            explicit.insert(v);
        }
    }
    let mut out = Vec::new();
    for &b in point.bins.iter() {
        let Bin::State(sb) = group.bin(b) else {
            continue;
        };
        let le_match = le.is_some_and(|x| sb.values.has_value_le(x));
        let ge_match = ge.is_some_and(|x| sb.values.has_value_ge(x));
        let int_match = sb.values.intersects(&explicit);
        let keep = if negative {
            !le_match && !ge_match && !int_match
        } else {
            le_match || ge_match || int_match
        };
        if keep {
            out.push(b);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, WireKind};

    fn pi_circuit() -> Circuit {
        let mut c = Circuit::new("t");
        for i in 0..4 {
            c.add_wire(format!("data[{i}]"), WireKind::Pi);
        }
        c.add_wire("mode", WireKind::Pi);
        c.classify_wires();
        c.build_cnf();
        c
    }

    #[test]
    fn variables_bind_to_wires() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
bit mode; // PI
bit [2:0] scratch; // LOCAL
";
        let g = parse_str(&c, "cg", spec).unwrap();
        assert_eq!(g.num_variables(), 3);
        assert_eq!(g.variable(0).width, 4);
        assert_eq!(g.variable(0).bit_vars(3, 0), vec![0, 1, 2, 3]);
        assert_eq!(g.variable(1).bit_vars(0, 0), vec![4]);
        assert_eq!(g.variable(2).kind, VarKind::Local);
    }

    #[test]
    fn unbound_variable_is_fatal() {
        let c = pi_circuit();
        assert!(parse_str(&c, "cg", "bit [3:0] nosuch; // PI").is_err());
    }

    #[test]
    fn explicit_bins_and_open_ranges() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
covergroup cg;
  cp: coverpoint data {
    bins lo  = {[$:3]};
    bins hi  = {[12:$]};
    bins mix = {0, 2, [5:7]};
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        assert_eq!(g.num_bins(), 3);
        let Bin::State(lo) = g.bin(0) else { panic!() };
        assert_eq!(lo.values.iter().collect::<Vec<_>>(), vec![(0, 3)]);
        let Bin::State(hi) = g.bin(1) else { panic!() };
        assert_eq!(hi.values.iter().collect::<Vec<_>>(), vec![(12, 15)]);
        let Bin::State(mix) = g.bin(2) else { panic!() };
        assert!(mix.values.contains(0) && !mix.values.contains(1));
        assert!(mix.values.contains(6));
    }

    #[test]
    fn out_of_range_value_rejected() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
covergroup cg;
  cp: coverpoint data {
    bins b = {17};
  }
endgroup
";
        assert!(parse_str(&c, "cg", spec).is_err());
    }

    #[test]
    fn implicit_point_gets_auto_bins() {
        let c = pi_circuit();
        let spec = "
bit mode; // PI
covergroup cg;
  coverpoint mode;
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        assert_eq!(g.num_bins(), 2);
        assert_eq!(g.bin(0).name(), "auto[0]");
        assert_eq!(g.bin(1).name(), "auto[1]");
    }

    #[test]
    fn bin_vector_expands_per_value() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
covergroup cg;
  cp: coverpoint data {
    bins v[] = {[4:6], 9};
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        assert_eq!(g.num_bins(), 4);
        assert_eq!(g.bin(3).name(), "v[9]");
    }

    #[test]
    fn wildcard_bins_rejected() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
covergroup cg;
  cp: coverpoint data {
    wildcard bins w = {4'b1?1?};
  }
endgroup
";
        assert!(matches!(parse_str(&c, "cg", spec), Err(Error::Unsupported(_))));
    }

    #[test]
    fn coverpoint_slice() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
covergroup cg;
  cp: coverpoint data[2:1] {
    bins b = {3};
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        let p = g.point(0);
        assert_eq!((p.msb, p.lsb), (2, 1));
        assert_eq!(p.max_value(), 3);
    }

    #[test]
    fn cross_selection_intersect_and_negation() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
bit mode; // PI
covergroup cg;
  cp_d: coverpoint data {
    bins a = {0};
    bins b = {[1:5]};
    bins c = {15};
  }
  cp_m: coverpoint mode;
  x: cross cp_d, cp_m {
    bins low_one  = binsof(cp_d) intersect {[$:2]} && binsof(cp_m.auto[1]);
    bins not_low  = !binsof(cp_d) intersect {[$:2]};
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        let x = &g.crosses()[0];
        assert_eq!(x.bins.len(), 2);
        // low_one: {a, b} x {auto[1]}
        let Bin::Cross(low_one) = g.bin(x.bins[0]) else { panic!() };
        assert_eq!(low_one.products.len(), 2);
        // not_low: {c} x every mode bin
        let Bin::Cross(not_low) = g.bin(x.bins[1]) else { panic!() };
        assert_eq!(not_low.products.len(), 2);
        for tuple in not_low.products.iter() {
            assert_eq!(g.bin(tuple[0]).name(), "c");
        }
    }

    #[test]
    fn cross_union_of_selections() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
bit mode; // PI
covergroup cg;
  cp_d: coverpoint data {
    bins a = {0};
    bins b = {1};
  }
  cp_m: coverpoint mode;
  x: cross cp_d, cp_m {
    bins u = binsof(cp_d.a) && binsof(cp_m.auto[0]) ||
             binsof(cp_d.b) && binsof(cp_m.auto[1]);
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        let x = &g.crosses()[0];
        let Bin::Cross(u) = g.bin(x.bins[0]) else { panic!() };
        assert_eq!(u.products.len(), 2);
    }

    #[test]
    fn crossing_a_bare_variable_creates_a_point() {
        let c = pi_circuit();
        let spec = "
bit [3:0] data; // PI
bit mode; // PI
covergroup cg;
  cp_d: coverpoint data { bins a = {0}; }
  x: cross cp_d, mode {
    bins all = binsof(cp_d.a);
  }
endgroup
";
        let g = parse_str(&c, "cg", spec).unwrap();
        assert_eq!(g.points().len(), 2);
        let Bin::Cross(all) = g.bin(g.crosses()[0].bins[0]) else { panic!() };
        // a crossed with both implicit mode bins
        assert_eq!(all.products.len(), 2);
    }
}
