use clap::{Parser, ValueEnum};

/// ctgen: SAT-based coverage-directed test pattern generator
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Options {
    /// circuit netlist (structural verilog subset)
    pub circuit: String,

    /// covergroup specification file
    pub cover: String,

    /// search strategy
    #[arg(short, long, value_enum, default_value_t = Strategy::Incremental)]
    pub strategy: Strategy,

    /// file listing the bins to search, one name per line;
    /// missing or unreadable falls back to every bin
    #[arg(long)]
    pub bins: Option<String>,

    /// group bins randomly into groups of this size instead of by
    /// coverpoint (grouped strategy only)
    #[arg(long = "rand-group", value_parser = clap::value_parser!(u64).range(2..))]
    pub rand_group: Option<u64>,

    /// active-low reset lines
    #[arg(short = 'n', long = "neg-reset", default_value_t = false)]
    pub neg_reset: bool,

    /// hits required to retire a bin; 0 means a single hit suffices
    /// and no input diversification is attempted
    #[arg(short = 't', long = "cov-threshold", default_value_t = 0)]
    pub cov_threshold: usize,

    /// maximum time frame
    #[arg(short = 'd', long = "max-depth", default_value_t = 50)]
    pub max_depth: usize,

    /// solve with minisat instead of cadical
    #[arg(long, default_value_t = false)]
    pub minisat: bool,

    /// random seed
    #[arg(long, default_value_t = 0)]
    pub rseed: u64,

    /// verbose level
    #[arg(short, default_value_t = 1)]
    pub verbose: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum Strategy {
    /// one growing solver instance, frames retracted by disable literals
    Incremental,
    /// incremental with per-group blocking clauses
    Grouped,
    /// random single-bin assumptions within each frame (MSPSAT)
    Mspsat,
    /// fresh solver instance per probe, learned clauses discarded
    NonIncremental,
    /// fresh solver instance per bin, depth grown from 0
    Single,
}

impl Default for Options {
    fn default() -> Self {
        Options::parse_from(["ctgen", "", ""])
    }
}
