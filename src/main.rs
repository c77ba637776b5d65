use clap::Parser;
use ctgen::{circuit, cover, Options, Tpg};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::process::exit;

fn main() {
    let options = Options::parse();
    let level = match options.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto).unwrap();
    ctrlc::set_handler(|| {
        eprintln!("interrupted");
        exit(130);
    })
    .unwrap();

    let circuit = circuit::parse::parse_file(&options.circuit).unwrap_or_else(|e| {
        eprintln!("{}: {e}", options.circuit);
        exit(1);
    });
    log::info!(
        "{}: {} wires, {} gates",
        circuit.name,
        circuit.num_wires(),
        circuit.num_gates()
    );
    let cover = cover::parse::parse_file(&circuit, &options.cover).unwrap_or_else(|e| {
        eprintln!("{}: {e}", options.cover);
        exit(1);
    });
    log::info!("{}: {} bins", cover.name, cover.num_bins());

    let mut tpg = Tpg::new(options, circuit, cover);
    let summary = tpg.run();
    tpg.statistic();
    println!("models: {}", summary.models);
    println!("bins solved: {}", summary.solved);
    if !summary.unsolved.is_empty() {
        println!("unsolved bins:");
        for name in summary.unsolved.iter() {
            println!("  {name}");
        }
    }
}
