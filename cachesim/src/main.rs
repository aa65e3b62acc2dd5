mod table;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use log::{debug, LevelFilter};
use cachelib::config::{parse_addresses, CachePolicyConfig, ReplacementAlgorithmConfig, SimulationConfig, DEFAULT_ADDRESSES, DEFAULT_LINES, DEFAULT_WORDS_PER_BLOCK};
use cachelib::io::read_addresses;
use cachelib::simulator::Simulator;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Simulates block placement and replacement in a single cache"))]
struct Args {
    /// JSON configuration file, replaces the cache options below
    #[arg(short, long, conflicts_with_all = ["policy", "algorithm", "lines", "words_per_block", "addresses", "seed"])]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CachePolicyConfig::DirectMapped)]
    policy: CachePolicyConfig,

    /// Ignored for direct mapped caches
    #[arg(long, value_enum, default_value_t = ReplacementAlgorithmConfig::FirstInFirstOut)]
    algorithm: ReplacementAlgorithmConfig,

    #[arg(long, default_value_t = DEFAULT_LINES)]
    lines: usize,

    #[arg(long, default_value_t = DEFAULT_WORDS_PER_BLOCK)]
    words_per_block: u64,

    /// Comma separated word addresses
    #[arg(long)]
    addresses: Option<String>,

    /// File of addresses separated by commas or line breaks
    #[arg(long, conflicts_with_all = ["addresses", "config"])]
    address_file: Option<PathBuf>,

    /// Seed for random replacement
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print a table of lines against accesses instead of JSON
    #[arg(short, long)]
    table: bool,

    /// Leave accesses which hit out of the table
    #[arg(long, requires = "table")]
    hide_hits: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    init_logging(args.debug);
    let mut config = build_config(&args)?;
    if let Some(path) = &args.address_file {
        config.addresses = read_addresses(path)?;
    }
    debug!("Parsed input configuration: {config:?}");
    let simulator = Simulator::new(&config).map_err(|e| format!("Invalid configuration: {e}"))?;
    let simulation_start = Instant::now();
    let summary = simulator.run();
    let simulation_time = simulation_start.elapsed();
    if args.table {
        print!("{}", table::render(&summary, !args.hide_hits));
    } else {
        println!("{}", serde_json::to_string_pretty(&summary).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    }
    if args.performance {
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    Ok(())
}

/// RUST_LOG sets the level, --debug raises it to at least debug
fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn build_config(args: &Args) -> Result<SimulationConfig, String> {
    if let Some(path) = &args.config {
        let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {}: {e}", path.display()))?;
        return SimulationConfig::from_json_reader(BufReader::new(config_file))
            .map_err(|e| format!("Couldn't load the config file: {e}"));
    }
    let addresses = match &args.addresses {
        Some(text) => parse_addresses(text).map_err(|e| format!("Couldn't parse the addresses: {e}"))?,
        None => DEFAULT_ADDRESSES.to_vec(),
    };
    Ok(SimulationConfig {
        policy: args.policy,
        algorithm: args.algorithm,
        lines: args.lines,
        words_per_block: args.words_per_block,
        addresses,
        seed: args.seed,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use super::Args;

    #[test]
    fn address_file_conflicts_with_config() {
        let parsed = Args::try_parse_from(["cachesim", "--config", "run.json", "--address-file", "addresses.txt"]);
        assert_eq!(parsed.unwrap_err().kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn address_file_conflicts_with_addresses() {
        let parsed = Args::try_parse_from(["cachesim", "--addresses", "1, 2", "--address-file", "addresses.txt"]);
        assert_eq!(parsed.unwrap_err().kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn address_file_alone_is_accepted() {
        let args = Args::try_parse_from(["cachesim", "--address-file", "addresses.txt", "--policy", "full"]).unwrap();
        assert_eq!(args.address_file.unwrap().to_str(), Some("addresses.txt"));
        assert!(args.config.is_none());
    }
}
