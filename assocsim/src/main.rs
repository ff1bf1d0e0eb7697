use std::path::PathBuf;
use std::time::Instant;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::debug;
use assoclib::config::{CacheConfig, SweepConfig};
use assoclib::io::{load_sweep_config, load_trace};
use assoclib::simulator::Simulator;
use assoclib::sweep::Sweep;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative LRU cache simulator"))]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, global = true)]
    performance: bool,

    #[arg(short, long, global = true, action = ArgAction::Set, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replays a trace of hex addresses, one per line, through a single cache
    Trace {
        trace: PathBuf,

        #[arg(short, long)]
        capacity: u64,

        #[arg(short, long)]
        associativity: u64,

        #[arg(short, long)]
        block_size: u64,

        #[arg(long, default_value_t = 2)]
        passes: u32,

        /// Start every pass from a cold cache instead of the state left by the previous pass
        #[arg(long)]
        reset_between_passes: bool,
    },
    /// Runs the sieve workload over a grid of cache sizes, block sizes and associativities
    Sweep {
        /// JSON sweep configuration, missing fields take their defaults
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
    debug!("Parsed arguments: {args:?}");
    match args.command {
        Command::Trace { trace, capacity, associativity, block_size, passes, reset_between_passes } => {
            let config = CacheConfig::new(capacity, associativity, block_size);
            let mut simulator = Simulator::new(&config).map_err(|e| format!("Invalid cache configuration: {e}"))?;
            let addresses = load_trace(&trace)?;
            simulator.run(&addresses, passes, reset_between_passes);
            println!("{}", serde_json::to_string_pretty(&simulator.result()).map_err(|e| format!("Couldn't serialise the output {e}"))?);
            if args.performance {
                let simulation_time = simulator.get_execution_time();
                let total_time = start.elapsed();
                println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
                println!("Total execution time (includes trace parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
            }
            if args.debug {
                #[cfg(debug_assertions)]
                println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
                println!("Cache geometry: {:?}", simulator.geometry());
                let cache = simulator.cache();
                println!("Valid cache lines: {} of {}", cache.valid_line_count(), simulator.geometry().line_count());
            }
        }
        Command::Sweep { config, format } => {
            let config = match config {
                Some(path) => load_sweep_config(path)?,
                None => SweepConfig::default(),
            };
            let sweep = Sweep::new(config).map_err(|e| format!("Invalid sweep configuration: {e}"))?;
            let sweep_start = Instant::now();
            let tables = sweep.run();
            let sweep_time = sweep_start.elapsed();
            match format {
                OutputFormat::Csv => {
                    let formatted = tables.iter().map(|t| t.to_csv()).collect::<Vec<_>>().join("\n");
                    print!("{formatted}");
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&tables).map_err(|e| format!("Couldn't serialise the output {e}"))?);
                }
            }
            if args.performance {
                println!("Sweep time: {}s", sweep_time.as_nanos() as f64 / 1e9);
                println!("Total execution time (includes configuration and output): {}s", start.elapsed().as_nanos() as f64 / 1e9)
            }
            if args.debug {
                println!("Parsed sweep configuration: {:?}", sweep.config());
            }
        }
    }
    Ok(())
}
