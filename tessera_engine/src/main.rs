// Tessera CLI: inspect timecodes and generation batches from the shell.
//
// Usage:
//   tessera timecode [--config F] [--seed S] [--size N] [--seconds N] [--at MS] [--json]
//   tessera batches  [--config F] [--seed S] [--size N] [--memory N] [--from G] [--count N]
//   tessera selftest [--seed S] [--size N] [--memory N] [--start G] [--iterations N]
//
// Flags override the matching field from the config file, which in turn
// overrides the built-in defaults. Logging goes to stderr and is controlled
// by RUST_LOG (default "info").

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tessera_engine::selftest::check_determinism;
use tessera_engine::{EngineConfig, GenerationEngine, TesseraConfig, TimecodeGenerator};
use tracing_subscriber::EnvFilter;

fn main() -> tessera_engine::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Timecode {
            config,
            seed,
            size,
            seconds,
            at,
            json,
        } => {
            let mut cfg = load_config(config.as_deref())?.timecode;
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if let Some(size) = size {
                cfg.size = size;
            }
            if let Some(seconds) = seconds {
                cfg.seconds = seconds;
            }
            run_timecode(&cfg, at, json)
        }
        Commands::Batches {
            config,
            seed,
            size,
            memory,
            from,
            count,
        } => {
            let mut cfg = load_config(config.as_deref())?.engine;
            override_engine(&mut cfg, seed, size, memory);
            run_batches(&cfg, from, count);
            Ok(())
        }
        Commands::Selftest {
            seed,
            size,
            memory,
            start,
            iterations,
        } => {
            let cfg = EngineConfig { seed, size, memory };
            run_selftest(&cfg, start, iterations);
            Ok(())
        }
    }
}

fn run_timecode(
    cfg: &tessera_engine::TimecodeConfig,
    at: Option<u64>,
    json: bool,
) -> tessera_engine::Result<()> {
    let mut timecodes = TimecodeGenerator::with_system_clock(cfg)?;
    let tc = match at {
        Some(now) => timecodes.at(now),
        None => timecodes.current(),
    };
    if json {
        println!("{}", serde_json::to_string(&tc)?);
    } else {
        println!("{}", tc.code);
        println!(
            "  expires in {:.1}s (bucket {} ms, width {}s)",
            tc.expiry_ms as f64 / 1000.0,
            tc.position,
            cfg.seconds
        );
    }
    Ok(())
}

fn run_batches(cfg: &EngineConfig, from: u64, count: u64) {
    tracing::info!(seed = %cfg.seed, size = cfg.size, from, count, "printing batches");
    // Batches are printed as they are produced, so history retention does
    // not limit output.
    let mut engine = GenerationEngine::new(cfg.seed.clone(), cfg.size, cfg.memory.max(1));
    for i in 0..count {
        if i == 0 {
            engine.to(from);
        } else {
            engine.generate();
        }
        let generation = engine.generation().wrapping_sub(1);
        let values = engine.values().unwrap_or_default();
        let joined: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
        println!("{generation}: {}", joined.join(" "));
    }
}

fn run_selftest(cfg: &EngineConfig, start: u64, iterations: u64) {
    println!(
        "Replaying seed {:?} (size {}, memory {}): to({start}) + {iterations} generations, twice",
        cfg.seed, cfg.size, cfg.memory
    );
    let report = check_determinism(cfg, start, iterations);
    println!("  run 1: crc32 {:08x}, history {}", report.first.checksum, report.first.history_len);
    println!("  run 2: crc32 {:08x}, history {}", report.second.checksum, report.second.history_len);
    if report.passed() {
        println!("PASS");
    } else {
        eprintln!("FAIL: replays diverged");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> tessera_engine::Result<TesseraConfig> {
    match path {
        Some(path) => TesseraConfig::load(path),
        None => Ok(TesseraConfig::default()),
    }
}

fn override_engine(
    cfg: &mut EngineConfig,
    seed: Option<String>,
    size: Option<usize>,
    memory: Option<usize>,
) {
    if let Some(seed) = seed {
        cfg.seed = seed;
    }
    if let Some(size) = size {
        cfg.size = size;
    }
    if let Some(memory) = memory {
        cfg.memory = memory;
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Seeded generation engine and rotating timecodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the timecode for the current (or given) time bucket.
    Timecode {
        /// JSON config file; its `timecode` section is used.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<String>,
        /// Characters per code.
        #[arg(long)]
        size: Option<usize>,
        /// Bucket width in seconds.
        #[arg(long)]
        seconds: Option<u64>,
        /// Evaluate at this Unix time in milliseconds instead of now.
        #[arg(long)]
        at: Option<u64>,
        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Jump to a generation and print successive batches.
    Batches {
        /// JSON config file; its `engine` section is used.
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        size: Option<usize>,
        #[arg(long)]
        memory: Option<usize>,
        /// First generation to print.
        #[arg(long, default_value_t = 0)]
        from: u64,
        /// Number of batches to print.
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Replay a fixed generation sequence twice and compare checksums.
    Selftest {
        #[arg(long, default_value = "test")]
        seed: String,
        #[arg(long, default_value_t = 100)]
        size: usize,
        #[arg(long, default_value_t = 20)]
        memory: usize,
        #[arg(long, default_value_t = 100_000)]
        start: u64,
        #[arg(long, default_value_t = 20_000)]
        iterations: u64,
    },
}
