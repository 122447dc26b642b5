//! BitokPoW CLI
//!
//! A command-line tool for hashing and verifying Bitok block headers.
//!
//! # Commands
//!
//! - `hash` - Compute the digest of hex or text input
//! - `verify` - Check an 80-byte header against a target
//! - `target` - Convert between compact bits, targets and difficulty
//! - `benchmark` - Run a multi-threaded performance benchmark
//! - `params` - Show the algorithm parameters

use std::fmt::Display;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bitokpow::benchmark::{self, BenchmarkConfig};
use bitokpow::report::{BenchmarkReport, HashReport, ParamsReport, TargetReport, VerifyReport};
use bitokpow::{HashEngine, Target};

#[derive(Parser)]
#[command(name = "bitokpow")]
#[command(author = "Bitok Developers")]
#[command(version)]
#[command(about = "BitokPoW proof-of-work hashing and block header verification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log filter directive (e.g. "info" or "bitokpow=debug")
    #[arg(long, global = true, env = "BITOKPOW_LOG", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the BitokPoW digest of some input
    Hash {
        /// Input bytes as hex (or plain text with --text)
        input: String,

        /// Treat the input as UTF-8 text instead of hex
        #[arg(long)]
        text: bool,
    },

    /// Check whether a block header meets a target
    Verify {
        /// The 80-byte header as hex
        #[arg(long)]
        header: String,

        /// The 32-byte target as little-endian hex
        #[arg(long, required_unless_present = "bits", conflicts_with = "bits")]
        target: Option<String>,

        /// The target as compact bits (e.g. 1e7fffff)
        #[arg(long)]
        bits: Option<String>,
    },

    /// Show a target in every representation
    Target {
        /// Compact bits (e.g. 1e7fffff)
        #[arg(long, required_unless_present = "difficulty", conflicts_with = "difficulty")]
        bits: Option<String>,

        /// Difficulty relative to the difficulty-1 target
        #[arg(long)]
        difficulty: Option<f64>,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of hashes to compute
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Number of threads to use (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Show algorithm parameters
    Params,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    let json = cli.json;
    let result = match cli.command {
        Commands::Hash { input, text } => cmd_hash(&input, text, json),
        Commands::Verify {
            header,
            target,
            bits,
        } => cmd_verify(&header, target.as_deref(), bits.as_deref(), json),
        Commands::Target { bits, difficulty } => cmd_target(bits.as_deref(), difficulty, json),
        Commands::Benchmark { count, threads } => cmd_benchmark(count, threads, json),
        Commands::Params => emit(&ParamsReport::current(), json),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("invalid log filter {directive:?}"))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

/// Print a report as pretty JSON or as text
fn emit<T: Serialize + Display>(report: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

/// Decode hex, tolerating a `0x` prefix
fn decode_hex(what: &str, text: &str) -> anyhow::Result<Vec<u8>> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).with_context(|| format!("{what} is not valid hex"))
}

/// Parse compact bits written in hex, with or without `0x`
fn parse_bits(text: &str) -> anyhow::Result<u32> {
    let text = text.trim();
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).with_context(|| format!("invalid compact bits {text:?}"))
}

fn cmd_hash(input: &str, text: bool, json: bool) -> anyhow::Result<()> {
    let data = if text {
        input.as_bytes().to_vec()
    } else {
        decode_hex("input", input)?
    };

    let digest = HashEngine::new().digest(&data)?;
    emit(&HashReport::new(&data, &digest), json)
}

fn cmd_verify(
    header: &str,
    target: Option<&str>,
    bits: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let header = decode_hex("header", header)?;

    let (target, bits) = match (target, bits) {
        (Some(target), _) => (decode_hex("target", target)?, None),
        (None, Some(bits)) => {
            let bits = parse_bits(bits)?;
            (Target::from_compact(bits)?.as_bytes().to_vec(), Some(bits))
        }
        (None, None) => anyhow::bail!("either --target or --bits is required"),
    };
    debug!(header_len = header.len(), target_len = target.len(), "verifying header");

    let report = VerifyReport::run(&header, &target, bits).context("verification failed")?;
    emit(&report, json)
}

fn cmd_target(bits: Option<&str>, difficulty: Option<f64>, json: bool) -> anyhow::Result<()> {
    let target = match (bits, difficulty) {
        (Some(bits), _) => Target::from_compact(parse_bits(bits)?)?,
        (None, Some(difficulty)) => Target::from_difficulty(difficulty)?,
        (None, None) => anyhow::bail!("either --bits or --difficulty is required"),
    };
    emit(&TargetReport::new(&target), json)
}

fn cmd_benchmark(count: u32, threads: Option<usize>, json: bool) -> anyhow::Result<()> {
    let threads = threads.unwrap_or_else(num_cpus::get);
    if !json {
        println!(
            "Running benchmark with {} hashes on {} threads...\n",
            count, threads
        );
    }

    let result = benchmark::run(&BenchmarkConfig { count, threads })?;
    emit(&BenchmarkReport::from(&result), json)?;

    if !json {
        println!("\n{}", ParamsReport::current());
    }
    Ok(())
}
