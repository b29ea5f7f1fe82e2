//! oplen - x86/x86-64 instruction length probe
//!
//! Usage:
//!   oplen hex 48 89 e5 c3               Split hex bytes into instructions
//!   oplen file <path> --offset 0x400    Scan a raw code file
//!   oplen cover 55 48 89 e5 --min 5     Bytes to relocate for a 5-byte patch

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "oplen", version)]
#[command(about = "Measure x86/x86-64 instruction lengths", long_about = None)]
struct Cli {
    /// Emit output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split hex bytes into instructions
    Hex {
        /// Bytes as hex, e.g. `48 89 e5`, `4889e5` or `0x48,0x89,0xe5`
        #[arg(required = true, value_name = "BYTES")]
        bytes: Vec<String>,
    },
    /// Scan instructions in a raw binary file
    File {
        /// Path to the file
        path: PathBuf,

        /// Start offset in the file (hex with 0x, or decimal)
        #[arg(short, long, default_value = "0", value_parser = parse_number)]
        offset: u64,

        /// Maximum number of instructions to decode
        #[arg(short, long, default_value = "100")]
        count: usize,
    },
    /// Length of the whole instructions spanning at least `--min` bytes
    Cover {
        /// Bytes as hex
        #[arg(required = true, value_name = "BYTES")]
        bytes: Vec<String>,

        /// Number of bytes that must be covered
        #[arg(short, long, default_value = "5")]
        min: usize,
    },
}

fn parse_number(s: &str) -> Result<u64, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).map_err(|e| e.to_string()),
        None => s.parse().map_err(|e: std::num::ParseIntError| e.to_string()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // warn+ on stderr; --verbose enables debug; RUST_LOG overrides
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_module("oplen", level)
        .filter_module("oplen_decode", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    match &cli.command {
        Command::Hex { bytes } => commands::hex::run(bytes, cli.json),
        Command::File {
            path,
            offset,
            count,
        } => commands::file::run(path, *offset, *count, cli.json),
        Command::Cover { bytes, min } => commands::cover::run(bytes, *min, cli.json),
    }
}
