//! `oplen cover`: how many whole instructions a patch of `min` bytes clobbers.

use anyhow::{Context, Result};
use oplen_decode::{LengthDecoder, X86_64LengthDecoder};
use serde::Serialize;

use super::{format_bytes, parse_hex_bytes};

#[derive(Debug, Serialize)]
struct Coverage {
    required: usize,
    length: usize,
    boundaries: Vec<usize>,
    bytes: String,
}

pub fn run(args: &[String], min: usize, json: bool) -> Result<()> {
    let code = parse_hex_bytes(args)?;
    let decoder = X86_64LengthDecoder::new();

    let length = decoder
        .covering_length(&code, min)
        .with_context(|| format!("cannot cover {} bytes", min))?;

    let coverage = Coverage {
        required: min,
        length,
        boundaries: decoder.boundaries(&code, length),
        bytes: format_bytes(&code[..length]),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&coverage)?);
    } else {
        println!("{}", coverage.length);
        log::debug!(
            "instructions start at {:?}: {}",
            coverage.boundaries,
            coverage.bytes
        );
    }
    Ok(())
}
