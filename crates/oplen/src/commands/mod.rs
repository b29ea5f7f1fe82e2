//! Subcommand implementations and the helpers they share.

pub mod cover;
pub mod file;
pub mod hex;

use anyhow::{bail, Context, Result};
use oplen_decode::{InstructionLength, LengthDecoder, X86_64LengthDecoder};
use serde::Serialize;

/// One line of a scan listing.
#[derive(Debug, Serialize)]
pub struct Row {
    pub address: u64,
    pub offset: usize,
    pub bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<InstructionLength>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Row {
    fn size(&self) -> usize {
        self.length.map_or(1, |l| l.total())
    }
}

/// Parse hex byte arguments.
///
/// Tokens may be separated by whitespace or commas and carry a `0x` prefix.
/// A token may hold several bytes (`4889e5`).
pub fn parse_hex_bytes(args: &[String]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();

    let tokens = args
        .iter()
        .flat_map(|arg| arg.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|token| !token.is_empty());

    for token in tokens {
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            bail!("invalid hex byte `{}`", token);
        }
        if digits.len() % 2 != 0 {
            bail!("odd number of hex digits in `{}`", token);
        }

        for start in (0..digits.len()).step_by(2) {
            let pair = &digits[start..start + 2];
            let byte = u8::from_str_radix(pair, 16)
                .with_context(|| format!("invalid hex byte `{}` in `{}`", pair, token))?;
            bytes.push(byte);
        }
    }

    if bytes.is_empty() {
        bail!("no bytes given");
    }
    Ok(bytes)
}

/// Decode up to `limit` instructions from `code`.
pub fn scan(code: &[u8], base: u64, limit: usize) -> Vec<Row> {
    let decoder = X86_64LengthDecoder::new();

    decoder
        .scan_block(code, base)
        .into_iter()
        .take(limit)
        .map(|result| match result {
            Ok(boundary) => Row {
                address: boundary.address,
                offset: boundary.offset,
                bytes: format_bytes(&code[boundary.offset..boundary.offset + boundary.size()]),
                length: Some(boundary.length),
                error: None,
            },
            Err(err) => {
                let offset = err.address().wrapping_sub(base) as usize;
                Row {
                    address: err.address(),
                    offset,
                    bytes: format_bytes(&code[offset..offset + 1]),
                    length: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect()
}

/// Print a listing as JSON or as aligned text.
pub fn print_rows(rows: &[Row], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    for row in rows {
        match &row.error {
            None => println!("{:>#10x}  {:<44}  {:>2}", row.address, row.bytes, row.size()),
            Some(_) => println!("{:>#10x}  {:<44}  (bad)", row.address, row.bytes),
        }
    }
    Ok(())
}

pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
