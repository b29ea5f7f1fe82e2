//! `oplen hex`: split bytes given on the command line.

use anyhow::Result;

use super::{parse_hex_bytes, print_rows, scan};

pub fn run(args: &[String], json: bool) -> Result<()> {
    let code = parse_hex_bytes(args)?;
    log::debug!("scanning {} bytes", code.len());

    let rows = scan(&code, 0, usize::MAX);
    print_rows(&rows, json)
}
