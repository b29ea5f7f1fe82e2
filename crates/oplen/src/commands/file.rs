//! `oplen file`: scan instructions in a raw code file.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use oplen_decode::MAX_INSTRUCTION_LENGTH;

use super::{print_rows, scan};

pub fn run(path: &Path, offset: u64, count: usize, json: bool) -> Result<()> {
    let data =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;

    let start = usize::try_from(offset)
        .ok()
        .filter(|&start| start <= data.len())
        .with_context(|| {
            format!(
                "offset {:#x} is past the end of {} ({} bytes)",
                offset,
                path.display(),
                data.len()
            )
        })?;

    if count == 0 {
        bail!("--count must be at least 1");
    }

    // `count` instructions never reach past `count` full windows
    let end = data
        .len()
        .min(start.saturating_add(count.saturating_mul(MAX_INSTRUCTION_LENGTH)));
    log::debug!(
        "scanning {:#x}..{:#x} of {} ({} bytes)",
        start,
        end,
        path.display(),
        data.len()
    );

    let rows = scan(&data[start..end], offset, count);
    let bad = rows.iter().filter(|row| row.error.is_some()).count();
    if bad > 0 {
        log::warn!("{} of {} bytes did not decode", bad, end - start);
    }

    print_rows(&rows, json)
}
