#![no_main]

use libfuzzer_sys::fuzz_target;
use oplen_decode::{instruction_size, LengthDecoder, X86_64LengthDecoder, INSTRUCTION_INVALID};

fuzz_target!(|data: &[u8]| {
    let decoder = X86_64LengthDecoder::new();

    // Single decode must agree with the sentinel entry point
    let size = instruction_size(data);
    match decoder.decode_length(data, 0x1000) {
        Ok(length) => {
            assert!((1..=15).contains(&length.total()));
            assert!(length.total() <= data.len());
            assert_eq!(size, length.total() as i32);
        }
        Err(_) => assert_eq!(size, INSTRUCTION_INVALID),
    }

    // Scanning a block must account for every byte exactly once
    let covered: usize = decoder
        .scan_block(data, 0x1000)
        .iter()
        .map(|r| r.as_ref().map_or(1, |b| b.size()))
        .sum();
    assert_eq!(covered, data.len());

    if let Ok(n) = decoder.covering_length(data, 5) {
        assert!(n >= 5 && n <= data.len());
    }
});
