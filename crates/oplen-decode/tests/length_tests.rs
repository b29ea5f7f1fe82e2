//! Instruction length tests against known x86_64 encodings.

use oplen_decode::x86_64::{lookup, OperandCategory};
use oplen_decode::{
    instruction_size, DecodeError, LengthDecoder, X86_64LengthDecoder, INSTRUCTION_INVALID,
};

/// A small compiled function: prologue, body, epilogue.
const FUNCTION: &[u8] = &[
    0x55, // push rbp
    0x48, 0x89, 0xe5, // mov rbp, rsp
    0x48, 0x83, 0xec, 0x20, // sub rsp, 0x20
    0x48, 0x89, 0x7d, 0xf8, // mov [rbp-8], rdi
    0x48, 0x8b, 0x45, 0xf8, // mov rax, [rbp-8]
    0x48, 0x83, 0xc0, 0x01, // add rax, 1
    0x48, 0x83, 0x7d, 0xf0, 0x0a, // cmp qword [rbp-16], 10
    0x7e, 0x07, // jle .L1
    0xb8, 0x01, 0x00, 0x00, 0x00, // mov eax, 1
    0xeb, 0x05, // jmp .L2
    0xb8, 0x00, 0x00, 0x00, 0x00, // .L1: mov eax, 0
    0x48, 0x83, 0xc4, 0x20, // .L2: add rsp, 0x20
    0x5d, // pop rbp
    0xc3, // ret
];

const FUNCTION_SIZES: &[usize] = &[1, 3, 4, 4, 4, 4, 5, 2, 5, 2, 5, 4, 1, 1];

#[test]
fn test_reference_scenarios() {
    assert_eq!(instruction_size(&[0x90]), 1);
    assert_eq!(instruction_size(&[0x48, 0x89, 0xE5]), 3);
    assert_eq!(instruction_size(&[0x0F, 0x1F, 0x00]), 3);
    assert_eq!(instruction_size(&[0x66, 0x83, 0x7D, 0xFC, 0x00]), 5);
    assert_eq!(instruction_size(&[0xFF]), INSTRUCTION_INVALID);
    assert_eq!(instruction_size(&[0xF6, 0x05, 0x00, 0x00, 0x00, 0x00, 0x01]), 7);
}

#[test]
fn test_scan_function() {
    let decoder = X86_64LengthDecoder::new();
    let sizes: Vec<usize> = decoder
        .scan_block(FUNCTION, 0x401000)
        .into_iter()
        .map(|r| r.expect("function decodes cleanly").size())
        .collect();
    assert_eq!(sizes, FUNCTION_SIZES);
    assert_eq!(sizes.iter().sum::<usize>(), FUNCTION.len());
}

#[test]
fn test_boundaries() {
    let decoder = X86_64LengthDecoder::new();
    assert_eq!(decoder.boundaries(FUNCTION, 8), vec![0, 1, 4]);
    assert_eq!(decoder.boundaries(&[0x90, 0x06, 0x90], 16), vec![0]);
}

#[test]
fn test_covering_length_for_jump_patch() {
    let decoder = X86_64LengthDecoder::new();
    // a 5-byte rel32 jmp overwrites push rbp, mov rbp, rsp and part of sub
    assert_eq!(decoder.covering_length(FUNCTION, 5).unwrap(), 8);
    // a 14-byte absolute jmp
    assert_eq!(decoder.covering_length(FUNCTION, 14).unwrap(), 16);
    assert_eq!(decoder.covering_length(FUNCTION, 1).unwrap(), 1);
}

#[test]
fn test_covering_length_failures() {
    let decoder = X86_64LengthDecoder::new();
    let err = decoder.covering_length(&[0x90, 0x06, 0x90], 2).unwrap_err();
    assert_eq!(err, DecodeError::invalid_opcode(1, 0x06, false));

    let err = decoder.covering_length(&[0x90, 0xE8, 0x00], 2).unwrap_err();
    assert!(err.is_truncated());
}

#[test]
fn test_scan_resyncs_after_garbage() {
    let decoder = X86_64LengthDecoder::new();
    let code = [0x06, 0x07, 0x90, 0xC3];
    let results = decoder.scan_block(&code, 0);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_err());
    assert!(results[1].is_err());
    assert_eq!(results[2].as_ref().unwrap().offset, 2);
    assert_eq!(results[3].as_ref().unwrap().offset, 3);
}

#[test]
fn test_tables_are_total() {
    for op in 0..=255u8 {
        // every entry is defined; the escaped map holds no prefixes
        let _ = lookup(op, false);
        assert_ne!(lookup(op, true).category, OperandCategory::Prefix);
    }
}

#[test]
fn test_every_single_opcode_is_safe() {
    let decoder = X86_64LengthDecoder::new();
    for op in 0..=255u8 {
        for escaped in [false, true] {
            let bytes: Vec<u8> = if escaped { vec![0x0F, op] } else { vec![op] };
            match decoder.decode_length(&bytes, 0) {
                Ok(length) => assert_eq!(length.total(), bytes.len()),
                Err(_) => assert_eq!(instruction_size(&bytes), INSTRUCTION_INVALID),
            }
        }
    }
}
