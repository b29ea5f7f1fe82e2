//! x86_64 instruction length decoder.

use super::modrm::{modrm_size_16, modrm_size_32};
use super::opcodes::{lookup, OperandCategory};
use super::prefix::Prefixes;
use super::special;
use crate::error::DecodeError;
use crate::traits::{InstructionLength, LengthDecoder};

/// Longest valid legacy x86 instruction in bytes.
pub const MAX_INSTRUCTION_LENGTH: usize = 15;

/// Returned by [`instruction_size`] when no instruction could be decoded.
pub const INSTRUCTION_INVALID: i32 = -1;

/// x86_64 instruction length decoder.
///
/// Stateless; every call sees only the bytes it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct X86_64LengthDecoder;

impl X86_64LengthDecoder {
    /// Creates a new x86_64 length decoder.
    pub fn new() -> Self {
        Self
    }

    fn decode(window: &[u8], address: u64) -> Result<InstructionLength, DecodeError> {
        let prefixes = Prefixes::parse(window);
        let mut offset = prefixes.count;

        let opcode = *window
            .get(offset)
            .ok_or_else(|| DecodeError::truncated(address, offset + 1, window.len()))?;

        let mut encoding = lookup(opcode, prefixes.escape_0f);
        let mut extra_opcodes = 0;
        if encoding.multi_encoding {
            let resolved = special::resolve(&window[offset..], &prefixes, address, offset)?;
            encoding = resolved.encoding;
            extra_opcodes = resolved.extra_opcodes;
        }
        offset += 1 + extra_opcodes;

        let immediate = match encoding.category {
            OperandCategory::Invalid => {
                return Err(DecodeError::invalid_opcode(address, opcode, prefixes.escape_0f));
            }
            OperandCategory::Prefix => {
                return Err(DecodeError::invalid_encoding(address, "prefix byte in opcode position"));
            }
            OperandCategory::NoOperand | OperandCategory::ModRm => 0,
            OperandCategory::ModRmImm8 | OperandCategory::Imm8 => 1,
            OperandCategory::ModRmImm16_32 | OperandCategory::Imm16_32 => {
                prefixes.immediate_size(encoding.supports_imm64)
            }
            OperandCategory::Imm16 => 2,
            OperandCategory::Imm16Imm8 => 3,
        };

        let addressing = if encoding.category.has_modrm() {
            let rest = &window[offset..];
            let size = if prefixes.address_16 {
                modrm_size_16(rest)
            } else {
                modrm_size_32(rest)
            };
            size.map_err(|needed| {
                DecodeError::truncated(address, offset + needed + immediate, window.len())
            })?
        } else {
            0
        };

        let length = InstructionLength {
            prefixes: prefixes.legacy_count(),
            opcode: offset - prefixes.legacy_count(),
            addressing,
            immediate,
        };

        if length.total() > window.len() {
            return Err(DecodeError::truncated(address, length.total(), window.len()));
        }

        Ok(length)
    }
}

impl LengthDecoder for X86_64LengthDecoder {
    fn decode_length(&self, bytes: &[u8], address: u64) -> Result<InstructionLength, DecodeError> {
        let window = &bytes[..bytes.len().min(MAX_INSTRUCTION_LENGTH)];

        Self::decode(window, address).map_err(|err| {
            let err = match err {
                // More input cannot help once the architectural limit is reached
                DecodeError::Truncated { needed, .. } if needed > MAX_INSTRUCTION_LENGTH => {
                    DecodeError::invalid_encoding(address, "instruction longer than 15 bytes")
                }
                err => err,
            };
            log::trace!("{}", err);
            err
        })
    }

    fn min_instruction_size(&self) -> usize {
        1
    }

    fn max_instruction_size(&self) -> usize {
        MAX_INSTRUCTION_LENGTH
    }

    fn is_fixed_width(&self) -> bool {
        false
    }
}

/// Length in bytes of the instruction at the start of `bytes`, or
/// [`INSTRUCTION_INVALID`].
///
/// Only the first [`MAX_INSTRUCTION_LENGTH`] bytes are examined. Every kind of
/// failure maps to the same sentinel; use
/// [`X86_64LengthDecoder::decode_length`] to tell them apart.
pub fn instruction_size(bytes: &[u8]) -> i32 {
    match X86_64LengthDecoder::new().decode_length(bytes, 0) {
        Ok(length) => length.total() as i32,
        Err(_) => INSTRUCTION_INVALID,
    }
}
