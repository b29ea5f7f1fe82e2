//! Opcodes whose encoding depends on the byte after the opcode.
//!
//! The 0x0F 0x38 / 0x0F 0x3A maps are covered only for the handful of legacy
//! (non-VEX) entries listed here.

use super::modrm::ModRM;
use super::opcodes::{Encoding, OperandCategory};
use super::prefix::Prefixes;
use crate::error::DecodeError;

/// Result of resolving a multi-encoding opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// The actual encoding
    pub encoding: Encoding,
    /// Opcode bytes consumed beyond the first opcode byte
    pub extra_opcodes: usize,
}

impl Resolved {
    fn new(category: OperandCategory, extra_opcodes: usize) -> Self {
        Self {
            encoding: Encoding::new(category),
            extra_opcodes,
        }
    }
}

/// Resolve the encoding of a multi-encoding opcode.
///
/// `bytes` starts at the opcode byte (after any escape) and ends at the
/// decode window. `address` is only used to label errors; `offset` is the
/// opcode's position in the window so truncation errors report whole-window
/// sizes.
pub fn resolve(
    bytes: &[u8],
    prefixes: &Prefixes,
    address: u64,
    offset: usize,
) -> Result<Resolved, DecodeError> {
    let opcode = bytes[0];
    let next = bytes
        .get(1)
        .copied()
        .ok_or_else(|| DecodeError::truncated(address, offset + 2, offset + bytes.len()))?;

    if prefixes.escape_0f {
        match opcode {
            // Group 7
            0x01 => {
                let extra = match next {
                    0xC1..=0xC4 | 0xC8 | 0xC9 | 0xD0 | 0xD1 | 0xF8 | 0xF9 => 1,
                    _ => 0,
                };
                Ok(Resolved::new(OperandCategory::ModRm, extra))
            }

            // invept, invvpid, movbe
            0x38 => match next {
                0x80 | 0x81 | 0xF0 | 0xF1 => Ok(Resolved::new(OperandCategory::ModRm, 1)),
                _ => Err(DecodeError::unknown_sub_opcode(address, opcode, next)),
            },

            0x3A => match next {
                // round*, blend*, pextr*, pinsr*, insertps, mpsadbw, pcmp*str*
                0x08..=0x0E | 0x14..=0x17 | 0x20..=0x22 | 0x42 | 0x60..=0x63 => {
                    Ok(Resolved::new(OperandCategory::ModRmImm8, 1))
                }
                0x0F | 0x40 | 0x41 => Ok(Resolved::new(OperandCategory::ModRm, 1)),
                _ => Err(DecodeError::unknown_sub_opcode(address, opcode, next)),
            },

            _ => Err(DecodeError::invalid_opcode(address, opcode, true)),
        }
    } else {
        match opcode {
            // Group 3: test r/m8, imm8 is /0 and /1
            0xF6 => {
                let category = if ModRM::parse(next).reg > 1 {
                    OperandCategory::ModRm
                } else {
                    OperandCategory::ModRmImm8
                };
                Ok(Resolved::new(category, 0))
            }

            _ => Err(DecodeError::invalid_opcode(address, opcode, false)),
        }
    }
}
