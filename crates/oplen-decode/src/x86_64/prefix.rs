//! x86 prefix parsing.

use super::opcodes::{OperandCategory, OPCODE_TABLE};

/// Two-byte opcode escape.
pub const ESCAPE_0F: u8 = 0x0F;
/// Operand size override.
pub const OPERAND_SIZE: u8 = 0x66;
/// Address size override.
pub const ADDRESS_SIZE: u8 = 0x67;

/// Prefix state accumulated before the opcode byte.
///
/// Each flag only ever goes from false to true within one decode. A repeated
/// prefix of the same class just sets the same flag again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Prefixes {
    /// Number of prefix bytes consumed, including the 0x0F escape.
    pub count: usize,
    /// 0x0F seen: the next byte indexes the two-byte table.
    pub escape_0f: bool,
    /// Operand size override (0x66)
    pub operand_16: bool,
    /// Address size override (0x67)
    pub address_16: bool,
    /// REX.W (0x48-0x4F)
    pub rex_w: bool,
}

impl Prefixes {
    /// Returns true if `byte` is a REX prefix with the W bit set.
    pub fn is_rex_w(byte: u8) -> bool {
        byte & 0xF8 == 0x48
    }

    /// Parse prefixes from the start of an instruction.
    ///
    /// Stops at the first byte that is not a prefix in the one-byte table, or
    /// immediately after the 0x0F escape. `count` is the offset of the opcode.
    pub fn parse(bytes: &[u8]) -> Self {
        let mut prefixes = Self::default();

        for &byte in bytes {
            if prefixes.escape_0f || OPCODE_TABLE[byte as usize].category != OperandCategory::Prefix {
                break;
            }

            match byte {
                ESCAPE_0F => prefixes.escape_0f = true,
                OPERAND_SIZE => prefixes.operand_16 = true,
                ADDRESS_SIZE => prefixes.address_16 = true,
                b if Self::is_rex_w(b) => prefixes.rex_w = true,
                // Segment overrides, lock, rep/repne, REX without W
                _ => {}
            }

            prefixes.count += 1;
        }

        prefixes
    }

    /// Number of legacy and REX prefix bytes, excluding the escape.
    pub fn legacy_count(&self) -> usize {
        self.count - self.escape_0f as usize
    }

    /// Width in bytes of an imm16/32 operand under these prefixes.
    ///
    /// REX.W takes precedence over 0x66. A 64-bit immediate is only produced
    /// when the opcode supports one.
    pub fn immediate_size(&self, supports_imm64: bool) -> usize {
        let wide = if supports_imm64 { 8 } else { 4 };
        let sizes = [4, 2, wide, wide];
        sizes[(self.operand_16 as usize) | ((self.rex_w as usize) << 1)]
    }
}
