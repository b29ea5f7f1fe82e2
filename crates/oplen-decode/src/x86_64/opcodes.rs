//! x86 opcode encoding tables.
//!
//! Each table maps an opcode byte to the shape of the bytes that follow it.
//! Mnemonics are irrelevant here: many distinct instructions collapse onto the
//! same [`OperandCategory`] because they occupy the same number of bytes.

#![allow(non_camel_case_types)]

/// Operand encoding category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperandCategory {
    /// No legacy instruction uses this opcode.
    Invalid,
    /// Prefix byte, including the 0x0F escape.
    Prefix,
    /// No operand bytes (also register-in-opcode forms).
    NoOperand,
    /// ModR/M only (r/m; r/m, reg; reg, r/m).
    ModRm,
    /// ModR/M followed by an 8-bit immediate.
    ModRmImm8,
    /// ModR/M followed by a 16/32-bit immediate.
    ModRmImm16_32,
    /// One byte after the opcode: imm8, rel8 or moffs8.
    Imm8,
    /// imm16/32 (or imm64), rel16/32, moffs16/32 after the opcode.
    Imm16_32,
    /// Fixed 16-bit immediate.
    Imm16,
    /// 16-bit immediate followed by an 8-bit immediate.
    Imm16Imm8,
}

impl OperandCategory {
    /// Returns true if the category is followed by a ModR/M byte.
    pub fn has_modrm(&self) -> bool {
        matches!(self, Self::ModRm | Self::ModRmImm8 | Self::ModRmImm16_32)
    }
}

/// Opcode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding {
    /// Operand encoding category
    pub category: OperandCategory,
    /// REX.W widens the immediate to 64 bits (mov r64, imm64)
    pub supports_imm64: bool,
    /// The opcode byte alone does not determine the encoding
    pub multi_encoding: bool,
}

impl Encoding {
    pub const fn new(category: OperandCategory) -> Self {
        Self {
            category,
            supports_imm64: false,
            multi_encoding: false,
        }
    }

    pub const fn with_imm64(mut self) -> Self {
        self.supports_imm64 = true;
        self
    }

    pub const fn with_multi_encoding(mut self) -> Self {
        self.multi_encoding = true;
        self
    }
}

const INVALID: Encoding = Encoding::new(OperandCategory::Invalid);
const PREFIX: Encoding = Encoding::new(OperandCategory::Prefix);
const NP: Encoding = Encoding::new(OperandCategory::NoOperand);
const M: Encoding = Encoding::new(OperandCategory::ModRm);
const MI8: Encoding = Encoding::new(OperandCategory::ModRmImm8);
const MI16_32: Encoding = Encoding::new(OperandCategory::ModRmImm16_32);
const I8: Encoding = Encoding::new(OperandCategory::Imm8);
const I16_32: Encoding = Encoding::new(OperandCategory::Imm16_32);
const I16: Encoding = Encoding::new(OperandCategory::Imm16);
const II16_8: Encoding = Encoding::new(OperandCategory::Imm16Imm8);

/// Fills `table[first..=last]` with `encoding`.
macro_rules! fill {
    ($table:ident, $first:expr, $last:expr, $encoding:expr) => {{
        let mut i = $first;
        while i <= $last {
            $table[i] = $encoding;
            i += 1;
        }
    }};
}

/// One-byte opcode table.
pub static OPCODE_TABLE: [Encoding; 256] = {
    let mut table = [INVALID; 256];

    // ALU block: add, or, adc, sbb, and, sub, xor, cmp.
    // Each row is r/m,reg x4 then AL,imm8 and rAX,imm16/32.
    let mut row = 0x00;
    while row < 0x40 {
        fill!(table, row, row + 3, M);
        table[row + 4] = I8;
        table[row + 5] = I16_32;
        row += 8;
    }

    // 0x06/0x07, 0x0E, 0x16/0x17, 0x1E/0x1F: push/pop sreg, invalid in 64-bit
    table[0x0F] = PREFIX; // two-byte escape

    // Segment overrides
    table[0x26] = PREFIX; // es
    table[0x2E] = PREFIX; // cs
    table[0x36] = PREFIX; // ss
    table[0x3E] = PREFIX; // ds

    // REX
    fill!(table, 0x40, 0x4F, PREFIX);

    // push/pop r64
    fill!(table, 0x50, 0x5F, NP);

    table[0x63] = M; // movsxd
    table[0x64] = PREFIX; // fs
    table[0x65] = PREFIX; // gs
    table[0x66] = PREFIX; // operand size
    table[0x67] = PREFIX; // address size
    table[0x68] = I16_32; // push imm16/32
    table[0x69] = MI16_32; // imul r, r/m, imm16/32
    table[0x6A] = I8; // push imm8
    table[0x6B] = MI8; // imul r, r/m, imm8
    fill!(table, 0x6C, 0x6F, NP); // ins/outs

    // jcc rel8
    fill!(table, 0x70, 0x7F, I8);

    // Group 1
    table[0x80] = MI8;
    table[0x81] = MI16_32;
    table[0x83] = MI8;

    // test, xchg, mov, lea, pop r/m
    fill!(table, 0x84, 0x8F, M);

    // nop/xchg, cbw, cwd
    fill!(table, 0x90, 0x99, NP);
    // fwait, pushf, popf, sahf, lahf
    fill!(table, 0x9B, 0x9F, NP);

    // mov al/rax <-> moffs
    table[0xA0] = I8;
    table[0xA1] = I16_32;
    table[0xA2] = I8;
    table[0xA3] = I16_32;
    fill!(table, 0xA4, 0xA7, NP); // movs, cmps
    table[0xA8] = I8; // test al, imm8
    table[0xA9] = I16_32; // test rax, imm16/32
    fill!(table, 0xAA, 0xAF, NP); // stos, lods, scas

    // mov r8, imm8
    fill!(table, 0xB0, 0xB7, I8);
    // mov r, imm16/32/64
    fill!(table, 0xB8, 0xBF, I16_32.with_imm64());

    // Group 2 with imm8
    table[0xC0] = MI8;
    table[0xC1] = MI8;
    table[0xC2] = I16; // ret imm16
    table[0xC3] = NP; // ret
    table[0xC6] = MI8; // mov r/m8, imm8
    table[0xC7] = MI16_32; // mov r/m, imm16/32
    table[0xC8] = II16_8; // enter
    table[0xC9] = NP; // leave
    table[0xCA] = I16; // retf imm16
    table[0xCB] = NP; // retf
    table[0xCC] = NP; // int3
    table[0xCD] = I8; // int imm8
    table[0xCE] = NP; // into
    table[0xCF] = NP; // iret

    // Group 2 by 1 / cl
    fill!(table, 0xD0, 0xD3, M);
    table[0xD7] = NP; // xlat
    // x87 escapes
    fill!(table, 0xD8, 0xDF, M);

    // loop*, jrcxz, in/out imm8
    fill!(table, 0xE0, 0xE7, I8);
    table[0xE8] = I16_32; // call rel32
    table[0xE9] = I16_32; // jmp rel32
    table[0xEB] = I8; // jmp rel8
    fill!(table, 0xEC, 0xEF, NP); // in/out dx

    table[0xF0] = PREFIX; // lock
    table[0xF1] = NP; // int1
    table[0xF2] = PREFIX; // repne
    table[0xF3] = PREFIX; // rep
    table[0xF4] = NP; // hlt
    table[0xF5] = NP; // cmc
    table[0xF6] = M.with_multi_encoding(); // Group 3, test has imm8
    table[0xF7] = M; // Group 3
    fill!(table, 0xF8, 0xFD, NP); // clc, stc, cli, sti, cld, std
    table[0xFE] = M; // Group 4
    table[0xFF] = M; // Group 5

    table
};

/// Two-byte (0x0F) opcode table.
pub static OPCODE_TABLE_0F: [Encoding; 256] = {
    let mut table = [M; 256];

    table[0x01] = NP.with_multi_encoding(); // Group 7
    table[0x04] = INVALID;
    fill!(table, 0x05, 0x09, NP); // syscall, clts, sysret, invd, wbinvd
    table[0x0A] = INVALID;
    table[0x0B] = NP; // ud2
    table[0x0C] = INVALID;
    table[0x0D] = NP;
    table[0x0E] = INVALID;
    table[0x0F] = INVALID;

    fill!(table, 0x24, 0x27, INVALID);

    // wrmsr, rdtsc, rdmsr, rdpmc, sysenter, sysexit
    fill!(table, 0x30, 0x35, NP);
    table[0x36] = INVALID;
    table[0x37] = NP; // getsec
    table[0x38] = M.with_multi_encoding(); // three-byte escape
    table[0x39] = INVALID;
    table[0x3A] = M.with_multi_encoding(); // three-byte escape
    fill!(table, 0x3B, 0x3F, INVALID);

    // pshufw/pshufd, Groups 12-14
    fill!(table, 0x70, 0x73, MI8);
    table[0x77] = NP; // emms
    table[0x7A] = INVALID;
    table[0x7B] = INVALID;

    // jcc rel32
    fill!(table, 0x80, 0x8F, I16_32);

    fill!(table, 0xA0, 0xA2, NP); // push fs, pop fs, cpuid
    table[0xA4] = MI8; // shld imm8
    table[0xA6] = INVALID;
    table[0xA7] = INVALID;
    fill!(table, 0xA8, 0xAA, NP); // push gs, pop gs, rsm
    table[0xAC] = MI8; // shrd imm8

    table[0xBA] = MI8; // Group 8
    table[0xC2] = MI8; // cmpps
    fill!(table, 0xC4, 0xC6, MI8); // pinsrw, pextrw, shufps
    fill!(table, 0xC8, 0xCF, NP); // bswap

    table[0xFF] = INVALID;

    table
};

/// Look up the encoding for an opcode byte in the active map.
pub fn lookup(opcode: u8, escaped: bool) -> Encoding {
    if escaped {
        OPCODE_TABLE_0F[opcode as usize]
    } else {
        OPCODE_TABLE[opcode as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(opcode: u8, escaped: bool) -> OperandCategory {
        lookup(opcode, escaped).category
    }

    #[test]
    fn test_alu_rows() {
        for row in (0x00..0x40).step_by(8) {
            for op in row..row + 4 {
                assert_eq!(category(op, false), OperandCategory::ModRm, "opcode {op:#04x}");
            }
            assert_eq!(category(row + 4, false), OperandCategory::Imm8);
            assert_eq!(category(row + 5, false), OperandCategory::Imm16_32);
        }
    }

    #[test]
    fn test_prefix_bytes() {
        let prefixes = [
            0x0F, 0x26, 0x2E, 0x36, 0x3E, 0x64, 0x65, 0x66, 0x67, 0xF0, 0xF2, 0xF3,
        ];
        for op in prefixes.into_iter().chain(0x40..=0x4F) {
            assert_eq!(category(op, false), OperandCategory::Prefix, "opcode {op:#04x}");
        }

        let count = OPCODE_TABLE
            .iter()
            .filter(|e| e.category == OperandCategory::Prefix)
            .count();
        assert_eq!(count, 28);
    }

    #[test]
    fn test_escaped_table_has_no_prefixes() {
        assert!(OPCODE_TABLE_0F
            .iter()
            .all(|e| e.category != OperandCategory::Prefix));
    }

    #[test]
    fn test_invalid_one_byte() {
        for op in [
            0x06, 0x07, 0x0E, 0x16, 0x17, 0x1E, 0x1F, 0x27, 0x2F, 0x37, 0x3F, 0x60, 0x61, 0x62,
            0x82, 0x9A, 0xC4, 0xC5, 0xD4, 0xD5, 0xD6, 0xEA,
        ] {
            assert_eq!(category(op, false), OperandCategory::Invalid, "opcode {op:#04x}");
        }
    }

    #[test]
    fn test_imm64_only_on_mov_imm() {
        for op in 0..=255u8 {
            let entry = lookup(op, false);
            assert_eq!(entry.supports_imm64, (0xB8..=0xBF).contains(&op), "opcode {op:#04x}");
            assert!(!lookup(op, true).supports_imm64);
        }
    }

    #[test]
    fn test_multi_encoding_entries() {
        let one_byte: Vec<u8> = (0..=255u8).filter(|&op| lookup(op, false).multi_encoding).collect();
        assert_eq!(one_byte, vec![0xF6]);

        let two_byte: Vec<u8> = (0..=255u8).filter(|&op| lookup(op, true).multi_encoding).collect();
        assert_eq!(two_byte, vec![0x01, 0x38, 0x3A]);
    }

    #[test]
    fn test_two_byte_selected_entries() {
        assert_eq!(category(0x05, true), OperandCategory::NoOperand); // syscall
        assert_eq!(category(0x1F, true), OperandCategory::ModRm); // nop r/m
        assert_eq!(category(0x84, true), OperandCategory::Imm16_32); // je rel32
        assert_eq!(category(0xAF, true), OperandCategory::ModRm); // imul r, r/m
        assert_eq!(category(0xBA, true), OperandCategory::ModRmImm8);
        assert_eq!(category(0xC8, true), OperandCategory::NoOperand); // bswap
        assert_eq!(category(0xFE, true), OperandCategory::ModRm);
        assert_eq!(category(0xFF, true), OperandCategory::Invalid);
    }

    #[test]
    fn test_category_counts() {
        let count = |table: &[Encoding; 256], c: OperandCategory| {
            table.iter().filter(|e| e.category == c).count()
        };
        assert_eq!(count(&OPCODE_TABLE, OperandCategory::Invalid), 22);
        assert_eq!(count(&OPCODE_TABLE_0F, OperandCategory::Invalid), 21);
        assert_eq!(count(&OPCODE_TABLE_0F, OperandCategory::ModRmImm8), 11);
    }
}
