//! ModR/M and SIB byte sizing.

/// Decoded ModR/M byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModRM {
    /// Mod field (bits 6-7)
    pub mod_: u8,
    /// Reg field (bits 3-5), register or opcode extension
    pub reg: u8,
    /// R/M field (bits 0-2)
    pub rm: u8,
}

impl ModRM {
    /// Parse a ModR/M byte.
    pub fn parse(byte: u8) -> Self {
        Self {
            mod_: (byte >> 6) & 0x3,
            reg: (byte >> 3) & 0x7,
            rm: byte & 0x7,
        }
    }

    /// Returns true if this ModR/M encodes a register operand (mod=11).
    pub fn is_register(&self) -> bool {
        self.mod_ == 0b11
    }

    /// Returns true if this ModR/M requires a SIB byte in 32/64-bit addressing.
    pub fn needs_sib(&self) -> bool {
        self.mod_ != 0b11 && self.rm == 0b100
    }
}

/// Decoded SIB byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sib {
    /// Scale (bits 6-7), actual scale is 1 << scale
    pub scale: u8,
    /// Index register (bits 3-5)
    pub index: u8,
    /// Base register (bits 0-2)
    pub base: u8,
}

impl Sib {
    /// Parse a SIB byte.
    pub fn parse(byte: u8) -> Self {
        Self {
            scale: (byte >> 6) & 0x3,
            index: (byte >> 3) & 0x7,
            base: byte & 0x7,
        }
    }
}

/// Size of a ModR/M (+SIB +displacement) sequence in 32/64-bit addressing.
///
/// `window` starts at the ModR/M byte. When the window is too short the error
/// holds the smallest window that could resolve the sequence: the full size
/// once it is known, otherwise enough to read the next deciding byte.
pub fn modrm_size_32(window: &[u8]) -> Result<usize, usize> {
    let modrm = ModRM::parse(*window.first().ok_or(1usize)?);

    let size = if modrm.is_register() {
        1
    } else {
        let sib_byte = usize::from(modrm.needs_sib());
        match modrm.mod_ {
            0b00 if modrm.needs_sib() => {
                let sib = Sib::parse(*window.get(1).ok_or(2usize)?);
                // base=101 with index=100 is [disp32]; other bases are sized as plain SIB
                if sib.base == 0b101 && sib.index == 0b100 {
                    6
                } else {
                    2
                }
            }
            // RIP/EIP-relative
            0b00 if modrm.rm == 0b101 => 5,
            0b00 => 1,
            0b01 => 2 + sib_byte,
            _ => 5 + sib_byte,
        }
    };

    fits(window, size)
}

/// Size of a ModR/M (+displacement) sequence in 16-bit addressing.
///
/// 16-bit addressing has no SIB byte.
pub fn modrm_size_16(window: &[u8]) -> Result<usize, usize> {
    let modrm = ModRM::parse(*window.first().ok_or(1usize)?);

    let size = match (modrm.mod_, modrm.rm) {
        // [disp16]
        (0b00, 0b110) => 3,
        (0b00, _) => 1,
        (0b01, _) => 2,
        (0b10, _) => 3,
        _ => 1,
    };

    fits(window, size)
}

fn fits(window: &[u8], size: usize) -> Result<usize, usize> {
    if size <= window.len() {
        Ok(size)
    } else {
        Err(size)
    }
}
