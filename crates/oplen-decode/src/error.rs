//! Length decoding error types.

use thiserror::Error;

/// Error type for instruction length decoding.
///
/// Every variant carries only `Copy` data so that failing a decode never
/// allocates.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The opcode byte maps to no legacy instruction.
    #[error("invalid opcode at {address:#x}: {}{opcode:02x}", escape_prefix(.escaped))]
    InvalidOpcode { address: u64, opcode: u8, escaped: bool },

    /// A multi-byte opcode whose selector byte is not a known encoding.
    #[error("unknown sub-opcode at {address:#x}: 0f {opcode:02x} {sub_opcode:02x}")]
    UnknownSubOpcode {
        address: u64,
        opcode: u8,
        sub_opcode: u8,
    },

    /// Instruction was truncated (not enough bytes).
    #[error("truncated instruction at {address:#x}: need {needed} bytes, have {available}")]
    Truncated {
        address: u64,
        needed: usize,
        available: usize,
    },

    /// A prefix in opcode position, or an instruction past the 15-byte limit.
    #[error("invalid encoding at {address:#x}: {reason}")]
    InvalidEncoding { address: u64, reason: &'static str },
}

fn escape_prefix(escaped: &bool) -> &'static str {
    if *escaped {
        "0f "
    } else {
        ""
    }
}

impl DecodeError {
    /// Creates a new InvalidOpcode error.
    pub fn invalid_opcode(address: u64, opcode: u8, escaped: bool) -> Self {
        Self::InvalidOpcode {
            address,
            opcode,
            escaped,
        }
    }

    /// Creates a new UnknownSubOpcode error.
    pub fn unknown_sub_opcode(address: u64, opcode: u8, sub_opcode: u8) -> Self {
        Self::UnknownSubOpcode {
            address,
            opcode,
            sub_opcode,
        }
    }

    /// Creates a new Truncated error.
    pub fn truncated(address: u64, needed: usize, available: usize) -> Self {
        Self::Truncated {
            address,
            needed,
            available,
        }
    }

    /// Creates a new InvalidEncoding error.
    pub fn invalid_encoding(address: u64, reason: &'static str) -> Self {
        Self::InvalidEncoding { address, reason }
    }

    /// Returns true if more input bytes could turn this failure into a success.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }

    /// Address of the instruction that failed to decode.
    pub fn address(&self) -> u64 {
        match *self {
            Self::InvalidOpcode { address, .. }
            | Self::UnknownSubOpcode { address, .. }
            | Self::Truncated { address, .. }
            | Self::InvalidEncoding { address, .. } => address,
        }
    }
}
