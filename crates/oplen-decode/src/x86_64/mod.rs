//! x86_64 instruction length decoder.
//!
//! This module sizes legacy-encoded instructions without disassembling them.
//! It handles:
//! - Legacy prefixes (REP, LOCK, segment overrides, operand/address size)
//! - REX prefix, with REX.W widening `mov r64, imm64`
//! - One-byte and 0x0F two-byte opcode maps
//! - ModR/M and SIB addressing in 16-bit and 32/64-bit forms
//! - A few 0x0F 0x38 / 0x0F 0x3A three-byte opcodes

mod decoder;
pub mod modrm;
pub mod opcodes;
pub mod prefix;
pub mod special;

pub use decoder::{instruction_size, X86_64LengthDecoder, INSTRUCTION_INVALID, MAX_INSTRUCTION_LENGTH};
pub use opcodes::{lookup, Encoding, OperandCategory};
