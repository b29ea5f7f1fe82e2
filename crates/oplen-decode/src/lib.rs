//! # oplen-decode
//!
//! Instruction length decoding for oplen.
//!
//! Given raw code bytes, a length decoder reports how many bytes the next
//! instruction occupies without producing a full disassembly. This crate
//! provides:
//! - x86_64 (AMD64), legacy encodings
//!
//! ```
//! use oplen_decode::{instruction_size, LengthDecoder, X86_64LengthDecoder};
//!
//! // mov rbp, rsp
//! assert_eq!(instruction_size(&[0x48, 0x89, 0xE5]), 3);
//!
//! let decoder = X86_64LengthDecoder::new();
//! let length = decoder.decode_length(&[0x0F, 0x1F, 0x00], 0x1000).unwrap();
//! assert_eq!(length.total(), 3);
//! ```

pub mod error;
pub mod traits;

#[cfg(feature = "x86_64")]
pub mod x86_64;

pub use error::DecodeError;
pub use traits::{Boundary, InstructionLength, LengthDecoder};

#[cfg(feature = "x86_64")]
pub use x86_64::{instruction_size, X86_64LengthDecoder, INSTRUCTION_INVALID, MAX_INSTRUCTION_LENGTH};
