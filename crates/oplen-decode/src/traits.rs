//! Length decoder traits.

use crate::DecodeError;

/// Byte breakdown of one decoded instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstructionLength {
    /// Legacy and REX prefix bytes.
    pub prefixes: usize,
    /// Escape, opcode and extra opcode bytes.
    pub opcode: usize,
    /// ModR/M, SIB and displacement bytes.
    pub addressing: usize,
    /// Immediate bytes.
    pub immediate: usize,
}

impl InstructionLength {
    /// Total instruction length in bytes.
    pub fn total(&self) -> usize {
        self.prefixes + self.opcode + self.addressing + self.immediate
    }
}

/// Position of a decoded instruction inside a scanned block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Boundary {
    /// Virtual address of the first byte.
    pub address: u64,
    /// Offset of the first byte within the block.
    pub offset: usize,
    /// Decoded length.
    pub length: InstructionLength,
}

impl Boundary {
    /// Number of bytes the instruction occupies.
    pub fn size(&self) -> usize {
        self.length.total()
    }
}

/// Trait for architecture-specific instruction length decoders.
pub trait LengthDecoder {
    /// Decode the length of a single instruction starting at the given address.
    ///
    /// # Arguments
    /// * `bytes` - The raw bytes to decode
    /// * `address` - The virtual address of the first byte, used in errors
    fn decode_length(&self, bytes: &[u8], address: u64) -> Result<InstructionLength, DecodeError>;

    /// Returns the minimum instruction size for this architecture.
    fn min_instruction_size(&self) -> usize;

    /// Returns the maximum instruction size for this architecture.
    fn max_instruction_size(&self) -> usize;

    /// Returns whether instructions are fixed-width.
    fn is_fixed_width(&self) -> bool;

    /// Walk a block of code, one result per instruction.
    ///
    /// On a decode failure the error is recorded and scanning resumes at the
    /// next byte.
    fn scan_block(&self, bytes: &[u8], start_address: u64) -> Vec<Result<Boundary, DecodeError>> {
        let mut results = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() {
            let address = start_address.wrapping_add(offset as u64);

            match self.decode_length(&bytes[offset..], address) {
                Ok(length) => {
                    results.push(Ok(Boundary {
                        address,
                        offset,
                        length,
                    }));
                    offset += length.total();
                }
                Err(e) => {
                    log::debug!("resyncing after {}", e);
                    results.push(Err(e));
                    offset += 1;
                }
            }
        }

        results
    }

    /// Offsets of the instruction starts in the leading run of decodable code.
    ///
    /// Stops at the first failure, or once `max_bytes` have been passed.
    fn boundaries(&self, bytes: &[u8], max_bytes: usize) -> Vec<usize> {
        let mut boundaries = Vec::new();
        let mut offset = 0;

        while offset < bytes.len() && offset < max_bytes {
            match self.decode_length(&bytes[offset..], offset as u64) {
                Ok(length) => {
                    boundaries.push(offset);
                    offset += length.total();
                }
                Err(_) => break,
            }
        }

        boundaries
    }

    /// Smallest run of whole instructions at the start of `bytes` spanning at
    /// least `required` bytes.
    ///
    /// This is the number of bytes to relocate when overwriting the start of a
    /// function with a `required`-byte jump.
    fn covering_length(&self, bytes: &[u8], required: usize) -> Result<usize, DecodeError> {
        let mut offset = 0;

        while offset < required {
            let rest = bytes.get(offset..).unwrap_or_default();
            let length = self.decode_length(rest, offset as u64)?;
            offset += length.total();
        }

        Ok(offset)
    }
}
