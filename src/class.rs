//! Quantization of leading-zero counts into eight classes.
//!
//! | leading zeros | class | boundary |
//! |---------------|-------|----------|
//! | 0..=7         | 0     | 0        |
//! | 8..=11        | 1     | 8        |
//! | 12..=15       | 2     | 12       |
//! | 16..=17       | 3     | 16       |
//! | 18..=19       | 4     | 18       |
//! | 20..=21       | 5     | 20       |
//! | 22..=23       | 6     | 22       |
//! | 24..          | 7     | 24       |
//!
//! The boundary is what the decoder assumes as the leading-zero count, so
//! `WW - boundary` bits are transmitted. The table is shared by both word
//! widths; encoder and decoder must agree on it exactly.

/// Width of the class field in every codeword that announces a class.
pub const CLASS_BITS: u8 = 3;

const BOUNDARIES: [u8; 8] = [0, 8, 12, 16, 18, 20, 22, 24];

/// A quantized leading-zero count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeadingClass(u8);

impl LeadingClass {
    /// Classifies a leading-zero count.
    #[inline]
    pub fn from_leading_zeros(lz: u32) -> Self {
        let code = match lz {
            0..=7 => 0,
            8..=11 => 1,
            12..=15 => 2,
            16..=17 => 3,
            18..=19 => 4,
            20..=21 => 5,
            22..=23 => 6,
            _ => 7,
        };
        Self(code)
    }

    /// Rebuilds a class from its 3-bit code. Higher bits are ignored.
    #[inline]
    pub fn from_code(code: u8) -> Self {
        Self(code & 0b111)
    }

    /// The 3-bit code sent on the wire.
    #[inline]
    pub fn code(self) -> u8 {
        self.0
    }

    /// Lower edge of the bucket: the leading-zero count the decoder assumes.
    #[inline]
    pub fn boundary(self) -> u8 {
        BOUNDARIES[self.0 as usize]
    }
}
