//! Fixed-width words holding the bit pattern of a float or double.
//!
//! The codecs never look at floating-point values: they XOR and count zeros
//! on the raw bits. [`Word`] carries everything that differs between the
//! 32-bit and 64-bit variants so the state machines are written once.

use std::fmt;

/// An unsigned word that is the bit-level reinterpretation of an IEEE-754 float.
///
/// Words travel through the codecs widened to `u64`; a 32-bit word always has
/// its upper half clear.
pub trait Word: Copy + Eq + Default + fmt::Debug + Send + Sync + 'static {
    /// The floating-point type whose bits this word holds.
    type Float: Copy + PartialEq + fmt::Debug;

    /// Word width in bits.
    const BITS: u8;

    /// Trailing-zero count above which the explicit-width codeword is used.
    const THRESHOLD: u8;

    /// Width of the significant-bit count field of the explicit-width codeword.
    const SIGNIFICANT_FIELD_BITS: u8;

    /// Canonical quiet NaN, reserved to mark the end of a block.
    const END_OF_STREAM: Self;

    /// Widens the word to 64 bits.
    fn to_u64(self) -> u64;

    /// Truncates a 64-bit pattern to this width.
    fn from_u64(bits: u64) -> Self;

    /// Reinterprets a float as a word.
    fn from_float(value: Self::Float) -> Self;

    /// Reinterprets the word as a float.
    fn to_float(self) -> Self::Float;
}

impl Word for u64 {
    type Float = f64;

    const BITS: u8 = 64;
    const THRESHOLD: u8 = 6;
    const SIGNIFICANT_FIELD_BITS: u8 = 6;
    const END_OF_STREAM: Self = 0x7ff8_0000_0000_0000;

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn from_u64(bits: u64) -> Self {
        bits
    }

    #[inline]
    fn from_float(value: f64) -> Self {
        value.to_bits()
    }

    #[inline]
    fn to_float(self) -> f64 {
        f64::from_bits(self)
    }
}

impl Word for u32 {
    type Float = f32;

    const BITS: u8 = 32;
    const THRESHOLD: u8 = 5;
    const SIGNIFICANT_FIELD_BITS: u8 = 5;
    const END_OF_STREAM: Self = 0x7fc0_0000;

    #[inline]
    fn to_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_u64(bits: u64) -> Self {
        bits as u32
    }

    #[inline]
    fn from_float(value: f32) -> Self {
        value.to_bits()
    }

    #[inline]
    fn to_float(self) -> f32 {
        f32::from_bits(self)
    }
}

/// Returns `true` if `word` is the reserved end-of-stream pattern.
///
/// A genuine sample carrying this exact NaN pattern is indistinguishable from
/// the end of the block and truncates the stream when decoded.
#[inline]
pub fn is_end_of_stream<W: Word>(word: W) -> bool {
    word == W::END_OF_STREAM
}

/// XOR of two words, widened to 64 bits.
#[inline]
pub(crate) fn xor<W: Word>(a: W, b: W) -> u64 {
    a.to_u64() ^ b.to_u64()
}

/// Applies a widened XOR delta to a word.
#[inline]
pub(crate) fn apply<W: Word>(base: W, delta: u64) -> W {
    W::from_u64(base.to_u64() ^ delta)
}

/// Leading zeros of a non-zero widened XOR, counted within the word width.
#[inline]
pub(crate) fn leading_zeros<W: Word>(xor: u64) -> u32 {
    xor.leading_zeros() - (64 - W::BITS as u32)
}

/// Trailing zeros of a widened XOR, capped at the word width.
#[inline]
pub(crate) fn trailing_zeros<W: Word>(xor: u64) -> u32 {
    xor.trailing_zeros().min(W::BITS as u32)
}
