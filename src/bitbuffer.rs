use crate::error::{Error, Result};

/// A growable bit buffer written most-significant-bit first.
///
/// Fields are packed back to back with no alignment between them; only
/// [`flush`](BitBuffer::flush) rounds the stream up to a whole byte.
#[derive(Debug, Clone, Default)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    /// Number of valid bits in the last byte (1..=8, or 0 if empty).
    bit_count: u8,
}

impl BitBuffer {
    /// Creates a new empty `BitBuffer`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `BitBuffer` with the given pre-allocated capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
            bit_count: 0,
        }
    }

    /// Returns the total number of bits written.
    #[inline]
    pub fn len_bits(&self) -> usize {
        if self.bytes.is_empty() {
            0
        } else {
            (self.bytes.len() - 1) * 8 + self.bit_count as usize
        }
    }

    /// Returns `true` if no bits have been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a reference to the underlying byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the buffer and returns the raw byte vector.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(bit as u64, 1);
    }

    /// Writes a single zero bit.
    #[inline]
    pub fn skip_bit(&mut self) {
        self.write_bits(0, 1);
    }

    /// Writes the lowest `n` bits of `value`, most significant first. `n` must be <= 64.
    pub fn write_bits(&mut self, value: u64, n: u8) {
        debug_assert!(n <= 64);
        let mut left = n;
        while left > 0 {
            if self.bit_count == 0 || self.bit_count == 8 {
                self.bytes.push(0);
                self.bit_count = 0;
            }
            let free = 8 - self.bit_count;
            let take = free.min(left);
            let chunk = (value >> (left - take)) & ((1u64 << take) - 1);
            if let Some(last) = self.bytes.last_mut() {
                *last |= (chunk as u8) << (free - take);
            }
            self.bit_count += take;
            left -= take;
        }
    }

    /// Pads the stream with zero bits up to the next byte boundary.
    pub fn flush(&mut self) {
        if !self.bytes.is_empty() {
            self.bit_count = 8;
        }
    }
}

/// A cursor for reading bits sequentially from a `BitBuffer` or raw bytes.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    /// Total number of valid bits.
    total_bits: usize,
    /// Current bit position (0-indexed from the start).
    pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over the given buffer.
    pub fn new(buffer: &'a BitBuffer) -> Self {
        Self::from_raw(buffer.as_bytes(), buffer.len_bits())
    }

    /// Creates a `BitReader` from raw bytes and a total bit count.
    ///
    /// A count larger than `bytes` can hold is clamped to the bytes present.
    pub fn from_raw(bytes: &'a [u8], total_bits: usize) -> Self {
        Self {
            bytes,
            total_bits: total_bits.min(bytes.len() * 8),
            pos: 0,
        }
    }

    /// Creates a `BitReader` over every bit of `bytes`.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::from_raw(bytes, bytes.len() * 8)
    }

    /// Returns the number of bits remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.total_bits.saturating_sub(self.pos)
    }

    /// Returns the number of bits consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns `true` if there are no more bits to read.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.total_bits
    }

    /// Reads a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Reads `n` bits as a `u64`, most significant first. `n` must be <= 64.
    pub fn read_bits(&mut self, n: u8) -> Result<u64> {
        debug_assert!(n <= 64);
        if self.remaining() < n as usize {
            return Err(Error::UnexpectedEnd {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let mut value: u64 = 0;
        let mut left = n;
        while left > 0 {
            let byte = self.bytes[self.pos / 8];
            let avail = 8 - (self.pos % 8) as u8;
            let take = avail.min(left);
            let chunk = (byte >> (avail - take)) & (((1u16 << take) - 1) as u8);
            value = (value << take) | chunk as u64;
            self.pos += take as usize;
            left -= take;
        }
        Ok(value)
    }
}
