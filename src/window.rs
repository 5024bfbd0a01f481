//! History window configuration and ring buffer for the ChimpN codecs.

use crate::error::{Error, Result};
use crate::word::Word;

/// Number of previous values a ChimpN codec can reference.
///
/// Always a power of two, so a slot is named by exactly `log2(size)` bits.
/// Encoder and decoder must be built with the same window; the stream does
/// not record it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    log2: u8,
}

impl Window {
    /// Largest supported window.
    pub const MAX_SIZE: usize = 1 << 12;

    /// The 128-value window used by Chimp128.
    pub const DEFAULT: Window = Window { log2: 7 };

    /// Creates a window of `size` values.
    ///
    /// Returns [`Error::InvalidWindow`] unless `size` is a power of two no
    /// larger than [`Window::MAX_SIZE`].
    pub fn new(size: usize) -> Result<Self> {
        if !size.is_power_of_two() || size > Self::MAX_SIZE {
            return Err(Error::InvalidWindow(size));
        }
        Ok(Self {
            log2: size.trailing_zeros() as u8,
        })
    }

    /// Number of values in the window.
    #[inline]
    pub fn size(self) -> usize {
        1 << self.log2
    }

    /// Width of the slot field.
    #[inline]
    pub fn log2(self) -> u8 {
        self.log2
    }

    /// Trailing-zero threshold for words of type `W` with this window.
    #[inline]
    pub fn threshold<W: Word>(self) -> u8 {
        W::THRESHOLD + self.log2
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for Window {
    type Error = Error;

    fn try_from(size: usize) -> Result<Self> {
        Self::new(size)
    }
}

/// Ring buffer of the most recent words; `cursor` holds the newest one.
#[derive(Debug, Clone)]
pub(crate) struct History<W> {
    slots: Vec<W>,
    cursor: usize,
}

impl<W: Word> History<W> {
    pub(crate) fn new(window: Window) -> Self {
        Self {
            slots: vec![W::default(); window.size()],
            cursor: 0,
        }
    }

    /// Stores the first word of a block in slot 0.
    pub(crate) fn seed(&mut self, word: W) {
        self.cursor = 0;
        self.slots[0] = word;
    }

    /// Appends a word, overwriting the oldest slot.
    #[inline]
    pub(crate) fn push(&mut self, word: W) {
        self.cursor = (self.cursor + 1) & (self.slots.len() - 1);
        self.slots[self.cursor] = word;
    }

    /// Slot holding the most recent word.
    #[inline]
    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub(crate) fn latest(&self) -> W {
        self.slots[self.cursor]
    }

    #[inline]
    pub(crate) fn get(&self, slot: usize) -> W {
        self.slots[slot]
    }
}
