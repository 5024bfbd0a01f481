use log::{debug, warn};

use crate::bitbuffer::BitBuffer;
use crate::class::LeadingClass;
use crate::encoder::{write_codeword, write_trailer, CompressedBlock, SlotRef};
use crate::window::{History, Window};
use crate::word::{self, Word};

/// The ChimpN compressor: XOR against a similar word from the last `W` values.
///
/// A direct-mapped table keyed by the low `threshold + 1` bits of each word
/// remembers where a word with those bits was last seen. When that word is
/// still in the window and XORs to more than `threshold` trailing zeros it is
/// used as the reference; otherwise the previous word is.
///
/// Blocks follow the reference implementation's wire layout: only the `00`
/// and `01` codewords carry a slot field, since `10` and `11` always refer to
/// the previous word.
///
/// # Example
/// ```
/// use chimp::{ChimpNEncoder, Window};
///
/// let mut encoder = ChimpNEncoder::<u64>::new(Window::DEFAULT);
/// for i in 0..64 {
///     encoder.push_float([1.5, 7.25, -3.0, 0.1][i % 4]);
/// }
/// let block = encoder.into_compressed();
/// assert_eq!(block.count, 64);
/// ```
#[derive(Debug, Clone)]
pub struct ChimpNEncoder<W: Word> {
    buf: BitBuffer,
    window: Window,
    history: History<W>,
    /// Global index of the latest word seen with each low-bit key.
    indices: Vec<usize>,
    key_mask: u64,
    threshold: u8,
    /// Global index of the most recent word.
    index: usize,
    stored_class: Option<LeadingClass>,
    first: bool,
    count: u64,
    size_bits: usize,
    closed: bool,
}

impl<W: Word> ChimpNEncoder<W> {
    /// Creates a new `ChimpNEncoder` with a default buffer.
    pub fn new(window: Window) -> Self {
        Self::with_capacity(window, 128)
    }

    /// Creates a new `ChimpNEncoder` whose buffer starts with `capacity` bytes reserved.
    pub fn with_capacity(window: Window, capacity: usize) -> Self {
        let threshold = window.threshold::<W>();
        let table_size = 1usize << (threshold + 1);
        Self {
            buf: BitBuffer::with_capacity(capacity),
            window,
            history: History::new(window),
            indices: vec![0; table_size],
            key_mask: (table_size - 1) as u64,
            threshold,
            index: 0,
            stored_class: None,
            first: true,
            count: 0,
            size_bits: 0,
            closed: false,
        }
    }

    /// The history window this encoder was built with.
    pub fn window(&self) -> Window {
        self.window
    }

    /// Appends a word to the block. Words must be pushed in series order.
    ///
    /// # Panics
    /// Panics if the encoder has been closed.
    pub fn push(&mut self, value: W) {
        assert!(!self.closed, "cannot push after close()");
        if word::is_end_of_stream(value) {
            warn!("pushed the end-of-stream pattern {value:?}; decoding will stop here");
        }
        self.write_value(value);
        self.count += 1;
    }

    /// Appends the bit pattern of a float.
    pub fn push_float(&mut self, value: W::Float) {
        self.push(W::from_float(value));
    }

    /// Writes the end-of-stream marker and pads to a byte boundary.
    /// Calling it again has no effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.write_value(W::END_OF_STREAM);
        write_trailer(&mut self.buf);
        self.closed = true;
        debug!(
            "closed chimp{} block: {} values, {} codeword bits, {} bytes",
            self.window.size(),
            self.count,
            self.size_bits,
            self.buf.as_bytes().len()
        );
    }

    /// Returns the number of words pushed so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the number of codeword bits written, excluding padding.
    pub fn size_bits(&self) -> usize {
        self.size_bits
    }

    /// Returns `true` once [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns a reference to the underlying `BitBuffer`.
    pub fn buffer(&self) -> &BitBuffer {
        &self.buf
    }

    /// Closes the encoder if needed and returns the compressed block.
    pub fn into_compressed(mut self) -> CompressedBlock {
        self.close();
        CompressedBlock {
            total_bits: self.buf.len_bits(),
            bytes: self.buf.into_bytes(),
            count: self.count,
        }
    }

    fn write_value(&mut self, value: W) {
        let key = (value.to_u64() & self.key_mask) as usize;

        if self.first {
            self.first = false;
            self.buf.write_bits(value.to_u64(), W::BITS);
            self.history.seed(value);
            self.indices[key] = self.index;
            self.size_bits = self.buf.len_bits();
            return;
        }

        let (slot, xor) = self.choose_reference(value, key);
        write_codeword::<W>(
            &mut self.buf,
            xor,
            self.threshold,
            Some(SlotRef {
                slot,
                bits: self.window.log2(),
            }),
            &mut self.stored_class,
        );

        self.history.push(value);
        self.index += 1;
        self.indices[key] = self.index;
        self.size_bits = self.buf.len_bits();
    }

    /// Picks the window slot to XOR against and returns it with the XOR.
    fn choose_reference(&self, value: W, key: usize) -> (usize, u64) {
        let candidate = self.indices[key];
        if self.index - candidate < self.window.size() {
            let slot = candidate & (self.window.size() - 1);
            let xor = word::xor(value, self.history.get(slot));
            if word::trailing_zeros::<W>(xor) > self.threshold as u32 {
                return (slot, xor);
            }
        }
        let previous = self.history.cursor();
        (previous, word::xor(value, self.history.latest()))
    }
}
