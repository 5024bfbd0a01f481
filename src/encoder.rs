use log::{debug, warn};

use crate::bitbuffer::BitBuffer;
use crate::class::{LeadingClass, CLASS_BITS};
use crate::window::Window;
use crate::windowed_encoder::ChimpNEncoder;
use crate::word::{self, Word};

/// A closed block of Chimp-encoded words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    /// The compressed byte data, zero-padded to a whole byte.
    pub bytes: Vec<u8>,
    /// Total number of valid bits in `bytes`.
    pub total_bits: usize,
    /// Number of words in this block, not counting the end-of-stream marker.
    pub count: u64,
}

/// Window slot a ChimpN codeword refers to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotRef {
    pub(crate) slot: usize,
    pub(crate) bits: u8,
}

/// Writes the codeword for a non-first word given its XOR against the chosen reference.
///
/// | prefix | meaning        | fields                                            |
/// |--------|----------------|---------------------------------------------------|
/// | `00`   | identical      | [slot]                                            |
/// | `01`   | explicit width | [slot], 3-bit class, significant count, `xor >> tz` |
/// | `10`   | class reuse    | `WW - boundary` bits of `xor`                     |
/// | `11`   | new class      | 3-bit class, `WW - boundary` bits of `xor`        |
///
/// The slot field is only present for windowed codecs.
pub(crate) fn write_codeword<W: Word>(
    buf: &mut BitBuffer,
    xor: u64,
    threshold: u8,
    reference: Option<SlotRef>,
    stored_class: &mut Option<LeadingClass>,
) {
    if xor == 0 {
        buf.write_bits(0b00, 2);
        write_slot(buf, reference);
        *stored_class = None;
        return;
    }

    let trailing = word::trailing_zeros::<W>(xor);
    let class = LeadingClass::from_leading_zeros(word::leading_zeros::<W>(xor));

    if trailing > threshold as u32 {
        let significant = W::BITS - class.boundary() - trailing as u8;
        buf.write_bits(0b01, 2);
        write_slot(buf, reference);
        buf.write_bits(class.code() as u64, CLASS_BITS);
        buf.write_bits(significant as u64, W::SIGNIFICANT_FIELD_BITS);
        buf.write_bits(xor >> trailing, significant);
        *stored_class = None;
    } else if *stored_class == Some(class) {
        buf.write_bits(0b10, 2);
        buf.write_bits(xor, W::BITS - class.boundary());
    } else {
        buf.write_bits(0b11, 2);
        buf.write_bits(class.code() as u64, CLASS_BITS);
        buf.write_bits(xor, W::BITS - class.boundary());
        *stored_class = Some(class);
    }
}

#[inline]
fn write_slot(buf: &mut BitBuffer, reference: Option<SlotRef>) {
    if let Some(r) = reference {
        buf.write_bits(r.slot as u64, r.bits);
    }
}

/// Writes the end-of-stream codeword, one zero bit and the byte padding.
pub(crate) fn write_trailer(buf: &mut BitBuffer) {
    buf.skip_bit();
    buf.flush();
}

/// The Chimp compressor: XOR against the immediately preceding word.
///
/// # Example
/// ```
/// use chimp::ChimpEncoder;
///
/// let mut encoder = ChimpEncoder::<u64>::new();
/// encoder.push_float(12.0);
/// encoder.push_float(12.5);
/// encoder.close();
///
/// let block = encoder.into_compressed();
/// assert_eq!(block.count, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ChimpEncoder<W: Word> {
    buf: BitBuffer,
    /// Previous word.
    stored: W,
    /// Class of the last new-class codeword, cleared by repeats and explicit-width codewords.
    stored_class: Option<LeadingClass>,
    first: bool,
    count: u64,
    /// Bits of all codewords written so far, excluding the closing padding.
    size_bits: usize,
    closed: bool,
}

impl<W: Word> ChimpEncoder<W> {
    /// Creates a new `ChimpEncoder` with a default buffer.
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    /// Creates a new `ChimpEncoder` whose buffer starts with `capacity` bytes reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BitBuffer::with_capacity(capacity),
            stored: W::default(),
            stored_class: None,
            first: true,
            count: 0,
            size_bits: 0,
            closed: false,
        }
    }

    /// Appends a word to the block. Words must be pushed in series order.
    ///
    /// Pushing [`Word::END_OF_STREAM`] is accepted but ends the block early
    /// for any decoder.
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
            "closed chimp block: {} values, {} codeword bits, {} bytes",
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
        if self.first {
            self.first = false;
            self.buf.write_bits(value.to_u64(), W::BITS);
        } else {
            write_codeword::<W>(
                &mut self.buf,
                word::xor(self.stored, value),
                W::THRESHOLD,
                None,
                &mut self.stored_class,
            );
        }
        self.stored = value;
        self.size_bits = self.buf.len_bits();
    }
}

impl<W: Word> Default for ChimpEncoder<W> {
    fn default() -> Self {
        Self::new()
    }
}

/// Either Chimp encoder, selected by an optional history window.
///
/// # Example
/// ```
/// use chimp::{Encoder, Window};
///
/// let mut encoder = Encoder::<u32>::new(Some(Window::new(32).unwrap()));
/// for v in [1.0f32, -2.0, -2.5] {
///     encoder.push_float(v);
/// }
/// let block = encoder.into_compressed();
/// assert_eq!(block.count, 3);
/// ```
#[derive(Debug, Clone)]
pub enum Encoder<W: Word> {
    /// Single previous-value reference.
    Chimp(ChimpEncoder<W>),
    /// Windowed back-reference.
    ChimpN(ChimpNEncoder<W>),
}

impl<W: Word> Encoder<W> {
    /// Creates a Chimp encoder, or a ChimpN encoder if `window` is given.
    pub fn new(window: Option<Window>) -> Self {
        match window {
            None => Encoder::Chimp(ChimpEncoder::new()),
            Some(window) => Encoder::ChimpN(ChimpNEncoder::new(window)),
        }
    }

    /// Like [`new`](Self::new) with `capacity` bytes reserved for output.
    pub fn with_capacity(window: Option<Window>, capacity: usize) -> Self {
        match window {
            None => Encoder::Chimp(ChimpEncoder::with_capacity(capacity)),
            Some(window) => Encoder::ChimpN(ChimpNEncoder::with_capacity(window, capacity)),
        }
    }

    /// The window in use, `None` for plain Chimp.
    pub fn window(&self) -> Option<Window> {
        match self {
            Encoder::Chimp(_) => None,
            Encoder::ChimpN(e) => Some(e.window()),
        }
    }

    /// Appends a word to the block.
    pub fn push(&mut self, value: W) {
        match self {
            Encoder::Chimp(e) => e.push(value),
            Encoder::ChimpN(e) => e.push(value),
        }
    }

    /// Appends the bit pattern of a float.
    pub fn push_float(&mut self, value: W::Float) {
        self.push(W::from_float(value));
    }

    /// Writes the end-of-stream marker and pads to a byte boundary.
    pub fn close(&mut self) {
        match self {
            Encoder::Chimp(e) => e.close(),
            Encoder::ChimpN(e) => e.close(),
        }
    }

    /// Returns the number of words pushed so far.
    pub fn count(&self) -> u64 {
        match self {
            Encoder::Chimp(e) => e.count(),
            Encoder::ChimpN(e) => e.count(),
        }
    }

    /// Returns the number of codeword bits written, excluding padding.
    pub fn size_bits(&self) -> usize {
        match self {
            Encoder::Chimp(e) => e.size_bits(),
            Encoder::ChimpN(e) => e.size_bits(),
        }
    }

    /// Returns a reference to the underlying `BitBuffer`.
    pub fn buffer(&self) -> &BitBuffer {
        match self {
            Encoder::Chimp(e) => e.buffer(),
            Encoder::ChimpN(e) => e.buffer(),
        }
    }

    /// Closes the encoder if needed and returns the compressed block.
    pub fn into_compressed(self) -> CompressedBlock {
        match self {
            Encoder::Chimp(e) => e.into_compressed(),
            Encoder::ChimpN(e) => e.into_compressed(),
        }
    }
}
