use log::trace;

use crate::bitbuffer::BitReader;
use crate::class::{LeadingClass, CLASS_BITS};
use crate::encoder::CompressedBlock;
use crate::error::{Error, Result};
use crate::window::Window;
use crate::windowed_decoder::ChimpNDecoder;
use crate::word::{self, Word};

/// The 2-bit control prefix opening every codeword after the first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Control {
    Repeat,
    Explicit,
    Reuse,
    NewClass,
}

impl Control {
    pub(crate) fn read(reader: &mut BitReader<'_>) -> Result<Self> {
        Ok(match reader.read_bits(2)? {
            0b00 => Control::Repeat,
            0b01 => Control::Explicit,
            0b10 => Control::Reuse,
            _ => Control::NewClass,
        })
    }
}

/// Reads the class, significant count and shifted bits of an explicit-width codeword.
pub(crate) fn read_explicit<W: Word>(reader: &mut BitReader<'_>) -> Result<u64> {
    let class = LeadingClass::from_code(reader.read_bits(CLASS_BITS)? as u8);
    let mut significant = reader.read_bits(W::SIGNIFICANT_FIELD_BITS)? as u8;
    // The field cannot hold the full width, so zero stands for it.
    if significant == 0 {
        significant = W::BITS;
    }
    let trailing = W::BITS
        .checked_sub(class.boundary() + significant)
        .ok_or(Error::Corrupt("significant bits exceed the word width"))?;
    Ok(reader.read_bits(significant)? << trailing)
}

/// Reads the XOR of a reuse codeword.
pub(crate) fn read_reuse<W: Word>(
    reader: &mut BitReader<'_>,
    stored_class: Option<LeadingClass>,
) -> Result<u64> {
    let class = stored_class.ok_or(Error::Corrupt("class reuse before any class was announced"))?;
    reader.read_bits(W::BITS - class.boundary())
}

/// Reads the class and XOR of a new-class codeword and records the class.
pub(crate) fn read_new_class<W: Word>(
    reader: &mut BitReader<'_>,
    stored_class: &mut Option<LeadingClass>,
) -> Result<u64> {
    let class = LeadingClass::from_code(reader.read_bits(CLASS_BITS)? as u8);
    *stored_class = Some(class);
    reader.read_bits(W::BITS - class.boundary())
}

/// The Chimp decompressor (single previous-value reference).
///
/// Yields words until the end-of-stream marker. After the marker or the
/// first error every call returns `Ok(None)`.
///
/// # Example
/// ```
/// use chimp::{ChimpDecoder, ChimpEncoder};
///
/// let mut encoder = ChimpEncoder::<u64>::new();
/// encoder.push_float(12.0);
/// encoder.push_float(12.5);
/// let block = encoder.into_compressed();
///
/// let mut decoder = ChimpDecoder::<u64>::new(&block);
/// assert_eq!(decoder.next_float().unwrap(), Some(12.0));
/// assert_eq!(decoder.next_float().unwrap(), Some(12.5));
/// assert_eq!(decoder.next_float().unwrap(), None);
/// ```
#[derive(Debug, Clone)]
pub struct ChimpDecoder<'a, W: Word> {
    reader: BitReader<'a>,
    stored: W,
    stored_class: Option<LeadingClass>,
    first: bool,
    done: bool,
}

impl<'a, W: Word> ChimpDecoder<'a, W> {
    /// Creates a decoder over a `CompressedBlock`.
    pub fn new(block: &'a CompressedBlock) -> Self {
        Self::from_reader(BitReader::from_raw(&block.bytes, block.total_bits))
    }

    /// Creates a decoder over the bytes of a closed block.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::from_reader(BitReader::from_bytes(bytes))
    }

    /// Creates a decoder reading from an existing `BitReader`.
    pub fn from_reader(reader: BitReader<'a>) -> Self {
        Self {
            reader,
            stored: W::default(),
            stored_class: None,
            first: true,
            done: false,
        }
    }

    /// Returns the next word, or `None` once the end-of-stream marker is read.
    pub fn next_word(&mut self) -> Result<Option<W>> {
        if self.done {
            return Ok(None);
        }
        let result = self.read_word();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    /// Returns the next value as a float.
    pub fn next_float(&mut self) -> Result<Option<W::Float>> {
        Ok(self.next_word()?.map(W::to_float))
    }

    /// Returns `true` once the end-of-stream marker or an error has been reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn read_word(&mut self) -> Result<Option<W>> {
        let value = if self.first {
            self.first = false;
            W::from_u64(self.reader.read_bits(W::BITS)?)
        } else {
            match Control::read(&mut self.reader)? {
                Control::Repeat => {
                    self.stored_class = None;
                    self.stored
                }
                Control::Explicit => {
                    let xor = read_explicit::<W>(&mut self.reader)?;
                    self.stored_class = None;
                    word::apply(self.stored, xor)
                }
                Control::Reuse => {
                    let xor = read_reuse::<W>(&mut self.reader, self.stored_class)?;
                    word::apply(self.stored, xor)
                }
                Control::NewClass => {
                    let xor = read_new_class::<W>(&mut self.reader, &mut self.stored_class)?;
                    word::apply(self.stored, xor)
                }
            }
        };

        if word::is_end_of_stream(value) {
            trace!("end of chimp stream after {} bits", self.reader.position());
            return Ok(None);
        }
        self.stored = value;
        Ok(Some(value))
    }
}

impl<'a, W: Word> Iterator for ChimpDecoder<'a, W> {
    type Item = Result<W>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_word().transpose()
    }
}

/// Either Chimp decoder, selected by the window the block was encoded with.
///
/// # Example
/// ```
/// use chimp::{Decoder, Encoder, Window};
///
/// let window = Some(Window::DEFAULT);
/// let mut encoder = Encoder::<u64>::new(window);
/// for v in [1.0, 1.0, 2.0] {
///     encoder.push_float(v);
/// }
/// let block = encoder.into_compressed();
///
/// let words = Decoder::<u64>::decode(&block, window).unwrap();
/// assert_eq!(words, vec![1.0f64.to_bits(), 1.0f64.to_bits(), 2.0f64.to_bits()]);
/// ```
#[derive(Debug, Clone)]
pub enum Decoder<'a, W: Word> {
    /// Single previous-value reference.
    Chimp(ChimpDecoder<'a, W>),
    /// Windowed back-reference.
    ChimpN(ChimpNDecoder<'a, W>),
}

impl<'a, W: Word> Decoder<'a, W> {
    /// Creates a decoder over a `CompressedBlock`.
    ///
    /// `window` must match the encoder's; a mismatch decodes garbage rather
    /// than failing.
    pub fn new(block: &'a CompressedBlock, window: Option<Window>) -> Self {
        Self::from_reader(BitReader::from_raw(&block.bytes, block.total_bits), window)
    }

    /// Creates a decoder over the bytes of a closed block.
    pub fn from_bytes(bytes: &'a [u8], window: Option<Window>) -> Self {
        Self::from_reader(BitReader::from_bytes(bytes), window)
    }

    /// Creates a decoder reading from an existing `BitReader`.
    pub fn from_reader(reader: BitReader<'a>, window: Option<Window>) -> Self {
        match window {
            None => Decoder::Chimp(ChimpDecoder::from_reader(reader)),
            Some(window) => Decoder::ChimpN(ChimpNDecoder::from_reader(reader, window)),
        }
    }

    /// Decodes every word of a block.
    pub fn decode(block: &'a CompressedBlock, window: Option<Window>) -> Result<Vec<W>> {
        // Every word after the first costs at least two bits.
        let bound = (block.total_bits / 2) as u64 + 1;
        let mut words = Vec::with_capacity(block.count.min(bound) as usize);
        let mut decoder = Self::new(block, window);
        while let Some(word) = decoder.next_word()? {
            words.push(word);
        }
        Ok(words)
    }

    /// Returns the next word, or `None` once the end-of-stream marker is read.
    pub fn next_word(&mut self) -> Result<Option<W>> {
        match self {
            Decoder::Chimp(d) => d.next_word(),
            Decoder::ChimpN(d) => d.next_word(),
        }
    }

    /// Returns the next value as a float.
    pub fn next_float(&mut self) -> Result<Option<W::Float>> {
        Ok(self.next_word()?.map(W::to_float))
    }
}

impl<'a, W: Word> Iterator for Decoder<'a, W> {
    type Item = Result<W>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_word().transpose()
    }
}
