use log::trace;

use crate::bitbuffer::BitReader;
use crate::class::LeadingClass;
use crate::decoder::{read_explicit, read_new_class, read_reuse, Control};
use crate::encoder::CompressedBlock;
use crate::error::Result;
use crate::window::{History, Window};
use crate::word::{self, Word};

/// The ChimpN decompressor.
///
/// Rebuilds its own history window from the words it decodes; `00` and `01`
/// codewords name the slot they were encoded against, `10` and `11` always
/// refer to the previous word.
///
/// # Example
/// ```
/// use chimp::{ChimpNDecoder, ChimpNEncoder, Window};
///
/// let window = Window::new(32).unwrap();
/// let mut encoder = ChimpNEncoder::<u32>::new(window);
/// for v in [1.0f32, -2.0, -2.5, 1.0] {
///     encoder.push_float(v);
/// }
/// let block = encoder.into_compressed();
///
/// let floats: Vec<f32> = ChimpNDecoder::<u32>::new(&block, window)
///     .map(|w| f32::from_bits(w.unwrap()))
///     .collect();
/// assert_eq!(floats, vec![1.0, -2.0, -2.5, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ChimpNDecoder<'a, W: Word> {
    reader: BitReader<'a>,
    window: Window,
    history: History<W>,
    stored_class: Option<LeadingClass>,
    first: bool,
    done: bool,
}

impl<'a, W: Word> ChimpNDecoder<'a, W> {
    /// Creates a decoder over a `CompressedBlock` encoded with `window`.
    pub fn new(block: &'a CompressedBlock, window: Window) -> Self {
        Self::from_reader(BitReader::from_raw(&block.bytes, block.total_bits), window)
    }

    /// Creates a decoder over the bytes of a closed block.
    pub fn from_bytes(bytes: &'a [u8], window: Window) -> Self {
        Self::from_reader(BitReader::from_bytes(bytes), window)
    }

    /// Creates a decoder reading from an existing `BitReader`.
    pub fn from_reader(reader: BitReader<'a>, window: Window) -> Self {
        Self {
            reader,
            window,
            history: History::new(window),
            stored_class: None,
            first: true,
            done: false,
        }
    }

    /// The history window this decoder was built with.
    pub fn window(&self) -> Window {
        self.window
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
        if self.first {
            self.first = false;
            let value = W::from_u64(self.reader.read_bits(W::BITS)?);
            if word::is_end_of_stream(value) {
                trace!("empty chimp{} stream", self.window.size());
                return Ok(None);
            }
            self.history.seed(value);
            return Ok(Some(value));
        }

        let value = match Control::read(&mut self.reader)? {
            Control::Repeat => {
                let slot = self.read_slot()?;
                self.stored_class = None;
                self.history.get(slot)
            }
            Control::Explicit => {
                let slot = self.read_slot()?;
                let xor = read_explicit::<W>(&mut self.reader)?;
                self.stored_class = None;
                word::apply(self.history.get(slot), xor)
            }
            Control::Reuse => {
                let xor = read_reuse::<W>(&mut self.reader, self.stored_class)?;
                word::apply(self.history.latest(), xor)
            }
            Control::NewClass => {
                let xor = read_new_class::<W>(&mut self.reader, &mut self.stored_class)?;
                word::apply(self.history.latest(), xor)
            }
        };

        if word::is_end_of_stream(value) {
            trace!(
                "end of chimp{} stream after {} bits",
                self.window.size(),
                self.reader.position()
            );
            return Ok(None);
        }
        self.history.push(value);
        Ok(Some(value))
    }

    #[inline]
    fn read_slot(&mut self) -> Result<usize> {
        Ok(self.reader.read_bits(self.window.log2())? as usize)
    }
}

impl<'a, W: Word> Iterator for ChimpNDecoder<'a, W> {
    type Item = Result<W>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_word().transpose()
    }
}
