//! Error types for Chimp encoding and decoding.

use thiserror::Error;

use crate::window::Window;

/// Errors raised while configuring a codec or decoding a block.
///
/// Every decoding error is fatal for the block it occurred in: the meaning of
/// each bit depends on all the bits before it, so there is nothing to resume.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The bit stream ended in the middle of a field.
    #[error("unexpected end of compressed stream: needed {needed} bits, {remaining} remaining")]
    UnexpectedEnd {
        /// Width of the field being read.
        needed: u8,
        /// Bits left in the stream when the read was attempted.
        remaining: usize,
    },

    /// The requested history window is not a power of two in the supported range.
    #[error("invalid window size {0}: must be a power of two between 1 and {max}", max = Window::MAX_SIZE)]
    InvalidWindow(usize),

    /// The stream contains a codeword no encoder could have produced.
    #[error("corrupt stream: {0}")]
    Corrupt(&'static str),
}

/// Convenience type alias for results carrying a Chimp [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
