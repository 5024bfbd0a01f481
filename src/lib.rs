//! # Chimp
//!
//! A Rust implementation of the Chimp and ChimpN floating-point compression
//! schemes from *"Chimp: Efficient Lossless Floating Point Compression for
//! Time Series Databases"* (VLDB 2022), for 32-bit and 64-bit words.
//!
//! ## Algorithm overview
//!
//! Adjacent readings of a sensor or metric usually share their sign,
//! exponent and top mantissa bits. Each value is XORed with a reference and
//! only the bits between the leading and trailing zero runs of the XOR are
//! kept:
//!
//! - **Chimp** uses the previous value as the reference. Leading zeros are
//!   rounded down to one of eight classes so they fit in 3 bits, and a
//!   trailing-zero run is only stripped when it is long enough to pay for the
//!   extra length field.
//!
//! - **ChimpN** keeps the last `N` values in a ring buffer and indexes them by
//!   their low bits. A value whose low bits match a recent one is XORed with
//!   that one instead, which suits periodic and seasonal series.
//!
//! Every block ends with a NaN marker, so a block holding the canonical quiet
//! NaN as a genuine sample decodes short.
//!
//! ## Example
//!
//! ```rust
//! use chimp::{ChimpDecoder, ChimpEncoder};
//!
//! // Compress
//! let mut encoder = ChimpEncoder::<u64>::new();
//! encoder.push_float(12.0);
//! encoder.push_float(12.5);
//! encoder.push_float(13.0);
//! encoder.close();
//!
//! let compressed = encoder.into_compressed();
//! println!("Compressed {} values into {} bytes", compressed.count, compressed.bytes.len());
//!
//! // Decompress
//! let values: Vec<f64> = ChimpDecoder::<u64>::new(&compressed)
//!     .map(|w| f64::from_bits(w.unwrap()))
//!     .collect();
//! assert_eq!(values, vec![12.0, 12.5, 13.0]);
//! ```
//!
//! ## Windowed compression
//!
//! The window is not stored in the block; decode with the one you encoded with.
//!
//! ```rust
//! use chimp::{Decoder, Encoder, Window};
//!
//! let window = Some(Window::new(32).unwrap());
//! let mut encoder = Encoder::<u32>::new(window);
//! for i in 0..100 {
//!     encoder.push_float([20.5f32, 21.0, 19.75][i % 3]);
//! }
//! let block = encoder.into_compressed();
//!
//! for result in Decoder::<u32>::new(&block, window) {
//!     let word = result.unwrap();
//!     println!("{}", f32::from_bits(word));
//! }
//! ```

pub mod bitbuffer;
pub mod class;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod window;
pub mod windowed_decoder;
pub mod windowed_encoder;
pub mod word;

// Re-export primary types at the crate root.
pub use decoder::{ChimpDecoder, Decoder};
pub use encoder::{ChimpEncoder, CompressedBlock, Encoder};
pub use error::{Error, Result};
pub use window::Window;
pub use windowed_decoder::ChimpNDecoder;
pub use windowed_encoder::ChimpNEncoder;
pub use word::{is_end_of_stream, Word};
