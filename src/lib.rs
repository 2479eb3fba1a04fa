//! # Huffman and LZW coders
//!
//! This crate provides two independent lossless codecs:
//!
//!  * [`huffman`]: a two-pass static Huffman coder. The first pass counts byte frequencies, the
//!    second writes a self-describing code table header followed by the MSB-first packed code
//!    words.
//!  * [`lzw`]: a single-pass adaptive LZW coder. Codes are written as fixed-width big-endian
//!    integers of `ceil(nb / 8)` bytes each with no header and no end marker, so both sides must
//!    agree on the code width `nb` and the alphabet size out of band.
//!
//! Example use of the LZW encoder:
//!
//! ```
//! use squeezl::lzw::{Configuration, Encoder, Decoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let config = Configuration::default();
//! let compressed = Encoder::new(config).encode(data).unwrap();
//! let decompressed = Decoder::new(config).decode(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
//!
//! And of the Huffman encoder:
//!
//! ```
//! use squeezl::huffman::{Encoder, Decoder};
//! let data = b"aaabbc";
//!
//! let compressed = Encoder::new().encode(data).unwrap();
//! let decompressed = Decoder::new().decode(&compressed).unwrap();
//! assert_eq!(decompressed, data);
//! ```
#![forbid(unsafe_code)]

/// Default number of bits per LZW code.
pub const DEFAULT_CODE_WIDTH: u8 = 16;
/// Default number of single byte seed entries in an LZW dictionary.
pub const DEFAULT_ALPHABET_SIZE: u16 = 256;

pub(crate) const MAX_CODESIZE: u8 = 32;
pub(crate) const MAX_ALPHABET: u16 = 256;

/// Alias for a LZW code point
pub(crate) type Code = u32;

/// The status after successful coding of some bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Input or output was consumed.
    Ok,
    /// Neither input was consumed nor output produced.
    NoProgress,
    /// The stream has been completely coded and all output has been written.
    Done,
}

/// The result of a coding operation on a pair of buffers.
#[must_use = "Contains a status with potential error information"]
#[derive(Debug)]
pub struct StreamResult {
    /// The number of bytes consumed from the input buffer.
    pub consumed_in: usize,
    /// The number of bytes written into the output buffer.
    pub consumed_out: usize,
    /// The status after returning from the call.
    pub status: Result<Status, CodecError>,
}

/// The result of coding a whole reader into a writer.
#[must_use = "Contains a status with potential error information"]
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The possible error that occurred.
    ///
    /// Note that when writing into streams it is not in general possible to recover from an
    /// error.
    pub status: Result<(), CodecError>,
}

mod bits;
mod error;
mod heap;
pub mod huffman;
pub mod lzw;

pub use crate::error::CodecError;
