use std::io;

use thiserror::Error;

/// Errors reported by the Huffman and LZW coders.
///
/// None of these leave a coder in a state where it produces further output for the same stream;
/// once an error is returned the remaining input should be discarded.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The coder was configured with values it can not work with.
    #[error("invalid configuration: {0}")]
    Configuration(&'static str),

    /// The Huffman code table or symbol count header could not be read.
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    /// A code that can not be valid given the current table state.
    #[error("invalid code {0:#x}")]
    InvalidCode(u64),

    /// An input byte outside the configured LZW alphabet.
    #[error("symbol {0} is outside of the alphabet")]
    InvalidSymbol(u8),

    /// The input ended before the decoder reached its terminal condition.
    #[error("unexpected end of compressed stream")]
    IncompleteStream,

    /// The underlying reader or writer failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(err) => err,
            CodecError::IncompleteStream => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
