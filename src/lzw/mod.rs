//! Single-pass adaptive LZW coding.
//!
//! Both sides start with one dictionary entry per symbol of the alphabet (codes `0..n`) and add
//! one entry per emitted code while the next free code is at most `2^nb - 1`. Afterwards the
//! dictionary stays fixed and coding continues with the existing entries.
//!
//! Every code is written as a `ceil(nb / 8)` byte big-endian integer. There is neither a header
//! nor an end code, the stream simply ends after the last code. The decoder must therefore be
//! told when its input is complete, see [`Decoder::finish`].
use crate::{CodecError, DEFAULT_ALPHABET_SIZE, DEFAULT_CODE_WIDTH, MAX_ALPHABET, MAX_CODESIZE};

pub mod decode;
mod dict;
pub mod encode;
mod stream;

pub use self::decode::Decoder;
pub use self::encode::Encoder;

/// Buffer size of the `std::io` and `async` stream adapters.
pub(crate) const STREAM_BUFFER: usize = 1 << 16;

/// Code width and alphabet size shared by an encoder and its decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Configuration {
    code_width: u8,
    alphabet_size: u16,
}

impl Configuration {
    /// Validate a code width `nb` and an alphabet size `n`.
    ///
    /// The code width must be between 1 and 32 bits, the alphabet between 1 and 256 symbols and
    /// every symbol must be representable as a code.
    pub fn new(code_width: u8, alphabet_size: u16) -> Result<Self, CodecError> {
        if code_width == 0 {
            return Err(CodecError::Configuration("code width must be positive"));
        }
        if code_width > MAX_CODESIZE {
            return Err(CodecError::Configuration("code width exceeds 32 bits"));
        }
        if alphabet_size == 0 || alphabet_size > MAX_ALPHABET {
            return Err(CodecError::Configuration(
                "alphabet size must be between 1 and 256",
            ));
        }
        if (1u64 << code_width) < u64::from(alphabet_size) {
            return Err(CodecError::Configuration(
                "code width too small for the alphabet",
            ));
        }

        Ok(Configuration {
            code_width,
            alphabet_size,
        })
    }

    /// Change the code width, keeping the alphabet.
    pub fn with_code_width(self, code_width: u8) -> Result<Self, CodecError> {
        Configuration::new(code_width, self.alphabet_size)
    }

    /// Change the alphabet size, keeping the code width.
    pub fn with_alphabet_size(self, alphabet_size: u16) -> Result<Self, CodecError> {
        Configuration::new(self.code_width, alphabet_size)
    }

    pub fn code_width(&self) -> u8 {
        self.code_width
    }

    pub fn alphabet_size(&self) -> u16 {
        self.alphabet_size
    }

    /// The number of bytes every code occupies in the stream.
    pub fn bytes_per_code(&self) -> usize {
        usize::from((self.code_width + 7) / 8)
    }

    /// The largest code that may be assigned, `2^nb - 1`.
    pub fn max_code(&self) -> u64 {
        (1u64 << self.code_width) - 1
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            code_width: DEFAULT_CODE_WIDTH,
            alphabet_size: DEFAULT_ALPHABET_SIZE,
        }
    }
}
