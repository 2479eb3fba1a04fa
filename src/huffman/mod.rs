//! Two-pass static Huffman coding.
//!
//! The compressed stream is a self-describing header followed by the packed code words:
//!
//! ```text
//! u16 entries
//! entries * { u8 symbol, u8 len, ceil(len / 8) bytes code word, right aligned }
//! u64 total symbols
//! code words, most significant bit first, zero padded to a byte
//! ```
//!
//! All integers are big-endian. An input of one distinct symbol gets the empty code word and no
//! payload; the decoder repeats that symbol `total` times. An empty input is a header with no
//! entries and a total of zero.
mod code;
pub mod decode;
pub mod encode;

pub use self::code::{CodeTable, Codeword, Frequencies, MAX_CODEWORD_LEN};
pub use self::decode::Decoder;
pub use self::encode::Encoder;
