//! A module for Huffman encoding.
use std::io::{self, BufRead, BufWriter, Cursor, Seek, SeekFrom, Write};

use super::code::{counts_overflow, write_header, CodeTable, Frequencies};
use crate::bits::BitWriter;
use crate::{AllResult, CodecError};

/// A two-pass Huffman encoder.
///
/// The encoder reads its input twice: once to count symbols and once to emit code words. For this
/// reason it only accepts seekable readers, see [`IntoStream::encode_all`].
#[derive(Default)]
pub struct Encoder {
    /// The table used by the last encoding.
    table: Option<CodeTable>,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type.
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    /// Construct an encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Encode a complete buffer.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::with_capacity(data.len() / 2 + 16);
        self.into_stream(&mut output)
            .encode_all(Cursor::new(data))
            .status?;
        Ok(output)
    }

    /// The code table of the last encoded stream.
    ///
    /// This is `None` before the first encoding and after encoding an empty input.
    pub fn table(&self) -> Option<&CodeTable> {
        self.table.as_ref()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode all data from a reader.
    ///
    /// The reader is read to its end to count symbols, then seeked back to its position at the
    /// time of the call and read a second time to emit the code words.
    pub fn encode_all<R: BufRead + Seek>(self, mut read: R) -> AllResult {
        let IntoStream { encoder, mut writer } = self;
        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let status = encode_two_pass(
            encoder,
            &mut read,
            &mut writer,
            &mut bytes_read,
            &mut bytes_written,
        );

        if status.is_ok() {
            tracing::debug!(bytes_read, bytes_written, "finished huffman encoding");
        }

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

fn encode_two_pass<R: BufRead + Seek, W: Write>(
    encoder: &mut Encoder,
    read: &mut R,
    writer: &mut W,
    bytes_read: &mut usize,
    bytes_written: &mut usize,
) -> Result<(), CodecError> {
    encoder.table = None;
    let start = read.stream_position()?;

    let mut freq = Frequencies::new();
    loop {
        let data = fill_buf(read)?;
        if data.is_empty() {
            break;
        }
        freq.add(data);
        let len = data.len();
        read.consume(len);
    }

    let total = freq.total().ok_or_else(counts_overflow)?;
    let table = if total == 0 {
        None
    } else {
        Some(CodeTable::from_frequencies(&freq)?)
    };

    let mut out = BufWriter::new(writer);
    *bytes_written += write_header(&mut out, table.as_ref(), total)?;

    if let Some(table) = &table {
        read.seek(SeekFrom::Start(start))?;
        let mut bits = BitWriter::new(&mut out);
        let mut seen = 0u64;
        loop {
            let data = fill_buf(read)?;
            if data.is_empty() {
                break;
            }

            for &byte in data {
                let code = table.get(byte).ok_or_else(changed_input)?;
                bits.write_bits(code.bits(), code.len())?;
            }

            let len = data.len();
            read.consume(len);
            *bytes_read += len;
            seen += len as u64;
        }

        if seen != total {
            return Err(changed_input());
        }

        let (_, written) = bits.finish()?;
        *bytes_written += written;
    }

    out.flush()?;
    encoder.table = table;
    Ok(())
}

fn fill_buf<R: BufRead>(read: &mut R) -> io::Result<&[u8]> {
    loop {
        match read.fill_buf() {
            Ok(_) => break,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    read.fill_buf()
}

fn changed_input() -> CodecError {
    CodecError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        "input changed between counting and encoding",
    ))
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use std::io::{Cursor, Seek, SeekFrom};

    #[test]
    fn three_symbol_payload_is_two_bytes() {
        let mut encoder = Encoder::new();
        let out = encoder.encode(b"aaabbc").unwrap();
        let table = encoder.table().unwrap();
        // 2 count + 3 * (symbol, len, one code byte) + 8 total
        let header = 2 + 3 * 3 + 8;
        assert_eq!(out.len(), header + 2);
        // a=0 a=0 a=0 b=11 b=11 c=10, zero padded
        assert_eq!(&out[header..], [0b0001_1111, 0b0000_0000]);
        assert_eq!(table.get(b'a').unwrap().len(), 1);
    }

    #[test]
    fn empty_input_is_header_only() {
        let mut encoder = Encoder::new();
        let out = encoder.encode(b"").unwrap();
        assert_eq!(out, [0u8; 10]);
        assert!(encoder.table().is_none());
    }

    #[test]
    fn single_symbol_has_no_payload() {
        let out = Encoder::new().encode(b"aaaa").unwrap();
        // one entry with an empty code word, then the total
        assert_eq!(out, [0, 1, b'a', 0, 0, 0, 0, 0, 0, 0, 0, 4]);
    }

    #[test]
    fn rewinds_to_start_position() {
        let mut input = Cursor::new(b"skip:abracadabra".to_vec());
        input.seek(SeekFrom::Start(5)).unwrap();

        let mut from_offset = vec![];
        let result = Encoder::new().into_stream(&mut from_offset).encode_all(input);
        assert!(result.status.is_ok());
        assert_eq!(result.bytes_read, 11);
        assert_eq!(result.bytes_written, from_offset.len());

        let direct = Encoder::new().encode(b"abracadabra").unwrap();
        assert_eq!(from_offset, direct);
    }
}
