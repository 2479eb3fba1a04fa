//! A module for Huffman decoding.
use std::io::{BufRead, BufWriter, Write};

use super::code::{read_header, CodeTable, Codeword};
use crate::bits::BitReader;
use crate::{AllResult, CodecError};

/// The repeated symbol of a single entry table is written in chunks of this size.
const RUN_CHUNK: usize = 1 << 12;

/// A table driven Huffman decoder.
#[derive(Default)]
pub struct Decoder {
    /// The table read from the last stream.
    table: Option<CodeTable>,
    /// The largest symbol count a header may announce.
    limit: Option<u64>,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type.
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::default()
    }

    /// Create a decoder that rejects streams announcing more than `limit` symbols.
    ///
    /// The check happens right after the header, before any output is written.
    pub fn with_output_limit(limit: u64) -> Self {
        Decoder {
            table: None,
            limit: Some(limit),
        }
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Decode a complete compressed buffer.
    ///
    /// A header with a single symbol expands to its announced count without reading any payload,
    /// so a few bytes of input may describe up to `u64::MAX` bytes of output. Use
    /// [`Decoder::with_output_limit`] for untrusted input.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut output = vec![];
        self.into_stream(&mut output).decode_all(data).status?;
        Ok(output)
    }

    /// The code table of the last decoded stream.
    pub fn table(&self) -> Option<&CodeTable> {
        self.table.as_ref()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode a header and all symbols it announces from a reader.
    ///
    /// Reading stops once the announced number of symbols has been decoded, so padding bits and
    /// any bytes after the stream are left alone. The announced number is only bounded by the
    /// decoder's output limit, see [`Decoder::with_output_limit`].
    pub fn decode_all<R: BufRead>(self, mut read: R) -> AllResult {
        let IntoStream { decoder, mut writer } = self;
        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let status = decode_stream(
            decoder,
            &mut read,
            &mut writer,
            &mut bytes_read,
            &mut bytes_written,
        );

        if status.is_ok() {
            tracing::debug!(bytes_read, bytes_written, "finished huffman decoding");
        }

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}

fn decode_stream<R: BufRead, W: Write>(
    decoder: &mut Decoder,
    read: &mut R,
    writer: &mut W,
    bytes_read: &mut usize,
    bytes_written: &mut usize,
) -> Result<(), CodecError> {
    decoder.table = None;
    let (table, total, header_len) = read_header(read)?;
    *bytes_read += header_len;

    if decoder.limit.map_or(false, |limit| total > limit) {
        return Err(CodecError::Configuration(
            "announced symbol count exceeds the output limit",
        ));
    }

    let table = match table {
        Some(table) => table,
        None => return Ok(()),
    };

    let mut out = BufWriter::new(writer);
    if let Some(symbol) = table.single_symbol() {
        let run = [symbol; RUN_CHUNK];
        let mut remaining = total;
        while remaining > 0 {
            let len = remaining.min(RUN_CHUNK as u64) as usize;
            out.write_all(&run[..len])?;
            remaining -= len as u64;
            *bytes_written += len;
        }
    } else {
        let inverse = table.inverse();
        let max_len = table.max_len();
        let mut bits = BitReader::new(&mut *read);
        let mut candidate = Codeword::default();
        let mut decoded = 0u64;

        let status = loop {
            if decoded == total {
                break Ok(());
            }

            let bit = match bits.read_bit() {
                Ok(Some(bit)) => bit,
                Ok(None) => break Err(CodecError::IncompleteStream),
                Err(err) => break Err(CodecError::Io(err)),
            };

            candidate.push(bit);
            if let Some(&symbol) = inverse.get(&candidate) {
                if let Err(err) = out.write_all(&[symbol]) {
                    break Err(CodecError::Io(err));
                }
                *bytes_written += 1;
                decoded += 1;
                candidate = Codeword::default();
            } else if candidate.len() >= max_len {
                break Err(CodecError::InvalidCode(candidate.bits() as u64));
            }
        };

        *bytes_read += bits.bytes_read();
        status?;
    }

    out.flush()?;
    decoder.table = Some(table);
    Ok(())
}
