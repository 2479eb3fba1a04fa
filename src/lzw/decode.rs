//! A module for all LZW decoding needs.
use std::io::{BufRead, Write};

use super::dict::DecodeTable;
use super::{stream, Configuration};
use crate::{AllResult, Code, CodecError, Status, StreamResult};

/// An incremental LZW decoder.
///
/// The stream format has no end marker. Call [`finish`] once all compressed input has been
/// supplied so that a trailing partial code can be detected; the stream adapters do this when
/// their reader is exhausted.
///
/// [`finish`]: #method.finish
pub struct Decoder {
    state: DecodeState,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

/// An async decoding sink.
///
/// See [`Decoder::into_async`] on how to create this type and more information.
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

/// A detected corruption, reported again by every later call.
#[derive(Clone, Copy, Debug)]
enum Failure {
    InvalidCode(u64),
    Incomplete,
}

struct DecodeState {
    config: Configuration,
    /// The table of decoded codes.
    table: DecodeTable,
    /// The last decoded code, `None` at the start of a stream.
    last: Option<Code>,
    /// The string of the last code; `previous[read_mark..]` has not been written yet.
    previous: Vec<u8>,
    read_mark: usize,
    /// Space for decoding the next string.
    scratch: Vec<u8>,
    /// The bytes of a code that has not been completely read.
    partial: [u8; 4],
    partial_len: usize,
    has_ended: bool,
    is_done: bool,
    failure: Option<Failure>,
}

impl Decoder {
    /// Create a new decoder for the given code width and alphabet.
    pub fn new(config: Configuration) -> Self {
        Decoder {
            state: DecodeState::new(config),
        }
    }

    /// Decode some bytes from `inp` and write result to `out`.
    ///
    /// This will consume a prefix of the input buffer and write decoded output into a prefix of
    /// the output buffer. See the respective fields of the return value for the count of consumed
    /// and written bytes. For the next call You should have adjusted the inputs accordingly.
    ///
    /// A decoded string that does not fit into `out` is written over the following calls, before
    /// any further input is consumed.
    pub fn decode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Mark the compressed input as complete.
    ///
    /// Once the remaining output has been written the next call to `decode_bytes` reports
    /// [`Status::Done`], or [`CodecError::IncompleteStream`] if the input ended inside a code.
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }

    /// Reset all internal state, starting a new stream with a fresh dictionary.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    /// Construct a decoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            decoder: self,
            writer,
        }
    }

    /// Decode a complete compressed buffer as a new stream.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.reset();
        let mut output = Vec::with_capacity(2 * data.len());
        self.into_stream(&mut output).decode_all(data).status?;
        Ok(output)
    }

    /// The number of dictionary entries, the seeds included.
    pub fn dictionary_len(&self) -> u64 {
        self.state.table.len()
    }

    pub fn configuration(&self) -> Configuration {
        self.state.config
    }

    /// Check if the decoding has finished.
    pub fn has_ended(&self) -> bool {
        self.state.is_done
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode data from a reader.
    ///
    /// This will read data until the stream is empty but keep a trailing partial code for a
    /// following call.
    pub fn decode(&mut self, read: impl BufRead) -> AllResult {
        stream::pump(&mut *self.decoder, read, &mut self.writer, false)
    }

    /// Decode data from a reader, requiring that the stream ends on a code boundary.
    pub fn decode_all(mut self, read: impl BufRead) -> AllResult {
        stream::pump(&mut *self.decoder, read, &mut self.writer, true)
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'_, W> {
    /// Decode data from an async reader, keeping a trailing partial code.
    pub async fn decode(&mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        stream::pump_async(&mut *self.decoder, read, &mut self.writer, false).await
    }

    /// Decode data from an async reader, requiring that the stream ends on a code boundary.
    pub async fn decode_all(mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        stream::pump_async(&mut *self.decoder, read, &mut self.writer, true).await
    }
}

impl stream::Coder for Decoder {
    fn code_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.decode_bytes(inp, out)
    }

    fn finish(&mut self) {
        Decoder::finish(self);
    }

    fn stalled() -> CodecError {
        CodecError::IncompleteStream
    }
}

impl Failure {
    fn error(self) -> CodecError {
        match self {
            Failure::InvalidCode(code) => CodecError::InvalidCode(code),
            Failure::Incomplete => CodecError::IncompleteStream,
        }
    }
}

impl DecodeState {
    fn new(config: Configuration) -> Self {
        DecodeState {
            config,
            table: DecodeTable::new(&config),
            last: None,
            previous: Vec::new(),
            read_mark: 0,
            scratch: Vec::new(),
            partial: [0; 4],
            partial_len: 0,
            has_ended: false,
            is_done: false,
            failure: None,
        }
    }

    fn reset(&mut self) {
        self.table.reset();
        self.last = None;
        self.previous.clear();
        self.read_mark = 0;
        self.partial_len = 0;
        self.has_ended = false;
        self.is_done = false;
        self.failure = None;
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        if let Some(failure) = self.failure {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Err(failure.error()),
            };
        }

        let o_in = inp.len();
        let o_out = out.len();
        let width = self.config.bytes_per_code();
        let mut status = Ok(Status::Ok);

        loop {
            if self.push_out(&mut out) || self.is_done {
                break;
            }

            while self.partial_len < width {
                match inp.split_first() {
                    Some((&byte, rest)) => {
                        self.partial[self.partial_len] = byte;
                        self.partial_len += 1;
                        inp = rest;
                    }
                    None => break,
                }
            }

            if self.partial_len < width {
                if self.has_ended {
                    if self.partial_len > 0 {
                        self.failure = Some(Failure::Incomplete);
                        status = Err(CodecError::IncompleteStream);
                    } else {
                        self.is_done = true;
                    }
                }
                break;
            }

            let code = self.partial[..width]
                .iter()
                .fold(0, |acc: Code, &byte| acc << 8 | Code::from(byte));
            self.partial_len = 0;

            let previous = self.last.map(|last| (last, self.previous.as_slice()));
            if let Err(err) = self.table.step(code, previous, &mut self.scratch) {
                self.failure = Some(Failure::InvalidCode(u64::from(code)));
                status = Err(err);
                break;
            }

            core::mem::swap(&mut self.previous, &mut self.scratch);
            self.read_mark = 0;
            self.last = Some(code);
        }

        let consumed_in = o_in - inp.len();
        let consumed_out = o_out - out.len();
        if status.is_ok() {
            if self.is_done {
                status = Ok(Status::Done);
            } else if consumed_in == 0 && consumed_out == 0 {
                status = Ok(Status::NoProgress);
            }
        }

        tracing::trace!(consumed_in, consumed_out, "lzw decode step");
        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    /// Write the rest of the last decoded string, returning if some remains.
    fn push_out(&mut self, out: &mut &mut [u8]) -> bool {
        let pending = &self.previous[self.read_mark..];
        let count = pending.len().min(out.len());
        let (bytes, tail) = core::mem::take(out).split_at_mut(count);
        bytes.copy_from_slice(&pending[..count]);
        *out = tail;
        self.read_mark += count;
        self.read_mark < self.previous.len()
    }
}
