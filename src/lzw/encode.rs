//! A module for all LZW encoding needs.
use std::io::{self, BufRead, Write};

use super::dict::{EncodeTable, Step};
use super::{stream, Configuration};
use crate::{AllResult, Code, CodecError, Status, StreamResult};

/// An incremental LZW encoder.
///
/// Feed input with [`encode_bytes`] and mark its end with [`finish`], or use one of the stream
/// adapters. After a stream has been completed call [`reset`] before encoding the next one.
///
/// [`encode_bytes`]: #method.encode_bytes
/// [`finish`]: #method.finish
/// [`reset`]: #method.reset
pub struct Encoder {
    state: EncodeState,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

/// An async encoding sink.
///
/// See [`Encoder::into_async`] on how to create this type and more information.
#[cfg(feature = "async")]
pub struct IntoAsync<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

struct EncodeState {
    config: Configuration,
    /// The current encoding dictionary.
    table: EncodeTable,
    /// The code corresponding to the currently read characters.
    current: Option<Code>,
    /// If the input has been marked complete.
    has_ended: bool,
    /// If the final code has been buffered.
    has_flushed: bool,
    /// A byte outside the alphabet that stopped the encoding.
    rejected: Option<u8>,
    /// The big-endian bytes of the last code, `pending[start..]` is not yet written.
    pending: [u8; 4],
    start: usize,
}

impl Encoder {
    /// Create a new encoder for the given code width and alphabet.
    pub fn new(config: Configuration) -> Self {
        Encoder {
            state: EncodeState::new(config),
        }
    }

    /// Encode some bytes from `inp` into `out`.
    ///
    /// Output is only produced in whole codes, though a code may be split across the output
    /// buffers of consecutive calls. See [`into_stream`] for high-level functions and [`finish`]
    /// for marking the input data as complete.
    ///
    /// [`into_stream`]: #method.into_stream
    /// [`finish`]: #method.finish
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.state.advance(inp, out)
    }

    /// Mark the encoding as finished.
    ///
    /// In following calls to `encode_bytes` the encoder will emit the code of the pending prefix
    /// after encoding all of `inp` and then report [`Status::Done`].
    pub fn finish(&mut self) {
        self.state.has_ended = true;
    }

    /// Reset all internal state, starting a new stream with a fresh dictionary.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Construct an encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    /// Construct an encoder into an async writer.
    #[cfg(feature = "async")]
    pub fn into_async<W: futures::io::AsyncWrite>(&mut self, writer: W) -> IntoAsync<'_, W> {
        IntoAsync {
            encoder: self,
            writer,
        }
    }

    /// Encode a complete buffer as a new stream.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        self.reset();
        let mut output = Vec::with_capacity(data.len() + self.state.config.bytes_per_code());
        self.into_stream(&mut output).encode_all(data).status?;
        Ok(output)
    }

    /// The number of dictionary entries, the seeds included.
    pub fn dictionary_len(&self) -> u64 {
        self.state.table.len()
    }

    pub fn configuration(&self) -> Configuration {
        self.state.config
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode data from a reader.
    ///
    /// This will drain the supplied reader. It will not emit the pending prefix after all data
    /// has been processed, so more data can follow in another call.
    pub fn encode(&mut self, read: impl BufRead) -> AllResult {
        stream::pump(&mut *self.encoder, read, &mut self.writer, false)
    }

    /// Encode data from a reader and complete the stream.
    pub fn encode_all(mut self, read: impl BufRead) -> AllResult {
        stream::pump(&mut *self.encoder, read, &mut self.writer, true)
    }
}

#[cfg(feature = "async")]
impl<W: futures::io::AsyncWrite + core::marker::Unpin> IntoAsync<'_, W> {
    /// Encode data from an async reader without completing the stream.
    pub async fn encode(&mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        stream::pump_async(&mut *self.encoder, read, &mut self.writer, false).await
    }

    /// Encode data from an async reader and complete the stream.
    pub async fn encode_all(mut self, read: impl futures::io::AsyncBufRead) -> AllResult {
        stream::pump_async(&mut *self.encoder, read, &mut self.writer, true).await
    }
}

impl stream::Coder for Encoder {
    fn code_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult {
        self.encode_bytes(inp, out)
    }

    fn finish(&mut self) {
        Encoder::finish(self);
    }

    fn stalled() -> CodecError {
        CodecError::Io(io::Error::new(
            io::ErrorKind::WriteZero,
            "encoder made no progress",
        ))
    }
}

impl EncodeState {
    fn new(config: Configuration) -> Self {
        EncodeState {
            config,
            table: EncodeTable::new(&config),
            current: None,
            has_ended: false,
            has_flushed: false,
            rejected: None,
            pending: [0; 4],
            start: 4,
        }
    }

    fn reset(&mut self) {
        self.table.reset();
        self.current = None;
        self.has_ended = false;
        self.has_flushed = false;
        self.rejected = None;
        self.start = self.pending.len();
    }

    fn advance(&mut self, mut inp: &[u8], mut out: &mut [u8]) -> StreamResult {
        if let Some(byte) = self.rejected {
            return StreamResult {
                consumed_in: 0,
                consumed_out: 0,
                status: Err(CodecError::InvalidSymbol(byte)),
            };
        }

        let c_in = inp.len();
        let c_out = out.len();
        let mut status = Ok(Status::Ok);

        loop {
            if self.push_out(&mut out) || self.has_flushed {
                break;
            }

            let (&byte, rest) = match inp.split_first() {
                Some(split) => split,
                None if self.has_ended => {
                    if let Some(code) = self.current.take() {
                        self.buffer_code(code);
                    }
                    self.has_flushed = true;
                    continue;
                }
                None => break,
            };

            if u16::from(byte) >= self.config.alphabet_size() {
                self.rejected = Some(byte);
                status = Err(CodecError::InvalidSymbol(byte));
                break;
            }

            inp = rest;
            match self.table.lookup_or_extend(self.current, byte) {
                Step::Extend(code) => self.current = Some(code),
                Step::Emit(code) => {
                    self.buffer_code(code);
                    self.current = Some(Code::from(byte));
                }
            }
        }

        let consumed_in = c_in - inp.len();
        let consumed_out = c_out - out.len();
        if status.is_ok() {
            if self.has_flushed && self.start == self.pending.len() {
                status = Ok(Status::Done);
            } else if consumed_in == 0 && consumed_out == 0 {
                status = Ok(Status::NoProgress);
            }
        }

        tracing::trace!(consumed_in, consumed_out, "lzw encode step");
        StreamResult {
            consumed_in,
            consumed_out,
            status,
        }
    }

    /// Write pending code bytes, returning if some remain.
    fn push_out(&mut self, out: &mut &mut [u8]) -> bool {
        let pending = &self.pending[self.start..];
        let count = pending.len().min(out.len());
        let (bytes, tail) = core::mem::take(out).split_at_mut(count);
        bytes.copy_from_slice(&pending[..count]);
        *out = tail;
        self.start += count;
        self.start < self.pending.len()
    }

    fn buffer_code(&mut self, code: Code) {
        debug_assert_eq!(self.start, self.pending.len());
        self.pending = code.to_be_bytes();
        self.start = self.pending.len() - self.config.bytes_per_code();
    }
}
