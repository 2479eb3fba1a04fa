//! Reader to writer loops shared by both coding directions.
use std::io::{BufRead, Write};

use super::STREAM_BUFFER;
use crate::{AllResult, CodecError, Status, StreamResult};

/// An incremental coder as seen by the stream adapters.
pub(crate) trait Coder {
    fn code_bytes(&mut self, inp: &[u8], out: &mut [u8]) -> StreamResult;

    fn finish(&mut self);

    /// The error for a call that neither consumed nor produced anything.
    fn stalled() -> CodecError;
}

/// What one round of the loop asks for.
enum Round {
    Continue,
    Stop(Result<(), CodecError>),
}

/// Code everything `read` yields into `writer`.
///
/// With `finish` the coder is told about the end of input once `read` is exhausted and the loop
/// runs until the coder is done. Otherwise it stops at the end of `read`, keeping any state for
/// a following call.
pub(crate) fn pump<C: Coder>(
    coder: &mut C,
    mut read: impl BufRead,
    writer: &mut impl Write,
    finish: bool,
) -> AllResult {
    let mut bytes_read = 0;
    let mut bytes_written = 0;
    let mut outbuf = vec![0; STREAM_BUFFER];

    let status = loop {
        let data = match read.fill_buf() {
            Ok(data) => data,
            Err(err) => break Err(CodecError::Io(err)),
        };

        if data.is_empty() {
            if !finish {
                break Ok(());
            }
            coder.finish();
        }

        let result = coder.code_bytes(data, &mut outbuf);
        bytes_read += result.consumed_in;
        bytes_written += result.consumed_out;
        read.consume(result.consumed_in);

        // Output before an error is still valid.
        if let Err(err) = writer.write_all(&outbuf[..result.consumed_out]) {
            break Err(CodecError::Io(err));
        }

        match settle::<C>(result.status) {
            Round::Continue => {}
            Round::Stop(Ok(())) => break writer.flush().map_err(CodecError::Io),
            Round::Stop(err) => break err,
        }
    };

    AllResult {
        bytes_read,
        bytes_written,
        status,
    }
}

/// The async twin of [`pump`].
#[cfg(feature = "async")]
pub(crate) async fn pump_async<C: Coder>(
    coder: &mut C,
    read: impl futures::io::AsyncBufRead,
    writer: &mut (impl futures::io::AsyncWrite + core::marker::Unpin),
    finish: bool,
) -> AllResult {
    use futures::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt};

    futures::pin_mut!(read);
    let mut bytes_read = 0;
    let mut bytes_written = 0;
    let mut outbuf = vec![0; STREAM_BUFFER];

    let status = loop {
        let data = match read.fill_buf().await {
            Ok(data) => data,
            Err(err) => break Err(CodecError::Io(err)),
        };

        if data.is_empty() {
            if !finish {
                break Ok(());
            }
            coder.finish();
        }

        let result = coder.code_bytes(data, &mut outbuf);
        bytes_read += result.consumed_in;
        bytes_written += result.consumed_out;
        AsyncBufRead::consume(read.as_mut(), result.consumed_in);

        if let Err(err) = writer.write_all(&outbuf[..result.consumed_out]).await {
            break Err(CodecError::Io(err));
        }

        match settle::<C>(result.status) {
            Round::Continue => {}
            Round::Stop(Ok(())) => break writer.flush().await.map_err(CodecError::Io),
            Round::Stop(err) => break err,
        }
    };

    AllResult {
        bytes_read,
        bytes_written,
        status,
    }
}

/// `Stop(Ok(()))` means the coder is done and the writer should be flushed.
fn settle<C: Coder>(status: Result<Status, CodecError>) -> Round {
    match status {
        Ok(Status::Ok) => Round::Continue,
        Ok(Status::Done) => Round::Stop(Ok(())),
        Ok(Status::NoProgress) => Round::Stop(Err(C::stalled())),
        Err(err) => Round::Stop(Err(err)),
    }
}
