//! HTTP response encoder module
//!
//! The [`ResponseEncoder`] serializes one outbound message and enforces the order of its
//! parts at runtime:
//!
//! ```text
//! status line -> headers -> body
//! status line -> headers -> chunk* -> last chunk -> trailers
//! ```
//!
//! Calling an operation in the wrong state returns [`SendError::ProtocolStateViolation`] and
//! writes nothing. The typed [`ResponseWriter`](crate::connection::ResponseWriter) wraps this
//! encoder so that the same mistakes don't compile.

use bytes::{Buf, BytesMut};
use http::StatusCode;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::{error, trace};

use crate::codec::body::ChunkedEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Headers, ResponsePart, ResponseWriteState, SendError, reason_phrase};

use ResponseWriteState::{BodyWritten, ChunkDone, ChunkInProgress, HeadersWritten, Init, StatusWritten, TrailersWritten};

/// Initial buffer size reserved for the status line
const INIT_STATUS_LINE_SIZE: usize = 64;

/// Single-use encoder bound to one outbound message.
#[derive(Debug)]
pub struct ResponseEncoder {
    state: ResponseWriteState,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn state(&self) -> ResponseWriteState {
        self.state
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ResponseWriteState]) -> Result<(), SendError> {
        if allowed.contains(&self.state) {
            return Ok(());
        }
        error!(operation, state = ?self.state, "response operation called out of order");
        Err(SendError::protocol_state_violation(operation, self.state))
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`. Legal only in `Init`.
    pub fn encode_status_line(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("write status line", &[Init])?;

        dst.reserve(INIT_STATUS_LINE_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), reason_phrase(status))?;

        self.state = StatusWritten;
        Ok(())
    }

    /// Writes every header followed by the blank line. Legal only in `StatusWritten`.
    pub fn encode_headers(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("write headers", &[StatusWritten])?;

        HeaderEncoder::encode(headers, dst);

        self.state = HeadersWritten;
        Ok(())
    }

    /// Writes a fixed-length body verbatim. Legal only in `HeadersWritten`, terminal.
    ///
    /// The caller must have sent a matching `Content-Length` header.
    pub fn encode_body<D: Buf>(&mut self, mut body: D, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("write body", &[HeadersWritten])?;

        dst.reserve(body.remaining());
        while body.has_remaining() {
            let chunk = body.chunk();
            let len = chunk.len();
            dst.extend_from_slice(chunk);
            body.advance(len);
        }

        self.state = BodyWritten;
        Ok(())
    }

    /// Switches to chunked framing without writing anything, so that a body with no data
    /// can still be terminated. Legal only in `HeadersWritten`.
    pub fn begin_chunked_body(&mut self) -> Result<(), SendError> {
        self.expect_state("begin chunked body", &[HeadersWritten])?;
        self.state = ChunkInProgress;
        Ok(())
    }

    /// Writes one chunk. Legal in `HeadersWritten` or `ChunkInProgress`.
    ///
    /// An empty `data` writes the last chunk and behaves exactly like
    /// [`ResponseEncoder::encode_chunked_body_done`].
    pub fn encode_chunk<D: Buf>(&mut self, data: D, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("write chunk", &[HeadersWritten, ChunkInProgress])?;

        let size = data.remaining();
        ChunkedEncoder::encode_chunk(data, dst)?;
        trace!(size, "encoded chunk");

        self.state = if size == 0 { ChunkDone } else { ChunkInProgress };
        Ok(())
    }

    /// Writes the last chunk `0\r\n`. Legal only in `ChunkInProgress`.
    pub fn encode_chunked_body_done(&mut self, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("finish chunked body", &[ChunkInProgress])?;

        ChunkedEncoder::encode_last_chunk(dst);

        self.state = ChunkDone;
        Ok(())
    }

    /// Writes the trailer section and its closing blank line. Legal only in `ChunkDone`.
    ///
    /// A `content-length` trailer is dropped.
    pub fn encode_trailers(&mut self, trailers: &Headers, dst: &mut BytesMut) -> Result<(), SendError> {
        self.expect_state("write trailers", &[ChunkDone])?;

        HeaderEncoder::encode_trailers(trailers, dst);

        self.state = TrailersWritten;
        Ok(())
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self { state: Init }
    }
}

impl<D: Buf> Encoder<ResponsePart<D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponsePart<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            ResponsePart::StatusLine(status) => self.encode_status_line(status, dst),
            ResponsePart::Headers(headers) => self.encode_headers(&headers, dst),
            ResponsePart::Body(body) => self.encode_body(body, dst),
            ResponsePart::BeginChunked => self.begin_chunked_body(),
            ResponsePart::Chunk(data) => self.encode_chunk(data, dst),
            ResponsePart::ChunkedDone => self.encode_chunked_body_done(dst),
            ResponsePart::Trailers(trailers) => self.encode_trailers(&trailers, dst),
        }
    }
}

/// Fast writer implementation for writing to BytesMut.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
