//! Typed response writer.
//!
//! [`ResponseWriter`] carries its position in the response as a zero-sized type parameter.
//! Every operation consumes the writer and hands back one in the next state, so writing
//! headers before the status line, or trailers after a fixed-length body, is a compile error
//! instead of a [`SendError::ProtocolStateViolation`].
//!
//! ```text
//! Init -> StatusWritten -> HeadersWritten -> BodyWritten
//!                                        \-> ChunkInProgress -> ChunkDone -> TrailersWritten
//! ```
//!
//! Each step is sent through a [`FramedWrite`] with [`ResponseEncoder`] and flushed, so the
//! peer sees bytes as soon as the call returns.

use std::marker::PhantomData;

use bytes::{Buf, Bytes};
use futures::SinkExt;
use http::StatusCode;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;
use tracing::trace;

use crate::codec::ResponseEncoder;
use crate::protocol::{Headers, ResponsePart, ResponseWriteState, SendError};
use state::{BodyWritten, ChunkDone, ChunkInProgress, HeadersWritten, Init, StatusWritten, TrailersWritten, WriteState};

/// Marker types for the states of a [`ResponseWriter`].
pub mod state {
    use crate::protocol::ResponseWriteState;

    mod sealed {
        pub trait Sealed {}
    }

    /// Implemented by the marker types only.
    pub trait WriteState: sealed::Sealed {
        const STATE: ResponseWriteState;
    }

    macro_rules! write_state {
        ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
            $(
                $(#[$meta])*
                #[derive(Debug, Clone, Copy, PartialEq, Eq)]
                pub struct $name;

                impl sealed::Sealed for $name {}

                impl WriteState for $name {
                    const STATE: ResponseWriteState = ResponseWriteState::$name;
                }
            )*
        };
    }

    write_state! {
        /// Nothing written yet
        Init,
        StatusWritten,
        HeadersWritten,
        /// At least one chunk written, or chunked framing started explicitly
        ChunkInProgress,
        /// The terminator chunk is out, only trailers may follow
        ChunkDone,
        TrailersWritten,
        BodyWritten,
    }
}

/// A single-use writer for one outbound message over `W`.
#[derive(Debug)]
pub struct ResponseWriter<W, S = Init> {
    framed_write: FramedWrite<W, ResponseEncoder>,
    _state: PhantomData<S>,
}

impl<W, S> ResponseWriter<W, S>
where
    S: WriteState,
{
    /// The runtime name of the current state.
    pub fn state(&self) -> ResponseWriteState {
        debug_assert_eq!(self.framed_write.encoder().state(), S::STATE);
        S::STATE
    }

    pub fn get_ref(&self) -> &W {
        self.framed_write.get_ref()
    }

    /// Gives the sink back. Everything written so far has been flushed.
    pub fn into_inner(self) -> W {
        self.framed_write.into_inner()
    }

    fn transition<T>(self) -> ResponseWriter<W, T> {
        ResponseWriter { framed_write: self.framed_write, _state: PhantomData }
    }
}

impl<W, S> ResponseWriter<W, S>
where
    W: AsyncWrite + Unpin,
{
    async fn send<D: Buf>(&mut self, part: ResponsePart<D>) -> Result<(), SendError> {
        self.framed_write.send(part).await
    }
}

impl<W> ResponseWriter<W, Init>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self { framed_write: FramedWrite::new(writer, ResponseEncoder::new()), _state: PhantomData }
    }

    pub async fn write_status_line(mut self, status: StatusCode) -> Result<ResponseWriter<W, StatusWritten>, SendError> {
        self.send(ResponsePart::<Bytes>::StatusLine(status)).await?;
        trace!(status = status.as_u16(), "status line written");
        Ok(self.transition())
    }
}

impl<W> ResponseWriter<W, StatusWritten>
where
    W: AsyncWrite + Unpin,
{
    pub async fn write_headers(mut self, headers: Headers) -> Result<ResponseWriter<W, HeadersWritten>, SendError> {
        let header_num = headers.len();
        self.send(ResponsePart::<Bytes>::Headers(headers)).await?;
        trace!(header_num, "headers written");
        Ok(self.transition())
    }
}

impl<W> ResponseWriter<W, HeadersWritten>
where
    W: AsyncWrite + Unpin,
{
    /// Writes a fixed-length body. The caller must have sent a matching `content-length`.
    pub async fn write_body<D: Buf>(mut self, body: D) -> Result<ResponseWriter<W, BodyWritten>, SendError> {
        self.send(ResponsePart::Body(body)).await?;
        Ok(self.transition())
    }

    /// Writes the first chunk of a chunked body.
    ///
    /// An empty `data` only switches to chunked framing; use
    /// [`write_chunked_body_done`](ResponseWriter::write_chunked_body_done) to terminate.
    pub async fn write_chunk<D: Buf>(self, data: D) -> Result<ResponseWriter<W, ChunkInProgress>, SendError> {
        let mut writer = self.begin_chunked_body().await?;
        writer.write_chunk(data).await?;
        Ok(writer)
    }

    /// Switches to chunked framing without writing any bytes.
    pub async fn begin_chunked_body(mut self) -> Result<ResponseWriter<W, ChunkInProgress>, SendError> {
        self.send(ResponsePart::<Bytes>::BeginChunked).await?;
        Ok(self.transition())
    }
}

impl<W> ResponseWriter<W, ChunkInProgress>
where
    W: AsyncWrite + Unpin,
{
    /// Writes `hex(len)\r\n<data>\r\n`. An empty `data` writes nothing, the terminator is
    /// only emitted by [`write_chunked_body_done`](ResponseWriter::write_chunked_body_done).
    pub async fn write_chunk<D: Buf>(&mut self, data: D) -> Result<(), SendError> {
        if !data.has_remaining() {
            return Ok(());
        }
        self.send(ResponsePart::Chunk(data)).await
    }

    pub async fn write_chunked_body_done(mut self) -> Result<ResponseWriter<W, ChunkDone>, SendError> {
        self.send(ResponsePart::<Bytes>::ChunkedDone).await?;
        Ok(self.transition())
    }
}

impl<W> ResponseWriter<W, ChunkDone>
where
    W: AsyncWrite + Unpin,
{
    /// Writes the trailer section. A `content-length` entry is dropped.
    pub async fn write_trailers(mut self, trailers: Headers) -> Result<ResponseWriter<W, TrailersWritten>, SendError> {
        self.send(ResponsePart::<Bytes>::Trailers(trailers)).await?;
        Ok(self.transition())
    }

    /// Ends the message with an empty trailer section.
    pub async fn finish(self) -> Result<ResponseWriter<W, TrailersWritten>, SendError> {
        self.write_trailers(Headers::new()).await
    }
}
