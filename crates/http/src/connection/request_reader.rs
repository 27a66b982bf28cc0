use tokio::io::AsyncRead;
use tracing::{debug, trace};

use crate::codec::{ByteAccumulator, ParserLimits, RequestDecoder};
use crate::ensure;
use crate::protocol::{ParseError, Request};

/// Drives a [`RequestDecoder`] over an async byte source.
///
/// Reads go into a bounded [`ByteAccumulator`]; after each read the decoder consumes whatever
/// it can and the consumed prefix is discarded. Bytes following the header section are left
/// in the accumulator, request bodies are not read.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    buffer: ByteAccumulator,
    decoder: RequestDecoder,
}

impl<R> RequestReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self::with_limits(reader, ParserLimits::default())
    }

    pub fn with_limits(reader: R, limits: ParserLimits) -> Self {
        Self { reader, buffer: ByteAccumulator::new(limits.max_header_bytes), decoder: RequestDecoder::with_limits(limits) }
    }

    /// Reads until a complete request head has been parsed.
    ///
    /// # Errors
    ///
    /// - any parse error raised by the decoder
    /// - [`ParseError::IncompleteRequest`] if the stream ends first
    /// - [`ParseError::TooLargeHeader`] if the head, consumed and pending, exceeds `max_header_bytes`
    /// - [`ParseError::ParserAlreadyComplete`] when called again after success
    pub async fn read_request(&mut self) -> Result<Request, ParseError> {
        ensure!(!self.decoder.is_done(), ParseError::ParserAlreadyComplete);

        loop {
            // bytes left over from an earlier read may already hold the next line
            if !self.buffer.is_empty() {
                let consumed = self.decoder.parse(self.buffer.as_slice())?;
                self.buffer.consume(consumed);

                if let Some(request) = self.decoder.take_request() {
                    debug!(method = request.method(), target = request.target(), "request head received");
                    return Ok(request);
                }
            }
            self.decoder.check_head_size(self.buffer.len())?;

            let read = self.buffer.read_from(&mut self.reader).await?;
            trace!(read, buffered = self.buffer.len(), "read from connection");

            if read == 0 {
                return Err(ParseError::incomplete_request(self.decoder.state(), self.buffer.len()));
            }
        }
    }

    /// Bytes received after the header section, not consumed by the parser.
    pub fn buffered(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    pub fn into_parts(self) -> (R, ByteAccumulator) {
        (self.reader, self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_HEADER_BYTES;
    use crate::protocol::ParseState;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::ReadBuf;

    /// Hands out `data` in pieces of at most `step` bytes per read.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
    }

    impl Trickle {
        fn new(data: &[u8], step: usize) -> Self {
            Self { data: data.to_vec(), pos: 0, step }
        }
    }

    impl AsyncRead for Trickle {
        fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            let remaining = &self.data[self.pos..];
            let amt = remaining.len().min(buf.remaining()).min(self.step);
            buf.put_slice(&remaining[..amt]);
            self.pos += amt;
            Poll::Ready(Ok(()))
        }
    }

    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::ErrorKind::ConnectionReset.into()))
        }
    }

    const GOOD_REQUEST: &[u8] = b"GET /path HTTP/1.1\r\nHost: example\r\nSet-Example-Header: v1\r\nSet-Example-Header: v2\r\n\r\n";

    #[tokio::test]
    async fn read_in_one_piece() {
        let mut reader = RequestReader::new(GOOD_REQUEST);
        let request = reader.read_request().await.unwrap();

        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/path");
        assert_eq!(request.headers().get("host"), Some("example"));
        assert_eq!(request.headers().get("set-example-header"), Some("v1, v2"));
    }

    #[tokio::test]
    async fn read_byte_by_byte() {
        let expected = RequestReader::new(GOOD_REQUEST).read_request().await.unwrap();

        for step in [1, 2, 3, 7, 16] {
            let mut reader = RequestReader::new(Trickle::new(GOOD_REQUEST, step));
            assert_eq!(reader.read_request().await.unwrap(), expected, "step {step}");
        }
    }

    #[tokio::test]
    async fn leftover_bytes_stay_buffered() {
        let mut reader = RequestReader::new(&b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc"[..]);
        reader.read_request().await.unwrap();

        assert_eq!(reader.buffered(), b"abc");
    }

    #[tokio::test]
    async fn premature_end_of_stream() {
        let mut reader = RequestReader::new(&b"GET / HTTP/1.1\r\nHost: exa"[..]);
        let result = reader.read_request().await;

        assert!(matches!(
            result,
            Err(ParseError::IncompleteRequest { state: ParseState::AwaitingHeaders, buffered: 9 })
        ));
    }

    #[tokio::test]
    async fn empty_stream() {
        let mut reader = RequestReader::new(&b""[..]);
        let result = reader.read_request().await;

        assert!(matches!(
            result,
            Err(ParseError::IncompleteRequest { state: ParseState::AwaitingRequestLine, buffered: 0 })
        ));
    }

    #[tokio::test]
    async fn parse_error_is_returned() {
        let mut reader = RequestReader::new(Trickle::new(b"GET / HTTP/1.0\r\n\r\n", 4));
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::UnsupportedVersion { version }) if version == "1.0"));
    }

    #[tokio::test]
    async fn oversized_head() {
        let limits = ParserLimits { max_header_bytes: 32, ..ParserLimits::default() };
        let mut reader = RequestReader::with_limits(&b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"[..], limits);
        let result = reader.read_request().await;

        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 32, .. })));
    }

    #[tokio::test]
    async fn repeated_header_over_many_reads() {
        let mut src = b"GET / HTTP/1.1\r\n".to_vec();
        for _ in 0..20_000 {
            src.extend_from_slice(b"X-Dup: aaaaaaaaaaaaaaaaaaaa\r\n");
        }
        src.extend_from_slice(b"\r\n");

        for step in [29, 512, 4096] {
            let mut reader = RequestReader::new(Trickle::new(&src, step));
            let result = reader.read_request().await;

            assert!(
                matches!(result, Err(ParseError::TooLargeHeader { max_size: MAX_HEADER_BYTES, .. })),
                "step {step}: {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn read_error_is_io() {
        let result = RequestReader::new(Failing).read_request().await;
        assert!(matches!(result, Err(ParseError::Io { source }) if source.kind() == io::ErrorKind::ConnectionReset));
    }

    #[tokio::test]
    async fn second_read_is_rejected() {
        let mut reader = RequestReader::new(GOOD_REQUEST);
        reader.read_request().await.unwrap();

        assert!(matches!(reader.read_request().await, Err(ParseError::ParserAlreadyComplete)));
    }
}
