//! HTTP request decoder module
//!
//! This module provides the incremental request parser. It consumes whatever bytes are
//! currently buffered, remembers where it stopped, and resumes when more bytes arrive, so
//! the result doesn't depend on how the request was split across reads.
//!
//! # State Machine
//!
//! ```text
//! AwaitingRequestLine -> AwaitingHeaders -> Done
//! ```
//!
//! A single call may walk through several states if enough bytes are buffered. Once `Done`
//! the parser refuses further input with [`ParseError::ParserAlreadyComplete`].
//!
//! # Example
//!
//! ```
//! use tcp_http::codec::RequestDecoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let consumed = decoder.parse(b"GET /path HTTP/1.1\r\nHost: exam").unwrap();
//! assert_eq!(consumed, 20);
//!
//! let consumed = decoder.parse(b"Host: example\r\n\r\n").unwrap();
//! assert_eq!(consumed, 17);
//!
//! let request = decoder.take_request().unwrap();
//! assert_eq!(request.target(), "/path");
//! assert_eq!(request.headers().get("host"), Some("example"));
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::header::RequestLineDecoder;
use crate::ensure;
use crate::protocol::{Headers, ParseError, ParseState, Request, RequestLine};

/// Maximum number of distinct header names allowed in a request
pub const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the request line plus the header section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Bounds applied while reading a request head.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    pub max_header_bytes: usize,
    pub max_header_num: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self { max_header_bytes: MAX_HEADER_BYTES, max_header_num: MAX_HEADER_NUM }
    }
}

/// Incremental request parser.
#[derive(Debug)]
pub struct RequestDecoder {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: Headers,
    limits: ParserLimits,
    // bytes of the head consumed so far, merged duplicates don't grow `headers.len()`
    head_bytes: usize,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance with the default limits
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    pub fn with_limits(limits: ParserLimits) -> Self {
        Self {
            state: ParseState::AwaitingRequestLine,
            request_line: None,
            headers: Headers::new(),
            limits,
            head_bytes: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    pub fn limits(&self) -> ParserLimits {
        self.limits
    }

    /// Number of head bytes consumed so far.
    #[inline]
    pub fn head_bytes(&self) -> usize {
        self.head_bytes
    }

    /// Fails once the consumed head plus `pending` unparsed bytes exceed `max_header_bytes`.
    pub fn check_head_size(&self, pending: usize) -> Result<(), ParseError> {
        let total = self.head_bytes + pending;
        ensure!(total <= self.limits.max_header_bytes, ParseError::too_large_header(total, self.limits.max_header_bytes));
        Ok(())
    }

    /// Consumes as many bytes of `src` as can be parsed right now.
    ///
    /// Returns the number of bytes consumed; the caller must discard exactly that many
    /// from the front of its buffer before calling again with more data.
    ///
    /// # Errors
    ///
    /// Any malformed request-line or field-line, too many headers, a head larger than
    /// `max_header_bytes` in total, or a call after the parser reached [`ParseState::Done`].
    pub fn parse(&mut self, src: &[u8]) -> Result<usize, ParseError> {
        let mut consumed = 0;
        loop {
            match self.state {
                ParseState::AwaitingRequestLine => match RequestLineDecoder::decode(&src[consumed..])? {
                    Some((read, line)) => {
                        consumed += read;
                        self.head_bytes += read;
                        self.check_head_size(0)?;
                        self.request_line = Some(line);
                        self.state = ParseState::AwaitingHeaders;
                        trace!(consumed, "request line parsed, awaiting headers");
                    }
                    None => return Ok(consumed),
                },

                ParseState::AwaitingHeaders => {
                    let (read, done) = self.headers.parse(&src[consumed..])?;
                    consumed += read;
                    self.head_bytes += read;
                    self.check_head_size(0)?;

                    if done {
                        self.state = ParseState::Done;
                        trace!(header_num = self.headers.len(), "header section parsed");
                        return Ok(consumed);
                    }

                    if read == 0 {
                        return Ok(consumed);
                    }

                    ensure!(
                        self.headers.len() <= self.limits.max_header_num,
                        ParseError::too_many_headers(self.limits.max_header_num)
                    );
                }

                ParseState::Done => return Err(ParseError::ParserAlreadyComplete),
            }
        }
    }

    /// Hands out the parsed request once, after the parser reached [`ParseState::Done`].
    pub fn take_request(&mut self) -> Option<Request> {
        if !self.is_done() {
            return None;
        }
        let line = self.request_line.take()?;
        Some(Request::new(line, std::mem::take(&mut self.headers)))
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode a request head from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the head is complete, body bytes (if any) stay in `src`
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: encountered a parsing error
    ///
    /// Once the request was handed out, every further call returns `Ok(None)` and leaves `src` alone.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.is_done() {
            return Ok(self.take_request());
        }

        let consumed = self.parse(src)?;
        src.advance(consumed);

        if self.is_done() {
            return Ok(self.take_request());
        }

        self.check_head_size(src.len())?;
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.is_done() {
            return Ok(self.take_request());
        }

        match self.decode(src)? {
            Some(request) => Ok(Some(request)),
            None => Err(ParseError::incomplete_request(self.state, src.len())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use http::Version;
    use indoc::indoc;
    use tokio_util::codec::FramedRead;

    const GOOD_REQUEST: &[u8] = b"GET /path HTTP/1.1\r\nHost: example\r\n\r\n";

    /// Feeds `src` in pieces of at most `step` bytes, keeping unconsumed bytes like a
    /// real read buffer would.
    fn parse_in_steps(src: &[u8], step: usize) -> Request {
        let mut decoder = RequestDecoder::new();
        let mut buffer = Vec::new();
        for piece in src.chunks(step) {
            buffer.extend_from_slice(piece);
            let consumed = decoder.parse(&buffer).unwrap();
            buffer.drain(..consumed);
            if decoder.is_done() {
                break;
            }
        }
        decoder.take_request().unwrap()
    }

    #[test]
    fn scenario_request() {
        let request = parse_in_steps(GOOD_REQUEST, GOOD_REQUEST.len());

        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/path");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers().get("host"), Some("example"));
    }

    #[test]
    fn split_invariance() {
        let whole = parse_in_steps(GOOD_REQUEST, GOOD_REQUEST.len());
        for step in 1..GOOD_REQUEST.len() {
            assert_eq!(parse_in_steps(GOOD_REQUEST, step), whole, "step {step}");
        }
    }

    #[test]
    fn split_at_every_position() {
        let whole = parse_in_steps(GOOD_REQUEST, GOOD_REQUEST.len());
        for split in 1..GOOD_REQUEST.len() {
            let mut decoder = RequestDecoder::new();
            let (first, second) = GOOD_REQUEST.split_at(split);

            let consumed = decoder.parse(first).unwrap();
            let mut rest = first[consumed..].to_vec();
            rest.extend_from_slice(second);
            decoder.parse(&rest).unwrap();

            assert!(decoder.is_done(), "split {split}");
            assert_eq!(decoder.take_request().unwrap(), whole, "split {split}");
        }
    }

    #[test]
    fn curl_request() {
        let str = indoc! {r##"
        GET /coffee HTTP/1.1
        Host: localhost:42069
        User-Agent: curl/7.81.0
        Accept: */*

        "##}
        .replace('\n', "\r\n");

        let request = parse_in_steps(str.as_bytes(), 3);

        assert_eq!(request.method(), "GET");
        assert_eq!(request.target(), "/coffee");
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.headers().get("Host"), Some("localhost:42069"));
        assert_eq!(request.headers().get("user-agent"), Some("curl/7.81.0"));
        assert_eq!(request.headers().get("accept"), Some("*/*"));
    }

    #[test]
    fn duplicate_headers() {
        let src = b"GET / HTTP/1.1\r\nSet-Example-Header: v1\r\nSet-Example-Header: v2\r\n\r\n";
        let request = parse_in_steps(src, 5);
        assert_eq!(request.headers().get("set-example-header"), Some("v1, v2"));
    }

    #[test]
    fn no_headers() {
        let request = parse_in_steps(b"GET / HTTP/1.1\r\n\r\n", 1);
        assert!(request.headers().is_empty());
    }

    #[test]
    fn body_bytes_are_not_consumed() {
        let mut decoder = RequestDecoder::new();
        let src = b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let consumed = decoder.parse(src).unwrap();

        assert!(decoder.is_done());
        assert_eq!(&src[consumed..], b"hello");
    }

    #[test]
    fn already_complete() {
        let mut decoder = RequestDecoder::new();
        decoder.parse(GOOD_REQUEST).unwrap();

        let result = decoder.parse(b"GET / HTTP/1.1\r\n");
        assert!(matches!(result, Err(ParseError::ParserAlreadyComplete)));
    }

    #[test]
    fn invalid_header_in_request() {
        let mut decoder = RequestDecoder::new();
        let result = decoder.parse(b"GET / HTTP/1.1\r\nHost : x\r\n\r\n");

        assert!(matches!(result, Err(ParseError::WhitespaceBeforeColon { .. })));
        assert_eq!(decoder.state(), ParseState::AwaitingHeaders);
    }

    #[test]
    fn too_many_headers() {
        let limits = ParserLimits { max_header_num: 2, ..ParserLimits::default() };
        let mut decoder = RequestDecoder::with_limits(limits);
        let result = decoder.parse(b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n");

        assert!(matches!(result, Err(ParseError::TooManyHeaders { max_num: 2 })));
    }

    #[test]
    fn take_request_before_done() {
        let mut decoder = RequestDecoder::new();
        decoder.parse(b"GET / HTTP/1.1\r\n").unwrap();

        assert_eq!(decoder.state(), ParseState::AwaitingHeaders);
        assert!(decoder.take_request().is_none());
    }

    #[test]
    fn decode_leaves_body_in_buffer() {
        let mut buffer = BytesMut::from(&b"POST / HTTP/1.1\r\nHost: x\r\n\r\n123"[..]);
        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();

        assert_eq!(request.method(), "POST");
        assert_eq!(&buffer[..], b"123");
    }

    #[test]
    fn decode_rejects_oversized_head() {
        let limits = ParserLimits { max_header_bytes: 16, ..ParserLimits::default() };
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nX-Long: aaaaaaaaaaaaaaaaaaaa"[..]);
        let result = RequestDecoder::with_limits(limits).decode(&mut buffer);

        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 16, .. })));
    }

    #[test]
    fn repeated_header_counts_towards_head_size() {
        let limits = ParserLimits { max_header_bytes: 64, ..ParserLimits::default() };
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut result = decoder.parse(b"GET / HTTP/1.1\r\n");

        // every line is consumed right away and merged into a single entry
        for _ in 0..10 {
            result = decoder.parse(b"X-Dup: aaaaaaaaaa\r\n");
            if result.is_err() {
                break;
            }
        }

        assert!(matches!(result, Err(ParseError::TooLargeHeader { max_size: 64, .. })));
        assert_eq!(decoder.state(), ParseState::AwaitingHeaders);
        assert!(decoder.head_bytes() > 64);
    }

    #[test]
    fn head_of_exactly_max_size() {
        let limits = ParserLimits { max_header_bytes: GOOD_REQUEST.len(), ..ParserLimits::default() };
        let mut decoder = RequestDecoder::with_limits(limits);

        assert_eq!(decoder.parse(GOOD_REQUEST).unwrap(), GOOD_REQUEST.len());
        assert_eq!(decoder.head_bytes(), GOOD_REQUEST.len());
        assert!(decoder.take_request().is_some());
    }

    #[test]
    fn decode_eof_incomplete() {
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: x\r\n"[..]);
        let result = RequestDecoder::new().decode_eof(&mut buffer);

        assert!(matches!(
            result,
            Err(ParseError::IncompleteRequest { state: ParseState::AwaitingHeaders, buffered: 0 })
        ));
    }

    #[tokio::test]
    async fn framed_read() {
        let mut framed = FramedRead::new(GOOD_REQUEST, RequestDecoder::new());
        let request = framed.next().await.unwrap().unwrap();

        assert_eq!(request.target(), "/path");
        assert_eq!(request.headers().get("host"), Some("example"));
        assert!(framed.next().await.is_none());
    }

    #[tokio::test]
    async fn framed_read_incomplete() {
        let mut framed = FramedRead::new(&b"GET /path HTTP/1.1\r\nHost: exa"[..], RequestDecoder::new());
        let result = framed.next().await.unwrap();

        assert!(matches!(
            result,
            Err(ParseError::IncompleteRequest { state: ParseState::AwaitingHeaders, buffered: 9 })
        ));
    }
}
