//! Parsed request types.
//!
//! A [`Request`] is produced by the [`RequestDecoder`](crate::codec::RequestDecoder) once its
//! state reaches [`ParseState::Done`]. From then on it is only read.

use http::Version;

use crate::protocol::Headers;

/// Progress of the request parser. Transitions only move forward.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseState {
    AwaitingRequestLine,
    AwaitingHeaders,
    Done,
}

/// The first line of a request: `<METHOD> <target> HTTP/1.1`.
///
/// The method is kept exactly as received and the target is opaque, no URL decoding is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    version: Version,
}

impl RequestLine {
    pub(crate) fn new(method: String, target: String) -> Self {
        Self { method, target, version: Version::HTTP_11 }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Always HTTP/1.1, every other version is rejected while parsing.
    pub fn version(&self) -> Version {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    line: RequestLine,
    headers: Headers,
}

impl Request {
    pub fn new(line: RequestLine, headers: Headers) -> Self {
        Self { line, headers }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    pub fn method(&self) -> &str {
        self.line.method()
    }

    pub fn target(&self) -> &str {
        self.line.target()
    }

    pub fn version(&self) -> Version {
        self.line.version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn into_parts(self) -> (RequestLine, Headers) {
        (self.line, self.headers)
    }
}
