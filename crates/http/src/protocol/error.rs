use std::io;
use thiserror::Error;

use crate::protocol::{ParseState, ResponseWriteState};

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("relay error: {source}")]
    RelayError {
        #[from]
        source: RelayError,
    },
}

/// Errors raised while turning inbound bytes into a [`Request`](crate::protocol::Request).
///
/// Every variant is fatal to the connection; the caller is expected to answer with a
/// 400-class response and close.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("invalid http method: {method:?}")]
    InvalidMethod { method: String },

    #[error("unrecognized http version scheme: {scheme:?}")]
    UnrecognizedVersionScheme { scheme: String },

    #[error("unsupported http version: {version:?}")]
    UnsupportedVersion { version: String },

    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("whitespace between header name and colon: {name:?}")]
    WhitespaceBeforeColon { name: String },

    #[error("invalid header name: {name:?}")]
    InvalidHeaderName { name: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("stream ended before the request was complete, state: {state:?}, buffered bytes: {buffered}")]
    IncompleteRequest { state: ParseState, buffered: usize },

    #[error("request parser already complete")]
    ParserAlreadyComplete,

    #[error("invalid chunked body: {reason}")]
    InvalidChunk { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_request_line(line: &[u8]) -> Self {
        Self::MalformedRequestLine { line: String::from_utf8_lossy(line).into_owned() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn unrecognized_version_scheme<S: ToString>(scheme: S) -> Self {
        Self::UnrecognizedVersionScheme { scheme: scheme.to_string() }
    }

    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion { version: version.to_string() }
    }

    pub fn malformed_header(line: &[u8]) -> Self {
        Self::MalformedHeader { line: String::from_utf8_lossy(line).into_owned() }
    }

    pub fn whitespace_before_colon(name: &[u8]) -> Self {
        Self::WhitespaceBeforeColon { name: String::from_utf8_lossy(name).into_owned() }
    }

    pub fn invalid_header_name(name: &[u8]) -> Self {
        Self::InvalidHeaderName { name: String::from_utf8_lossy(name).into_owned() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn incomplete_request(state: ParseState, buffered: usize) -> Self {
        Self::IncompleteRequest { state, buffered }
    }

    pub fn invalid_chunk<S: ToString>(reason: S) -> Self {
        Self::InvalidChunk { reason: reason.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    /// An operation was called out of order. This is a caller bug, not a remote-input error.
    #[error("can't {operation} while response is in state {state:?}")]
    ProtocolStateViolation { operation: &'static str, state: ResponseWriteState },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn protocol_state_violation(operation: &'static str, state: ResponseWriteState) -> Self {
        Self::ProtocolStateViolation { operation, state }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors that abort a relay. Nothing is retried and the downstream message is left as is.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("upstream read failed after {forwarded} bytes: {source}")]
    UpstreamRead {
        forwarded: u64,
        #[source]
        source: io::Error,
    },

    #[error("downstream write failed after {forwarded} bytes: {source}")]
    DownstreamWrite {
        forwarded: u64,
        #[source]
        source: SendError,
    },
}

impl RelayError {
    pub fn upstream_read(forwarded: u64, source: io::Error) -> Self {
        Self::UpstreamRead { forwarded, source }
    }

    pub fn downstream_write(forwarded: u64, source: SendError) -> Self {
        Self::DownstreamWrite { forwarded, source }
    }

    /// Number of body bytes that reached the downstream before the failure.
    pub fn forwarded(&self) -> u64 {
        match self {
            Self::UpstreamRead { forwarded, .. } | Self::DownstreamWrite { forwarded, .. } => *forwarded,
        }
    }
}
