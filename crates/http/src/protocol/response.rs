//! Response-side protocol types: write ordering states, reason phrases and default headers.

use http::StatusCode;
use http::header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE};

use crate::protocol::Headers;

/// Where a single outbound message currently is.
///
/// ```text
/// Init -> StatusWritten -> HeadersWritten -> BodyWritten
///                                        \-> ChunkInProgress -> ChunkDone -> TrailersWritten
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResponseWriteState {
    Init,
    StatusWritten,
    HeadersWritten,
    ChunkInProgress,
    ChunkDone,
    TrailersWritten,
    BodyWritten,
}

impl ResponseWriteState {
    /// Returns true once nothing more may be written for this message.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::BodyWritten | Self::TrailersWritten)
    }
}

/// The reason phrase emitted for `status`. Codes outside the fixed table get an empty phrase.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status {
        StatusCode::OK => "OK",
        StatusCode::BAD_REQUEST => "Bad Request",
        StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "",
    }
}

/// Headers sent when a handler doesn't customize them.
pub fn default_headers(content_length: usize) -> Headers {
    let mut headers = Headers::with_capacity(3);
    headers.set(CONTENT_LENGTH, content_length.to_string());
    headers.set(CONNECTION, "close");
    headers.set(CONTENT_TYPE, "text/plain");
    headers
}
