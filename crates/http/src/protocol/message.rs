use bytes::{Buf, Bytes};
use http::StatusCode;

use crate::protocol::Headers;

/// One step of an outbound message, fed to the [`ResponseEncoder`](crate::codec::ResponseEncoder).
///
/// The encoder checks that parts arrive in a legal order:
/// `StatusLine`, `Headers`, then either a single `Body` or
/// `BeginChunked`/`Chunk`s, `ChunkedDone` and `Trailers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart<Data: Buf = Bytes> {
    StatusLine(StatusCode),
    Headers(Headers),
    /// A fixed-length body, written verbatim
    Body(Data),
    /// Switches to chunked framing without writing anything
    BeginChunked,
    Chunk(Data),
    /// The zero-length terminator chunk
    ChunkedDone,
    Trailers(Headers),
}

/// Represents an item in a decoded payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
