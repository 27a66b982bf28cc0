//! Chunked transfer-coding for message bodies.
//!
//! # Components
//!
//! - [`ChunkedEncoder`]: frames data as `hex-length CRLF data CRLF` and writes the last chunk
//! - [`ChunkedDecoder`]: the reading counterpart, yields data items and collects trailers
//!
//! Fixed-length bodies need no framing and are written verbatim by the
//! [`ResponseEncoder`](crate::codec::ResponseEncoder).

mod chunked_decoder;
mod chunked_encoder;

pub use chunked_decoder::ChunkedDecoder;
pub use chunked_encoder::ChunkedEncoder;
pub use chunked_encoder::LAST_CHUNK;
