//! HTTP connection handling module
//!
//! This module moves bytes between a connection and the codecs. It owns the driving loop of
//! the request parser and the typed writer for the response.
//!
//! # Components
//!
//! - [`RequestReader`]: reads from an [`AsyncRead`](tokio::io::AsyncRead) into a bounded
//!   buffer and feeds the [`RequestDecoder`](crate::codec::RequestDecoder) until a request head
//!   is complete or the stream ends
//! - [`ResponseWriter`]: typed state machine over a
//!   [`FramedWrite`](tokio_util::codec::FramedWrite) that only exposes the next legal operations
//! - [`HttpConnection`]: one request, one handler call, then done. Malformed requests are
//!   answered with `400 Bad Request`
//!
//! # Features
//!
//! - Split-invariant parsing, whatever the read sizes
//! - Bounded header section
//! - Chunked responses with trailers

mod http_connection;
mod request_reader;
mod response_writer;

pub use http_connection::{HttpConnection, write_error_response};
pub use request_reader::RequestReader;
pub use response_writer::{ResponseWriter, state};
