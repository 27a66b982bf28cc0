//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module turns bytes into requests and responses into bytes. Everything here is
//! synchronous and works on in-memory buffers; the [`connection`](crate::connection) layer
//! moves bytes between these codecs and the network.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`ByteAccumulator`]: bounded read buffer with cheap prefix consumption
//!   - [`RequestLineDecoder`] and [`HeaderDecoder`]: one line per call
//!   - [`RequestDecoder`]: state machine composing the two until the request head is complete
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: runtime-checked ordering of status line, headers and body parts
//!   - [`HeaderEncoder`]: header and trailer sections
//!   - [`ChunkedEncoder`] / [`ChunkedDecoder`]: chunked transfer-coding
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http::StatusCode;
//! use tcp_http::codec::{RequestDecoder, ResponseEncoder};
//! use tcp_http::protocol::default_headers;
//! use tokio_util::codec::Decoder;
//!
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//! let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.method(), "GET");
//!
//! let mut encoder = ResponseEncoder::new();
//! let mut out = BytesMut::new();
//! encoder.encode_status_line(StatusCode::OK, &mut out).unwrap();
//! encoder.encode_headers(&default_headers(2), &mut out).unwrap();
//! encoder.encode_body(&b"ok"[..], &mut out).unwrap();
//! ```

mod accumulator;
mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use accumulator::ByteAccumulator;
pub use body::{ChunkedDecoder, ChunkedEncoder, LAST_CHUNK};
pub use header::{HeaderDecoder, HeaderEncoder, RequestLineDecoder};
pub use request_decoder::{MAX_HEADER_BYTES, MAX_HEADER_NUM, ParserLimits, RequestDecoder};
pub use response_encoder::ResponseEncoder;
