//! Core HTTP/1.1 protocol types shared by the codec, connection and relay layers.
//!
//! # Architecture
//!
//! - **Requests** ([`request`]): [`Request`], [`RequestLine`] and the parser's [`ParseState`]
//! - **Headers** ([`headers`]): [`Headers`], an ordered map with lowercase names that merges
//!   repeated fields as `"v1, v2"`
//! - **Responses** ([`response`]): [`ResponseWriteState`], the fixed [`reason_phrase`] table and
//!   [`default_headers`]
//! - **Messages** ([`message`]): [`ResponsePart`] for the encoder and [`PayloadItem`] for the
//!   chunked decoder
//! - **Errors** ([`error`]): [`HttpError`] on top of [`ParseError`], [`SendError`] and [`RelayError`]

mod message;
pub use message::PayloadItem;
pub use message::ResponsePart;

mod headers;
pub use headers::Headers;

mod request;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::ResponseWriteState;
pub use response::default_headers;
pub use response::reason_phrase;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::RelayError;
pub use error::SendError;
