//! Line-oriented codecs for the start of a message.
//!
//! # Components
//!
//! - [`RequestLineDecoder`]: decodes `<METHOD> <target> HTTP/1.1`
//! - [`HeaderDecoder`]: decodes one `name: value` field-line per call and detects the blank
//!   line closing the header section
//! - [`HeaderEncoder`]: serializes header and trailer sections

mod header_decoder;
mod header_encoder;
mod request_line_decoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;
pub use request_line_decoder::RequestLineDecoder;
