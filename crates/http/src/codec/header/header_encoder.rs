//! Field-line encoder shared by the response header section and the trailer section.

use bytes::{BufMut, BytesMut};
use http::header::CONTENT_LENGTH;
use tracing::warn;

use crate::protocol::Headers;

#[derive(Debug)]
pub struct HeaderEncoder;

impl HeaderEncoder {
    /// Writes every header as `name: value\r\n` in iteration order, then the blank line
    /// closing the section.
    pub fn encode(headers: &Headers, dst: &mut BytesMut) {
        dst.reserve(encoded_len(headers) + 2);
        for (name, value) in headers.iter() {
            put_field_line(name, value, dst);
        }
        dst.put_slice(b"\r\n");
    }

    /// Same as [`HeaderEncoder::encode`] but drops `content-length`, which has no meaning once
    /// the body is chunked.
    pub fn encode_trailers(trailers: &Headers, dst: &mut BytesMut) {
        dst.reserve(encoded_len(trailers) + 2);
        for (name, value) in trailers.iter() {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH.as_str()) {
                warn!(value, "content-length is not allowed in trailers, skipped");
                continue;
            }
            put_field_line(name, value, dst);
        }
        dst.put_slice(b"\r\n");
    }
}

#[inline]
fn put_field_line(name: &str, value: &str, dst: &mut BytesMut) {
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
    dst.put_slice(b"\r\n");
}

fn encoded_len(headers: &Headers) -> usize {
    headers.iter().map(|(name, value)| name.len() + value.len() + 4).sum()
}
