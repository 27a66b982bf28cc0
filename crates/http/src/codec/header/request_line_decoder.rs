//! Request-line decoder.
//!
//! Accepts exactly `<METHOD> SP <target> SP HTTP/1.1 CRLF`. Checks run in this order:
//!
//! 1. splitting on single spaces gives three tokens, else [`ParseError::MalformedRequestLine`]
//! 2. the method equals its own uppercase form, else [`ParseError::InvalidMethod`]
//! 3. the version splits on `/` into two parts, else [`ParseError::MalformedRequestLine`]
//! 4. the scheme is `HTTP`, else [`ParseError::UnrecognizedVersionScheme`]
//! 5. the version is `1.1`, else [`ParseError::UnsupportedVersion`]

use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestLine};
use crate::utils::find_crlf;

const CRLF_LEN: usize = 2;

#[derive(Debug)]
pub struct RequestLineDecoder;

impl RequestLineDecoder {
    /// Decodes the request-line at the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(None)` if no CRLF is buffered yet
    /// - `Ok(Some((consumed, line)))` on success, `consumed` includes the CRLF
    /// - `Err(_)` if a full line is buffered but malformed
    pub fn decode(src: &[u8]) -> Result<Option<(usize, RequestLine)>, ParseError> {
        let Some(line_end) = find_crlf(src) else {
            return Ok(None);
        };

        let raw_line = &src[..line_end];
        let line = std::str::from_utf8(raw_line).map_err(|_utf8_error| ParseError::malformed_request_line(raw_line))?;

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::malformed_request_line(raw_line));
        };

        ensure!(!method.is_empty() && method.to_uppercase() == method, ParseError::invalid_method(method));

        let version_parts: Vec<&str> = version.split('/').collect();
        let [scheme, number] = version_parts[..] else {
            return Err(ParseError::malformed_request_line(raw_line));
        };

        ensure!(scheme == "HTTP", ParseError::unrecognized_version_scheme(scheme));
        ensure!(number == "1.1", ParseError::unsupported_version(number));

        trace!(method, target, "decoded request line");
        Ok(Some((line_end + CRLF_LEN, RequestLine::new(method.to_string(), target.to_string()))))
    }
}
