//! Field-line decoder for the header section of a request.
//!
//! The decoder is called once per field-line. It never buffers anything itself: the caller
//! hands in the unconsumed bytes and advances by the returned count.
//!
//! A field-line is `name ":" OWS value OWS CRLF`. The section ends with an empty line.
//!
//! # Validation
//!
//! - the line must contain a colon, otherwise [`ParseError::MalformedHeader`]
//! - no whitespace may sit between the name and the colon, otherwise
//!   [`ParseError::WhitespaceBeforeColon`]
//! - the trimmed name must be a non-empty token, otherwise [`ParseError::InvalidHeaderName`]
//! - the trimmed value must be valid UTF-8, otherwise [`ParseError::MalformedHeader`]

use tracing::trace;

use crate::ensure;
use crate::protocol::{Headers, ParseError};
use crate::utils::find_crlf;

const CRLF_LEN: usize = 2;

/// Characters that may not appear in a header name.
const SEPARATORS: &[u8] = b"()<>@,;:\\\"/[]?={} ";

#[derive(Debug)]
pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Decodes at most one field-line from `src` into `headers`.
    ///
    /// # Returns
    ///
    /// - `Ok((0, false))` if no complete line is buffered yet
    /// - `Ok((2, true))` if `src` starts with the empty line ending the header section
    /// - `Ok((n, false))` after merging one field-line of `n` bytes, CRLF included
    pub fn decode_field_line(src: &[u8], headers: &mut Headers) -> Result<(usize, bool), ParseError> {
        let Some(line_end) = find_crlf(src) else {
            return Ok((0, false));
        };

        if line_end == 0 {
            trace!("reached end of header section");
            return Ok((CRLF_LEN, true));
        }

        let line = &src[..line_end];
        let colon = line.iter().position(|b| *b == b':').ok_or_else(|| ParseError::malformed_header(line))?;

        let (raw_name, raw_value) = (&line[..colon], &line[colon + 1..]);
        ensure!(!raw_name.last().is_some_and(u8::is_ascii_whitespace), ParseError::whitespace_before_colon(raw_name));

        let name = raw_name.trim_ascii();
        ensure!(is_valid_header_name(name), ParseError::invalid_header_name(name));

        let value = std::str::from_utf8(raw_value.trim_ascii()).map_err(|_utf8_error| ParseError::malformed_header(line))?;

        // validated above, names are ASCII only
        let name = std::str::from_utf8(name).map_err(|_utf8_error| ParseError::invalid_header_name(name))?;

        trace!(name, value, "decoded header field");
        headers.append(name, value);

        Ok((line_end + CRLF_LEN, false))
    }
}

/// Returns true if `name` is a non-empty token: visible ASCII without separators.
pub(crate) fn is_valid_header_name(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().all(|b| b.is_ascii_graphic() && !SEPARATORS.contains(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_names() {
        assert!(is_valid_header_name(b"Host"));
        assert!(is_valid_header_name(b"X-Content-SHA256"));
        assert!(is_valid_header_name(b"!#$%&'*+-.^_`|~09azAZ"));

        assert!(!is_valid_header_name(b""));
        assert!(!is_valid_header_name(b"Ho st"));
        assert!(!is_valid_header_name(b"Host\t"));
        assert!(!is_valid_header_name(b"Content/Type"));
        assert!(!is_valid_header_name(b"{name}"));
        assert!(!is_valid_header_name(b"na\x7fme"));
        assert!(!is_valid_header_name("näme".as_bytes()));
    }

    #[test]
    fn multiple_values_merge() {
        let mut headers = Headers::new();
        let mut src: &[u8] = b"Set-Example-Header: v1\r\nSet-Example-Header: v2\r\n\r\n";

        loop {
            let (consumed, done) = HeaderDecoder::decode_field_line(src, &mut headers).unwrap();
            src = &src[consumed..];
            if done {
                break;
            }
        }

        assert!(src.is_empty());
        assert_eq!(headers.get("set-example-header"), Some("v1, v2"));
    }

    #[test]
    fn colon_in_value() {
        let mut headers = Headers::new();
        let (consumed, done) = HeaderDecoder::decode_field_line(b"Host: localhost:8080\r\n", &mut headers).unwrap();

        assert_eq!((consumed, done), (22, false));
        assert_eq!(headers.get("host"), Some("localhost:8080"));
    }

    #[test]
    fn empty_value() {
        let mut headers = Headers::new();
        HeaderDecoder::decode_field_line(b"X-Empty:\r\n", &mut headers).unwrap();
        assert_eq!(headers.get("x-empty"), Some(""));
    }

    #[test]
    fn missing_colon() {
        let mut headers = Headers::new();
        let result = HeaderDecoder::decode_field_line(b"Host localhost\r\n", &mut headers);
        assert!(matches!(result, Err(ParseError::MalformedHeader { line }) if line == "Host localhost"));
    }

    #[test]
    fn tab_before_colon() {
        let mut headers = Headers::new();
        let result = HeaderDecoder::decode_field_line(b"Host\t: x\r\n", &mut headers);
        assert!(matches!(result, Err(ParseError::WhitespaceBeforeColon { .. })));
    }

    #[test]
    fn empty_name() {
        let mut headers = Headers::new();
        let result = HeaderDecoder::decode_field_line(b": value\r\n", &mut headers);
        assert!(matches!(result, Err(ParseError::InvalidHeaderName { name }) if name.is_empty()));
    }

    #[test]
    fn non_utf8_value() {
        let mut headers = Headers::new();
        let result = HeaderDecoder::decode_field_line(b"X-Bin: \xff\xfe\r\n", &mut headers);
        assert!(matches!(result, Err(ParseError::MalformedHeader { .. })));
    }

    #[test]
    fn only_one_line_per_call() {
        let mut headers = Headers::new();
        let src = b"A: 1\r\nB: 2\r\n\r\n";
        let (consumed, done) = HeaderDecoder::decode_field_line(src, &mut headers).unwrap();

        assert_eq!((consumed, done), (6, false));
        assert_eq!(headers.len(), 1);
    }
}
