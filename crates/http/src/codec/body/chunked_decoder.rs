//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This is the reading counterpart of [`ChunkedEncoder`](super::ChunkedEncoder): it turns a
//! chunked body back into data items and collects the trailer section, if any.
//!
//! Each size line is read up to its CRLF, the hex length parsed (chunk extensions after `;`
//! are ignored), then exactly that many data bytes are yielded, possibly over several
//! `decode` calls, followed by the chunk's CRLF.

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Headers, ParseError, PayloadItem};
use crate::utils::find_crlf;
use ChunkedState::{Data, DataCrlf, End, Size, Trailers};

/// Longest size line accepted, extensions included
const MAX_SIZE_LINE: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    trailers: Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the hex size line
    Size,
    /// Read chunk data, the number of bytes still expected
    Data(u64),
    /// Read the CRLF after chunk data
    DataCrlf,
    /// Read trailer field-lines until the blank line
    Trailers,
    /// Final state after the trailer section
    End,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: Size, trailers: Headers::new() }
    }

    /// Trailers received after the last chunk. Complete once [`PayloadItem::Eof`] was returned.
    pub fn trailers(&self) -> &Headers {
        &self.trailers
    }

    pub fn into_trailers(self) -> Headers {
        self.trailers
    }

    pub fn is_finished(&self) -> bool {
        self.state == End
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when chunk data is available
    /// - `Ok(Some(PayloadItem::Eof))` once the last chunk and the trailers are read
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                Size => {
                    let Some(line_end) = find_crlf(src) else {
                        ensure!(src.len() <= MAX_SIZE_LINE, ParseError::invalid_chunk("chunk size line too long"));
                        return Ok(None);
                    };

                    let size = parse_chunk_size(&src[..line_end])?;
                    src.advance(line_end + 2);
                    trace!(size, "read chunk size");

                    self.state = if size == 0 { Trailers } else { Data(size) };
                }

                Data(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let read = usize::try_from(remaining).map_or(src.len(), |remaining| remaining.min(src.len()));
                    let bytes = src.split_to(read).freeze();
                    let left = remaining - read as u64;
                    self.state = if left == 0 { DataCrlf } else { Data(left) };

                    trace!(len = bytes.len(), left, "read chunked bytes");
                    return Ok(Some(PayloadItem::Chunk(bytes)));
                }

                DataCrlf => {
                    if src.len() < 2 {
                        return Ok(None);
                    }
                    ensure!(&src[..2] == b"\r\n", ParseError::invalid_chunk("missing CRLF after chunk data"));
                    src.advance(2);
                    self.state = Size;
                }

                Trailers => {
                    let (read, done) = self.trailers.parse(src)?;
                    src.advance(read);
                    if done {
                        trace!(trailer_num = self.trailers.len(), "finished reading chunked data");
                        self.state = End;
                    } else if read == 0 {
                        return Ok(None);
                    }
                }

                End => return Ok(Some(PayloadItem::Eof)),
            }
        }
    }
}

/// Parses the hex size at the start of a size line, ignoring chunk extensions.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let size = match line.iter().position(|b| *b == b';') {
        Some(index) => &line[..index],
        None => line,
    }
    .trim_ascii();

    ensure!(!size.is_empty() && size.iter().all(u8::is_ascii_hexdigit), ParseError::invalid_chunk("invalid chunk size"));

    size.iter().try_fold(0u64, |acc, digit| {
        // validated as a hex digit above
        let value = u64::from(char::from(*digit).to_digit(16).unwrap_or_default());
        acc.checked_mul(16)
            .and_then(|acc| acc.checked_add(value))
            .ok_or_else(|| ParseError::invalid_chunk("invalid overflow chunked length"))
    })
}
