//! Chunked transfer-coding writer.
//!
//! ```text
//! chunk      = hex-length CRLF chunk-data CRLF
//! last-chunk = "0" CRLF
//! ```
//!
//! The trailer section that may follow the last chunk is written by
//! [`HeaderEncoder::encode_trailers`](crate::codec::HeaderEncoder::encode_trailers).

use bytes::{Buf, BytesMut};
use std::io::Write;

use crate::protocol::SendError;

/// The zero-length chunk closing a chunked body
pub const LAST_CHUNK: &[u8] = b"0\r\n";

#[derive(Debug)]
pub struct ChunkedEncoder;

impl ChunkedEncoder {
    /// Frames `data` as one chunk. An empty `data` produces exactly [`LAST_CHUNK`].
    pub fn encode_chunk<D: Buf>(mut data: D, dst: &mut BytesMut) -> Result<(), SendError> {
        let size = data.remaining();
        if size == 0 {
            Self::encode_last_chunk(dst);
            return Ok(());
        }

        write!(helper::Writer(dst), "{size:x}\r\n")?;
        dst.reserve(size + 2);
        while data.has_remaining() {
            let chunk = data.chunk();
            let len = chunk.len();
            dst.extend_from_slice(chunk);
            data.advance(len);
        }
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }

    pub fn encode_last_chunk(dst: &mut BytesMut) {
        dst.extend_from_slice(LAST_CHUNK);
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
