//! Growable read buffer for the request head.
//!
//! Bytes read from the connection are appended at the back and consumed from the front as
//! the parser makes progress. Consuming is an O(1) advance of the underlying [`BytesMut`].
//! Capacity doubles only when the current one is exhausted, and growth is bounded by
//! `max_size` so a peer can't grow the buffer without ever sending a CRLF.

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

/// Initial capacity of a fresh accumulator
pub const INIT_CAPACITY: usize = 1024;

/// Largest single read issued by [`ByteAccumulator::read_from`]
const READ_BLOCK_SIZE: usize = 4 * 1024;

#[derive(Debug)]
pub struct ByteAccumulator {
    buf: BytesMut,
    max_size: usize,
}

impl ByteAccumulator {
    pub fn new(max_size: usize) -> Self {
        Self::with_capacity(INIT_CAPACITY.min(max_size), max_size)
    }

    pub fn with_capacity(capacity: usize, max_size: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity), max_size }
    }

    /// Copies `chunk` in, doubling the capacity first if it doesn't fit.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TooLargeHeader`] if the populated length would exceed `max_size`.
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let required = self.buf.len() + chunk.len();
        ensure!(required <= self.max_size, ParseError::too_large_header(required, self.max_size));

        if required > self.buf.capacity() {
            let mut new_capacity = self.buf.capacity().max(1) * 2;
            while new_capacity < required {
                new_capacity *= 2;
            }
            trace!(from = self.buf.capacity(), to = new_capacity, "grow accumulator");
            self.buf.reserve(new_capacity - self.buf.len());
        }

        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    /// Discards the first `n` populated bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than [`ByteAccumulator::len`].
    pub fn consume(&mut self, n: usize) {
        assert!(n <= self.buf.len(), "consume {n} bytes but only {} buffered", self.buf.len());
        self.buf.advance(n);
    }

    /// Reads one block from `reader` and appends it, never past `max_size`.
    ///
    /// Returns the number of bytes read, `0` means the stream has ended.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> Result<usize, ParseError>
    where
        R: AsyncRead + Unpin,
    {
        let room = self.remaining();
        ensure!(room > 0, ParseError::too_large_header(self.buf.len() + 1, self.max_size));

        let mut block = [0u8; READ_BLOCK_SIZE];
        let block = &mut block[..room.min(READ_BLOCK_SIZE)];
        let read = reader.read(block).await.map_err(ParseError::io)?;

        self.append(&block[..read])?;
        Ok(read)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// How many more bytes may be appended before hitting the limit.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.max_size - self.buf.len()
    }

    pub fn into_inner(self) -> BytesMut {
        self.buf
    }
}
