use std::fmt::Write;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRAILER, TRANSFER_ENCODING};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{info, trace};

use crate::connection::ResponseWriter;
use crate::connection::state::{HeadersWritten, TrailersWritten};
use crate::protocol::{Headers, RelayError, default_headers};

/// Trailer carrying the lowercase hex SHA-256 of the relayed body
pub const CONTENT_SHA256_TRAILER: &str = "X-Content-SHA256";

/// Trailer carrying the number of relayed body bytes
pub const CONTENT_LENGTH_TRAILER: &str = "X-Content-Length";

/// Upstream read size used unless configured otherwise
pub const DEFAULT_BLOCK_SIZE: usize = 256;

/// Re-frames an upstream byte stream as a chunked body.
///
/// Every non-empty upstream read is forwarded as one chunk and fed to a running SHA-256.
/// Once the upstream is exhausted the terminator chunk is written, followed by the
/// [`CONTENT_SHA256_TRAILER`] and [`CONTENT_LENGTH_TRAILER`] trailers.
///
/// The first failing read or write aborts the relay. The downstream is left wherever it
/// stopped; the error reports how many bytes made it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyRelay {
    block_size: usize,
}

impl ProxyRelay {
    pub fn new() -> Self {
        Self { block_size: DEFAULT_BLOCK_SIZE }
    }

    /// Sets the upstream read size, at least one byte.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Relays `upstream` into `writer`, which must already carry headers announcing chunked
    /// transfer and the trailers, see [`relay_headers`].
    pub async fn relay<U, W>(
        &self,
        mut upstream: U,
        writer: ResponseWriter<W, HeadersWritten>,
    ) -> Result<(ResponseWriter<W, TrailersWritten>, RelaySummary), RelayError>
    where
        U: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut writer = writer.begin_chunked_body().await.map_err(|e| RelayError::downstream_write(0, e))?;

        let mut hasher = Sha256::new();
        let mut forwarded = 0u64;
        let mut block = vec![0u8; self.block_size];

        loop {
            let read = upstream.read(&mut block).await.map_err(|e| RelayError::upstream_read(forwarded, e))?;
            if read == 0 {
                break;
            }

            let data = &block[..read];
            writer.write_chunk(data).await.map_err(|e| RelayError::downstream_write(forwarded, e))?;
            hasher.update(data);
            forwarded += read as u64;
            trace!(read, forwarded, "relayed chunk");
        }

        let summary = RelaySummary { length: forwarded, digest: to_hex(&hasher.finalize()) };

        let writer = writer
            .write_chunked_body_done()
            .await
            .map_err(|e| RelayError::downstream_write(forwarded, e))?
            .write_trailers(summary.trailers())
            .await
            .map_err(|e| RelayError::downstream_write(forwarded, e))?;

        info!(length = summary.length, digest = %summary.digest, "relay finished");
        Ok((writer, summary))
    }
}

impl Default for ProxyRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// What a finished relay forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySummary {
    /// Number of body bytes
    pub length: u64,
    /// Lowercase hex SHA-256 over the body bytes
    pub digest: String,
}

impl RelaySummary {
    pub fn trailers(&self) -> Headers {
        let mut trailers = Headers::with_capacity(2);
        trailers.append(CONTENT_SHA256_TRAILER, self.digest.clone());
        trailers.append(CONTENT_LENGTH_TRAILER, self.length.to_string());
        trailers
    }
}

/// Response headers for a relayed body: the defaults without `content-length`, plus chunked
/// transfer-encoding and the announcement of both trailers.
pub fn relay_headers(content_type: &str) -> Headers {
    let mut headers = default_headers(0);
    headers.remove(CONTENT_LENGTH.as_str());
    headers.set(CONTENT_TYPE.as_str(), content_type);
    headers.append(TRANSFER_ENCODING.as_str(), "chunked");
    headers.append(TRAILER.as_str(), format!("{CONTENT_SHA256_TRAILER}, {CONTENT_LENGTH_TRAILER}"));
    headers
}

fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // writing into a String can't fail
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}
