//! Streaming relay from an upstream byte source into a chunked response.
//!
//! ```no_run
//! use http::StatusCode;
//! use tcp_http::connection::ResponseWriter;
//! use tcp_http::relay::{ProxyRelay, relay_headers};
//! use tokio::net::TcpStream;
//!
//! # async fn run(upstream: TcpStream, downstream: TcpStream) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = ResponseWriter::new(downstream)
//!     .write_status_line(StatusCode::OK)
//!     .await?
//!     .write_headers(relay_headers("application/json"))
//!     .await?;
//!
//! let (_writer, summary) = ProxyRelay::new().relay(upstream, writer).await?;
//! println!("relayed {} bytes, sha256 {}", summary.length, summary.digest);
//! # Ok(())
//! # }
//! ```

mod proxy_relay;

pub use proxy_relay::{
    CONTENT_LENGTH_TRAILER, CONTENT_SHA256_TRAILER, DEFAULT_BLOCK_SIZE, ProxyRelay, RelaySummary, relay_headers,
};
