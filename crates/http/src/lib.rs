//! An incremental HTTP/1.1 framing engine
//!
//! This crate parses requests from bytes that arrive in arbitrary pieces and writes responses
//! in a strictly checked order, including chunked bodies with trailers. It is built on top of
//! tokio and keeps the request head in a bounded buffer.
//!
//! # Features
//!
//! - Request line and header parsing that doesn't depend on read boundaries
//! - Case-insensitive header map that merges repeated fields
//! - Typed response writer: out-of-order writes don't compile
//! - Chunked transfer encoding with trailers
//! - Streaming relay that digests the relayed body and reports it in trailers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tokio::net::tcp::OwnedWriteHalf;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use tcp_http::connection::{HttpConnection, ResponseWriter};
//! use tcp_http::handler::make_handler;
//! use tcp_http::protocol::{default_headers, HttpError, Request};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request, writer: ResponseWriter<OwnedWriteHalf>) -> Result<(), HttpError> {
//!     info!(target = request.target(), "receiving request");
//!
//!     let body = "Hello World!\r\n";
//!     writer
//!         .write_status_line(StatusCode::OK)
//!         .await?
//!         .write_headers(default_headers(body.len()))
//!         .await?
//!         .write_body(body.as_bytes())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: Data model and error types
//! - [`codec`]: Byte-level parsing and serialization
//! - [`connection`]: Request reading loop, typed response writer, one-shot connection processing
//! - [`handler`]: Request handler traits and utilities
//! - [`relay`]: Upstream to chunked-body relay with a SHA-256 trailer
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Request parsing errors, fatal to the connection
//! - [`protocol::SendError`]: Response writing errors
//! - [`protocol::RelayError`]: Relay aborts, upstream or downstream
//!
//! # Limitations
//!
//! - HTTP/1.1 only, and only the literal version `HTTP/1.1` is accepted
//! - One request per connection, no keep-alive
//! - Request bodies are not read; bytes after the header section stay buffered
//! - Maximum header size: 8KB for the request line plus all field-lines, merged duplicates included
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod relay;

mod utils;
pub(crate) use utils::ensure;
