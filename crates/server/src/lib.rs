//! Demo server for the `tcp-http` framing engine
//!
//! This crate holds the collaborators around the engine: the accept loop with its shutdown
//! token, the demo routes, and the upstream client used by the proxy route.
//!
//! # Example
//!
//! ```no_run
//! use tcp_http_server::{DemoHandler, Server};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::builder().address("127.0.0.1:42069").handler(DemoHandler::default()).build()?;
//!
//!     let shutdown = CancellationToken::new();
//!     server.start(shutdown).await?;
//!     Ok(())
//! }
//! ```

mod routes;
mod server;

pub use routes::{DEFAULT_PROXY_TARGET, DemoHandler};
pub use server::{ConnectionHandler, Server, ServerBuildError, ServerBuilder, ServerError};
