use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tcp_http::codec::ParserLimits;
use tcp_http::connection::HttpConnection;
use tcp_http::handler::Handler;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Request handler as seen by the accept loop
pub type ConnectionHandler = dyn Handler<OwnedWriteHalf>;

#[derive(Default)]
pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    handler: Option<Arc<ConnectionHandler>>,
    limits: ParserLimits,
}

impl ServerBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    pub fn handler(mut self, handler: impl Handler<OwnedWriteHalf> + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::invalid_address)?;
        if address.is_empty() {
            return Err(ServerBuildError::invalid_address(io::Error::other("address resolved to nothing")));
        }
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        Ok(Server { address, handler, limits: self.limits })
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("has_handler", &self.handler.is_some())
            .field("limits", &self.limits)
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

impl ServerBuildError {
    fn invalid_address(source: io::Error) -> Self {
        Self::InvalidAddress { source }
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("bind server error: {source}")]
    Bind {
        #[from]
        source: io::Error,
    },
}

/// Accepts connections and runs one [`HttpConnection`] task per connection.
pub struct Server {
    address: Vec<SocketAddr>,
    handler: Arc<ConnectionHandler>,
    limits: ParserLimits,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the configured address and serves until `shutdown` is cancelled.
    pub async fn start(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e.into());
            }
        };

        self.serve(tcp_listener, shutdown).await;
        Ok(())
    }

    /// Serves on an already bound listener until `shutdown` is cancelled.
    ///
    /// Cancellation only stops accepting: connections already accepted keep running on their
    /// own tasks until their response is written.
    pub async fn serve(self, tcp_listener: TcpListener, shutdown: CancellationToken) {
        loop {
            let (tcp_stream, remote_addr) = select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("shutdown requested, stop accepting connections");
                    break;
                }

                accepted = tcp_listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let handler = Arc::clone(&self.handler);
            let limits = self.limits;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_limits(reader, writer, limits);
                match connection.process(handler).await {
                    Ok(()) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, "service has error, cause {}, connection shutdown", e);
                    }
                }
            });
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("limits", &self.limits).finish_non_exhaustive()
    }
}
