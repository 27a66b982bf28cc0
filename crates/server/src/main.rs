use std::process::ExitCode;

use clap::Parser;
use tcp_http::relay::{DEFAULT_BLOCK_SIZE, ProxyRelay};
use tcp_http_server::{DEFAULT_PROXY_TARGET, DemoHandler, Server};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "tcp-http-server")]
#[command(about = "Demo HTTP/1.1 server with a chunked proxy route", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:42069")]
    address: String,

    /// Upstream base URL for `/httpbin/<path>`
    #[arg(long, default_value = DEFAULT_PROXY_TARGET)]
    proxy_target: String,

    /// Upstream read size of the proxy relay
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(args.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        return ExitCode::FAILURE;
    }

    let handler = DemoHandler::new(args.proxy_target).with_relay(ProxyRelay::new().with_block_size(args.block_size));
    let server = match Server::builder().address(args.address.as_str()).handler(handler).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server configuration");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    match server.start(shutdown).await {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(cause = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

/// Cancels `shutdown` on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(cause = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(cause = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
    shutdown.cancel();
}
