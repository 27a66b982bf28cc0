//! Demo routes.
//!
//! - `/yourproblem`: `400` with an HTML page
//! - `/myproblem`: `500` with an HTML page
//! - `/httpbin/<path>`: `GET <proxy target>/<path>`, relayed as a chunked body with digest trailers
//! - anything else: `200` with an HTML page

use std::io;

use async_trait::async_trait;
use futures::TryStreamExt;
use http::StatusCode;
use http::header::CONTENT_TYPE;
use tcp_http::connection::{ResponseWriter, write_error_response};
use tcp_http::handler::Handler;
use tcp_http::protocol::{HttpError, Request, SendError, default_headers};
use tcp_http::relay::{ProxyRelay, relay_headers};
use tokio::io::AsyncWrite;
use tokio_util::io::StreamReader;
use tracing::{error, info};

pub const DEFAULT_PROXY_TARGET: &str = "https://httpbin.org";

const PROXY_PREFIX: &str = "/httpbin/";

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>The server could not make sense of this request.</p>
  </body>
</html>";

const SERVER_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Something went wrong on our side.</p>
  </body>
</html>";

const OK_PAGE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was handled.</p>
  </body>
</html>";

#[derive(Debug, Clone)]
pub struct DemoHandler {
    proxy_target: String,
    relay: ProxyRelay,
    client: reqwest::Client,
}

impl DemoHandler {
    pub fn new(proxy_target: impl Into<String>) -> Self {
        Self { proxy_target: proxy_target.into(), relay: ProxyRelay::new(), client: reqwest::Client::new() }
    }

    /// Uses `client` for upstream requests instead of a default one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_relay(mut self, relay: ProxyRelay) -> Self {
        self.relay = relay;
        self
    }

    fn proxy_url(&self, path: &str) -> String {
        format!("{}/{}", self.proxy_target.trim_end_matches('/'), path)
    }

    async fn proxy<W>(&self, path: &str, writer: ResponseWriter<W>) -> Result<(), HttpError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let url = self.proxy_url(path);
        info!(%url, "proxy request");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = %e, %url, "upstream request failed");
                write_error_response(writer, StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).await?;
                return Ok(());
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("text/plain")
            .to_owned();

        let upstream = StreamReader::new(Box::pin(response.bytes_stream().map_err(io::Error::other)));

        let writer = writer.write_status_line(status).await?.write_headers(relay_headers(&content_type)).await?;
        let (_writer, summary) = self.relay.relay(upstream, writer).await?;

        info!(%url, length = summary.length, digest = %summary.digest, "proxy finished");
        Ok(())
    }
}

impl Default for DemoHandler {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_TARGET)
    }
}

#[async_trait]
impl<W> Handler<W> for DemoHandler
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn call(&self, request: Request, writer: ResponseWriter<W>) -> Result<(), HttpError> {
        let target = request.target();

        if let Some(path) = target.strip_prefix(PROXY_PREFIX) {
            return self.proxy(path, writer).await;
        }

        let (status, page) = match target {
            "/yourproblem" => (StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE),
            "/myproblem" => (StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_PAGE),
            _ => (StatusCode::OK, OK_PAGE),
        };

        write_html(writer, status, page).await?;
        Ok(())
    }
}

async fn write_html<W>(writer: ResponseWriter<W>, status: StatusCode, page: &str) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = default_headers(page.len());
    headers.set(CONTENT_TYPE.as_str(), "text/html");

    writer.write_status_line(status).await?.write_headers(headers).await?.write_body(page.as_bytes()).await?;
    Ok(())
}
