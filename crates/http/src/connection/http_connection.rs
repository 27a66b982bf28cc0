use std::sync::Arc;

use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info, warn};

use crate::codec::ParserLimits;
use crate::connection::state::{BodyWritten, Init};
use crate::connection::{RequestReader, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, SendError, default_headers};

/// One HTTP exchange over a reader/writer pair
///
/// `HttpConnection` reads a single request head, hands it to a [`Handler`] together with a
/// [`ResponseWriter`] and returns once the handler is done. There is no keep-alive: the
/// connection is meant to be closed afterwards.
///
/// When the request can't be parsed, a `400 Bad Request` carrying the error text is written
/// instead and the parse error is returned.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    request_reader: RequestReader<R>,
    writer: W,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_limits(reader, writer, ParserLimits::default())
    }

    pub fn with_limits(reader: R, writer: W, limits: ParserLimits) -> Self {
        Self { request_reader: RequestReader::with_limits(reader, limits), writer }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler<W> + ?Sized,
    {
        let request = match self.request_reader.read_request().await {
            Ok(request) => request,

            // nobody to answer to
            Err(e @ ParseError::Io { .. }) => {
                error!(cause = %e, "can't read request");
                return Err(e.into());
            }

            Err(e) => {
                error!(cause = %e, "can't parse request");
                let writer = ResponseWriter::new(self.writer);
                if let Err(send_error) = write_error_response(writer, StatusCode::BAD_REQUEST, &e.to_string()).await {
                    warn!(cause = %send_error, "failed to send bad request response");
                }
                return Err(e.into());
            }
        };

        info!(method = request.method(), target = request.target(), "processing request");

        let result = handler.call(request, ResponseWriter::new(self.writer)).await;
        if let Err(e) = &result {
            error!(cause = %e, "handler failed");
        }
        result
    }
}

/// Writes a complete response with the default headers and `message` as a `text/plain` body.
pub async fn write_error_response<W>(
    writer: ResponseWriter<W, Init>,
    status: StatusCode,
    message: &str,
) -> Result<ResponseWriter<W, BodyWritten>, SendError>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_status_line(status)
        .await?
        .write_headers(default_headers(message.len()))
        .await?
        .write_body(message.as_bytes())
        .await
}
