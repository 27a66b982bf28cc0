//! Request handler abstraction.
//!
//! A [`Handler`] receives the parsed [`Request`] together with a fresh
//! [`ResponseWriter`] bound to the connection and is responsible for writing the whole
//! response. Plain async functions and closures become handlers through [`make_handler`].

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::{HttpError, Request};

#[async_trait]
pub trait Handler<W>: Send + Sync
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn call(&self, request: Request, writer: ResponseWriter<W>) -> Result<(), HttpError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<W, F, Fut> Handler<W> for HandlerFn<F>
where
    W: AsyncWrite + Unpin + Send + 'static,
    F: Fn(Request, ResponseWriter<W>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HttpError>> + Send,
{
    async fn call(&self, request: Request, writer: ResponseWriter<W>) -> Result<(), HttpError> {
        (self.f)(request, writer).await
    }
}

pub fn make_handler<W, F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request, ResponseWriter<W>) -> Fut,
    Fut: Future<Output = Result<(), HttpError>>,
{
    HandlerFn { f }
}
