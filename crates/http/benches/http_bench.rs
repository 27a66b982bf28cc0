use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use futures::executor::block_on;
use http::StatusCode;
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tcp_http::codec::{RequestDecoder, ResponseEncoder};
use tcp_http::connection::{HttpConnection, ResponseWriter};
use tcp_http::handler::make_handler;
use tcp_http::protocol::{HttpError, Request, default_headers};
use tcp_http::relay::{ProxyRelay, relay_headers};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::Decoder;

// Mock IO for testing
#[derive(Debug, Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

// Test handler
async fn test_handler(_request: Request, writer: ResponseWriter<MockIO>) -> Result<(), HttpError> {
    let body = "Hello World!";
    writer
        .write_status_line(StatusCode::OK)
        .await?
        .write_headers(default_headers(body.len()))
        .await?
        .write_body(body.as_bytes())
        .await?;
    Ok(())
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&request[..]);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    let curl_request = b"GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

    c.bench_function("decode_request_byte_by_byte", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut buffer = Vec::with_capacity(curl_request.len());
            for byte in curl_request {
                buffer.push(*byte);
                let consumed = decoder.parse(&buffer).unwrap();
                buffer.drain(..consumed);
            }
            black_box(decoder.take_request().unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let body = b"Hello World!";

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode_status_line(StatusCode::OK, &mut bytes).unwrap();
            encoder.encode_headers(&default_headers(body.len()), &mut bytes).unwrap();
            encoder.encode_body(&body[..], &mut bytes).unwrap();
            black_box(bytes);
        });
    });

    c.bench_function("encode_chunked_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode_status_line(StatusCode::OK, &mut bytes).unwrap();
            encoder.encode_headers(&relay_headers("text/plain"), &mut bytes).unwrap();
            for _ in 0..16 {
                encoder.encode_chunk(&body[..], &mut bytes).unwrap();
            }
            encoder.encode_chunked_body_done(&mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";
    let handler = Arc::new(make_handler(test_handler));

    c.bench_function("process_simple_request", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(request.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            black_box(block_on(connection.process(Arc::clone(&handler))).unwrap());
        });
    });
}

fn bench_proxy_relay(c: &mut Criterion) {
    let upstream: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    let relay = ProxyRelay::new();

    c.bench_function("relay_64k", |b| {
        b.iter(|| {
            block_on(async {
                let writer = ResponseWriter::new(MockIO::new(Vec::new()))
                    .write_status_line(StatusCode::OK)
                    .await
                    .unwrap()
                    .write_headers(relay_headers("application/octet-stream"))
                    .await
                    .unwrap();
                black_box(relay.relay(&upstream[..], writer).await.unwrap().1);
            });
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_encoder, bench_http_connection, bench_proxy_relay);
criterion_main!(benches);
