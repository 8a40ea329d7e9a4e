//! Shared utilities for integration tests.

#![allow(dead_code)]

use hyper::{Request, Response, StatusCode, Uri};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::Service;

/// Error returned by [`MockTransport`] when told to fail.
#[derive(Debug, thiserror::Error)]
#[error("mock transport failure")]
pub struct MockTransportError;

/// In-process transport that records every URI it is asked to send and
/// answers with an optional Strict-Transport-Security header.
#[derive(Clone)]
pub struct MockTransport {
    header: Option<&'static str>,
    fail: bool,
    seen: Arc<Mutex<Vec<Uri>>>,
}

impl MockTransport {
    pub fn new(header: Option<&'static str>) -> Self {
        Self {
            header,
            fail: false,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Some("max-age=31536000"))
        }
    }

    /// URIs sent so far, in order.
    pub fn seen(&self) -> Vec<Uri> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_seen(&self) -> String {
        self.seen().last().unwrap().to_string()
    }
}

impl<B> Service<Request<B>> for MockTransport {
    type Response = Response<String>;
    type Error = MockTransportError;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        self.seen.lock().unwrap().push(req.uri().clone());
        if self.fail {
            return std::future::ready(Err(MockTransportError));
        }

        let mut builder = Response::builder().status(StatusCode::OK);
        if let Some(header) = self.header {
            builder = builder.header("Strict-Transport-Security", header);
        }
        std::future::ready(Ok(builder.body("ok".to_string()).unwrap()))
    }
}

/// Transport whose responses never arrive, for timeout and cancellation tests.
#[derive(Clone)]
pub struct StalledTransport {
    header: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl StalledTransport {
    pub fn new(header: Option<&'static str>) -> Self {
        Self {
            header,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<B> Service<Request<B>> for StalledTransport {
    type Response = Response<String>;
    type Error = MockTransportError;
    type Future = futures_util::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: Request<B>) -> Self::Future {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let header = self.header;
        Box::pin(async move {
            std::future::pending::<()>().await;
            let mut builder = Response::builder().status(StatusCode::OK);
            if let Some(header) = header {
                builder = builder.header("Strict-Transport-Security", header);
            }
            Ok(builder.body(String::new()).unwrap())
        })
    }
}

/// Start a plain-HTTP origin on an ephemeral port. Every response carries
/// `hsts_header` when given. Returns the bound address and a request counter.
pub async fn start_origin(hsts_header: Option<&'static str>) -> (SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let counter = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let counter = counter.clone();
                    tokio::spawn(async move {
                        // Read the request head before answering
                        let mut buf = Vec::new();
                        let mut chunk = [0u8; 1024];
                        loop {
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                            }
                            // A TLS ClientHello: this origin only speaks plain http
                            if buf[0] == 0x16 {
                                return;
                            }
                            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                            if buf.len() > 16 * 1024 {
                                return;
                            }
                        }
                        counter.fetch_add(1, Ordering::SeqCst);

                        let body = "ok";
                        let sts = hsts_header
                            .map(|h| format!("Strict-Transport-Security: {}\r\n", h))
                            .unwrap_or_default();
                        let response = format!(
                            "HTTP/1.1 200 OK\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            sts,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}
