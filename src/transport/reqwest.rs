//! Transport backed by `reqwest`.

use futures_util::future::BoxFuture;
use http::uri::InvalidUri;
use hyper::{Request, Response, Uri};
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tower::Service;

use crate::config::TransportConfig;
use crate::interceptor::ResolvedUri;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("response URL is not a valid URI: {0}")]
    ResolvedUri(#[from] InvalidUri),
}

/// Sends requests with a shared `reqwest::Client`.
///
/// Redirects are never followed here, so every hop passes back through the
/// HSTS layer. Each response carries a [`ResolvedUri`] extension.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none());
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        Ok(Self::new(builder.build()?))
    }
}

impl<B> Service<Request<B>> for ReqwestTransport
where
    B: Into<reqwest::Body>,
{
    type Response = Response<reqwest::Body>;
    type Error = TransportError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let client = self.client.clone();
        let req = reqwest::Request::try_from(req);

        Box::pin(async move {
            let req = req?;
            tracing::trace!(method = %req.method(), url = %req.url(), "Sending request");

            let response = client.execute(req).await?;
            let resolved: Uri = response.url().as_str().parse()?;

            let mut response = Response::from(response);
            response.extensions_mut().insert(ResolvedUri(resolved));
            Ok::<_, TransportError>(response)
        })
    }
}
