//! HSTS-enforcing HTTP client.
//!
//! # Responsibilities
//! - Seed preloaded hosts into an in-memory store
//! - Compose the service stack: HSTS layer → User-Agent → transport
//! - Follow redirects hop by hop so every hop is checked against the store
//!
//! # Design Decisions
//! - The transport never follows redirects itself; a redirect to `http://`
//!   on a Known HSTS Host must be upgraded like any other request
//! - Only `GET` is issued; request bodies are out of scope for fetching

use http::header::{InvalidHeaderValue, LOCATION, USER_AGENT};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response, StatusCode, Uri};
use std::sync::Arc;
use thiserror::Error;
use tower::{BoxError, Service, ServiceBuilder, ServiceExt};
use tower_http::set_header::{SetRequestHeader, SetRequestHeaderLayer};

use crate::config::ClientConfig;
use crate::interceptor::{BuildError, HstsLayer, HstsService, HstsUpgraded};
use crate::store::MemoryStore;
use crate::transport::{ReqwestTransport, TransportError};

/// The composed service stack used by [`HstsClient`].
pub type ClientService = HstsService<SetRequestHeader<ReqwestTransport, HeaderValue>>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HSTS layer: {0}")]
    Build(#[from] BuildError),

    #[error("failed to build transport: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid user agent: {0}")]
    UserAgent(#[from] InvalidHeaderValue),
}

/// One request/response exchange while fetching a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    /// URI the hop was asked for.
    pub requested: Uri,
    /// URI actually sent, after any HSTS upgrade.
    pub sent: Uri,
    pub status: StatusCode,
}

impl Hop {
    pub fn upgraded(&self) -> bool {
        self.requested != self.sent
    }
}

/// Result of fetching a URI, one entry per hop.
#[derive(Debug, Clone, Default)]
pub struct Fetch {
    pub hops: Vec<Hop>,
}

impl Fetch {
    pub fn final_status(&self) -> Option<StatusCode> {
        self.hops.last().map(|h| h.status)
    }
}

pub struct HstsClient {
    store: Arc<MemoryStore>,
    service: ClientService,
    max_redirects: usize,
}

impl HstsClient {
    /// Build a client with a fresh store seeded from `config.preload`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let store = Arc::new(MemoryStore::new());
        for preload in &config.preload {
            store.seed(&preload.host, preload.include_subdomains);
            tracing::debug!(
                host = %preload.host,
                include_subdomains = preload.include_subdomains,
                "Preloaded Known HSTS Host"
            );
        }
        tracing::info!(count = config.preload.len(), "Preload list seeded");

        Self::with_store(config, store)
    }

    /// Build a client around an existing store.
    pub fn with_store(config: &ClientConfig, store: Arc<MemoryStore>) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::from_config(&config.transport)?;
        let user_agent = HeaderValue::from_str(&config.transport.user_agent)?;
        let hsts = HstsLayer::builder()
            .store(store.clone())
            .policy(config.policy.clone())
            .build()?;

        let service = ServiceBuilder::new()
            .layer(hsts)
            .layer(SetRequestHeaderLayer::if_not_present(USER_AGENT, user_agent))
            .service(transport);

        Ok(Self {
            store,
            service,
            max_redirects: config.transport.max_redirects,
        })
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// `GET` `uri`, following redirects.
    pub async fn get(&self, uri: Uri) -> Result<Fetch, BoxError> {
        follow_redirects(self.service.clone(), uri, self.max_redirects).await
    }
}

/// Issue `GET uri` through `service`, following up to `max_redirects` redirects.
pub async fn follow_redirects<S, B>(
    mut service: S,
    uri: Uri,
    max_redirects: usize,
) -> Result<Fetch, BoxError>
where
    S: Service<Request<String>, Response = Response<B>>,
    S::Error: Into<BoxError>,
{
    let mut fetch = Fetch::default();
    let mut next = uri;

    loop {
        let request = Request::builder()
            .method(Method::GET)
            .uri(next.clone())
            .body(String::new())?;

        let response = service
            .ready()
            .await
            .map_err(Into::<BoxError>::into)?
            .call(request)
            .await
            .map_err(Into::<BoxError>::into)?;

        let status = response.status();
        let sent = response
            .extensions()
            .get::<HstsUpgraded>()
            .map(|u| u.upgraded.clone())
            .unwrap_or_else(|| next.clone());

        let location = if status.is_redirection() {
            response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|l| resolve_location(&sent, l))
        } else {
            None
        };

        tracing::debug!(requested = %next, sent = %sent, status = %status, "Hop complete");
        fetch.hops.push(Hop {
            requested: next,
            sent,
            status,
        });

        match location {
            Some(location) if fetch.hops.len() <= max_redirects => next = location,
            _ => return Ok(fetch),
        }
    }
}

/// Resolve a `Location` header value against the URI it was received for.
fn resolve_location(base: &Uri, location: &str) -> Option<Uri> {
    let base = url::Url::parse(&base.to_string()).ok()?;
    base.join(location).ok()?.as_str().parse().ok()
}
