//! HSTS enforcement as tower middleware.
//!
//! # Responsibilities
//! - Upgrade requests to Known HSTS Hosts before they are sent (§8.3)
//! - Delegate the send to the wrapped transport
//! - Fold Strict-Transport-Security response headers into the store (§8.1)

use futures_util::future::BoxFuture;
use hyper::{Request, Response, Uri};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tower::{BoxError, Layer, Service};

use crate::config::PolicyConfig;
use crate::header::{StsDirectives, STRICT_TRANSPORT_SECURITY};
use crate::interceptor::upgrade::{host_component, is_insecure, is_secure, upgrade_uri};
use crate::observability::metrics;
use crate::store::HstsStore;

/// Response extension a transport sets to the URI the response actually came
/// from, e.g. after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUri(pub Uri);

/// Marks an exchange whose request was upgraded to https. Set on the request
/// before it is sent and copied onto the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HstsUpgraded {
    pub original: Uri,
    pub upgraded: Uri,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("an HSTS store is required")]
    MissingStore,
}

/// Layer that wraps a transport with HSTS enforcement.
#[derive(Debug, Clone)]
pub struct HstsLayer {
    store: Arc<dyn HstsStore>,
    policy: PolicyConfig,
}

impl HstsLayer {
    pub fn new(store: Arc<dyn HstsStore>) -> Self {
        Self {
            store,
            policy: PolicyConfig::default(),
        }
    }

    pub fn builder() -> HstsLayerBuilder {
        HstsLayerBuilder::default()
    }
}

impl<S> Layer<S> for HstsLayer {
    type Service = HstsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HstsService {
            inner,
            store: self.store.clone(),
            policy: self.policy.clone(),
        }
    }
}

/// Builder for [`HstsLayer`]. Fails at `build` time when no store is set.
#[derive(Debug, Default)]
pub struct HstsLayerBuilder {
    store: Option<Arc<dyn HstsStore>>,
    policy: PolicyConfig,
}

impl HstsLayerBuilder {
    pub fn store(mut self, store: Arc<dyn HstsStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn policy(mut self, policy: PolicyConfig) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Result<HstsLayer, BuildError> {
        Ok(HstsLayer {
            store: self.store.ok_or(BuildError::MissingStore)?,
            policy: self.policy,
        })
    }
}

/// A transport with HSTS enforcement in front of it.
///
/// Stateless across requests; everything learned lives in the store.
#[derive(Debug, Clone)]
pub struct HstsService<S> {
    inner: S,
    store: Arc<dyn HstsStore>,
    policy: PolicyConfig,
}

impl<S> HstsService<S> {
    pub fn new(inner: S, store: Arc<dyn HstsStore>) -> Self {
        HstsLayer::new(store).layer(inner)
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HstsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The ready inner service goes into the future, a fresh clone stays behind
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let store = self.store.clone();
        let policy = self.policy.clone();

        Box::pin(async move {
            enforce(store.as_ref(), &mut req)?;
            let sent = req.uri().clone();
            let upgraded = req.extensions().get::<HstsUpgraded>().cloned();

            let mut response = inner.call(req).await.map_err(Into::<BoxError>::into)?;

            observe(store.as_ref(), &policy, &sent, &response);
            if let Some(upgraded) = upgraded {
                response.extensions_mut().insert(upgraded);
            }
            Ok::<_, BoxError>(response)
        })
    }
}

/// Steps 1-4: upgrade the request if its host is a Known HSTS Host.
fn enforce<B>(store: &dyn HstsStore, req: &mut Request<B>) -> Result<(), BoxError> {
    if !is_insecure(req.uri()) {
        return Ok(());
    }
    tracing::debug!(uri = %req.uri(), "Request uses the http scheme");

    let host = match host_component(req.uri()) {
        Some(host) => host,
        None => return Ok(()),
    };

    if host.is_ip_literal() {
        tracing::debug!(
            uri = %req.uri(),
            "Host is an IP literal, no Known HSTS Host can match"
        );
        metrics::record_ip_literal_bypass();
        return Ok(());
    }

    let known = match store.find(&host.key())? {
        Some(known) => known,
        None => return Ok(()),
    };

    let upgraded = upgrade_uri(req.uri())?;
    tracing::debug!(
        uri = %req.uri(),
        upgraded = %upgraded,
        matched = %known.domain,
        "Request rewritten to https for Known HSTS Host"
    );

    let original = std::mem::replace(req.uri_mut(), upgraded.clone());
    req.extensions_mut().insert(HstsUpgraded { original, upgraded });
    metrics::record_upgrade();
    Ok(())
}

/// Step 6: fold the response's Strict-Transport-Security header into the store.
fn observe<B>(store: &dyn HstsStore, policy: &PolicyConfig, sent: &Uri, response: &Response<B>) {
    if !response.headers().contains_key(STRICT_TRANSPORT_SECURITY) {
        return;
    }

    let sts = match StsDirectives::from_headers(response.headers()) {
        Some(sts) => sts,
        None => {
            tracing::debug!(uri = %sent, "Ignoring malformed Strict-Transport-Security header");
            metrics::record_header_rejected();
            return;
        }
    };

    let resolved = response
        .extensions()
        .get::<ResolvedUri>()
        .map(|r| &r.0)
        .unwrap_or(sent);

    if policy.ignore_insecure_headers && !is_secure(resolved) {
        tracing::debug!(
            uri = %resolved,
            "Ignoring Strict-Transport-Security header received over http"
        );
        return;
    }

    let host = match host_component(resolved) {
        Some(host) => host,
        None => return,
    };

    tracing::debug!(
        uri = %resolved,
        max_age = sts.max_age,
        include_subdomains = sts.include_subdomains,
        preload = sts.preload,
        "Received Strict-Transport-Security header"
    );

    match store.update(&host.key(), sts.include_subdomains, sts.preload, sts.max_age) {
        Ok(true) => tracing::debug!(host = %host, "Known HSTS Host state updated"),
        Ok(false) => {}
        Err(e) => tracing::error!(
            host = %host,
            error = %e,
            "Failed to record Strict-Transport-Security directive"
        ),
    }
}
