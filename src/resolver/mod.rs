pub mod types;

pub use types::{InvalidReason, QueryStatus, ResolveOptions, Resolution};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::classify::{self, ParsedUrl};
use crate::query::QueryCache;
use crate::resource::{self, Endpoint, EndpointKey, FetchError, Fetcher, GithubResource};
use crate::store::Store;

/// Shared fetch context: one fetcher and one cache keyed by endpoint, used
/// by every call site.
pub struct QueryClient {
    fetcher: Arc<dyn Fetcher>,
    cache: QueryCache<EndpointKey, GithubResource>,
    api_base: String,
    proxy_base: String,
}

impl QueryClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, api_base: impl Into<String>, proxy_base: impl Into<String>) -> Self {
        Self {
            fetcher,
            cache: QueryCache::new(),
            api_base: api_base.into(),
            proxy_base: proxy_base.into(),
        }
    }

    pub fn endpoint_for(&self, parsed: &ParsedUrl, use_server: bool) -> Option<Endpoint> {
        if use_server {
            Endpoint::proxy(parsed, &self.proxy_base)
        } else {
            Endpoint::direct(parsed, &self.api_base)
        }
    }

    pub async fn fetch(&self, endpoint: &Endpoint, stale_time: Duration) -> Result<GithubResource, FetchError> {
        let fetch = self.fetch_fn(endpoint);
        self.cache.get(&endpoint.key, stale_time, fetch).await
    }

    pub async fn refetch(&self, endpoint: &Endpoint) -> Result<GithubResource, FetchError> {
        let fetch = self.fetch_fn(endpoint);
        self.cache.refetch(&endpoint.key, fetch).await
    }

    fn fetch_fn(
        &self,
        endpoint: &Endpoint,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<GithubResource, FetchError>> {
        let fetcher = Arc::clone(&self.fetcher);
        let target = endpoint.clone();
        move || {
            Box::pin(async move {
                let resource = fetcher.fetch(&target).await?;
                resource::check_kind(&target, resource)
            })
        }
    }
}

struct CallSite {
    generation: u64,
    input: String,
    endpoint: Option<Endpoint>,
}

/// One caller's view of a resolution, equivalent to a single query hook.
///
/// Only the most recently issued input may publish state: a response for
/// a superseded input is returned to its own caller but never becomes the
/// visible state.
pub struct ResourceQuery {
    client: Arc<QueryClient>,
    options: ResolveOptions,
    state: Store<Resolution>,
    site: Mutex<CallSite>,
}

impl ResourceQuery {
    pub fn new(client: Arc<QueryClient>, options: ResolveOptions) -> Self {
        Self {
            client,
            options,
            state: Store::new(Resolution::idle()),
            site: Mutex::new(CallSite {
                generation: 0,
                input: String::new(),
                endpoint: None,
            }),
        }
    }

    /// Classify `raw` and fetch the resource it names.
    ///
    /// Blank input and URLs that do not classify are answered locally with an
    /// `invalid_reason` and never reach the network.
    #[instrument(skip(self), fields(use_server = self.options.use_server))]
    pub async fn resolve(&self, raw: &str) -> Resolution {
        let input = raw.trim();
        if input.is_empty() {
            debug!("empty input");
            return self.publish_invalid(input, InvalidReason::EmptyUrl);
        }

        let parsed = classify::parse(input);
        let Some(endpoint) = self.client.endpoint_for(&parsed, self.options.use_server) else {
            debug!("not a recognised github url");
            return self.publish_invalid(input, InvalidReason::InvalidGithubUrl);
        };
        info!(
            kind = %endpoint.kind,
            endpoint = %endpoint.key,
            canonical = parsed.html_url().as_deref().unwrap_or_default(),
            "resolving"
        );

        let (generation, loading) = self.begin(input, &endpoint);
        let result = self.client.fetch(&endpoint, self.options.stale_time).await;
        let settled = loading.settled(result);
        self.commit(generation, &settled);
        settled
    }

    /// Fetch the current endpoint again, ignoring the stale window. Returns
    /// the current state untouched when there is nothing to refetch.
    #[instrument(skip(self))]
    pub async fn refetch(&self) -> Resolution {
        let started = {
            let mut site = self.site();
            match site.endpoint.clone() {
                Some(endpoint) => {
                    let input = site.input.clone();
                    let (generation, loading) = self.begin_locked(&mut site, &input, &endpoint);
                    Some((generation, loading, endpoint))
                }
                None => None,
            }
        };
        let Some((generation, loading, endpoint)) = started else {
            return self.state.get();
        };

        let result = self.client.refetch(&endpoint).await;
        let settled = loading.settled(result);
        self.commit(generation, &settled);
        settled
    }

    pub fn snapshot(&self) -> Resolution {
        self.state.get()
    }

    /// Receiver of every state this call site publishes. Slow receivers
    /// only see the latest one.
    pub fn subscribe(&self) -> watch::Receiver<Resolution> {
        self.state.subscribe()
    }

    fn begin(&self, input: &str, endpoint: &Endpoint) -> (u64, Resolution) {
        let mut site = self.site();
        self.begin_locked(&mut site, input, endpoint)
    }

    /// Claim a new generation for `input` and publish `Loading`. The caller
    /// holds the site lock.
    fn begin_locked(&self, site: &mut CallSite, input: &str, endpoint: &Endpoint) -> (u64, Resolution) {
        site.generation += 1;
        site.input = input.to_string();
        site.endpoint = Some(endpoint.clone());
        let loading = Resolution::loading(input, endpoint.kind, endpoint.key.clone());
        self.state.set(loading.clone());
        (site.generation, loading)
    }

    fn commit(&self, generation: u64, settled: &Resolution) {
        let site = self.site();
        if site.generation != generation {
            debug!(generation, current = site.generation, "discarding superseded result");
            return;
        }
        self.state.set(settled.clone());
    }

    fn publish_invalid(&self, input: &str, reason: InvalidReason) -> Resolution {
        let mut site = self.site();
        site.generation += 1;
        site.input = input.to_string();
        site.endpoint = None;
        let invalid = Resolution::invalid(input, reason);
        self.state.set(invalid.clone());
        invalid
    }

    fn site(&self) -> MutexGuard<'_, CallSite> {
        self.site.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
