mod api;
pub mod endpoint;
pub mod types;

pub use endpoint::{Endpoint, EndpointKey, Route};
pub use types::{FetchError, GithubResource};

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::classify::ResourceKind;

const USER_AGENT: &str = "gh-resolve";

/// Network seam for resolving an endpoint into a normalized resource.
/// Implementations must be Send + Sync so one fetcher can back many
/// concurrent resolutions.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<GithubResource, FetchError>;
}

/// reqwest-backed fetcher for both the GitHub API and the proxy.
pub struct HttpFetcher {
    client: reqwest::Client,
    token: Option<String>,
}

impl HttpFetcher {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %endpoint.key, kind = %endpoint.kind))]
    async fn fetch(&self, endpoint: &Endpoint) -> Result<GithubResource, FetchError> {
        let accept = match endpoint.route {
            Route::Direct => "application/vnd.github+json",
            Route::Proxy => "application/json",
        };
        let mut request = self
            .client
            .get(endpoint.url())
            .header("User-Agent", USER_AGENT)
            .header("Accept", accept);

        // The token is for the GitHub API only; never hand it to the proxy.
        if endpoint.route == Route::Direct {
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
        }

        debug!("sending request");
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed");
            FetchError::with_code(format!("Request to {} failed: {}", endpoint.key, e), "NETWORK")
        })?;

        let status = response.status();
        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .is_some_and(|v| v.as_bytes() == b"0");
        let body = response.text().await.map_err(|e| {
            FetchError::with_code(format!("Failed to read response body: {}", e), "NETWORK")
        })?;
        debug!(status = status.as_u16(), body_bytes = body.len(), "received response");

        if !status.is_success() {
            return Err(status_error(status, rate_limited, &body));
        }

        match endpoint.route {
            Route::Direct => decode_api(endpoint.kind, &body),
            Route::Proxy => serde_json::from_str::<GithubResource>(&body).map_err(decode_error),
        }
    }
}

/// A successful fetch must produce the kind the URL was classified as.
pub fn check_kind(endpoint: &Endpoint, resource: GithubResource) -> Result<GithubResource, FetchError> {
    if resource.kind() != endpoint.kind {
        return Err(FetchError::with_code(
            format!("Expected a {} but received a {}", endpoint.kind, resource.kind()),
            "KIND_MISMATCH",
        ));
    }
    Ok(resource)
}

fn decode_api(kind: ResourceKind, body: &str) -> Result<GithubResource, FetchError> {
    let resource = match kind {
        ResourceKind::User => {
            GithubResource::User(serde_json::from_str::<api::ApiUser>(body).map_err(decode_error)?.into())
        }
        ResourceKind::Repo => {
            GithubResource::Repo(serde_json::from_str::<api::ApiRepo>(body).map_err(decode_error)?.into())
        }
        ResourceKind::Pull => {
            GithubResource::Pull(serde_json::from_str::<api::ApiPull>(body).map_err(decode_error)?.into())
        }
        ResourceKind::Issue => {
            GithubResource::Issue(serde_json::from_str::<api::ApiIssue>(body).map_err(decode_error)?.into())
        }
        ResourceKind::Unknown => {
            return Err(FetchError::with_code("Cannot fetch an unknown resource", "KIND_MISMATCH"))
        }
    };
    Ok(resource)
}

fn decode_error(e: serde_json::Error) -> FetchError {
    FetchError::with_code(format!("Failed to decode response: {}", e), "DECODE")
}

/// Map a non-success status to a FetchError, preferring GitHub's own
/// `message` field for the text.
fn status_error(status: StatusCode, rate_limited: bool, body: &str) -> FetchError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| format!("GitHub returned HTTP {}", status.as_u16()));

    let code = match status {
        StatusCode::NOT_FOUND => "NOT_FOUND".to_string(),
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED".to_string(),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limited => "RATE_LIMITED".to_string(),
        StatusCode::TOO_MANY_REQUESTS => "RATE_LIMITED".to_string(),
        other => format!("HTTP_{}", other.as_u16()),
    };
    FetchError::with_code(message, code)
}
