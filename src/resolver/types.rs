use std::time::Duration;

use serde::Serialize;

use crate::classify::ResourceKind;
use crate::resource::{EndpointKey, FetchError, GithubResource};

/// Why a resolution was never attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvalidReason {
    EmptyUrl,
    InvalidGithubUrl,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::EmptyUrl => write!(f, "EMPTY_URL"),
            InvalidReason::InvalidGithubUrl => write!(f, "INVALID_GITHUB_URL"),
        }
    }
}

/// Lifecycle of one call site: `Idle -> Loading -> Success | Error`, with
/// `refetch` or a new input moving back to `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Go through the proxy instead of the GitHub API.
    pub use_server: bool,
    /// How long a fetched resource is served from cache without refetching.
    pub stale_time: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            use_server: false,
            stale_time: Duration::from_secs(60),
        }
    }
}

/// Visible state of a resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Trimmed input this state belongs to.
    pub input: String,
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointKey>,
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GithubResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<InvalidReason>,
}

impl Resolution {
    pub fn idle() -> Self {
        Self {
            input: String::new(),
            kind: ResourceKind::Unknown,
            endpoint: None,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            invalid_reason: None,
        }
    }

    pub(crate) fn invalid(input: &str, reason: InvalidReason) -> Self {
        Self {
            input: input.to_string(),
            invalid_reason: Some(reason),
            ..Self::idle()
        }
    }

    pub(crate) fn loading(input: &str, kind: ResourceKind, endpoint: EndpointKey) -> Self {
        Self {
            input: input.to_string(),
            kind,
            endpoint: Some(endpoint),
            status: QueryStatus::Loading,
            ..Self::idle()
        }
    }

    /// Settle a loading state with the fetch outcome.
    pub(crate) fn settled(self, result: Result<GithubResource, FetchError>) -> Self {
        match result {
            Ok(data) => Self {
                status: QueryStatus::Success,
                data: Some(data),
                error: None,
                ..self
            },
            Err(error) => Self {
                status: QueryStatus::Error,
                data: None,
                error: Some(error),
                ..self
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reason_wire_names() {
        assert_eq!(serde_json::to_value(InvalidReason::EmptyUrl).unwrap(), "EMPTY_URL");
        assert_eq!(
            serde_json::to_value(InvalidReason::InvalidGithubUrl).unwrap(),
            "INVALID_GITHUB_URL"
        );
        assert_eq!(InvalidReason::InvalidGithubUrl.to_string(), "INVALID_GITHUB_URL");
    }

    #[test]
    fn test_idle_resolution_is_not_loading() {
        let idle = Resolution::idle();
        assert_eq!(idle.status, QueryStatus::Idle);
        assert!(!idle.is_loading());
        assert!(idle.data.is_none() && idle.error.is_none());
    }

    #[test]
    fn test_error_settle_clears_data() {
        let key_source = crate::resource::Endpoint::direct(
            &crate::classify::parse("https://github.com/octocat"),
            "https://api.github.com",
        )
        .unwrap();
        let loading = Resolution::loading("x", ResourceKind::User, key_source.key);
        assert!(loading.is_loading());
        let failed = loading.settled(Err(FetchError::with_code("nope", "NETWORK")));
        assert_eq!(failed.status, QueryStatus::Error);
        assert!(failed.data.is_none());
        assert_eq!(failed.error.unwrap().message, "nope");
    }
}
