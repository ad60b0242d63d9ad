use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::ResourceKind;

/// Normalized GitHub resource, tagged by `kind`.
///
/// Both the direct API path and the proxy produce this shape, so callers do
/// not care which one served a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GithubResource {
    User(UserResource),
    Repo(RepoResource),
    Pull(PullResource),
    Issue(IssueResource),
}

impl GithubResource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            GithubResource::User(_) => ResourceKind::User,
            GithubResource::Repo(_) => ResourceKind::Repo,
            GithubResource::Pull(_) => ResourceKind::Pull,
            GithubResource::Issue(_) => ResourceKind::Issue,
        }
    }

    pub fn html_url(&self) -> &str {
        match self {
            GithubResource::User(u) => &u.html_url,
            GithubResource::Repo(r) => &r.html_url,
            GithubResource::Pull(p) => &p.html_url,
            GithubResource::Issue(i) => &i.html_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResource {
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    pub bio: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoResource {
    pub id: u64,
    pub full_name: String,
    pub owner: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResource {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ResourceState,
    pub author: String,
    pub html_url: String,
    pub draft: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueResource {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: ResourceState,
    pub author: String,
    pub html_url: String,
    pub comments: u64,
    pub labels: Vec<String>,
    pub created_at: String,
}

/// Display state of a pull request or issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Open,
    Closed,
    Merged,
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceState::Open => write!(f, "open"),
            ResourceState::Closed => write!(f, "closed"),
            ResourceState::Merged => write!(f, "merged"),
        }
    }
}

/// Failure of a fetch, surfaced to callers as data rather than thrown.
///
/// Serializes as `{ "message": ..., "code": ... }` with `code` omitted when
/// absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}{}", code_suffix(.code))]
pub struct FetchError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FetchError {
    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" ({})", c)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_serializes_with_kind_tag() {
        let resource = GithubResource::Issue(IssueResource {
            id: 7,
            number: 1,
            title: "Bug".to_string(),
            state: ResourceState::Open,
            author: "octocat".to_string(),
            html_url: "https://github.com/o/r/issues/1".to_string(),
            comments: 3,
            labels: vec!["bug".to_string()],
            created_at: "2024-01-01T00:00:00Z".to_string(),
        });
        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(value["kind"], "issue");
        assert_eq!(value["state"], "open");
        assert_eq!(value["html_url"], "https://github.com/o/r/issues/1");
        assert_eq!(resource.kind(), ResourceKind::Issue);
    }

    #[test]
    fn test_fetch_error_omits_missing_code() {
        let bare = FetchError {
            message: "boom".to_string(),
            code: None,
        };
        assert_eq!(bare.to_string(), "boom");
        let value = serde_json::to_value(&bare).unwrap();
        assert_eq!(value, serde_json::json!({ "message": "boom" }));

        let coded = FetchError::with_code("Not Found", "NOT_FOUND");
        assert_eq!(coded.to_string(), "Not Found (NOT_FOUND)");
    }

    #[test]
    fn test_fetch_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(FetchError::with_code("Bad credentials", "UNAUTHORIZED"));
        assert_eq!(err.to_string(), "Bad credentials (UNAUTHORIZED)");
    }
}
