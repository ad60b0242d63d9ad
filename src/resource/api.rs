//! Raw GitHub REST API payloads and their mapping onto the normalized
//! resource shapes. Only the fields we display are deserialized.

use serde::Deserialize;

use super::types::{IssueResource, PullResource, RepoResource, ResourceState, UserResource};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiAccount {
    login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    id: u64,
    login: String,
    name: Option<String>,
    avatar_url: String,
    html_url: String,
    bio: Option<String>,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    #[serde(default)]
    public_repos: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepo {
    id: u64,
    full_name: String,
    owner: ApiAccount,
    description: Option<String>,
    html_url: String,
    language: Option<String>,
    stargazers_count: u64,
    forks_count: u64,
    open_issues_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPull {
    id: u64,
    number: u64,
    title: String,
    state: String,
    user: Option<ApiAccount>,
    html_url: String,
    #[serde(default)]
    draft: bool,
    merged_at: Option<String>,
    created_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLabel {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiIssue {
    id: u64,
    number: u64,
    title: String,
    state: String,
    user: Option<ApiAccount>,
    html_url: String,
    #[serde(default)]
    comments: u64,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    created_at: String,
}

/// GitHub shows deleted accounts as "ghost".
fn author(user: Option<ApiAccount>) -> String {
    user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string())
}

fn state(raw: &str) -> ResourceState {
    if raw.eq_ignore_ascii_case("closed") {
        ResourceState::Closed
    } else {
        ResourceState::Open
    }
}

impl From<ApiUser> for UserResource {
    fn from(u: ApiUser) -> Self {
        UserResource {
            id: u.id,
            login: u.login,
            name: u.name,
            avatar_url: u.avatar_url,
            html_url: u.html_url,
            bio: u.bio,
            followers: u.followers,
            following: u.following,
            public_repos: u.public_repos,
        }
    }
}

impl From<ApiRepo> for RepoResource {
    fn from(r: ApiRepo) -> Self {
        RepoResource {
            id: r.id,
            full_name: r.full_name,
            owner: r.owner.login,
            description: r.description,
            html_url: r.html_url,
            language: r.language,
            stargazers_count: r.stargazers_count,
            forks_count: r.forks_count,
            open_issues_count: r.open_issues_count,
        }
    }
}

impl From<ApiPull> for PullResource {
    fn from(p: ApiPull) -> Self {
        let state = if p.merged_at.is_some() {
            ResourceState::Merged
        } else {
            state(&p.state)
        };
        PullResource {
            id: p.id,
            number: p.number,
            title: p.title,
            state,
            author: author(p.user),
            html_url: p.html_url,
            draft: p.draft,
            created_at: p.created_at,
        }
    }
}

impl From<ApiIssue> for IssueResource {
    fn from(i: ApiIssue) -> Self {
        IssueResource {
            id: i.id,
            number: i.number,
            title: i.title,
            state: state(&i.state),
            author: author(i.user),
            html_url: i.html_url,
            comments: i.comments,
            labels: i.labels.into_iter().map(|l| l.name).collect(),
            created_at: i.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merged_pull_maps_to_merged_state() {
        let raw: ApiPull = serde_json::from_value(serde_json::json!({
            "id": 10,
            "number": 3,
            "title": "Fix",
            "state": "closed",
            "user": { "login": "alice" },
            "html_url": "https://github.com/o/r/pull/3",
            "merged_at": "2024-02-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let pull = PullResource::from(raw);
        assert_eq!(pull.state, ResourceState::Merged);
        assert_eq!(pull.author, "alice");
        assert!(!pull.draft);
    }

    #[test]
    fn test_issue_without_user_is_ghost() {
        let raw: ApiIssue = serde_json::from_value(serde_json::json!({
            "id": 11,
            "number": 4,
            "title": "Crash",
            "state": "closed",
            "user": null,
            "html_url": "https://github.com/o/r/issues/4",
            "labels": [{ "name": "bug" }, { "name": "p1" }],
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let issue = IssueResource::from(raw);
        assert_eq!(issue.author, "ghost");
        assert_eq!(issue.state, ResourceState::Closed);
        assert_eq!(issue.labels, vec!["bug", "p1"]);
        assert_eq!(issue.comments, 0);
    }
}
