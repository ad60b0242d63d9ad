use serde::Serialize;

/// Kind of GitHub resource a URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    User,
    Repo,
    Pull,
    Issue,
    Unknown,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Repo => "repo",
            ResourceKind::Pull => "pull",
            ResourceKind::Issue => "issue",
            ResourceKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured identifiers extracted from a GitHub web URL.
///
/// Owner, repo and username values are taken verbatim from the URL path
/// segments and never contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParsedUrl {
    User {
        username: String,
    },
    Repo {
        owner: String,
        repo: String,
    },
    Pull {
        owner: String,
        repo: String,
        number: u64,
    },
    Issue {
        owner: String,
        repo: String,
        number: u64,
    },
    Unknown,
}

impl ParsedUrl {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ParsedUrl::User { .. } => ResourceKind::User,
            ParsedUrl::Repo { .. } => ResourceKind::Repo,
            ParsedUrl::Pull { .. } => ResourceKind::Pull,
            ParsedUrl::Issue { .. } => ResourceKind::Issue,
            ParsedUrl::Unknown => ResourceKind::Unknown,
        }
    }

    /// Canonical `https://github.com/...` page for this resource.
    /// `None` for `Unknown`.
    pub fn html_url(&self) -> Option<String> {
        let path = match self {
            ParsedUrl::User { username } => username.clone(),
            ParsedUrl::Repo { owner, repo } => format!("{}/{}", owner, repo),
            ParsedUrl::Pull { owner, repo, number } => format!("{}/{}/pull/{}", owner, repo, number),
            ParsedUrl::Issue { owner, repo, number } => {
                format!("{}/{}/issues/{}", owner, repo, number)
            }
            ParsedUrl::Unknown => return None,
        };
        Some(format!("https://github.com/{}", path))
    }
}
