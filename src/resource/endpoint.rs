use serde::Serialize;

use crate::classify::{ParsedUrl, ResourceKind};

/// Cache key for a resolution: the full endpoint URL.
///
/// Two raw inputs with the same coordinates and route produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EndpointKey(String);

impl EndpointKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a request goes: the GitHub REST API itself, or a same-origin proxy
/// that already returns the normalized shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Direct,
    Proxy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub key: EndpointKey,
    pub kind: ResourceKind,
    pub route: Route,
}

impl Endpoint {
    /// GitHub REST path for a classified URL, e.g. `{base}/repos/o/r/pulls/1`.
    pub fn direct(parsed: &ParsedUrl, api_base: &str) -> Option<Endpoint> {
        let path = match parsed {
            ParsedUrl::User { username } => format!("users/{}", username),
            ParsedUrl::Repo { owner, repo } => format!("repos/{}/{}", owner, repo),
            ParsedUrl::Pull { owner, repo, number } => {
                format!("repos/{}/{}/pulls/{}", owner, repo, number)
            }
            ParsedUrl::Issue { owner, repo, number } => {
                format!("repos/{}/{}/issues/{}", owner, repo, number)
            }
            ParsedUrl::Unknown => return None,
        };
        Some(Self::build(parsed.kind(), Route::Direct, api_base, &path))
    }

    /// Proxy path for a classified URL, e.g. `{base}/api/github/pull/o/r/1`.
    pub fn proxy(parsed: &ParsedUrl, proxy_base: &str) -> Option<Endpoint> {
        let coords = match parsed {
            ParsedUrl::User { username } => username.clone(),
            ParsedUrl::Repo { owner, repo } => format!("{}/{}", owner, repo),
            ParsedUrl::Pull { owner, repo, number } | ParsedUrl::Issue { owner, repo, number } => {
                format!("{}/{}/{}", owner, repo, number)
            }
            ParsedUrl::Unknown => return None,
        };
        let path = format!("api/github/{}/{}", parsed.kind(), coords);
        Some(Self::build(parsed.kind(), Route::Proxy, proxy_base, &path))
    }

    fn build(kind: ResourceKind, route: Route, base: &str, path: &str) -> Endpoint {
        Endpoint {
            key: EndpointKey(format!("{}/{}", base.trim_end_matches('/'), path)),
            kind,
            route,
        }
    }

    pub fn url(&self) -> &str {
        self.key.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::parse;

    const API: &str = "https://api.github.com";

    #[test]
    fn test_direct_paths() {
        let cases = [
            ("https://github.com/octocat", "https://api.github.com/users/octocat"),
            ("https://github.com/o/r", "https://api.github.com/repos/o/r"),
            ("https://github.com/o/r/pull/5", "https://api.github.com/repos/o/r/pulls/5"),
            ("https://github.com/o/r/issues/9", "https://api.github.com/repos/o/r/issues/9"),
        ];
        for (input, expected) in cases {
            let endpoint = Endpoint::direct(&parse(input), API).unwrap();
            assert_eq!(endpoint.url(), expected);
            assert_eq!(endpoint.route, Route::Direct);
        }
    }

    #[test]
    fn test_proxy_paths() {
        let endpoint = Endpoint::proxy(&parse("https://github.com/o/r/pulls/5"), "http://localhost:3000/").unwrap();
        assert_eq!(endpoint.url(), "http://localhost:3000/api/github/pull/o/r/5");
        assert_eq!(endpoint.kind, ResourceKind::Pull);
        assert_eq!(endpoint.route, Route::Proxy);
    }

    #[test]
    fn test_unknown_has_no_endpoint() {
        assert!(Endpoint::direct(&ParsedUrl::Unknown, API).is_none());
        assert!(Endpoint::proxy(&ParsedUrl::Unknown, API).is_none());
    }

    #[test]
    fn test_equivalent_inputs_share_key() {
        let a = Endpoint::direct(&parse("https://github.com/vercel/next.js/pull/123"), API).unwrap();
        let b = Endpoint::direct(&parse("  https://github.com/vercel/next.js/pulls/123/files/?x=1"), API).unwrap();
        assert_eq!(a.key, b.key);
    }
}
