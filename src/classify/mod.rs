pub mod types;

pub use types::{ParsedUrl, ResourceKind};

use tracing::trace;

const GITHUB_HOST: &str = "github.com";

/// Classify a GitHub web URL by the shape of its path.
///
/// Never fails: anything that is not an absolute `github.com` URL with a
/// recognised path comes back as `ParsedUrl::Unknown`. Classification is
/// purely structural, so a well-formed URL for a nonexistent repository still
/// classifies; the fetch step decides whether it exists.
pub fn parse(input: &str) -> ParsedUrl {
    let Ok(parsed) = reqwest::Url::parse(input) else {
        return ParsedUrl::Unknown;
    };

    if parsed.host_str() != Some(GITHUB_HOST) {
        return ParsedUrl::Unknown;
    }

    let Some(segments) = parsed.path_segments() else {
        return ParsedUrl::Unknown;
    };
    let segments: Vec<&str> = segments.filter(|segment| !segment.is_empty()).collect();
    trace!(?segments, "classifying github path");

    match segments.as_slice() {
        [username] => ParsedUrl::User {
            username: username.to_string(),
        },
        [owner, repo] => ParsedUrl::Repo {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
        [owner, repo, section, number, ..] => {
            let Ok(number) = number.parse::<u64>() else {
                return ParsedUrl::Unknown;
            };
            let (owner, repo) = (owner.to_string(), repo.to_string());
            match *section {
                "pull" | "pulls" => ParsedUrl::Pull { owner, repo, number },
                "issue" | "issues" => ParsedUrl::Issue { owner, repo, number },
                _ => ParsedUrl::Unknown,
            }
        }
        _ => ParsedUrl::Unknown,
    }
}
