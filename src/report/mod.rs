pub mod types;

pub use types::{Format, Report, Summary};

use crate::resolver::{InvalidReason, QueryStatus, Resolution};
use crate::resource::GithubResource;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Build a Report from finished resolutions, keeping input order.
pub fn build(resolutions: Vec<Resolution>) -> Report {
    let mut summary = Summary::default();
    for resolution in &resolutions {
        summary.record(resolution);
    }
    Report { resolutions, summary }
}

/// Output the report to the terminal (default) or to a file. A file always
/// receives JSON.
#[instrument(skip(report), fields(resolved = report.summary.resolved, failed = report.summary.failed))]
pub fn output(report: &Report, format: Format, output_path: Option<&Path>) -> Result<(), ReportError> {
    match (format, output_path) {
        (_, Some(path)) => {
            debug!(path = %path.display(), "writing report to file");
            std::fs::write(path, render_json(report)?)?;
            Ok(())
        }
        (Format::Json, None) => {
            debug!("writing json report to stdout");
            println!("{}", render_json(report)?);
            Ok(())
        }
        (Format::Terminal, None) => {
            debug!("writing report to terminal");
            print!("{}", render_terminal(report));
            Ok(())
        }
    }
}

fn render_json(report: &Report) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Human-readable rendering. Invalid input and fetch failures get distinct
/// messages.
fn render_terminal(report: &Report) -> String {
    let mut out = String::new();
    for resolution in &report.resolutions {
        let heading = if resolution.input.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            resolution.input.bold().to_string()
        };
        out.push_str(&format!("\n{}\n", heading));

        if let Some(reason) = resolution.invalid_reason {
            let message = match reason {
                InvalidReason::EmptyUrl => "No URL given",
                InvalidReason::InvalidGithubUrl => "Not a valid GitHub URL",
            };
            out.push_str(&format!("  {} [{}]\n", message.yellow(), reason));
            continue;
        }
        if resolution.is_loading() {
            out.push_str(&format!("  {}\n", "Still loading".dimmed()));
            continue;
        }

        match (&resolution.status, &resolution.data, &resolution.error) {
            (QueryStatus::Success, Some(data), _) => out.push_str(&describe(data)),
            (QueryStatus::Error, _, Some(error)) => {
                out.push_str(&format!("  {} {}\n", "Couldn't load this resource:".red().bold(), error));
            }
            (status, _, _) => out.push_str(&format!("  {:?}\n", status)),
        }
    }

    let summary = &report.summary;
    out.push_str(&format!(
        "\n{} resolved | {} failed | {} invalid\n",
        summary.resolved.to_string().green().bold(),
        summary.failed.to_string().red().bold(),
        summary.invalid.to_string().yellow().bold()
    ));
    out
}

fn describe(resource: &GithubResource) -> String {
    let detail = match resource {
        GithubResource::User(user) => {
            let name = user.name.as_deref().map(|n| format!(" ({})", n)).unwrap_or_default();
            format!(
                "user {}{} | followers {} | following {} | repos {}",
                user.login, name, user.followers, user.following, user.public_repos
            )
        }
        GithubResource::Repo(repo) => {
            let language = repo.language.as_deref().unwrap_or("n/a");
            format!(
                "repo {} | ★ {} | forks {} | open issues {} | {}",
                repo.full_name, repo.stargazers_count, repo.forks_count, repo.open_issues_count, language
            )
        }
        GithubResource::Pull(pull) => format!(
            "pull #{} \"{}\" by {} [{}{}]",
            pull.number,
            pull.title,
            pull.author,
            pull.state,
            if pull.draft { ", draft" } else { "" }
        ),
        GithubResource::Issue(issue) => {
            let labels = if issue.labels.is_empty() {
                String::new()
            } else {
                format!(" {{{}}}", issue.labels.join(", "))
            };
            format!(
                "issue #{} \"{}\" by {} [{}] | {} comments{}",
                issue.number, issue.title, issue.author, issue.state, issue.comments, labels
            )
        }
    };
    format!("  {}\n  {}\n", detail.green(), resource.html_url().dimmed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ResourceKind;
    use crate::resource::types::{PullResource, ResourceState};
    use crate::resource::FetchError;

    fn success() -> Resolution {
        Resolution {
            input: "https://github.com/o/r/pull/42".to_string(),
            kind: ResourceKind::Pull,
            status: QueryStatus::Success,
            data: Some(GithubResource::Pull(PullResource {
                id: 1,
                number: 42,
                title: "Add OAuth2 login flow".to_string(),
                state: ResourceState::Open,
                author: "alice".to_string(),
                html_url: "https://github.com/o/r/pull/42".to_string(),
                draft: true,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            })),
            ..Resolution::idle()
        }
    }

    fn failure() -> Resolution {
        Resolution {
            input: "https://github.com/o/gone".to_string(),
            kind: ResourceKind::Repo,
            status: QueryStatus::Error,
            error: Some(FetchError::with_code("Not Found", "NOT_FOUND")),
            ..Resolution::idle()
        }
    }

    fn invalid() -> Resolution {
        Resolution {
            input: "nope".to_string(),
            invalid_reason: Some(InvalidReason::InvalidGithubUrl),
            ..Resolution::idle()
        }
    }

    #[test]
    fn test_build_summary() {
        let report = build(vec![success(), failure(), invalid()]);
        assert_eq!(
            report.summary,
            Summary {
                resolved: 1,
                failed: 1,
                invalid: 1
            }
        );
        assert!(report.has_failures());
        assert_eq!(report.resolutions[0].input, "https://github.com/o/r/pull/42");
    }

    #[test]
    fn test_all_resolved_has_no_failures() {
        assert!(!build(vec![success()]).has_failures());
    }

    #[test]
    fn test_terminal_distinguishes_invalid_from_failure() {
        colored::control::set_override(false);
        let text = render_terminal(&build(vec![success(), failure(), invalid()]));
        assert!(text.contains("pull #42 \"Add OAuth2 login flow\" by alice [open, draft]"));
        assert!(text.contains("Couldn't load this resource: Not Found (NOT_FOUND)"));
        assert!(text.contains("Not a valid GitHub URL [INVALID_GITHUB_URL]"));
        assert!(text.contains("1 resolved | 1 failed | 1 invalid"));
    }

    #[test]
    fn test_terminal_marks_unsettled_resolution() {
        colored::control::set_override(false);
        let loading = Resolution {
            input: "https://github.com/octocat".to_string(),
            status: QueryStatus::Loading,
            ..Resolution::idle()
        };
        let text = render_terminal(&build(vec![loading]));
        assert!(text.contains("Still loading"));
        assert!(text.contains("0 resolved | 0 failed | 0 invalid"));
    }

    #[test]
    fn test_json_shapes() {
        let json = render_json(&build(vec![success(), failure()])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["resolutions"][0]["data"]["kind"], "pull");
        assert_eq!(value["resolutions"][0]["status"], "success");
        assert_eq!(
            value["resolutions"][1]["error"],
            serde_json::json!({ "message": "Not Found", "code": "NOT_FOUND" })
        );
        assert_eq!(value["summary"]["failed"], 1);
    }

    #[test]
    fn test_output_to_file() {
        let report = build(vec![invalid()]);
        let path = std::env::temp_dir().join("gh-resolve-report-test.json");
        output(&report, Format::Terminal, Some(&path)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("INVALID_GITHUB_URL"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_output_to_terminal() {
        let report = build(vec![success()]);
        // Should not panic
        output(&report, Format::Terminal, None).unwrap();
    }
}
