mod classify;
mod config;
mod query;
mod report;
mod resolver;
mod resource;
mod store;

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use crate::report::Format;
use crate::resolver::{QueryClient, QueryStatus, ResourceQuery};
use crate::resource::HttpFetcher;

/// gh-resolve — classify GitHub URLs and resolve them to user, repo, pull
/// request or issue metadata.
#[derive(Parser, Debug)]
#[command(name = "gh-resolve", version, about)]
struct Cli {
    /// GitHub URLs (e.g., https://github.com/vercel/next.js/pull/123)
    #[arg(required = true)]
    urls: Vec<String>,

    /// Resolve through the proxy instead of calling the GitHub API directly
    #[arg(long)]
    server: bool,

    /// Seconds a fetched resource is reused before it is fetched again
    #[arg(long, value_name = "SECS")]
    stale_time: Option<u64>,

    /// Fetch once more any URL whose first fetch failed
    #[arg(long)]
    retry_failed: bool,

    /// Print JSON instead of the terminal report
    #[arg(long)]
    json: bool,

    /// Optional output file path for a JSON report
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    let mut options = config.resolve_options();
    options.use_server |= cli.server;
    if let Some(secs) = cli.stale_time {
        options.stale_time = Duration::from_secs(secs);
    }
    debug!(use_server = options.use_server, stale_time = ?options.stale_time, "resolve options");

    let fetcher = Arc::new(HttpFetcher::new(config.github_token()));
    let client = Arc::new(QueryClient::new(
        fetcher,
        config.api_base_url(),
        config.proxy_base_url(),
    ));

    // One call site per input, all sharing the client's cache, so inputs
    // naming the same resource share one request.
    info!(count = cli.urls.len(), "resolving urls");
    let retry_failed = cli.retry_failed;
    let resolutions = futures::future::join_all(cli.urls.iter().enumerate().map(|(index, url)| {
        let query = ResourceQuery::new(Arc::clone(&client), options);
        let mut updates = query.subscribe();
        let watcher = tokio::spawn(
            async move {
                while updates.changed().await.is_ok() {
                    let state = updates.borrow_and_update().clone();
                    debug!(status = ?state.status, endpoint = ?state.endpoint, "state changed");
                }
            }
            .instrument(info_span!("watch", index)),
        );
        async move {
            let first = query.resolve(url).await;
            if retry_failed && first.status == QueryStatus::Error {
                info!(error = ?first.error, "retrying failed fetch");
                query.refetch().await;
            }
            let resolution = query.snapshot();
            // Dropping the query closes the channel and ends the watcher.
            drop(query);
            let _ = watcher.await;
            resolution
        }
        .instrument(info_span!("resolve", index))
    }))
    .await;

    let built_report = report::build(resolutions);
    let format = if cli.json { Format::Json } else { Format::Terminal };
    report::output(&built_report, format, cli.output.as_deref())?;
    info!(
        resolved = built_report.summary.resolved,
        failed = built_report.summary.failed,
        invalid = built_report.summary.invalid,
        "done"
    );

    if built_report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}
