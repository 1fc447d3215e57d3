//! # Comment Corpus
//!
//! A harvester that builds text corpora from public discussion around a
//! topic: comment threads from YouTube videos, and articles from Rappler.
//!
//! ## Features
//!
//! - Selects N channels × M videos matching a keyword query, escalating
//!   through alternate search orderings until enough channels qualify
//! - Collects up to a target number of comments and replies per video via
//!   cursor pagination, with randomized pacing between requests
//! - Tops up an existing corpus so each named channel reaches a per-channel
//!   video count without re-fetching videos it already holds
//! - Crawls Rappler topic, person, and search listings into article rows
//! - Writes two-sheet JSON workbooks (base columns and full columns)
//!
//! ## Usage
//!
//! ```sh
//! comment_corpus youtube --keywords "pogo alice guo rappler"
//! comment_corpus topup --out youtube_comments.json
//! comment_corpus rappler --mode search --query "alice guo"
//! ```
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | No YouTube API key configured |
//! | 2 | No channel or video qualified |
//! | 3 | Run failed (I/O, HTTP client setup, selection search) |

use chrono::Local;
use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod corpus;
mod models;
mod outputs;
mod pacing;
mod pipeline;
mod progress;
mod scrapers;
mod utils;
mod youtube;

use cli::{Cli, Command, RapplerArgs, TopUpArgs, YoutubeArgs};
use corpus::{build_article_workbook, build_comment_workbook, load_corpus};
use outputs::workbook::write_workbook;
use pacing::Jitter;
use pipeline::harvest::harvest_plan;
use pipeline::selector::{select_channels, SelectionTarget};
use pipeline::topup::{top_up, TopUpTarget};
use scrapers::rappler::RapplerScraper;
use utils::ensure_writable_parent;
use youtube::client::YoutubeClient;

const EXIT_MISSING_KEY: u8 = 1;
const EXIT_NOTHING_SELECTED: u8 = 2;
const EXIT_RUN_FAILED: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(started_at = %Local::now().to_rfc3339(), "comment_corpus starting up");

    // .env is optional; a missing file is not an error
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "No .env loaded");
    }
    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let code = exit_code(run(args).await);

    info!(elapsed = ?start_time.elapsed(), "Run finished");
    code
}

/// Errors that escape a run get their own code so they are never mistaken
/// for a missing key or an empty selection.
fn exit_code(outcome: Result<ExitCode, Box<dyn Error>>) -> ExitCode {
    outcome.unwrap_or_else(|e| {
        error!(error = %e, "Run failed");
        ExitCode::from(EXIT_RUN_FAILED)
    })
}

/// Dispatch the chosen subcommand and map its outcome to an exit code.
async fn run(args: Cli) -> Result<ExitCode, Box<dyn Error>> {
    Ok(match args.command {
        Command::Youtube(cmd) => match youtube_client(args.api_key)? {
            Some(client) => run_youtube(&client, cmd).await?,
            None => ExitCode::from(EXIT_MISSING_KEY),
        },
        Command::Topup(cmd) => match youtube_client(args.api_key)? {
            Some(client) => run_topup(&client, cmd).await?,
            None => ExitCode::from(EXIT_MISSING_KEY),
        },
        Command::Rappler(cmd) => run_rappler(cmd).await?,
    })
}

/// Build the API client, or `None` when no non-empty key is configured.
fn youtube_client(api_key: Option<String>) -> Result<Option<YoutubeClient>, Box<dyn Error>> {
    match api_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => Ok(Some(YoutubeClient::new(key)?)),
        None => {
            error!("Missing YouTube API key; set YT_API_KEY (env or .env) or pass --api-key");
            Ok(None)
        }
    }
}

#[instrument(level = "info", skip_all, fields(keywords = %args.keywords))]
async fn run_youtube(client: &YoutubeClient, args: YoutubeArgs) -> Result<ExitCode, Box<dyn Error>> {
    // Fail on an unusable output path before spending any quota.
    ensure_writable_parent(&args.out).await?;

    let target = SelectionTarget {
        channels: args.channels,
        videos_per_channel: args.videos_per_channel,
        min_comments: args.min_comments,
    };
    let plan = select_channels(client, &args.keywords, &target).await?;
    if plan.iter().all(|s| s.videos.is_empty()) {
        error!(
            min_comments = args.min_comments,
            "No channels/videos found. Try different keywords or lower --min-comments"
        );
        return Ok(ExitCode::from(EXIT_NOTHING_SELECTED));
    }
    for selection in &plan {
        info!(
            channel_id = %selection.channel_id,
            videos = %selection.video_ids().join(","),
            "Selected channel"
        );
    }

    let rows = harvest_plan(
        client,
        &plan,
        args.target_per_video,
        &Jitter::millis(400, 800),
        &Jitter::millis(200, 500),
    )
    .await;

    write_workbook(&build_comment_workbook(&rows)?, &args.out).await?;
    info!(rows = rows.len(), path = %args.out.display(), "Saved comment corpus");
    Ok(ExitCode::SUCCESS)
}

#[instrument(level = "info", skip_all, fields(path = %args.out.display()))]
async fn run_topup(client: &YoutubeClient, args: TopUpArgs) -> Result<ExitCode, Box<dyn Error>> {
    ensure_writable_parent(&args.out).await?;

    let mut rows = load_corpus(&args.out).await?;
    let target = TopUpTarget {
        channel_names: args.channel_names,
        keywords: args.keywords,
        min_comments: args.min_comments,
        videos_per_channel: args.videos_per_channel,
        target_per_video: args.target_per_video,
    };
    let added = top_up(client, &rows, &target, &Jitter::millis(300, 600)).await;
    if added.is_empty() {
        warn!("Nothing new to add; rewriting corpus unchanged");
    }
    rows.extend(added);

    write_workbook(&build_comment_workbook(&rows)?, &args.out).await?;
    let videos = rows.iter().map(|r| r.video_id.as_str()).unique().count();
    info!(rows = rows.len(), videos, "Saved topped-up corpus");
    Ok(ExitCode::SUCCESS)
}

#[instrument(level = "info", skip_all, fields(mode = ?args.mode, pages = args.pages))]
async fn run_rappler(args: RapplerArgs) -> Result<ExitCode, Box<dyn Error>> {
    let Some(slug_or_query) = args.target() else {
        return Err("--slug is required for topic/person; --query is required for search".into());
    };
    ensure_writable_parent(&args.out).await?;

    let scraper = RapplerScraper::new()?;
    let articles = scraper.scrape(args.mode, slug_or_query, args.pages).await;

    write_workbook(&build_article_workbook(&articles)?, &args.out).await?;
    info!(articles = articles.len(), path = %args.out.display(), "Saved article corpus");
    Ok(ExitCode::SUCCESS)
}
