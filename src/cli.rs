//! Command-line interface definitions for comment_corpus.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The API key can be provided via flag, environment variable, or a `.env`
//! file in the working directory.

use crate::pipeline::topup::{DEFAULT_CHANNEL_NAMES, DEFAULT_KEYWORDS};
use crate::scrapers::rappler::ListingMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the comment_corpus application.
///
/// # Examples
///
/// ```sh
/// # Five channels × five videos about a topic
/// comment_corpus youtube --keywords "pogo alice guo rappler"
///
/// # Bring an existing corpus up to five videos per news channel
/// comment_corpus topup --out youtube_comments.json
///
/// # Crawl five pages of a Rappler topic
/// comment_corpus rappler --mode topic --slug pogo
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YouTube Data API key
    #[arg(long, env = "YT_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select channels and videos by keyword and harvest their comments
    Youtube(YoutubeArgs),
    /// Extend an existing comment corpus without duplicating videos
    Topup(TopUpArgs),
    /// Crawl Rappler listing pages and extract articles
    Rappler(RapplerArgs),
}

#[derive(Args, Debug)]
pub struct YoutubeArgs {
    /// Topic/person/search keywords (e.g. 'pogo alice guo rappler')
    #[arg(long)]
    pub keywords: String,

    /// Number of channels to include
    #[arg(long, default_value_t = 5)]
    pub channels: usize,

    /// Videos per channel
    #[arg(long, default_value_t = 5)]
    pub videos_per_channel: usize,

    /// Minimum total comments a video must have to qualify
    #[arg(long, default_value_t = 25)]
    pub min_comments: u64,

    /// Target number of comment rows to fetch per video
    #[arg(long, default_value_t = 150)]
    pub target_per_video: usize,

    /// Workbook output path
    #[arg(long, default_value = "youtube_comments.json")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct TopUpArgs {
    /// Channel display name to top up (repeatable)
    #[arg(long = "channel-name", default_values_t = DEFAULT_CHANNEL_NAMES.map(String::from))]
    pub channel_names: Vec<String>,

    /// Keywords used to search each channel's catalog
    #[arg(long, default_value = DEFAULT_KEYWORDS)]
    pub keywords: String,

    /// Minimum total comments a video must have to qualify
    #[arg(long, default_value_t = 25)]
    pub min_comments: u64,

    /// Target number of comment rows to fetch per video
    #[arg(long, default_value_t = 120)]
    pub target_per_video: usize,

    /// Distinct videos each channel should cover
    #[arg(long, default_value_t = 5)]
    pub videos_per_channel: usize,

    /// Workbook to read and extend
    #[arg(long, default_value = "youtube_comments.json")]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct RapplerArgs {
    /// Type of Rappler listing to crawl
    #[arg(long, value_enum)]
    pub mode: ListingMode,

    /// Slug for topic/person (e.g. 'pogo' or 'risa-hontiveros')
    #[arg(long, required_if_eq_any = [("mode", "topic"), ("mode", "person")])]
    pub slug: Option<String>,

    /// Search query if mode=search
    #[arg(long, required_if_eq("mode", "search"))]
    pub query: Option<String>,

    /// Number of listing pages to crawl
    #[arg(long, default_value_t = 5)]
    pub pages: u32,

    /// Workbook output path
    #[arg(long, default_value = "rappler_articles.json")]
    pub out: PathBuf,
}

impl RapplerArgs {
    /// The slug or query that goes into the listing URL for the chosen mode.
    pub fn target(&self) -> Option<&str> {
        match self.mode {
            ListingMode::Topic | ListingMode::Person => self.slug.as_deref(),
            ListingMode::Search => self.query.as_deref(),
        }
    }
}
