//! Incremental top-up of a persisted corpus.
//!
//! For each target channel name the merger works out how many distinct videos
//! the corpus already covers for that channel and fetches only the shortfall.
//! Candidates are drawn from the channel's own catalog, ranked by comment
//! count, and never include a video that is already covered for *any*
//! channel. The merge is append-only: existing rows are never touched, and
//! only rows produced in the current pass are backfilled.

use super::backfill::backfill;
use super::collector::collect_comments;
use crate::models::{CommentRow, SearchOrder, VideoCandidate};
use crate::pacing::Pacer;
use crate::youtube::{probe_engagement, Result, SearchQuery, YoutubeApi};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

/// Results requested from each per-channel catalog search.
pub const CHANNEL_SEARCH_RESULTS: u32 = 40;

/// Channel names targeted when none are given on the command line.
pub const DEFAULT_CHANNEL_NAMES: [&str; 5] =
    ["Rappler", "GMA News", "ABS-CBN News", "News5", "INQUIRER.net"];

/// Keywords used to search each channel's catalog by default.
pub const DEFAULT_KEYWORDS: &str = "POGO Philippines Senate hearing Rappler";

/// What a top-up run tries to achieve.
#[derive(Debug, Clone, PartialEq)]
pub struct TopUpTarget {
    pub channel_names: Vec<String>,
    pub keywords: String,
    pub min_comments: u64,
    /// K: distinct videos each channel should cover.
    pub videos_per_channel: usize,
    pub target_per_video: usize,
}

/// Videos already present in the corpus, globally and per owning channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coverage {
    videos: HashSet<String>,
    per_channel: HashMap<String, HashSet<String>>,
}

impl Coverage {
    pub fn from_rows(rows: &[CommentRow]) -> Self {
        let mut coverage = Coverage::default();
        for row in rows.iter().filter(|r| !r.video_id.is_empty()) {
            coverage.videos.insert(row.video_id.clone());
            if let Some(channel) = row.coverage_channel() {
                coverage
                    .per_channel
                    .entry(channel.to_string())
                    .or_default()
                    .insert(row.video_id.clone());
            }
        }
        coverage
    }

    /// Distinct videos covered for `channel_id`.
    pub fn covered(&self, channel_id: &str) -> usize {
        self.per_channel.get(channel_id).map_or(0, HashSet::len)
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.videos.contains(video_id)
    }

    pub fn video_count(&self) -> usize {
        self.videos.len()
    }

    pub fn mark(&mut self, channel_id: &str, video_id: &str) {
        self.videos.insert(video_id.to_string());
        self.per_channel
            .entry(channel_id.to_string())
            .or_default()
            .insert(video_id.to_string());
    }
}

/// Rank uncovered, qualifying candidates and keep the best `need`.
///
/// `ids` is the catalog search order; it breaks ties in comment count.
pub fn pick_shortfall(
    ids: &[String],
    meta: &HashMap<String, VideoCandidate>,
    coverage: &Coverage,
    min_comments: u64,
    need: usize,
) -> Vec<VideoCandidate> {
    ids.iter()
        .unique()
        .filter(|id| !coverage.contains(id))
        .filter_map(|id| meta.get(id.as_str()))
        .filter(|v| v.comment_count >= min_comments)
        .sorted_by(|a, b| b.comment_count.cmp(&a.comment_count))
        .take(need)
        .cloned()
        .collect()
}

/// Run one top-up pass over `existing` and return only the new rows.
///
/// The caller persists `existing` followed by the returned rows. A channel
/// whose lookup or catalog search fails is skipped, as is any video whose
/// comments cannot be fetched; neither stops the pass.
#[instrument(level = "info", skip_all, fields(channels = target.channel_names.len(), existing_rows = existing.len()))]
pub async fn top_up<A, P>(
    api: &A,
    existing: &[CommentRow],
    target: &TopUpTarget,
    page_pacer: &P,
) -> Vec<CommentRow>
where
    A: YoutubeApi,
    P: Pacer,
{
    let mut coverage = Coverage::from_rows(existing);
    info!(covered_videos = coverage.video_count(), "Loaded existing coverage");

    let mut added = Vec::new();
    for name in &target.channel_names {
        match top_up_channel(api, name, target, &mut coverage, page_pacer).await {
            Ok(rows) => added.extend(rows),
            Err(e) => warn!(%name, error = %e, "Channel top-up failed; skipping channel"),
        }
    }

    info!(
        added_rows = added.len(),
        covered_videos = coverage.video_count(),
        "Top-up complete"
    );
    added
}

/// Fill one channel's shortfall, marking each collected video in `coverage`.
async fn top_up_channel<A, P>(
    api: &A,
    name: &str,
    target: &TopUpTarget,
    coverage: &mut Coverage,
    page_pacer: &P,
) -> Result<Vec<CommentRow>>
where
    A: YoutubeApi,
    P: Pacer,
{
    let Some(channel) = api.find_channel(name).await? else {
        warn!(%name, "No channel matched; skipping");
        return Ok(Vec::new());
    };
    let have = coverage.covered(&channel.channel_id);
    let need = target.videos_per_channel.saturating_sub(have);
    if need == 0 {
        debug!(%name, channel_id = %channel.channel_id, have, "Channel already covered");
        return Ok(Vec::new());
    }

    let query = SearchQuery::new(&target.keywords, SearchOrder::ViewCount, CHANNEL_SEARCH_RESULTS)
        .within_channel(&channel.channel_id);
    let ids: Vec<String> = api
        .search_videos(&query)
        .await?
        .into_iter()
        .map(|h| h.video_id)
        .collect();
    let meta = probe_engagement(api, &ids).await?;
    let picks = pick_shortfall(&ids, &meta, coverage, target.min_comments, need);
    info!(
        %name,
        channel_id = %channel.channel_id,
        have,
        need,
        candidates = ids.len(),
        picked = picks.len(),
        "Topping up channel"
    );

    let mut added = Vec::new();
    for video in picks {
        let rows =
            match collect_comments(api, &video.video_id, target.target_per_video, page_pacer).await {
                Ok(rows) => backfill(rows, &meta),
                Err(e) => {
                    warn!(video = %video.video_id, error = %e, "Comment fetch failed; skipping video");
                    continue;
                }
            };
        debug!(video = %video.video_id, rows = rows.len(), "Appended video");
        added.extend(rows);
        // Credit the uploader, which is what coverage is keyed on when read back.
        let owner = video.channel_id.as_deref().unwrap_or(&channel.channel_id);
        coverage.mark(owner, &video.video_id);
        if owner != channel.channel_id {
            coverage.mark(&channel.channel_id, &video.video_id);
        }
    }
    Ok(added)
}
