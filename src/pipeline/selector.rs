//! Channel selection: N channels × M qualifying videos.
//!
//! Candidates come from keyword searches under a fixed sequence of ordering
//! strategies. Each tier probes engagement for its hits, drops videos below
//! the engagement floor and folds the rest into a [`ChannelBuckets`]
//! accumulator that is passed from tier to tier.
//!
//! # Termination
//!
//! 1. After every tier, if at least N channels hold exactly M videos, the
//!    first N of them (in discovery order) are returned.
//! 2. If every tier is exhausted, the N largest buckets are returned, which
//!    may hold fewer than M videos or number fewer than N.
//!
//! Selection itself never fails; only transport errors propagate.

use crate::models::{ChannelSelection, SearchOrder, SelectionPlan, VideoCandidate};
use crate::youtube::{probe_engagement, Result, SearchQuery, YoutubeApi};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// Ordering used for the first search.
pub const PRIMARY_ORDER: SearchOrder = SearchOrder::Relevance;

/// Orderings tried, in sequence, when the primary tier under-supplies.
pub const ESCALATION_ORDERS: [SearchOrder; 3] =
    [SearchOrder::ViewCount, SearchOrder::Date, SearchOrder::Rating];

/// Results requested per search tier.
pub const RESULTS_PER_TIER: u32 = 50;

/// Shape and floor of the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTarget {
    /// N: channels wanted.
    pub channels: usize,
    /// M: videos wanted per channel; also the bucket cap.
    pub videos_per_channel: usize,
    /// Minimum comment count for a video to qualify.
    pub min_comments: u64,
}

/// Per-channel accumulator of qualifying videos.
///
/// Buckets are kept in the order their channel was first seen. Within a
/// bucket videos are sorted by descending comment count with a stable sort,
/// so earlier arrivals win ties, and the bucket never exceeds the cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelBuckets {
    order: Vec<String>,
    buckets: HashMap<String, Vec<VideoCandidate>>,
}

impl ChannelBuckets {
    /// Fold `candidates` into the buckets and return the updated accumulator.
    ///
    /// Videos below the floor or without an owning channel are ignored. A
    /// video already in its bucket is replaced by the newer probe result.
    pub fn absorb<I>(mut self, candidates: I, target: &SelectionTarget) -> Self
    where
        I: IntoIterator<Item = VideoCandidate>,
    {
        if target.videos_per_channel == 0 {
            return self;
        }
        for candidate in candidates {
            if candidate.comment_count < target.min_comments {
                continue;
            }
            let Some(channel_id) = candidate.channel_id.clone().filter(|c| !c.is_empty()) else {
                continue;
            };

            if !self.buckets.contains_key(&channel_id) {
                self.order.push(channel_id.clone());
            }
            let bucket = self.buckets.entry(channel_id).or_default();

            match bucket.iter_mut().find(|v| v.video_id == candidate.video_id) {
                Some(existing) => *existing = candidate,
                None => bucket.push(candidate),
            }
            bucket.sort_by(|a, b| b.comment_count.cmp(&a.comment_count));
            bucket.truncate(target.videos_per_channel);
        }
        self
    }

    /// Videos currently held for `channel_id`, best first.
    #[cfg(test)]
    pub fn get(&self, channel_id: &str) -> Option<&[VideoCandidate]> {
        self.buckets.get(channel_id).map(Vec::as_slice)
    }

    /// Number of channels with at least one qualifying video.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Channels whose bucket is full, in discovery order.
    pub fn qualified(&self, target: &SelectionTarget) -> SelectionPlan {
        self.order
            .iter()
            .filter(|ch| {
                self.buckets
                    .get(*ch)
                    .is_some_and(|b| b.len() == target.videos_per_channel)
            })
            .map(|ch| self.selection(ch))
            .collect()
    }

    /// The `n` largest buckets; discovery order breaks ties.
    pub fn largest(&self, n: usize) -> SelectionPlan {
        self.order
            .iter()
            .filter(|ch| self.buckets.get(*ch).is_some_and(|b| !b.is_empty()))
            .sorted_by(|a, b| self.buckets[*b].len().cmp(&self.buckets[*a].len()))
            .take(n)
            .map(|ch| self.selection(ch))
            .collect()
    }

    fn selection(&self, channel_id: &str) -> ChannelSelection {
        ChannelSelection {
            channel_id: channel_id.to_string(),
            videos: self.buckets.get(channel_id).cloned().unwrap_or_default(),
        }
    }
}

/// Run one search tier and fold its probed hits into `buckets`.
#[instrument(level = "info", skip(api, order, buckets, target), fields(order = order.as_str()))]
pub async fn run_tier<A: YoutubeApi>(
    api: &A,
    keywords: &str,
    order: SearchOrder,
    buckets: ChannelBuckets,
    target: &SelectionTarget,
) -> Result<ChannelBuckets> {
    let query = SearchQuery::new(keywords, order, RESULTS_PER_TIER);
    let hits = api.search_videos(&query).await?;
    let ids: Vec<String> = hits.into_iter().map(|h| h.video_id).unique().collect();
    let stats = probe_engagement(api, &ids).await?;

    // Search order, not map order, decides who is first-seen.
    let candidates: Vec<VideoCandidate> =
        ids.iter().filter_map(|id| stats.get(id).cloned()).collect();
    let qualifying = candidates
        .iter()
        .filter(|c| c.comment_count >= target.min_comments)
        .count();
    debug!(hits = ids.len(), probed = candidates.len(), qualifying, "Tier candidates");

    Ok(buckets.absorb(candidates, target))
}

/// Pick up to N channels with up to M qualifying videos each.
#[instrument(level = "info", skip(api, target), fields(n = target.channels, m = target.videos_per_channel, min = target.min_comments))]
pub async fn select_channels<A: YoutubeApi>(
    api: &A,
    keywords: &str,
    target: &SelectionTarget,
) -> Result<SelectionPlan> {
    let tiers = std::iter::once(PRIMARY_ORDER).chain(ESCALATION_ORDERS);
    let mut buckets = ChannelBuckets::default();

    for (tier, order) in tiers.enumerate() {
        buckets = run_tier(api, keywords, order, buckets, target).await?;
        let qualified = buckets.qualified(target);
        info!(
            tier,
            order = order.as_str(),
            channels_seen = buckets.len(),
            channels_qualified = qualified.len(),
            "Search tier complete"
        );
        if qualified.len() >= target.channels {
            return Ok(qualified.into_iter().take(target.channels).collect());
        }
    }

    let plan = buckets.largest(target.channels);
    warn!(
        channels = plan.len(),
        wanted = target.channels,
        short_buckets = plan
            .iter()
            .filter(|s| s.videos.len() < target.videos_per_channel)
            .count(),
        "Not enough fully qualified channels; using largest buckets"
    );
    Ok(plan)
}
