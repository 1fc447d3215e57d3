//! Video platform collaborators: search, engagement probe, comment threads.
//!
//! The pipeline only ever talks to the platform through the [`YoutubeApi`]
//! trait. [`client::YoutubeClient`] is the production implementation backed by
//! the YouTube Data API v3; tests substitute an in-memory fake.
//!
//! # Submodules
//!
//! - [`client`]: HTTP implementation of [`YoutubeApi`]
//! - [`error`]: [`YoutubeError`], the transport/quota error type
//! - [`pages`]: Lazy, cursor-driven stream of comment-thread pages

pub mod client;
pub mod error;
pub mod pages;

#[cfg(test)]
pub mod fake;

use crate::models::{ChannelHit, SearchHit, SearchOrder, ThreadPage, VideoCandidate};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub use error::{Result, YoutubeError};

/// Largest number of video identifiers accepted by one probe request.
pub const MAX_PROBE_BATCH: usize = 50;

/// Page size requested from the comment-thread endpoint.
pub const COMMENT_PAGE_SIZE: u32 = 100;

/// Parameters for a video search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub keywords: String,
    /// Restrict results to one channel's catalog.
    pub channel_id: Option<String>,
    pub max_results: u32,
    pub order: SearchOrder,
}

impl SearchQuery {
    pub fn new(keywords: &str, order: SearchOrder, max_results: u32) -> Self {
        Self {
            keywords: keywords.to_string(),
            channel_id: None,
            max_results,
            order,
        }
    }

    pub fn within_channel(mut self, channel_id: &str) -> Self {
        self.channel_id = Some(channel_id.to_string());
        self
    }
}

/// Async access to the video platform.
///
/// Implementors return errors only for transport/quota failures. Unknown
/// identifiers and missing fields are not errors.
pub trait YoutubeApi {
    /// Ranked video hits for a query.
    async fn search_videos(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;

    /// First channel matching a display name, if any.
    async fn find_channel(&self, name: &str) -> Result<Option<ChannelHit>>;

    /// Metadata and comment counts for at most [`MAX_PROBE_BATCH`] videos.
    /// Identifiers the platform does not know are absent from the map.
    async fn video_details(&self, ids: &[String]) -> Result<HashMap<String, VideoCandidate>>;

    /// One page of comment threads for a video, ordered by relevance.
    async fn comment_threads(&self, video_id: &str, page_token: Option<&str>)
    -> Result<ThreadPage>;
}

/// Probe engagement for any number of videos, [`MAX_PROBE_BATCH`] at a time.
///
/// Duplicate identifiers are requested once.
#[instrument(level = "debug", skip_all, fields(ids = ids.len()))]
pub async fn probe_engagement<A: YoutubeApi>(
    api: &A,
    ids: &[String],
) -> Result<HashMap<String, VideoCandidate>> {
    let unique: Vec<String> = ids.iter().unique().cloned().collect();
    let mut out = HashMap::with_capacity(unique.len());
    for chunk in unique.chunks(MAX_PROBE_BATCH) {
        let batch = api.video_details(chunk).await?;
        debug!(requested = chunk.len(), returned = batch.len(), "Probed engagement batch");
        out.extend(batch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::fake::FakeYoutube;
    use super::*;

    #[tokio::test]
    async fn test_probe_engagement_chunks_by_fifty() {
        let mut fake = FakeYoutube::default();
        let ids: Vec<String> = (0..120).map(|i| format!("v{i}")).collect();
        for id in &ids {
            fake.add_video(id, "UC1", 10);
        }

        let stats = probe_engagement(&fake, &ids).await.unwrap();

        assert_eq!(stats.len(), 120);
        assert_eq!(fake.probe_batches(), vec![50, 50, 20]);
    }

    #[tokio::test]
    async fn test_probe_engagement_skips_unknown_and_duplicates() {
        let mut fake = FakeYoutube::default();
        fake.add_video("known", "UC1", 10);
        let ids = vec!["known".to_string(), "ghost".to_string(), "known".to_string()];

        let stats = probe_engagement(&fake, &ids).await.unwrap();

        assert_eq!(stats.len(), 1);
        assert!(stats.contains_key("known"));
        assert_eq!(fake.probe_batches(), vec![2]);
    }

    #[tokio::test]
    async fn test_probe_engagement_empty_input_makes_no_request() {
        let fake = FakeYoutube::default();
        let stats = probe_engagement(&fake, &[]).await.unwrap();
        assert!(stats.is_empty());
        assert!(fake.probe_batches().is_empty());
    }

    #[test]
    fn test_search_query_builder() {
        let q = SearchQuery::new("pogo", SearchOrder::ViewCount, 40).within_channel("UC9");
        assert_eq!(q.channel_id.as_deref(), Some("UC9"));
        assert_eq!(q.max_results, 40);
        assert_eq!(q.order, SearchOrder::ViewCount);
    }
}
