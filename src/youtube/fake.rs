//! In-memory [`YoutubeApi`] used by the pipeline tests.
//!
//! Searches are keyed by `(order, channel scope)` and return the configured
//! identifiers in order. Comment pages are addressed by their index, which is
//! also used as the continuation token. Every call is recorded so tests can
//! assert on request counts.

use super::{Result, SearchQuery, YoutubeApi, YoutubeError, MAX_PROBE_BATCH};
use crate::models::{
    ChannelHit, Comment, CommentThread, SearchHit, SearchOrder, ThreadPage, VideoCandidate,
};
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FakeYoutube {
    videos: HashMap<String, VideoCandidate>,
    searches: HashMap<(SearchOrder, Option<String>), Vec<String>>,
    channels: HashMap<String, ChannelHit>,
    pages: HashMap<String, Vec<Vec<CommentThread>>>,
    failing_searches: Vec<SearchOrder>,
    failing_videos: Vec<String>,
    failing_channels: Vec<String>,
    probe_log: RefCell<Vec<usize>>,
    search_log: RefCell<Vec<SearchQuery>>,
    page_log: RefCell<Vec<(String, Option<String>)>>,
}

impl FakeYoutube {
    pub fn add_video(&mut self, id: &str, channel_id: &str, comment_count: u64) {
        self.videos.insert(
            id.to_string(),
            VideoCandidate {
                video_id: id.to_string(),
                title: Some(format!("Title of {id}")),
                published_at: Some("2024-01-01T00:00:00Z".to_string()),
                channel_id: Some(channel_id.to_string()),
                channel_title: Some(format!("Channel {channel_id}")),
                comment_count,
            },
        );
    }

    pub fn set_search(&mut self, order: SearchOrder, ids: &[&str]) {
        self.searches
            .insert((order, None), ids.iter().map(|s| s.to_string()).collect());
    }

    pub fn set_channel_search(&mut self, channel_id: &str, order: SearchOrder, ids: &[&str]) {
        self.searches.insert(
            (order, Some(channel_id.to_string())),
            ids.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn fail_search(&mut self, order: SearchOrder) {
        self.failing_searches.push(order);
    }

    /// Every comment-thread request for `video_id` returns `commentsDisabled`.
    pub fn fail_comments(&mut self, video_id: &str) {
        self.failing_videos.push(video_id.to_string());
    }

    pub fn fail_channel_lookup(&mut self, name: &str) {
        self.failing_channels.push(name.to_string());
    }

    pub fn add_channel(&mut self, name: &str, channel_id: &str) {
        self.channels.insert(
            name.to_string(),
            ChannelHit {
                channel_id: channel_id.to_string(),
                channel_title: Some(name.to_string()),
            },
        );
    }

    pub fn set_pages(&mut self, video_id: &str, pages: Vec<Vec<CommentThread>>) {
        self.pages.insert(video_id.to_string(), pages);
    }

    pub fn probe_batches(&self) -> Vec<usize> {
        self.probe_log.borrow().clone()
    }

    pub fn searches(&self) -> Vec<SearchQuery> {
        self.search_log.borrow().clone()
    }

    pub fn page_requests(&self, video_id: &str) -> usize {
        self.page_log
            .borrow()
            .iter()
            .filter(|(v, _)| v == video_id)
            .count()
    }
}

impl YoutubeApi for FakeYoutube {
    async fn search_videos(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        self.search_log.borrow_mut().push(query.clone());
        if self.failing_searches.contains(&query.order) {
            return Err(YoutubeError::Api {
                status: 403,
                message: "quotaExceeded".to_string(),
            });
        }
        let ids = self
            .searches
            .get(&(query.order, query.channel_id.clone()))
            .cloned()
            .unwrap_or_default();
        Ok(ids
            .into_iter()
            .take(query.max_results as usize)
            .map(|id| {
                let meta = self.videos.get(&id);
                SearchHit {
                    title: meta.and_then(|m| m.title.clone()),
                    channel_id: meta.and_then(|m| m.channel_id.clone()),
                    channel_title: meta.and_then(|m| m.channel_title.clone()),
                    published_at: meta.and_then(|m| m.published_at.clone()),
                    video_id: id,
                }
            })
            .collect())
    }

    async fn find_channel(&self, name: &str) -> Result<Option<ChannelHit>> {
        if self.failing_channels.iter().any(|c| c == name) {
            return Err(YoutubeError::Network(format!("timed out looking up {name}")));
        }
        Ok(self.channels.get(name).cloned())
    }

    async fn video_details(&self, ids: &[String]) -> Result<HashMap<String, VideoCandidate>> {
        assert!(ids.len() <= MAX_PROBE_BATCH, "probe batch too large");
        self.probe_log.borrow_mut().push(ids.len());
        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }

    async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        self.page_log
            .borrow_mut()
            .push((video_id.to_string(), page_token.map(str::to_string)));
        if self.failing_videos.iter().any(|v| v == video_id) {
            return Err(YoutubeError::Api {
                status: 403,
                message: "commentsDisabled".to_string(),
            });
        }
        let Some(pages) = self.pages.get(video_id) else {
            return Ok(ThreadPage::default());
        };
        let index: usize = match page_token {
            None => 0,
            Some(t) => t
                .parse()
                .map_err(|_| YoutubeError::Parse(format!("bad page token {t}")))?,
        };
        let threads = pages.get(index).cloned().unwrap_or_default();
        let next_page_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(ThreadPage {
            threads,
            next_page_token,
        })
    }
}

/// A thread whose top-level comment is `id` with `replies` replies `id.r0..`.
pub fn thread(id: &str, replies: usize) -> CommentThread {
    CommentThread {
        top_level: comment(id),
        replies: (0..replies).map(|i| comment(&format!("{id}.r{i}"))).collect(),
    }
}

pub fn comment(id: &str) -> Comment {
    Comment {
        id: id.to_string(),
        text_display: format!("text {id}"),
        text_original: format!("text {id}"),
        published_at: Some("2024-02-02T00:00:00Z".to_string()),
        like_count: 1,
        author_display_name: Some(format!("@author-{id}")),
        author_channel_id: Some(format!("UCauthor-{id}")),
    }
}

/// Split `total_threads` threads (each with `replies` replies) into pages of `per_page`.
pub fn paged_threads(
    prefix: &str,
    total_threads: usize,
    replies: usize,
    per_page: usize,
) -> Vec<Vec<CommentThread>> {
    let all: Vec<CommentThread> = (0..total_threads)
        .map(|i| thread(&format!("{prefix}-t{i}"), replies))
        .collect();
    all.chunks(per_page.max(1)).map(|c| c.to_vec()).collect()
}
