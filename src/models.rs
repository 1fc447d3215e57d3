//! Data models for videos, comments, selection plans and scraped articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`VideoCandidate`]: A video together with the engagement count reported by the prober
//! - [`SelectionPlan`]: The channels and videos chosen for collection
//! - [`CommentThread`] / [`Comment`]: Raw threads as returned by the comment source
//! - [`CommentRow`]: One normalized row of the persisted corpus
//! - [`Article`]: One scraped news article
//!
//! Rows serialize with the snake_case column names used in the workbook, so a
//! corpus written by one run can be read back unchanged by a later top-up run.

use serde::{Deserialize, Serialize};

/// Ordering strategy accepted by the video search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchOrder {
    /// Ranked by relevance to the query (the primary tier).
    Relevance,
    /// Most recently published first.
    Date,
    /// Most viewed first.
    ViewCount,
    /// Highest rated first.
    Rating,
}

impl SearchOrder {
    /// The wire value expected by the `order` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::Rating => "rating",
        }
    }
}

/// One hit from a video search, before engagement has been probed.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub video_id: String,
    pub title: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub published_at: Option<String>,
}

/// First match of a channel search.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelHit {
    pub channel_id: String,
    pub channel_title: Option<String>,
}

/// A video with its owning channel and engagement count.
///
/// Produced by the engagement prober. A later probe of the same identifier
/// replaces the earlier value wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: Option<String>,
    pub published_at: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    /// Total published comment count; the engagement proxy.
    pub comment_count: u64,
}

/// The videos chosen for a single channel, best first.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSelection {
    pub channel_id: String,
    pub videos: Vec<VideoCandidate>,
}

impl ChannelSelection {
    pub fn video_ids(&self) -> Vec<&str> {
        self.videos.iter().map(|v| v.video_id.as_str()).collect()
    }
}

/// Output of the channel selector: at most N channels, at most M videos each.
pub type SelectionPlan = Vec<ChannelSelection>;

/// A single comment as returned by the comment-thread source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: String,
    pub text_display: String,
    pub text_original: String,
    pub published_at: Option<String>,
    pub like_count: u64,
    pub author_display_name: Option<String>,
    pub author_channel_id: Option<String>,
}

/// A top-level comment plus the replies returned with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    pub top_level: Comment,
    pub replies: Vec<Comment>,
}

/// One page of comment threads and the cursor for the next page, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadPage {
    pub threads: Vec<CommentThread>,
    pub next_page_token: Option<String>,
}

/// One row of the comment corpus.
///
/// The first six fields form the base projection; the rest are the extras
/// sheet. `channel_id` / `channel_title` describe the commenting author, while
/// the `video_uploader_*` fields describe the channel that owns the video and
/// are filled in by the backfill pass.
///
/// Every field defaults when absent so that older or hand-edited workbooks
/// still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentRow {
    pub title: String,
    pub link: String,
    pub date_published: Option<String>,
    pub text: String,
    pub like_count: u64,
    pub reply_parent_id: Option<String>,
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub video_id: String,
    pub video_title: Option<String>,
    pub comment_id: String,
    pub author: Option<String>,
    pub is_reply: bool,
    pub video_uploader_channel_id: Option<String>,
    pub video_uploader_channel_title: Option<String>,
}

impl CommentRow {
    /// Build a row for `comment` on `video_id`.
    ///
    /// `parent` is the top-level comment id for replies and `None` for
    /// top-level comments; it also drives `is_reply`.
    pub fn from_comment(video_id: &str, comment: &Comment, parent: Option<&str>) -> Self {
        CommentRow {
            title: comment.text_display.clone(),
            link: comment_permalink(video_id, &comment.id),
            date_published: comment.published_at.clone(),
            text: comment.text_original.clone(),
            like_count: comment.like_count,
            reply_parent_id: parent.map(str::to_string),
            channel_id: comment.author_channel_id.clone(),
            channel_title: comment.author_display_name.clone(),
            video_id: video_id.to_string(),
            video_title: None,
            comment_id: comment.id.clone(),
            author: comment.author_display_name.clone(),
            is_reply: parent.is_some(),
            video_uploader_channel_id: None,
            video_uploader_channel_title: None,
        }
    }

    /// The channel this row counts toward for coverage purposes.
    ///
    /// Rows with no uploader identity (missing or empty) fall back to
    /// `channel_id`.
    pub fn coverage_channel(&self) -> Option<&str> {
        let present = |c: &&str| !c.is_empty();
        self.video_uploader_channel_id
            .as_deref()
            .filter(present)
            .or_else(|| self.channel_id.as_deref().filter(present))
    }
}

/// Canonical watch URL anchored at a specific comment.
pub fn comment_permalink(video_id: &str, comment_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}&lc={comment_id}")
}

/// A scraped news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub link: String,
    pub title: Option<String>,
    pub date_published: Option<String>,
    pub text: Option<String>,
    pub author: Option<String>,
    /// Tag labels joined with `", "`.
    pub tags: Option<String>,
}
