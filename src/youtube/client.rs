//! HTTP implementation of [`YoutubeApi`] against the YouTube Data API v3.
//!
//! Only the three read endpoints the pipeline needs are used:
//!
//! | Endpoint | Used for |
//! |----------|----------|
//! | `search` | Candidate search and channel lookup |
//! | `videos` | Engagement probe (`snippet,statistics`) |
//! | `commentThreads` | Paginated comment collection (`snippet,replies`) |
//!
//! Response bodies are treated as loosely structured: every field is optional
//! and missing values default to empty/zero rather than failing the request.

use super::{Result, SearchQuery, YoutubeApi, YoutubeError, COMMENT_PAGE_SIZE, MAX_PROBE_BATCH};
use crate::models::{ChannelHit, Comment, CommentThread, SearchHit, ThreadPage, VideoCandidate};
use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Thin client over the Data API. Holds the API key and a pooled HTTP client.
pub struct YoutubeClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for YoutubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl YoutubeClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key,
            base_url: BASE_URL.to_string(),
        })
    }

    /// GET `{base}/{endpoint}` with `params` plus the API key and decode the body.
    async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let t0 = Instant::now();
        let resp = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                endpoint,
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "YouTube API request failed"
            );
            return Err(YoutubeError::Api {
                status: status.as_u16(),
                message: truncate_for_log(&body, 300),
            });
        }

        let body = resp.text().await?;
        debug!(
            endpoint,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "YouTube API response"
        );
        Ok(serde_json::from_str(&body)?)
    }
}

impl YoutubeApi for YoutubeClient {
    #[instrument(level = "info", skip_all, fields(order = query.order.as_str(), channel = ?query.channel_id))]
    async fn search_videos(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let mut params = vec![
            ("q", query.keywords.clone()),
            ("part", "snippet".to_string()),
            ("type", "video".to_string()),
            ("maxResults", query.max_results.to_string()),
            ("order", query.order.as_str().to_string()),
        ];
        if let Some(channel_id) = &query.channel_id {
            params.push(("channelId", channel_id.clone()));
        }
        let resp: SearchResponse = self.get("search", &params).await?;
        Ok(resp
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(SearchHit {
                    video_id,
                    title: item.snippet.title,
                    channel_id: item.snippet.channel_id,
                    channel_title: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect())
    }

    #[instrument(level = "info", skip(self))]
    async fn find_channel(&self, name: &str) -> Result<Option<ChannelHit>> {
        let params = [
            ("q", name.to_string()),
            ("part", "snippet".to_string()),
            ("type", "channel".to_string()),
            ("maxResults", "1".to_string()),
        ];
        let resp: SearchResponse = self.get("search", &params).await?;
        Ok(resp.items.into_iter().next().and_then(|item| {
            let channel_id = item.snippet.channel_id.or(item.id.channel_id)?;
            Some(ChannelHit {
                channel_id,
                channel_title: item.snippet.channel_title,
            })
        }))
    }

    #[instrument(level = "debug", skip_all, fields(ids = ids.len()))]
    async fn video_details(&self, ids: &[String]) -> Result<HashMap<String, VideoCandidate>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        debug_assert!(ids.len() <= MAX_PROBE_BATCH);
        let params = [
            ("id", ids.join(",")),
            ("part", "snippet,statistics".to_string()),
            ("maxResults", MAX_PROBE_BATCH.to_string()),
        ];
        let resp: VideosResponse = self.get("videos", &params).await?;
        Ok(resp
            .items
            .into_iter()
            .map(|item| {
                let candidate = VideoCandidate {
                    video_id: item.id.clone(),
                    title: item.snippet.title,
                    published_at: item.snippet.published_at,
                    channel_id: item.snippet.channel_id,
                    channel_title: item.snippet.channel_title,
                    comment_count: item
                        .statistics
                        .comment_count
                        .and_then(|c| c.parse().ok())
                        .unwrap_or(0),
                };
                (item.id, candidate)
            })
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<ThreadPage> {
        let mut params = vec![
            ("videoId", video_id.to_string()),
            ("part", "snippet,replies".to_string()),
            ("maxResults", COMMENT_PAGE_SIZE.to_string()),
            ("order", "relevance".to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        let resp: CommentThreadsResponse = self.get("commentThreads", &params).await?;
        Ok(ThreadPage {
            threads: resp
                .items
                .into_iter()
                .map(|item| CommentThread {
                    top_level: item.snippet.top_level_comment.into(),
                    replies: item.replies.comments.into_iter().map(Into::into).collect(),
                })
                .collect(),
            next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
        })
    }
}

// ---- Wire types ----

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchResponse {
    items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchItem {
    id: SearchItemId,
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
    channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_id: Option<String>,
    channel_title: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideosResponse {
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Statistics {
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CommentThreadsResponse {
    items: Vec<CommentThreadItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CommentThreadItem {
    snippet: CommentThreadSnippet,
    replies: Replies,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CommentThreadSnippet {
    top_level_comment: CommentResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Replies {
    comments: Vec<CommentResource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CommentResource {
    id: String,
    snippet: CommentSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CommentSnippet {
    text_display: String,
    text_original: String,
    published_at: Option<String>,
    like_count: u64,
    author_display_name: Option<String>,
    author_channel_id: Option<AuthorChannelId>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthorChannelId {
    value: Option<String>,
}

impl From<CommentResource> for Comment {
    fn from(c: CommentResource) -> Self {
        Comment {
            id: c.id,
            text_display: c.snippet.text_display,
            text_original: c.snippet.text_original,
            published_at: c.snippet.published_at,
            like_count: c.snippet.like_count,
            author_display_name: c.snippet.author_display_name,
            author_channel_id: c.snippet.author_channel_id.and_then(|a| a.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_videos_response_defaults_missing_statistics() {
        let json = r#"{
            "items": [
                {"id": "a", "snippet": {"title": "A", "channelId": "UC1", "channelTitle": "One"},
                 "statistics": {"commentCount": "42"}},
                {"id": "b", "snippet": {"title": "B"}}
            ]
        }"#;
        let resp: VideosResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items.len(), 2);
        assert_eq!(resp.items[0].statistics.comment_count.as_deref(), Some("42"));
        assert_eq!(resp.items[1].statistics.comment_count, None);
        assert_eq!(resp.items[1].snippet.channel_id, None);
    }

    #[test]
    fn test_comment_threads_response_flattens_into_comments() {
        let json = r#"{
            "nextPageToken": "QURTSl",
            "items": [{
                "snippet": {"topLevelComment": {"id": "c1", "snippet": {
                    "textDisplay": "Hello &amp; welcome", "textOriginal": "Hello & welcome",
                    "publishedAt": "2024-03-01T00:00:00Z", "likeCount": 7,
                    "authorDisplayName": "@a", "authorChannelId": {"value": "UCa"}}}},
                "replies": {"comments": [
                    {"id": "c1.r1", "snippet": {"textOriginal": "reply", "authorDisplayName": "@b"}}
                ]}
            }]
        }"#;
        let resp: CommentThreadsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.next_page_token.as_deref(), Some("QURTSl"));

        let item = resp.items.into_iter().next().unwrap();
        let top: Comment = item.snippet.top_level_comment.into();
        assert_eq!(top.id, "c1");
        assert_eq!(top.like_count, 7);
        assert_eq!(top.author_channel_id.as_deref(), Some("UCa"));

        let reply: Comment = item.replies.comments.into_iter().next().unwrap().into();
        assert_eq!(reply.text_original, "reply");
        assert_eq!(reply.text_display, "");
        assert_eq!(reply.like_count, 0);
        assert_eq!(reply.author_channel_id, None);
    }

    #[test]
    fn test_search_response_without_replies_or_ids() {
        let json = r#"{"items": [{"id": {"kind": "youtube#channel", "channelId": "UCx"},
                        "snippet": {"channelTitle": "X"}}]}"#;
        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.items[0].id.video_id, None);
        assert_eq!(resp.items[0].id.channel_id.as_deref(), Some("UCx"));
    }

    #[test]
    fn test_client_debug_hides_key() {
        let client = YoutubeClient::new("secret-key".to_string()).unwrap();
        let dbg = format!("{client:?}");
        assert!(!dbg.contains("secret-key"));
    }
}
