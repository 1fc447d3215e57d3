//! Deferred backfill of video metadata onto collected rows.
//!
//! Rows are created before their video's title and uploader are known. This
//! pass fills them from a probe result in one go. Rows whose video is absent
//! from the metadata pass through unchanged.

use crate::models::{CommentRow, VideoCandidate};
use std::collections::HashMap;

pub fn backfill(rows: Vec<CommentRow>, meta: &HashMap<String, VideoCandidate>) -> Vec<CommentRow> {
    rows.into_iter()
        .map(|row| match meta.get(&row.video_id) {
            Some(video) => CommentRow {
                video_title: video.title.clone(),
                video_uploader_channel_id: video.channel_id.clone(),
                video_uploader_channel_title: video.channel_title.clone(),
                ..row
            },
            None => row,
        })
        .collect()
}
