//! Threaded comment collection for a single video.
//!
//! Pages are pulled from [`comment_pages`] until the number of emitted rows
//! reaches the target or the source runs out of pages. Each thread becomes
//! one top-level row followed by one row per reply, and every row counts
//! toward the target. The target is checked after each whole thread, so the
//! result may overshoot by up to one thread's replies. Nothing is truncated.

use crate::models::{CommentRow, CommentThread};
use crate::pacing::Pacer;
use crate::youtube::pages::comment_pages;
use crate::youtube::{Result, YoutubeApi};
use futures::TryStreamExt;
use std::pin::pin;
use tracing::{info, instrument};

/// Flatten one thread into its top-level row and reply rows, in order.
pub fn flatten_thread(video_id: &str, thread: &CommentThread) -> Vec<CommentRow> {
    let parent = thread.top_level.id.as_str();
    std::iter::once(CommentRow::from_comment(video_id, &thread.top_level, None))
        .chain(
            thread
                .replies
                .iter()
                .map(|reply| CommentRow::from_comment(video_id, reply, Some(parent))),
        )
        .collect()
}

/// Collect up to roughly `target` comment rows for `video_id`.
///
/// Returns whatever the source has when it holds fewer than `target` rows.
/// Transport errors are returned as-is; rows gathered before the error are
/// dropped with it.
#[instrument(level = "info", skip(api, pacer))]
pub async fn collect_comments<A, P>(
    api: &A,
    video_id: &str,
    target: usize,
    pacer: &P,
) -> Result<Vec<CommentRow>>
where
    A: YoutubeApi,
    P: Pacer,
{
    let mut rows = Vec::new();
    if target == 0 {
        return Ok(rows);
    }

    let mut pages = pin!(comment_pages(api, video_id, pacer));
    let mut page_count = 0usize;
    'pages: while let Some(page) = pages.try_next().await? {
        page_count += 1;
        for thread in &page.threads {
            rows.extend(flatten_thread(video_id, thread));
            if rows.len() >= target {
                break 'pages;
            }
        }
    }

    info!(
        rows = rows.len(),
        pages = page_count,
        reached_target = rows.len() >= target,
        "Collected comments"
    );
    Ok(rows)
}
