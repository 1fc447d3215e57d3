//! Comment harvest for a whole selection plan.
//!
//! Videos are visited sequentially in plan order. Between videos the
//! video pacer runs; between pages of one video the page pacer runs. Once
//! every video is collected, all distinct video ids are probed again and the
//! rows are backfilled with title and uploader identity.
//!
//! A video whose comments cannot be fetched is logged and skipped; the rest
//! of the plan still runs and its rows are kept.

use super::backfill::backfill;
use super::collector::collect_comments;
use crate::models::{CommentRow, SelectionPlan};
use crate::pacing::Pacer;
use crate::progress::count_bar;
use crate::youtube::{probe_engagement, YoutubeApi};
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

#[instrument(level = "info", skip_all, fields(channels = plan.len(), target = target_per_video))]
pub async fn harvest_plan<A, P, V>(
    api: &A,
    plan: &SelectionPlan,
    target_per_video: usize,
    page_pacer: &P,
    video_pacer: &V,
) -> Vec<CommentRow>
where
    A: YoutubeApi,
    P: Pacer,
    V: Pacer,
{
    let total_videos: usize = plan.iter().map(|s| s.videos.len()).sum();
    let pb = count_bar(total_videos as u64, "Fetching video comments");

    let mut rows = Vec::new();
    let mut failed = 0usize;
    for selection in plan {
        for video in &selection.videos {
            match collect_comments(api, &video.video_id, target_per_video, page_pacer).await {
                Ok(fetched) => {
                    debug!(
                        channel = %selection.channel_id,
                        video = %video.video_id,
                        comment_count = video.comment_count,
                        rows = fetched.len(),
                        "Video collected"
                    );
                    rows.extend(fetched);
                }
                Err(e) => {
                    failed += 1;
                    warn!(video = %video.video_id, error = %e, "Comment fetch failed; skipping video");
                }
            }
            pb.inc(1);
            video_pacer.pause().await;
        }
    }
    pb.finish_and_clear();

    let video_ids: Vec<String> = rows.iter().map(|r| r.video_id.clone()).unique().collect();
    let meta = match probe_engagement(api, &video_ids).await {
        Ok(meta) => meta,
        Err(e) => {
            warn!(error = %e, "Metadata probe failed; rows keep empty video fields");
            HashMap::new()
        }
    };
    info!(
        rows = rows.len(),
        videos = video_ids.len(),
        failed_videos = failed,
        with_metadata = meta.len(),
        "Harvest complete"
    );
    backfill(rows, &meta)
}
