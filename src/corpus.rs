//! Corpus assembly: comment rows and articles into two-sheet workbooks.
//!
//! Each corpus is written as a base sheet holding only the core columns and
//! an extras sheet holding every column. Top-up runs read the extras sheet
//! back to recover the full rows.

use crate::models::{Article, CommentRow};
use crate::outputs::workbook::{read_workbook, Sheet, Workbook};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

pub const YOUTUBE_BASE_SHEET: &str = "youtube_base";
pub const YOUTUBE_FULL_SHEET: &str = "youtube_with_extras";

pub const BASE_COLUMNS: [&str; 6] = [
    "title",
    "link",
    "date_published",
    "text",
    "like_count",
    "reply_parent_id",
];

pub const EXTRA_COLUMNS: [&str; 9] = [
    "channel_id",
    "channel_title",
    "video_id",
    "video_title",
    "comment_id",
    "author",
    "is_reply",
    "video_uploader_channel_id",
    "video_uploader_channel_title",
];

pub const ARTICLES_BASE_SHEET: &str = "articles_base";
pub const ARTICLES_FULL_SHEET: &str = "articles_with_extras";

pub const ARTICLE_BASE_COLUMNS: [&str; 4] = ["link", "title", "date_published", "text"];
pub const ARTICLE_COLUMNS: [&str; 6] = ["link", "title", "date_published", "text", "author", "tags"];

/// Base + extras workbook for comment rows.
pub fn build_comment_workbook(rows: &[CommentRow]) -> Result<Workbook, serde_json::Error> {
    let full_columns: Vec<&str> = BASE_COLUMNS.iter().chain(EXTRA_COLUMNS.iter()).copied().collect();
    Ok(Workbook {
        sheets: vec![
            Sheet::from_records(YOUTUBE_BASE_SHEET, &BASE_COLUMNS, rows)?,
            Sheet::from_records(YOUTUBE_FULL_SHEET, &full_columns, rows)?,
        ],
    })
}

/// Base + extras workbook for scraped articles.
pub fn build_article_workbook(articles: &[Article]) -> Result<Workbook, serde_json::Error> {
    Ok(Workbook {
        sheets: vec![
            Sheet::from_records(ARTICLES_BASE_SHEET, &ARTICLE_BASE_COLUMNS, articles)?,
            Sheet::from_records(ARTICLES_FULL_SHEET, &ARTICLE_COLUMNS, articles)?,
        ],
    })
}

/// Full comment rows from a workbook. A workbook without the extras sheet
/// yields no rows.
pub fn comment_rows(workbook: &Workbook) -> Result<Vec<CommentRow>, serde_json::Error> {
    match workbook.sheet(YOUTUBE_FULL_SHEET) {
        Some(sheet) => sheet.records(),
        None => Ok(Vec::new()),
    }
}

/// Load an existing corpus, or an empty one when `path` does not exist yet.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_corpus(path: &Path) -> Result<Vec<CommentRow>, Box<dyn Error>> {
    if !tokio::fs::try_exists(path).await? {
        info!("No existing corpus; starting empty");
        return Ok(Vec::new());
    }
    let workbook = read_workbook(path).await?;
    let rows = comment_rows(&workbook)?;
    info!(rows = rows.len(), "Loaded existing corpus");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::workbook::write_workbook;
    use serde_json::Value;

    fn row(video: &str, comment: &str, parent: Option<&str>) -> CommentRow {
        CommentRow {
            title: format!("display {comment}"),
            link: format!("https://www.youtube.com/watch?v={video}&lc={comment}"),
            text: format!("original {comment}"),
            like_count: 4,
            reply_parent_id: parent.map(str::to_string),
            video_id: video.to_string(),
            video_title: Some("Hearing".to_string()),
            comment_id: comment.to_string(),
            is_reply: parent.is_some(),
            video_uploader_channel_id: Some("UCr".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_comment_workbook_shapes() {
        let rows = vec![row("v", "c1", None), row("v", "c1.r0", Some("c1"))];
        let wb = build_comment_workbook(&rows).unwrap();

        let base = wb.sheet(YOUTUBE_BASE_SHEET).unwrap();
        assert_eq!(base.columns, BASE_COLUMNS);
        assert_eq!(base.rows.len(), 2);
        assert_eq!(base.rows[1][5], Value::from("c1"));
        assert_eq!(base.rows[0][5], Value::Null);

        let full = wb.sheet(YOUTUBE_FULL_SHEET).unwrap();
        assert_eq!(full.columns.len(), BASE_COLUMNS.len() + EXTRA_COLUMNS.len());
        assert_eq!(comment_rows(&wb).unwrap(), rows);
    }

    #[test]
    fn test_article_workbook_shapes() {
        let articles = vec![Article {
            link: "https://www.rappler.com/a".to_string(),
            title: Some("T".to_string()),
            text: Some("body".to_string()),
            author: Some("Reporter".to_string()),
            ..Default::default()
        }];
        let wb = build_article_workbook(&articles).unwrap();
        assert_eq!(wb.sheet(ARTICLES_BASE_SHEET).unwrap().columns, ARTICLE_BASE_COLUMNS);
        let full = wb.sheet(ARTICLES_FULL_SHEET).unwrap();
        assert_eq!(full.rows[0][4], Value::from("Reporter"));
        assert_eq!(full.rows[0][5], Value::Null);
    }

    #[test]
    fn test_workbook_without_extras_sheet_has_no_rows() {
        assert!(comment_rows(&Workbook::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_corpus_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let rows = load_corpus(&dir.path().join("absent.json")).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_load_corpus_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        let rows = vec![row("v", "c1", None)];
        write_workbook(&build_comment_workbook(&rows).unwrap(), &path)
            .await
            .unwrap();

        assert_eq!(load_corpus(&path).await.unwrap(), rows);
    }
}
