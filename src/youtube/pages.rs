//! Comment-thread pagination as a lazy stream.
//!
//! The cursor moves `Start → Next(token) → … → Done`. Nothing is requested
//! until the consumer polls, so a consumer that stops early never triggers a
//! further page fetch. The pacer runs before every request except the first.

use super::{Result, YoutubeApi};
use crate::models::ThreadPage;
use crate::pacing::Pacer;
use futures::stream::{self, Stream};
use tracing::debug;

/// Pagination state between page requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    Start,
    Next(String),
    Done,
}

impl Cursor {
    /// Cursor following a page that reported `token`. Empty tokens end the stream.
    pub fn after(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.is_empty() => Cursor::Next(t.to_string()),
            _ => Cursor::Done,
        }
    }
}

/// Stream every comment-thread page of `video_id`, in order.
pub fn comment_pages<'a, A, P>(
    api: &'a A,
    video_id: &'a str,
    pacer: &'a P,
) -> impl Stream<Item = Result<ThreadPage>> + 'a
where
    A: YoutubeApi,
    P: Pacer,
{
    stream::try_unfold(Cursor::Start, move |cursor| async move {
        let token = match cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::Next(token) => {
                pacer.pause().await;
                Some(token)
            }
        };
        let page = api.comment_threads(video_id, token.as_deref()).await?;
        let next = Cursor::after(page.next_page_token.as_deref());
        debug!(
            video_id,
            threads = page.threads.len(),
            has_next = next != Cursor::Done,
            "Fetched comment page"
        );
        Ok(Some((page, next)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::NoPause;
    use crate::youtube::fake::{paged_threads, FakeYoutube};
    use futures::TryStreamExt;
    use std::cell::Cell;
    use std::pin::pin;

    #[derive(Default)]
    struct CountingPacer {
        pauses: Cell<usize>,
    }

    impl Pacer for CountingPacer {
        async fn pause(&self) {
            self.pauses.set(self.pauses.get() + 1);
        }
    }

    #[test]
    fn test_cursor_after() {
        assert_eq!(Cursor::after(None), Cursor::Done);
        assert_eq!(Cursor::after(Some("")), Cursor::Done);
        assert_eq!(Cursor::after(Some("abc")), Cursor::Next("abc".to_string()));
    }

    #[tokio::test]
    async fn test_streams_all_pages_then_stops() {
        let mut fake = FakeYoutube::default();
        fake.set_pages("v1", paged_threads("v1", 25, 0, 10));
        let pacer = CountingPacer::default();

        let pages: Vec<ThreadPage> = comment_pages(&fake, "v1", &pacer)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].threads.len(), 5);
        assert_eq!(fake.page_requests("v1"), 3);
        assert_eq!(pacer.pauses.get(), 2);
    }

    #[tokio::test]
    async fn test_lazy_until_polled() {
        let mut fake = FakeYoutube::default();
        fake.set_pages("v1", paged_threads("v1", 30, 0, 10));

        let mut pages = pin!(comment_pages(&fake, "v1", &NoPause));
        assert_eq!(fake.page_requests("v1"), 0);

        let first = pages.try_next().await.unwrap().unwrap();
        assert_eq!(first.threads.len(), 10);
        assert_eq!(fake.page_requests("v1"), 1);
    }

    #[tokio::test]
    async fn test_unknown_video_yields_single_empty_page() {
        let fake = FakeYoutube::default();
        let pages: Vec<ThreadPage> = comment_pages(&fake, "missing", &NoPause)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].threads.is_empty());
    }
}
