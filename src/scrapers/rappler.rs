//! Rappler listing crawler and article extractor.
//!
//! Listing pages come in three flavours:
//!
//! | Mode | URL pattern |
//! |------|-------------|
//! | `topic` | `https://www.rappler.com/topic/{slug}/page/{n}/` |
//! | `person` | `https://www.rappler.com/persons/{slug}/page/{n}/` |
//! | `search` | `https://www.rappler.com/?s={query}&paged={n}` |
//!
//! Each listing page is mined for headline links, then every article is
//! fetched and reduced to an [`Article`]. Extraction is best effort: any
//! field that cannot be found is left empty, and articles lacking a title or
//! body are dropped. Failed fetches are logged and skipped.

use crate::models::Article;
use crate::pacing::{Jitter, Pacer};
use clap::ValueEnum;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

const BASE_URL: &str = "https://www.rappler.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123 Safari/537.36";

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("h3 a, h2 a, .post-card a"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("h1"));
static TIME_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("time[datetime]"));
static AUTHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"[class*="author"], [class*="byline"]"#));
static TAGS_SELECTOR: Lazy<Selector> = Lazy::new(|| selector(r#"[class*="tags"]"#));
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static BODY_SELECTORS: Lazy<[Selector; 3]> = Lazy::new(|| {
    [
        selector("div.post-single__content"),
        selector("div.entry-content"),
        selector("article"),
    ]
});
static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("p, h2, li"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Which kind of listing to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingMode {
    Topic,
    Person,
    Search,
}

/// Listing URL for `page` (1-based) of the given mode.
pub fn listing_url(mode: ListingMode, slug_or_query: &str, page: u32) -> String {
    match mode {
        ListingMode::Topic => format!("{BASE_URL}/topic/{slug_or_query}/page/{page}/"),
        ListingMode::Person => format!("{BASE_URL}/persons/{slug_or_query}/page/{page}/"),
        ListingMode::Search => format!(
            "{BASE_URL}/?s={}&paged={page}",
            urlencoding::encode(slug_or_query).replace("%20", "+")
        ),
    }
}

/// Collapse runs of whitespace and trim, like reading the text aloud.
fn element_text(element: &ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

/// Article links found on a listing page, absolute and deduplicated.
pub fn extract_listing_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(base) = Url::parse(BASE_URL) else {
        return Vec::new();
    };
    document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| {
            if href.starts_with('/') {
                base.join(href).ok().map(|u| u.to_string())
            } else {
                Some(href.to_string())
            }
        })
        .filter(|href| href.contains("rappler.com") && !href.contains("/video/"))
        .unique()
        .collect()
}

/// Pull article fields out of a fetched page.
pub fn extract_article(url: &str, html: &str) -> Article {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|h| element_text(&h))
        .filter(|t| !t.is_empty());

    let date_published = document
        .select(&TIME_SELECTOR)
        .next()
        .and_then(|t| t.value().attr("datetime"))
        .map(str::to_string);

    let author = document
        .select(&AUTHOR_SELECTOR)
        .next()
        .map(|a| element_text(&a))
        .filter(|a| !a.is_empty());

    let text = BODY_SELECTORS
        .iter()
        .find_map(|sel| document.select(sel).next())
        .map(|body| {
            body.select(&BLOCK_SELECTOR)
                .map(|block| element_text(&block))
                .filter(|t| !t.is_empty())
                .join("\n")
        })
        .filter(|t| !t.is_empty());

    let tags = document
        .select(&TAGS_SELECTOR)
        .next()
        .map(|container| {
            container
                .select(&ANCHOR_SELECTOR)
                .map(|a| element_text(&a))
                .filter(|t| !t.is_empty())
                .join(", ")
        })
        .filter(|t| !t.is_empty());

    Article {
        link: url.to_string(),
        title,
        date_published,
        text,
        author,
        tags,
    }
}

/// HTTP side of the scraper: a client with a browser user agent and fixed
/// courtesy delays.
pub struct RapplerScraper {
    http: reqwest::Client,
    listing_pause: Jitter,
    article_pause: Jitter,
}

impl RapplerScraper {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            listing_pause: Jitter::millis(1_000, 2_000),
            article_pause: Jitter::millis(800, 1_500),
        })
    }

    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        Ok(resp.text().await?)
    }

    /// Links from one listing page; an empty list if the fetch fails.
    #[instrument(level = "info", skip(self))]
    pub async fn index_listing(&self, listing_url: &str) -> Vec<String> {
        match self.fetch(listing_url).await {
            Ok(html) => extract_listing_links(&html),
            Err(e) => {
                warn!(url = %listing_url, error = %e, "Listing fetch failed");
                Vec::new()
            }
        }
    }

    /// One article; `None` if the fetch fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_article(&self, url: &str) -> Option<Article> {
        match self.fetch(url).await {
            Ok(html) => Some(extract_article(url, &html)),
            Err(e) => {
                warn!(%url, error = %e, "Fetch failed");
                None
            }
        }
    }

    /// Crawl listing pages `1..=pages` and return every usable article.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape(&self, mode: ListingMode, slug_or_query: &str, pages: u32) -> Vec<Article> {
        let mut articles = Vec::new();
        for page in 1..=pages {
            let url = listing_url(mode, slug_or_query, page);
            info!(page, %url, "Listing page");
            self.listing_pause.pause().await;
            let links = self.index_listing(&url).await;
            info!(page, count = links.len(), "Found article links");

            for link in links {
                self.article_pause.pause().await;
                match self.fetch_article(&link).await {
                    Some(article) if article.title.is_some() && article.text.is_some() => {
                        debug!(%link, "Kept article");
                        articles.push(article);
                    }
                    Some(_) => debug!(%link, "Dropped article without title or body"),
                    None => {}
                }
            }
        }
        info!(count = articles.len(), "Scraped Rappler articles");
        articles
    }
}
