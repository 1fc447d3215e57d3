//! News site scrapers used to build article corpora alongside comments.
//!
//! Each scraper follows a two-phase pattern:
//!
//! 1. **Indexing**: Discover article URLs from the site's listing pages
//! 2. **Fetching**: Download and parse article content from each URL
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Rappler | [`rappler`] | HTML scraping | Topic, person and search listings |
//!
//! Failed fetches are logged and skipped; a crawl never aborts on a single
//! bad page.

pub mod rappler;
