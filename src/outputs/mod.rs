//! Output generation for harvested corpora.
//!
//! # Submodules
//!
//! - [`workbook`]: Named sheets of ordered columns, persisted as one JSON file
//!
//! # Output Structure
//!
//! ```text
//! youtube_comments.json
//! ├── youtube_base          # six core columns
//! └── youtube_with_extras   # core + provenance columns
//!
//! rappler_articles.json
//! ├── articles_base
//! └── articles_with_extras
//! ```

pub mod workbook;
