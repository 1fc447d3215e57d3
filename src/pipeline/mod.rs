//! The comment harvesting pipeline.
//!
//! # Stages
//!
//! 1. [`selector`]: Pick N channels with M qualifying videos each, escalating
//!    through search orderings until enough channels qualify
//! 2. [`collector`]: Page through one video's comment threads up to a target
//! 3. [`harvest`]: Drive the collector over a whole selection plan
//! 4. [`backfill`]: Attach video title and uploader identity to rows
//!
//! [`topup`] reuses stages 2 and 4 to extend an existing corpus per channel
//! without revisiting videos it already holds.

pub mod backfill;
pub mod collector;
pub mod harvest;
pub mod selector;
pub mod topup;
