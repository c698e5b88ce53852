//! Small text and number exercises around the news feed.
//!
//! Everything random takes the generator as a parameter so callers (and
//! tests) decide about seeding.

pub mod dicts;
pub mod feed_stats;
pub mod numbers;
pub mod text;
