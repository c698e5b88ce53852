//! Publishing records into the news feed, plus the interactive pieces the
//! `newsfeed` binary is built from.

pub mod distance;
pub mod feed;
pub mod prompt;
pub mod publisher;

pub use self::feed::FeedFile;
pub use self::publisher::{BatchReport, PublishOutcome, Publisher, RecordOutcome};
