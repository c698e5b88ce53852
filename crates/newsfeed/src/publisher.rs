use std::fmt;

use newsfeed_core::parse::Decoded;
use newsfeed_core::{Record, RecordError};
use newsfeed_db::{Database, DbError};
use newsfeed_util_error::FmtCompact as _;
use snafu::{ResultExt as _, Snafu};
use tracing::{debug, info, warn};

use crate::feed::{FeedError, FeedFile};

const LOG_TARGET: &str = "newsfeed::publisher";

#[derive(Debug, Snafu)]
pub enum PublisherError {
    #[snafu(display("Failed to store record"))]
    Store { source: DbError },
    #[snafu(display("Failed to append record to the feed"))]
    Feed { source: FeedError },
}

pub type PublisherResult<T> = std::result::Result<T, PublisherError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Published,
    /// Already stored; nothing written.
    Skipped,
}

/// Why one record of a batch did not make it.
#[derive(Debug, Snafu)]
pub enum RecordFailure {
    #[snafu(transparent)]
    Invalid { source: RecordError },
    #[snafu(transparent)]
    Publish { source: PublisherError },
}

#[derive(Debug)]
pub enum RecordOutcome {
    Published,
    Skipped,
    Failed(RecordFailure),
}

impl RecordOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RecordOutcome::Failed(_))
    }
}

impl From<PublishOutcome> for RecordOutcome {
    fn from(value: PublishOutcome) -> Self {
        match value {
            PublishOutcome::Published => RecordOutcome::Published,
            PublishOutcome::Skipped => RecordOutcome::Skipped,
        }
    }
}

/// Per-record outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
    pub published: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchReport {
    fn push(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Published => self.published += 1,
            RecordOutcome::Skipped => self.skipped += 1,
            RecordOutcome::Failed(_) => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether the batch's input file is done with: at least one record was
    /// published or already stored. An input whose every record failed is
    /// kept so it can be fixed and re-imported.
    pub fn source_consumed(&self) -> bool {
        0 < self.published + self.skipped
    }

    /// Indices of the records that failed.
    pub fn failed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_failed())
            .map(|(i, _)| i)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Published: {}, skipped: {}, failed: {}",
            self.published, self.skipped, self.failed
        )
    }
}

/// Stores records and appends them to the feed.
pub struct Publisher {
    db: Database,
    feed: FeedFile,
}

impl Publisher {
    pub fn new(db: Database, feed: FeedFile) -> Self {
        Self { db, feed }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn feed(&self) -> &FeedFile {
        &self.feed
    }

    /// Publish one record.
    ///
    /// With `persist`, the record is inserted first and a record that is
    /// already stored is skipped without touching the feed. Without it, the
    /// store is not consulted at all.
    pub fn publish(&self, record: &Record, persist: bool) -> PublisherResult<PublishOutcome> {
        let fingerprint = record.fingerprint();
        let kind = record.kind();

        if persist {
            if self.db.exists(record).context(StoreSnafu)? {
                debug!(target: LOG_TARGET, %kind, %fingerprint, "Record already stored");
                return Ok(PublishOutcome::Skipped);
            }
            if let Err(err) = self.db.insert(record) {
                if err.is_duplicate() {
                    debug!(target: LOG_TARGET, %kind, %fingerprint, "Record stored concurrently");
                    return Ok(PublishOutcome::Skipped);
                }
                return Err(err).context(StoreSnafu);
            }
        }

        self.feed.append(&record.render()).context(FeedSnafu)?;
        info!(target: LOG_TARGET, %kind, %fingerprint, persist, "Record published");
        Ok(PublishOutcome::Published)
    }

    pub fn publish_batch<'r>(
        &self,
        records: impl IntoIterator<Item = &'r Record>,
        persist: bool,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (idx, record) in records.into_iter().enumerate() {
            report.push(self.publish_logged(idx, record, persist));
        }
        report
    }

    /// Like [`Self::publish_batch`], with decode failures kept at their
    /// position.
    pub fn publish_decoded(&self, decoded: Decoded, persist: bool) -> BatchReport {
        let mut report = BatchReport::default();
        for (idx, entry) in decoded.into_iter().enumerate() {
            let outcome = match entry {
                Ok(record) => self.publish_logged(idx, &record, persist),
                Err(err) => {
                    warn!(target: LOG_TARGET, idx, err = %err.fmt_compact(), "Skipping invalid record");
                    RecordOutcome::Failed(err.into())
                }
            };
            report.push(outcome);
        }
        report
    }

    fn publish_logged(&self, idx: usize, record: &Record, persist: bool) -> RecordOutcome {
        match self.publish(record, persist) {
            Ok(outcome) => outcome.into(),
            Err(err) => {
                warn!(target: LOG_TARGET, idx, kind = %record.kind(), err = %err.fmt_compact(), "Failed to publish record");
                RecordOutcome::Failed(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use newsfeed_core::RecordKind;

    use super::*;

    fn failed() -> RecordOutcome {
        RecordOutcome::Failed(
            RecordError::MissingField {
                kind: RecordKind::News,
                field: "text",
            }
            .into(),
        )
    }

    fn report(outcomes: impl IntoIterator<Item = RecordOutcome>) -> BatchReport {
        let mut report = BatchReport::default();
        for outcome in outcomes {
            report.push(outcome);
        }
        report
    }

    #[test]
    fn source_consumed_needs_a_processed_record() {
        assert!(!report([]).source_consumed());
        assert!(!report([failed(), failed()]).source_consumed());
        assert!(report([failed(), RecordOutcome::Skipped]).source_consumed());
        assert!(report([RecordOutcome::Published, failed()]).source_consumed());
    }

    #[test]
    fn log_target_names_this_module() {
        assert_eq!(format!("{LOG_TARGET}::tests"), module_path!());
    }
}
