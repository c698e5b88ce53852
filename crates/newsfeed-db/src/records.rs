use newsfeed_core::{Fingerprint, Record, RecordKind, Timestamp};
use redb_bincode::ReadableTable as _;
use snafu::ensure;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::{
    Database, DbResult, DuplicateFingerprintSnafu, LOG_TARGET, RecordRow, RowFields,
    records_table, row_seq,
};

/// Where a freshly inserted record ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedRow {
    pub kind: RecordKind,
    pub id: u64,
    pub fingerprint: Fingerprint,
    pub inserted_at: Timestamp,
}

/// A record row as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub fingerprint: Fingerprint,
    pub id: u64,
    pub created_at: Timestamp,
    pub inserted_at: Timestamp,
    pub fields: RowFields,
}

impl StoredRow {
    pub fn kind(&self) -> RecordKind {
        self.fields.kind()
    }

    fn from_row(fingerprint: Fingerprint, row: RecordRow) -> Self {
        Self {
            fingerprint,
            id: row.id,
            created_at: row.created_at,
            inserted_at: row.inserted_at,
            fields: row.fields,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub news: u64,
    pub private_ad: u64,
    pub weather_alert: u64,
}

impl RecordCounts {
    pub fn get(&self, kind: RecordKind) -> u64 {
        match kind {
            RecordKind::News => self.news,
            RecordKind::PrivateAd => self.private_ad,
            RecordKind::WeatherAlert => self.weather_alert,
        }
    }

    fn get_mut(&mut self, kind: RecordKind) -> &mut u64 {
        match kind {
            RecordKind::News => &mut self.news,
            RecordKind::PrivateAd => &mut self.private_ad,
            RecordKind::WeatherAlert => &mut self.weather_alert,
        }
    }

    pub fn total(&self) -> u64 {
        self.news + self.private_ad + self.weather_alert
    }
}

impl Database {
    /// Whether a record with the same fingerprint is already stored.
    ///
    /// Only an early exit; [`Database::insert`] does the authoritative check.
    pub fn exists(&self, record: &Record) -> DbResult<bool> {
        let fingerprint = record.fingerprint();
        self.read_with(|tx| {
            let table = tx.open_table(&records_table(record.kind()))?;
            Ok(table.get(&fingerprint)?.is_some())
        })
    }

    pub fn insert(&self, record: &Record) -> DbResult<InsertedRow> {
        self.insert_at(record, OffsetDateTime::now_utc())
    }

    /// Insert `record` as if the store's clock read `now`.
    pub fn insert_at(&self, record: &Record, now: OffsetDateTime) -> DbResult<InsertedRow> {
        let kind = record.kind();
        let fingerprint = record.fingerprint();
        let inserted_at = Timestamp::from(now);

        let inserted = self.write_with(|tx| {
            let mut table = tx.open_table(&records_table(kind))?;
            let mut seq_table = tx.open_table(&row_seq::TABLE)?;

            ensure!(
                table.get(&fingerprint)?.is_none(),
                DuplicateFingerprintSnafu { kind, fingerprint }
            );

            let id = seq_table.get(&kind)?.map(|g| g.value()).unwrap_or(1);
            seq_table.insert(&kind, &(id + 1))?;

            table.insert(
                &fingerprint,
                &RecordRow {
                    id,
                    created_at: record.created_at().into(),
                    inserted_at,
                    fields: RowFields::from_record(record, now),
                },
            )?;

            Ok(InsertedRow {
                kind,
                id,
                fingerprint,
                inserted_at,
            })
        })?;

        debug!(target: LOG_TARGET, %kind, %fingerprint, id = inserted.id, "Record stored");
        Ok(inserted)
    }

    /// Remove every row of every record table. Returns how many were removed.
    pub fn clear_all(&self) -> DbResult<u64> {
        let removed = self.write_with(|tx| {
            let mut removed = 0;
            for kind in RecordKind::ALL {
                let mut table = tx.open_table(&records_table(kind))?;
                let mut keys = vec![];
                for entry in table.range::<Fingerprint>(..)? {
                    let (k, _) = entry?;
                    keys.push(k.value());
                }
                for key in &keys {
                    table.remove(key)?;
                }
                removed += keys.len() as u64;
            }
            Ok(removed)
        })?;

        info!(target: LOG_TARGET, removed, "Cleared all records");
        Ok(removed)
    }

    pub fn counts(&self) -> DbResult<RecordCounts> {
        self.read_with(|tx| {
            let mut counts = RecordCounts::default();
            for kind in RecordKind::ALL {
                let table = tx.open_table(&records_table(kind))?;
                for entry in table.range::<Fingerprint>(..)? {
                    entry?;
                    *counts.get_mut(kind) += 1;
                }
            }
            Ok(counts)
        })
    }

    /// Up to `limit` rows of `kind`, most recently inserted first.
    pub fn recent(&self, kind: RecordKind, limit: usize) -> DbResult<Vec<StoredRow>> {
        let mut rows = self.read_with(|tx| {
            let table = tx.open_table(&records_table(kind))?;
            let mut rows = vec![];
            for entry in table.range::<Fingerprint>(..)? {
                let (k, v) = entry?;
                rows.push(StoredRow::from_row(k.value(), v.value()));
            }
            Ok(rows)
        })?;

        rows.sort_by(|a, b| b.id.cmp(&a.id));
        rows.truncate(limit);
        Ok(rows)
    }
}
