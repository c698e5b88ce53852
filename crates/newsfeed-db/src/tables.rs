use bincode::{Decode, Encode};
use newsfeed_core::geo::Coordinates;
use newsfeed_core::{Fingerprint, Record, RecordKind, Timestamp, format_date};

macro_rules! def_table {
    ($(#[$outer:meta])*
        $name:ident : $k:ty => $v:ty) => {
        #[allow(unused)]
        $(#[$outer])*
        pub mod $name {
            use super::*;
            pub type Key = $k;
            pub type Value = $v;
            pub type Definition<'a> = redb_bincode::TableDefinition<'a, Key, Value>;
            pub trait ReadableTable: redb_bincode::ReadableTable<Key, Value> {}
            impl<RT> ReadableTable for RT where RT: redb_bincode::ReadableTable<Key, Value> {}
            pub type Table<'a> = redb_bincode::Table<'a, Key, Value>;
            pub const TABLE: Definition = redb_bincode::TableDefinition::new(stringify!($name));
        }
    };
}

def_table! {
    /// Tracks database/schema version
    db_version: () => u64
}

def_table! {
    /// Next row id to hand out, per record kind
    row_seq: RecordKind => u64
}

def_table!(news_records: Fingerprint => RecordRow);
def_table!(private_ad_records: Fingerprint => RecordRow);
def_table!(weather_alert_records: Fingerprint => RecordRow);

def_table! {
    /// City coordinates, keyed by lowercased name
    cities: String => CityRecord
}

/// Definition of the table holding rows of `kind`.
///
/// All record tables share a schema, only the name differs.
pub fn records_table(kind: RecordKind) -> news_records::Definition<'static> {
    match kind {
        RecordKind::News => news_records::TABLE,
        RecordKind::PrivateAd => private_ad_records::TABLE,
        RecordKind::WeatherAlert => weather_alert_records::TABLE,
    }
}

#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq)]
pub struct RecordRow {
    pub id: u64,
    pub created_at: Timestamp,
    pub inserted_at: Timestamp,
    pub fields: RowFields,
}

#[derive(Debug, Encode, Decode, Clone, PartialEq, Eq)]
pub enum RowFields {
    News {
        text: String,
        city: String,
    },
    PrivateAd {
        text: String,
        expiration_date: String,
        /// As of insertion.
        days_left: i64,
    },
    WeatherAlert {
        text: String,
        severity: String,
        location: String,
        alert_id: String,
    },
}

impl RowFields {
    pub fn from_record(record: &Record, inserted_at: time::OffsetDateTime) -> Self {
        match record {
            Record::News(r) => RowFields::News {
                text: r.text().to_owned(),
                city: r.city().to_owned(),
            },
            Record::PrivateAd(r) => RowFields::PrivateAd {
                text: r.text().to_owned(),
                expiration_date: format_date(r.expiration_date()),
                days_left: r.days_left(inserted_at.date()),
            },
            Record::WeatherAlert(r) => RowFields::WeatherAlert {
                text: r.text().to_owned(),
                severity: r.severity().to_owned(),
                location: r.location().to_owned(),
                alert_id: r.alert_id().to_owned(),
            },
        }
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            RowFields::News { .. } => RecordKind::News,
            RowFields::PrivateAd { .. } => RecordKind::PrivateAd,
            RowFields::WeatherAlert { .. } => RecordKind::WeatherAlert,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RowFields::News { text, .. }
            | RowFields::PrivateAd { text, .. }
            | RowFields::WeatherAlert { text, .. } => text,
        }
    }
}

#[derive(Debug, Encode, Decode, Clone, PartialEq)]
pub struct CityRecord {
    pub name: String,
    pub coordinates: Coordinates,
    pub country: Option<String>,
    pub created_at: Timestamp,
}
