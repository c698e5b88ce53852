//! Decoders turning JSON and XML files into records.
//!
//! Both formats accept either a single envelope or a collection of them.
//! Problems with one envelope are reported in [`Decoded`] next to the
//! records that did decode; only input that cannot be read as the format at
//! all fails the whole call with [`ParseError`].

pub mod json;
pub mod xml;

use std::path::PathBuf;
use std::{io, vec};

use snafu::Snafu;

use crate::record::{
    MalformedRecordSnafu, News, PrivateAd, Record, RecordError, RecordKind, RecordResult,
    WeatherAlert,
};

const LOG_TARGET: &str = "newsfeed::parse";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display("Invalid input format"))]
    InvalidFormat { source: FormatError },
    #[snafu(display("Failed to read {}", path.display()))]
    Read { source: io::Error, path: PathBuf },
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FormatError {
    #[snafu(display("Not valid JSON"))]
    Json { source: serde_json::Error },
    #[snafu(display("Not valid XML"))]
    Xml { source: quick_xml::Error },
    #[snafu(display("Input is not UTF-8"))]
    Utf8 { source: std::str::Utf8Error },
    #[snafu(display("{reason}"))]
    Shape { reason: String },
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Per-envelope decode results, in input order.
#[derive(Debug, Default)]
pub struct Decoded {
    entries: Vec<RecordResult<Record>>,
}

impl Decoded {
    pub fn entries(&self) -> &[RecordResult<Record>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(|e| e.as_ref().ok())
    }

    /// Failed envelopes with their zero-based position.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &RecordError)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().err().map(|err| (i, err)))
    }
}

impl FromIterator<RecordResult<Record>> for Decoded {
    fn from_iter<T: IntoIterator<Item = RecordResult<Record>>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Decoded {
    type Item = RecordResult<Record>;
    type IntoIter = vec::IntoIter<RecordResult<Record>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Named string fields of one envelope's payload.
pub(crate) trait Fields {
    /// Value of `name`, or `None` if absent or not textual.
    fn field(&self, name: &str) -> Option<&str>;
}

/// Build a record of the kind named by `tag` from an envelope payload.
pub(crate) fn build_record(tag: Option<&str>, fields: &impl Fields) -> RecordResult<Record> {
    let Some(tag) = tag else {
        return MalformedRecordSnafu {
            reason: "missing 'type'",
        }
        .fail();
    };
    let kind: RecordKind = tag.parse()?;
    let get = |name: &'static str| fields.field(name).unwrap_or_default();

    Ok(match kind {
        RecordKind::News => News::new(get("text"), get("city"))?.into(),
        RecordKind::PrivateAd => PrivateAd::parse(get("text"), get("expiration_date"))?.into(),
        RecordKind::WeatherAlert => {
            WeatherAlert::new(get("text"), get("severity"), get("location"))?.into()
        }
    })
}

fn shape_error(reason: impl Into<String>) -> ParseError {
    ParseError::InvalidFormat {
        source: FormatError::Shape {
            reason: reason.into(),
        },
    }
}
