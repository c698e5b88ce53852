//! Feed records.
//!
//! A closed set of variants, each with its own required fields, fingerprint
//! fields and feed rendering. All variants share a trimmed, non-empty `text`
//! body and a capture timestamp.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use snafu::{ResultExt as _, Snafu, ensure};
use time::{Date, OffsetDateTime};

use crate::{Fingerprint, format_date, format_datetime, parse_date};

pub const ALERT_ID_PREFIX: &str = "WA-";
const ALERT_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ALERT_ID_LEN: usize = 4;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RecordError {
    #[snafu(display("{kind} record requires non-empty '{field}' field"))]
    MissingField {
        kind: RecordKind,
        field: &'static str,
    },
    #[snafu(display("Unsupported record type: '{tag}'"))]
    UnsupportedType { tag: String },
    #[snafu(display("Invalid date '{value}' in '{field}', expected YYYY-MM-DD"))]
    InvalidDate {
        field: &'static str,
        value: String,
        source: time::error::Parse,
    },
    #[snafu(display("Unknown severity '{value}', expected one of Low, Medium, High, Critical"))]
    InvalidSeverity { value: String },
    #[snafu(display("Malformed record envelope: {reason}"))]
    MalformedRecord { reason: String },
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;

#[cfg_attr(feature = "bincode", derive(::bincode::Encode, ::bincode::Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
    News,
    PrivateAd,
    WeatherAlert,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::News,
        RecordKind::PrivateAd,
        RecordKind::WeatherAlert,
    ];

    /// Tag used in JSON `type` fields and XML `type` attributes.
    pub fn tag(self) -> &'static str {
        match self {
            RecordKind::News => "news",
            RecordKind::PrivateAd => "private_ad",
            RecordKind::WeatherAlert => "weather_alert",
        }
    }

    /// Matches tags case-insensitively, ignoring surrounding whitespace.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag().eq_ignore_ascii_case(tag))
    }

    pub fn display_name(self) -> &'static str {
        match self {
            RecordKind::News => "News",
            RecordKind::PrivateAd => "Private Ad",
            RecordKind::WeatherAlert => "Weather Alert",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for RecordKind {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| RecordError::UnsupportedType { tag: s.to_owned() })
    }
}

/// Severity levels accepted on interactive entry.
///
/// Decoded records keep whatever non-empty severity string the input had.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RecordError::InvalidSeverity {
                value: s.to_owned(),
            })
    }
}

/// Trim `value` and make sure something is left.
fn required(kind: RecordKind, field: &'static str, value: &str) -> RecordResult<String> {
    let value = value.trim();
    ensure!(!value.is_empty(), MissingFieldSnafu { kind, field });
    Ok(value.to_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct News {
    text: String,
    city: String,
    created_at: OffsetDateTime,
}

impl News {
    pub fn new(text: &str, city: &str) -> RecordResult<Self> {
        Self::new_at(text, city, OffsetDateTime::now_utc())
    }

    pub fn new_at(text: &str, city: &str, created_at: OffsetDateTime) -> RecordResult<Self> {
        Ok(Self {
            text: required(RecordKind::News, "text", text)?,
            city: required(RecordKind::News, "city", city)?,
            created_at,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateAd {
    text: String,
    expiration_date: Date,
    created_at: OffsetDateTime,
}

impl PrivateAd {
    pub fn new(text: &str, expiration_date: Date) -> RecordResult<Self> {
        Self::new_at(text, expiration_date, OffsetDateTime::now_utc())
    }

    pub fn new_at(
        text: &str,
        expiration_date: Date,
        created_at: OffsetDateTime,
    ) -> RecordResult<Self> {
        Ok(Self {
            text: required(RecordKind::PrivateAd, "text", text)?,
            expiration_date,
            created_at,
        })
    }

    /// Build from a textual `YYYY-MM-DD` expiration date.
    ///
    /// Dates in the past are accepted here.
    pub fn parse(text: &str, expiration_date: &str) -> RecordResult<Self> {
        let text = required(RecordKind::PrivateAd, "text", text)?;
        let expiration_date = required(RecordKind::PrivateAd, "expiration_date", expiration_date)?;
        let date = parse_date(&expiration_date).context(InvalidDateSnafu {
            field: "expiration_date",
            value: expiration_date.clone(),
        })?;
        Self::new(&text, date)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expiration_date(&self) -> Date {
        self.expiration_date
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    /// Whole days from `today` until expiration; negative once expired.
    pub fn days_left(&self, today: Date) -> i64 {
        (self.expiration_date - today).whole_days()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherAlert {
    text: String,
    severity: String,
    location: String,
    alert_id: String,
    created_at: OffsetDateTime,
}

impl WeatherAlert {
    pub fn new(text: &str, severity: &str, location: &str) -> RecordResult<Self> {
        Self::new_with_rng(
            text,
            severity,
            location,
            OffsetDateTime::now_utc(),
            &mut rand::rng(),
        )
    }

    pub fn new_with_rng(
        text: &str,
        severity: &str,
        location: &str,
        created_at: OffsetDateTime,
        rng: &mut (impl Rng + ?Sized),
    ) -> RecordResult<Self> {
        Ok(Self {
            text: required(RecordKind::WeatherAlert, "text", text)?,
            severity: required(RecordKind::WeatherAlert, "severity", severity)?,
            location: required(RecordKind::WeatherAlert, "location", location)?,
            alert_id: generate_alert_id(rng),
            created_at,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn alert_id(&self) -> &str {
        &self.alert_id
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }
}

fn generate_alert_id(rng: &mut (impl Rng + ?Sized)) -> String {
    let mut id = String::with_capacity(ALERT_ID_PREFIX.len() + ALERT_ID_LEN);
    id.push_str(ALERT_ID_PREFIX);
    for _ in 0..ALERT_ID_LEN {
        let idx = rng.random_range(0..ALERT_ID_CHARSET.len());
        id.push(char::from(ALERT_ID_CHARSET[idx]));
    }
    id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    News(News),
    PrivateAd(PrivateAd),
    WeatherAlert(WeatherAlert),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::News(_) => RecordKind::News,
            Record::PrivateAd(_) => RecordKind::PrivateAd,
            Record::WeatherAlert(_) => RecordKind::WeatherAlert,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Record::News(r) => r.text(),
            Record::PrivateAd(r) => r.text(),
            Record::WeatherAlert(r) => r.text(),
        }
    }

    pub fn created_at(&self) -> OffsetDateTime {
        match self {
            Record::News(r) => r.created_at(),
            Record::PrivateAd(r) => r.created_at(),
            Record::WeatherAlert(r) => r.created_at(),
        }
    }

    /// Fingerprint over the variant's dedup fields.
    ///
    /// Capture time and alert id are not part of it.
    pub fn fingerprint(&self) -> Fingerprint {
        match self {
            Record::News(r) => Fingerprint::from_fields([r.text(), r.city()]),
            Record::PrivateAd(r) => {
                let date = format_date(r.expiration_date());
                Fingerprint::from_fields([r.text(), date.as_str()])
            }
            Record::WeatherAlert(r) => {
                Fingerprint::from_fields([r.text(), r.severity(), r.location()])
            }
        }
    }

    /// Render the feed block, computing days left against today's UTC date.
    pub fn render(&self) -> String {
        self.render_on(OffsetDateTime::now_utc().date())
    }

    /// Render the feed block as of `today`.
    pub fn render_on(&self, today: Date) -> String {
        match self {
            Record::News(r) => format!(
                "News -------------------------\n{}\n{}, {}\n\n",
                r.text(),
                r.city(),
                format_datetime(r.created_at())
            ),
            Record::PrivateAd(r) => format!(
                "Private Ad -------------------\n{}\nActual until: {}, {} days left\n\n",
                r.text(),
                format_date(r.expiration_date()),
                r.days_left(today)
            ),
            Record::WeatherAlert(r) => format!(
                "Weather Alert ----------------\nAlert ID: {}\nSeverity: {}\n{}\nLocation: {}, {}\n\n",
                r.alert_id(),
                r.severity(),
                r.text(),
                r.location(),
                format_datetime(r.created_at())
            ),
        }
    }
}

impl From<News> for Record {
    fn from(value: News) -> Self {
        Record::News(value)
    }
}

impl From<PrivateAd> for Record {
    fn from(value: PrivateAd) -> Self {
        Record::PrivateAd(value)
    }
}

impl From<WeatherAlert> for Record {
    fn from(value: WeatherAlert) -> Self {
        Record::WeatherAlert(value)
    }
}

#[cfg(test)]
mod tests;
