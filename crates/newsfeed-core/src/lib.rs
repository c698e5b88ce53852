//! Record model, content fingerprints and input decoders shared by the
//! newsfeed tools.

pub mod fingerprint;
pub mod geo;
pub mod parse;
pub mod record;
mod timestamp;

pub use fingerprint::Fingerprint;
pub use record::{
    News, PrivateAd, Record, RecordError, RecordKind, RecordResult, Severity, WeatherAlert,
};
pub use timestamp::Timestamp;

/// Calendar date format used for expiration dates.
pub const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: time::Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

/// Format a timestamp as `YYYY-MM-DD HH:MM`, the way feed blocks show it.
pub fn format_datetime(dt: time::OffsetDateTime) -> String {
    format!(
        "{} {:02}:{:02}",
        format_date(dt.date()),
        dt.hour(),
        dt.minute()
    )
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<time::Date, time::error::Parse> {
    time::Date::parse(s.trim(), DATE_FORMAT)
}
