use std::fmt;

use time::OffsetDateTime;

use crate::format_datetime;

/// Unix timestamp in whole seconds, UTC.
#[cfg_attr(feature = "bincode", derive(::bincode::Encode, ::bincode::Decode))]
#[derive(Copy, Clone, Hash, Debug, PartialOrd, Ord, PartialEq, Eq)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub fn now() -> Self {
        OffsetDateTime::now_utc().into()
    }

    pub fn from_unix_secs(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_unix_secs(self) -> i64 {
        self.0
    }

    /// `None` only for values outside the range `time` can represent.
    pub fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.0).ok()
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self(value.unix_timestamp())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => f.write_str(&format_datetime(dt)),
            None => write!(f, "@{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn display_uses_feed_format() {
        let ts = Timestamp::from(datetime!(2024-02-29 23:05:41 UTC));
        assert_eq!(ts.to_string(), "2024-02-29 23:05");
        assert_eq!(Timestamp::ZERO.to_string(), "1970-01-01 00:00");
    }

    #[test]
    fn out_of_range_falls_back_to_raw_seconds() {
        assert_eq!(
            Timestamp::from_unix_secs(i64::MAX).to_string(),
            format!("@{}", i64::MAX)
        );
    }
}
