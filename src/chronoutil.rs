//! Clock sources and the timestamp formats used by V4 signing.

use {
    crate::constants::{ISO8601_COMPACT_FORMAT, ISO8601_DATE_FORMAT, ISO8601_UTC_LENGTH},
    chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc},
    lazy_static::lazy_static,
    regex::Regex,
    std::fmt::Debug,
};

lazy_static! {
    /// Compact ISO 8601 basic format in UTC, e.g. `20240115T000000Z`.
    static ref ISO_8601_COMPACT_REGEX: Regex = Regex::new(
        r"(?x)^
        (?P<year>\d{4})
        (?P<month>0[1-9]|1[0-2])
        (?P<day>0[1-9]|[12][0-9]|3[01])
        T
        (?P<hour>[01][0-9]|2[0-3])
        (?P<minute>[0-5][0-9])
        (?P<second>[0-5][0-9])
        Z$").unwrap();
}

/// A source of the current time for signing.
pub trait Clock: Debug + Send + Sync {
    /// Return the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// [`Clock`] that always returns the same instant. Useful for tests and for reproducing a
/// signature while debugging a mismatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The two renderings of the request instant that appear in a signed URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTimestamp {
    /// `YYYYMMDD'T'HHMMSS'Z'`, used for `X-Goog-Date` and the string to sign.
    pub request_timestamp: String,

    /// `YYYYMMDD`, used in the credential scope.
    pub datestamp: String,
}

impl From<DateTime<Utc>> for RequestTimestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        RequestTimestamp {
            request_timestamp: instant.format(ISO8601_COMPACT_FORMAT).to_string(),
            datestamp: instant.format(ISO8601_DATE_FORMAT).to_string(),
        }
    }
}

/// Parse a compact ISO 8601 UTC timestamp (`YYYYMMDD'T'HHMMSS'Z'`).
///
/// Returns `None` if the string does not match the format or does not name a real date.
pub(crate) fn parse_compact_iso8601(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != ISO8601_UTC_LENGTH {
        return None;
    }

    let cap = ISO_8601_COMPACT_REGEX.captures(s)?;
    let field = |name: &str| cap.name(name).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = i32::try_from(field("year")?).ok()?;
    let naive_date = NaiveDate::from_ymd_opt(year, field("month")?, field("day")?)?;
    let naive_time = NaiveTime::from_hms_opt(field("hour")?, field("minute")?, field("second")?)?;

    Some(NaiveDateTime::new(naive_date, naive_time).and_utc())
}
