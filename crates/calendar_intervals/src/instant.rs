//! Coercion of caller input into UTC instants.
//!
//! Every boundary in this crate is a `chrono::DateTime<Utc>`. Callers may hand
//! us anything that reasonably names a point in time: a chrono value, an
//! RFC 3339 string, a bare calendar date, or milliseconds since the UNIX epoch.
//! Values that carry no offset are read as UTC, never as local time, so the
//! same input always denotes the same instant regardless of the host timezone.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{IntervalError, IntervalResult};

/// Naive date-time layouts accepted after RFC 3339 has been ruled out.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Anything that can be turned into a UTC instant, or fail with
/// [`IntervalError::InvalidInput`].
pub trait IntoInstant {
    /// Perform the conversion
    fn into_instant(self) -> IntervalResult<DateTime<Utc>>;
}

impl IntoInstant for DateTime<Utc> {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        Ok(self)
    }
}

impl IntoInstant for &DateTime<Utc> {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        Ok(*self)
    }
}

impl IntoInstant for DateTime<FixedOffset> {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        Ok(self.with_timezone(&Utc))
    }
}

impl IntoInstant for NaiveDateTime {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        Ok(Utc.from_utc_datetime(&self))
    }
}

impl IntoInstant for NaiveDate {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        let midnight = self
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| IntervalError::InvalidInput(format!("no midnight on {self}")))?;
        midnight.into_instant()
    }
}

/// Milliseconds since the UNIX epoch.
impl IntoInstant for i64 {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self).single().ok_or_else(|| {
            IntervalError::InvalidInput(format!("{self}ms is outside the representable range"))
        })
    }
}

impl IntoInstant for &str {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        parse_instant(self)
    }
}

impl IntoInstant for &String {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        parse_instant(self)
    }
}

impl IntoInstant for String {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        parse_instant(&self)
    }
}

/// `None` stands for a missing bound.
impl<T: IntoInstant> IntoInstant for Option<T> {
    fn into_instant(self) -> IntervalResult<DateTime<Utc>> {
        self.ok_or_else(|| IntervalError::InvalidInput("missing instant".into()))?
            .into_instant()
    }
}

/// Parse an instant from a string.
///
/// Tried in order: RFC 3339 with any offset, a naive date-time (with `T` or a
/// space between date and time, seconds optional), then a bare `YYYY-MM-DD`
/// date meaning midnight. Naive forms are taken as UTC.
pub fn parse_instant(s: &str) -> IntervalResult<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(IntervalError::InvalidInput("empty instant".into()));
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return t.into_instant();
    }
    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, format) {
            return t.into_instant();
        }
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => d.into_instant(),
        Err(err) => Err(IntervalError::InvalidInput(format!(
            "cannot parse '{s}' as an instant: {err}"
        ))),
    }
}

/// Format as RFC 3339 with a `Z` suffix for sane year ranges (0000-9999AD).
/// Beyond that RFC 3339 has no representation, so fall back to chrono's debug form.
pub fn format_instant(t: &DateTime<Utc>) -> String {
    if (0..=9999).contains(&t.year()) {
        t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
    } else {
        format!("{t:?}")
    }
}
