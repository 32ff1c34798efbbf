//! Calendar granularities and their step arithmetic.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};

use crate::error::{IntervalError, IntervalResult};

/// The step size used to partition a range.
///
/// Variants are ordered from finest to coarsest.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// One second
    Second,
    /// One minute
    Minute,
    /// One hour
    Hour,
    /// One calendar day
    Day,
    /// Seven calendar days
    Week,
    /// One calendar month
    Month,
    /// Three calendar months
    Quarter,
    /// Twelve calendar months
    Year,
}

impl Unit {
    /// Every unit, finest first
    pub const ALL: [Unit; 8] = [
        Unit::Second,
        Unit::Minute,
        Unit::Hour,
        Unit::Day,
        Unit::Week,
        Unit::Month,
        Unit::Quarter,
        Unit::Year,
    ];

    /// The lowercase name of this unit
    pub fn name(&self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
            Unit::Month => "month",
            Unit::Quarter => "quarter",
            Unit::Year => "year",
        }
    }

    /// The unit an interval of this unit is subdivided into, if any.
    ///
    /// Weeks and months both split into days. Quarters and years both split
    /// into months. Seconds are the floor.
    pub fn finer(&self) -> Option<Unit> {
        match self {
            Unit::Second => None,
            Unit::Minute => Some(Unit::Second),
            Unit::Hour => Some(Unit::Minute),
            Unit::Day => Some(Unit::Hour),
            Unit::Week => Some(Unit::Day),
            Unit::Month => Some(Unit::Day),
            Unit::Quarter => Some(Unit::Month),
            Unit::Year => Some(Unit::Month),
        }
    }

    /// Step `t` forward by exactly one unit using UTC calendar fields.
    ///
    /// Month-based units keep the day of month and time of day. When the day
    /// does not exist in the target month the excess days roll into the next
    /// month, so Jan 31 plus one month is Mar 2 (or Mar 3 outside leap years).
    ///
    /// Returns `None` if the result is not representable.
    pub fn advance(&self, t: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Unit::Second => t.checked_add_signed(chrono::Duration::seconds(1)),
            Unit::Minute => t.checked_add_signed(chrono::Duration::minutes(1)),
            Unit::Hour => t.checked_add_signed(chrono::Duration::hours(1)),
            Unit::Day => t.checked_add_days(Days::new(1)),
            Unit::Week => t.checked_add_days(Days::new(7)),
            Unit::Month => add_months_rolling(t, 1),
            Unit::Quarter => add_months_rolling(t, 3),
            Unit::Year => add_months_rolling(t, 12),
        }
    }
}

fn add_months_rolling(t: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    let naive = t.naive_utc();
    let total = i64::from(naive.year()) * 12 + i64::from(naive.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let date = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(naive.day0())))?;
    Some(Utc.from_utc_datetime(&date.and_time(naive.time())))
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Unit::ALL
            .into_iter()
            .find(|u| u.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| IntervalError::InvalidUnit(s.to_string()))
    }
}

/// Anything that names a [`Unit`], or fails with [`IntervalError::InvalidUnit`].
pub trait IntoUnit {
    /// Perform the conversion
    fn into_unit(self) -> IntervalResult<Unit>;
}

impl IntoUnit for Unit {
    fn into_unit(self) -> IntervalResult<Unit> {
        Ok(self)
    }
}

impl IntoUnit for &str {
    fn into_unit(self) -> IntervalResult<Unit> {
        self.parse()
    }
}

impl IntoUnit for &String {
    fn into_unit(self) -> IntervalResult<Unit> {
        self.parse()
    }
}

impl IntoUnit for String {
    fn into_unit(self) -> IntervalResult<Unit> {
        self.parse()
    }
}
