use std::{fmt, iter::FusedIterator, slice::Windows};

use chrono::{DateTime, Utc};

use crate::{instant::format_instant, unit::Unit};

/// One half-open sub-range `[start, end)` produced by an
/// [`IntervalSet`](crate::IntervalSet), tagged with the unit that produced it.
///
/// Intervals are plain values. They are derived from the set's boundaries on
/// demand and never alias any state of the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Interval {
    /// Inclusive
    pub start: DateTime<Utc>,
    /// Exclusive
    pub end: DateTime<Utc>,
    /// The granularity this interval was cut at
    pub unit: Unit,
}

impl Interval {
    /// Length of the interval. The last interval of a set may be shorter than a
    /// full unit.
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Whether `t` falls within `[start, end)`
    pub fn contains(&self, t: &DateTime<Utc>) -> bool {
        self.start <= *t && *t < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}) {}",
            format_instant(&self.start),
            format_instant(&self.end),
            self.unit
        )
    }
}

/// Iterator over the intervals of a set, walking its boundaries pairwise.
#[derive(Clone, Debug)]
pub struct Intervals<'a> {
    windows: Windows<'a, DateTime<Utc>>,
    unit: Unit,
}

impl<'a> Intervals<'a> {
    pub(crate) fn new(boundaries: &'a [DateTime<Utc>], unit: Unit) -> Self {
        Self {
            windows: boundaries.windows(2),
            unit,
        }
    }

    fn make(&self, pair: &[DateTime<Utc>]) -> Interval {
        Interval {
            start: pair[0],
            end: pair[1],
            unit: self.unit,
        }
    }
}

impl<'a> Iterator for Intervals<'a> {
    type Item = Interval;

    fn next(&mut self) -> Option<Interval> {
        let pair = self.windows.next()?;
        Some(self.make(pair))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.windows.size_hint()
    }
}

impl<'a> DoubleEndedIterator for Intervals<'a> {
    fn next_back(&mut self) -> Option<Interval> {
        let pair = self.windows.next_back()?;
        Some(self.make(pair))
    }
}

impl<'a> ExactSizeIterator for Intervals<'a> {}

impl<'a> FusedIterator for Intervals<'a> {}
