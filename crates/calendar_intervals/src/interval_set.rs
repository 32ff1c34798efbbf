//! Partitioning a range into calendar intervals, and traversing the partition.

use std::fmt;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tracing::Instrument;

use crate::{
    error::{IntervalError, IntervalResult},
    instant::{format_instant, IntoInstant},
    interval::{Interval, Intervals},
    unit::{IntoUnit, Unit},
    visitor::Visitor,
};

/// The range `[start, end)` cut into consecutive intervals of one [`Unit`].
///
/// The boundaries are computed once at construction by stepping a cursor
/// forward from `start` one calendar unit at a time. `end` is always the last
/// boundary, so the final interval is truncated when the range is not a whole
/// number of units.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntervalSet {
    unit: Unit,
    /// Strictly increasing. First is `start`, last is `end`, never fewer than two.
    boundaries: Vec<DateTime<Utc>>,
    is_equipartition: bool,
}

/// Counters accumulated over a whole traversal, nested levels included.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, derive_more::AddAssign)]
pub struct TraversalSummary {
    /// Number of times the visitor callback was invoked
    pub visited: usize,
    /// Number of intervals which were subdivided and traversed
    pub descended: usize,
    /// Number of callback failures which were logged and skipped
    pub failed: usize,
}

impl IntervalSet {
    /// Partition `[start, end)` into intervals of `unit`.
    ///
    /// The unit is checked first, so an unrecognized unit is reported as
    /// [`IntervalError::InvalidUnit`] even when the bounds are also bad.
    /// Missing or unparseable bounds, or `start >= end`, are
    /// [`IntervalError::InvalidInput`].
    ///
    /// ```
    /// use calendar_intervals::{IntervalSet, Unit};
    ///
    /// let days = IntervalSet::new("2024-01-01", "2024-01-05", "day").unwrap();
    /// assert_eq!(days.len(), 4);
    /// assert_eq!(days.unit(), Unit::Day);
    /// assert!(days.is_equipartition());
    /// ```
    pub fn new(
        start: impl IntoInstant,
        end: impl IntoInstant,
        unit: impl IntoUnit,
    ) -> IntervalResult<Self> {
        let unit = unit.into_unit()?;
        let start = start.into_instant()?;
        let end = end.into_instant()?;
        if start >= end {
            return Err(IntervalError::InvalidInput(format!(
                "start {} is not before end {}",
                format_instant(&start),
                format_instant(&end)
            )));
        }
        Ok(Self::partition(start, end, unit))
    }

    /// Requires `start < end`.
    fn partition(start: DateTime<Utc>, end: DateTime<Utc>, unit: Unit) -> Self {
        let mut boundaries = Vec::new();
        let mut cursor = Some(start);
        // An unrepresentable step is necessarily past `end`, so it ends the walk
        // like any other overshoot.
        while let Some(t) = cursor.filter(|t| *t < end) {
            boundaries.push(t);
            cursor = unit.advance(t);
        }
        let is_equipartition = cursor == Some(end);
        boundaries.push(end);

        tracing::trace!(
            %unit,
            segments = boundaries.len() - 1,
            start = %format_instant(&start),
            end = %format_instant(&end),
            is_equipartition,
            "partitioned range"
        );

        Self {
            unit,
            boundaries,
            is_equipartition,
        }
    }

    /// The first boundary
    pub fn start(&self) -> DateTime<Utc> {
        self.boundaries[0]
    }

    /// The last boundary
    pub fn end(&self) -> DateTime<Utc> {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// The granularity of this partition
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Number of intervals, always at least one
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Always false, since `start < end` is enforced at construction
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the last interval is a whole unit rather than a truncated
    /// remainder
    pub fn is_equipartition(&self) -> bool {
        self.is_equipartition
    }

    /// All boundaries, `start` through `end` inclusive
    pub fn boundaries(&self) -> &[DateTime<Utc>] {
        &self.boundaries
    }

    /// Iterate over the intervals in order. Each call starts afresh.
    pub fn iter(&self) -> Intervals<'_> {
        Intervals::new(&self.boundaries, self.unit)
    }

    /// Visit every interval in order, descending into finer units wherever
    /// the visitor asks for it and allows it.
    ///
    /// Traversal is depth-first and pre-order: an interval is visited before
    /// its subdivisions, and all of those are visited before its next
    /// sibling. A callback error is logged and the interval it came from is
    /// skipped, subdivisions included; the traversal itself never fails.
    pub async fn accept<S: Send>(&self, visitor: &mut Visitor<S>) -> TraversalSummary {
        let summary = self.traverse(visitor).await;
        tracing::debug!(
            unit = %self.unit,
            depth = visitor.depth(),
            visited = summary.visited,
            descended = summary.descended,
            failed = summary.failed,
            "traversal complete"
        );
        summary
    }

    /// [`accept`](Self::accept), driven to completion on the current thread.
    pub fn accept_blocking<S: Send>(&self, visitor: &mut Visitor<S>) -> TraversalSummary {
        futures::executor::block_on(self.accept(visitor))
    }

    fn traverse<'a, S: Send>(
        &'a self,
        visitor: &'a mut Visitor<S>,
    ) -> BoxFuture<'a, TraversalSummary> {
        let span = tracing::trace_span!(
            "interval_set",
            unit = %self.unit,
            depth = visitor.depth(),
            len = self.len()
        );
        async move {
            let mut summary = TraversalSummary::default();
            for interval in self.iter() {
                let depth = visitor.depth();
                tracing::trace!(depth, %interval, "visit");
                summary.visited += 1;

                let descend = match visitor.visit(interval).await {
                    Ok(descend) => descend,
                    Err(err) => {
                        summary.failed += 1;
                        tracing::error!(
                            depth,
                            unit = %self.unit,
                            start = %format_instant(&interval.start),
                            end = %format_instant(&interval.end),
                            "visitor failed, skipping interval: {err:?}"
                        );
                        continue;
                    }
                };
                if !descend || !visitor.is_sub_intervals() {
                    continue;
                }
                let Some(finer) = self.unit.finer() else {
                    tracing::trace!(depth, unit = %self.unit, "no finer unit to descend into");
                    continue;
                };

                let children = Self::partition(interval.start, interval.end, finer);
                tracing::debug!(
                    depth,
                    %interval,
                    %finer,
                    len = children.len(),
                    "descending"
                );
                summary.descended += 1;
                let mut guard = visitor.descend();
                summary += children.traverse(&mut *guard).await;
            }
            summary
        }
        .instrument(span)
        .boxed()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = Interval;
    type IntoIter = Intervals<'a>;

    fn into_iter(self) -> Intervals<'a> {
        self.iter()
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} over [{}, {})",
            self.len(),
            self.unit,
            format_instant(&self.start()),
            format_instant(&self.end())
        )
    }
}
