#![warn(missing_docs)]
//! Partition a UTC date-time range into calendar intervals, and walk them.
//!
//! An [`IntervalSet`] cuts `[start, end)` into consecutive intervals of one
//! [`Unit`], from seconds up to years, stepping with calendar arithmetic on
//! UTC fields. The final interval ends exactly at `end`, so it is truncated
//! when the range is not a whole number of units.
//!
//! [`IntervalSet::accept`] drives a [`Visitor`] over those intervals. For
//! each interval the visitor may ask to go one unit finer, in which case that
//! interval is partitioned again and traversed before its next sibling. The
//! visitor decides how deep to go, interval by interval.
//!
//! ```
//! use calendar_intervals::{IntervalSet, Unit, Visitor};
//!
//! let year = IntervalSet::new("2024-01-01", "2025-01-01", Unit::Quarter).unwrap();
//!
//! // Record every interval, splitting quarters into months but no further.
//! let mut visitor = Visitor::from_fn_with_state(Vec::new(), |seen, interval| {
//!     let depth = seen.depth();
//!     seen.push((depth, interval.unit));
//!     Ok(depth < 1)
//! })
//! .sub_intervals(true);
//!
//! let summary = year.accept_blocking(&mut visitor);
//! assert_eq!(summary.visited, 16);
//! assert_eq!(visitor.state()[..4], [
//!     (0, Unit::Quarter),
//!     (1, Unit::Month),
//!     (1, Unit::Month),
//!     (1, Unit::Month),
//! ]);
//! ```

#[allow(missing_docs)]
mod error;
pub mod instant;
mod interval;
mod interval_set;
pub mod logging;
mod unit;
mod visitor;

pub use error::{IntervalError, IntervalResult, VisitResult};
pub use instant::{parse_instant, IntoInstant};
pub use interval::{Interval, Intervals};
pub use interval_set::{IntervalSet, TraversalSummary};
pub use unit::{IntoUnit, Unit};
pub use visitor::{VisitFn, VisitScope, Visitor};
