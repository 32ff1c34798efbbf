use std::time::Duration;

use calendar_intervals::{logging, Interval, IntervalSet, TraversalSummary, Unit, Visitor};
use chrono::{DateTime, TimeZone, Utc};
use futures::FutureExt;

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn year_2024_by_quarter() -> IntervalSet {
    IntervalSet::new("2024-01-01", "2025-01-01", "quarter").unwrap()
}

/// A visitor which records `(depth, interval)` for every visit and asks to
/// descend while the depth is at most `max_depth`.
fn recorder(max_depth: usize) -> Visitor<Vec<(usize, Interval)>> {
    Visitor::from_fn_with_state(Vec::new(), move |seen, interval| {
        let depth = seen.depth();
        seen.push((depth, interval));
        Ok(depth <= max_depth)
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn quarters_then_months_in_preorder() {
    logging::test_run().unwrap();

    let set = year_2024_by_quarter();
    // descend at depth 0 (quarters -> months), refuse at depth 1
    let mut visitor = Visitor::from_fn_with_state(Vec::new(), |seen, interval| {
        let depth = seen.depth();
        seen.push((depth, interval));
        Ok(depth < 1)
    })
    .sub_intervals(true);

    let summary = set.accept(&mut visitor).await;
    assert_eq!(
        summary,
        TraversalSummary {
            visited: 16,
            descended: 4,
            failed: 0
        }
    );
    assert_eq!(visitor.depth(), 0);

    let seen = visitor.into_state();
    let shape: Vec<_> = seen.iter().map(|(d, i)| (*d, i.unit)).collect();
    let mut expected = vec![];
    for _ in 0..4 {
        expected.push((0, Unit::Quarter));
        expected.extend([(1, Unit::Month); 3]);
    }
    pretty_assertions::assert_eq!(shape, expected);

    // second quarter is followed by April, May, June
    assert_eq!(seen[4].1.start, date(2024, 4, 1));
    let months: Vec<_> = seen[5..8].iter().map(|(_, i)| (i.start, i.end)).collect();
    pretty_assertions::assert_eq!(
        months,
        vec![
            (date(2024, 4, 1), date(2024, 5, 1)),
            (date(2024, 5, 1), date(2024, 6, 1)),
            (date(2024, 6, 1), date(2024, 7, 1)),
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn no_descent_without_sub_intervals() {
    logging::test_run().unwrap();

    let set = year_2024_by_quarter();
    let mut visitor = recorder(usize::MAX);
    assert!(!visitor.is_sub_intervals());

    let summary = set.accept(&mut visitor).await;
    assert_eq!(summary.visited, 4);
    assert_eq!(summary.descended, 0);
    assert!(visitor.state().iter().all(|(d, i)| *d == 0 && i.unit == Unit::Quarter));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_visit_skips_only_its_subtree() {
    logging::test_run().unwrap();

    let set = year_2024_by_quarter();
    let mut visitor = Visitor::from_fn_with_state(Vec::new(), |seen, interval| {
        if interval.unit == Unit::Quarter && interval.start == date(2024, 4, 1) {
            anyhow::bail!("no data for {interval}");
        }
        seen.push(interval.unit);
        Ok(interval.unit > Unit::Day)
    })
    .sub_intervals(true);

    let summary = set.accept(&mut visitor).await;
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.descended, 3 + 9);
    assert_eq!(visitor.depth(), 0);

    let seen = visitor.into_state();
    let quarters = seen.iter().filter(|u| **u == Unit::Quarter).count();
    let months = seen.iter().filter(|u| **u == Unit::Month).count();
    assert_eq!(quarters, 3);
    assert_eq!(months, 9);
    // months descend into days as well
    let days = seen.iter().filter(|u| **u == Unit::Day).count();
    assert_eq!(days, 366 - 30 - 31 - 30);
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_deep_in_the_tree_do_not_unbalance_depth() {
    logging::test_run().unwrap();

    let set = IntervalSet::new("2024-01-01", "2024-01-03", Unit::Day).unwrap();
    let mut visitor = Visitor::from_fn_with_state(Vec::new(), |depths, interval| {
        let depth = depths.depth();
        depths.push(depth);
        if interval.unit == Unit::Minute {
            anyhow::bail!("minutes are off limits");
        }
        Ok(true)
    })
    .sub_intervals(true);

    let summary = set.accept(&mut visitor).await;
    // 2 days, 48 hours, 48 * 60 failing minutes
    assert_eq!(summary.visited, 2 + 48 + 48 * 60);
    assert_eq!(summary.failed, 48 * 60);
    assert_eq!(visitor.depth(), 0);
    assert_eq!(visitor.state().iter().max(), Some(&2));
}

#[tokio::test(flavor = "multi_thread")]
async fn seconds_are_the_floor() {
    logging::test_run().unwrap();

    let set = IntervalSet::new("2024-06-01T12:00:00Z", "2024-06-01T13:00:00Z", Unit::Hour).unwrap();
    let mut visitor = recorder(usize::MAX).sub_intervals(true);

    let summary = set.accept(&mut visitor).await;
    assert_eq!(summary.visited, 1 + 60 + 3600);
    assert_eq!(summary.descended, 1 + 60);
    let deepest = visitor.state().iter().map(|(d, _)| *d).max();
    assert_eq!(deepest, Some(2));
    assert!(visitor
        .state()
        .iter()
        .filter(|(d, _)| *d == 2)
        .all(|(_, i)| i.unit == Unit::Second));
}

#[test_case::test_case(Unit::Week, "2024-01-01", "2024-01-15" => 2 + 14 ; "weeks into days")]
#[test_case::test_case(Unit::Month, "2024-02-01", "2024-03-01" => 1 + 29 ; "leap february into days")]
#[test_case::test_case(Unit::Year, "2023-01-01", "2025-01-01" => 2 + 24 ; "years into months")]
fn one_level_of_descent(unit: Unit, start: &str, end: &str) -> usize {
    let set = IntervalSet::new(start, end, unit).unwrap();
    let mut visitor = recorder(0).sub_intervals(true);
    set.accept_blocking(&mut visitor).visited
}

#[tokio::test(flavor = "multi_thread")]
async fn async_visits_keep_their_order() {
    logging::test_run().unwrap();

    let set = IntervalSet::new("2024-01-01", "2024-01-04", Unit::Day).unwrap();
    let mut visitor = Visitor::with_state(Vec::new(), |seen, interval| {
        async move {
            // later siblings sleep less, which would reorder a concurrent walk
            let nap = 3 - (interval.start.timestamp() - 1_704_067_200) / 86_400;
            tokio::time::sleep(Duration::from_millis(nap as u64 * 5)).await;
            seen.push(interval.start);
            Ok(false)
        }
        .boxed()
    });

    set.accept(&mut visitor).await;
    pretty_assertions::assert_eq!(
        visitor.into_state(),
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn visitor_is_reusable_across_traversals() {
    logging::test_run().unwrap();

    let mut visitor = Visitor::<usize>::from_fn(|count, _| {
        **count += 1;
        Ok(true)
    })
    .sub_intervals(true);

    let minutes = IntervalSet::new("2024-01-01", "2024-01-01T00:02:00Z", Unit::Minute).unwrap();
    minutes.accept(&mut visitor).await;
    assert_eq!(*visitor.state(), 2 + 120);
    assert_eq!(visitor.depth(), 0);

    visitor.set_sub_intervals(false);
    minutes.accept(&mut visitor).await;
    assert_eq!(*visitor.state(), 2 + 120 + 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn callback_can_switch_off_descent() {
    logging::test_run().unwrap();

    let set = year_2024_by_quarter();
    // after the first month is seen, stop descending anywhere
    let mut visitor = Visitor::from_fn_with_state(Vec::new(), |seen, interval| {
        if interval.unit == Unit::Month {
            seen.set_sub_intervals(false);
        }
        seen.push(interval.unit);
        Ok(true)
    })
    .sub_intervals(true);

    set.accept(&mut visitor).await;
    pretty_assertions::assert_eq!(
        visitor.into_state(),
        vec![
            Unit::Quarter,
            Unit::Month,
            Unit::Month,
            Unit::Month,
            Unit::Quarter,
            Unit::Quarter,
            Unit::Quarter,
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn abandoned_traversal_restores_depth() {
    logging::test_run().unwrap();

    let set = year_2024_by_quarter();
    let mut visitor = Visitor::<()>::new(|_, interval| {
        async move {
            if interval.unit == Unit::Month {
                futures::future::pending::<()>().await;
            }
            Ok(true)
        }
        .boxed()
    })
    .sub_intervals(true);

    let r = tokio::time::timeout(Duration::from_millis(50), set.accept(&mut visitor)).await;
    assert!(r.is_err());
    assert_eq!(visitor.depth(), 0);
}
