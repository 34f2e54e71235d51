//! The spaced-repetition interval policy.
//!
//! The policy is fixed: every new topic receives one revision per entry in
//! [`REVISION_INTERVALS`], scheduled that many days after its start date.

use chrono::{Days, NaiveDate};

/// Day offsets from a topic's start date, in ascending order. A one-week
/// check followed by progressively wider gaps.
pub const REVISION_INTERVALS: [u32; 5] = [7, 15, 30, 60, 120];

/// One entry of a freshly generated schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedRevision {
  pub scheduled_date: NaiveDate,
  pub interval_days:  u32,
}

/// Compute the initial schedule for a topic starting on `start`.
///
/// Returns `None` only if a date would overflow chrono's calendar range.
pub fn schedule_for(start: NaiveDate) -> Option<Vec<PlannedRevision>> {
  REVISION_INTERVALS
    .iter()
    .map(|&interval_days| {
      start
        .checked_add_days(Days::new(u64::from(interval_days)))
        .map(|scheduled_date| PlannedRevision { scheduled_date, interval_days })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn intervals_are_strictly_ascending() {
    assert!(REVISION_INTERVALS.windows(2).all(|w| w[0] < w[1]));
    assert!(REVISION_INTERVALS[0] > 0);
  }

  #[test]
  fn schedule_offsets_from_start() {
    let start = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
    let plan = schedule_for(start).unwrap();

    assert_eq!(plan.len(), REVISION_INTERVALS.len());
    assert_eq!(
      plan[0].scheduled_date,
      NaiveDate::from_ymd_opt(2026, 2, 12).unwrap()
    );
    for (planned, offset) in plan.iter().zip(REVISION_INTERVALS) {
      assert_eq!(planned.interval_days, offset);
      assert_eq!((planned.scheduled_date - start).num_days(), i64::from(offset));
    }
  }

  #[test]
  fn schedule_overflow_is_reported() {
    assert!(schedule_for(NaiveDate::MAX).is_none());
  }
}
