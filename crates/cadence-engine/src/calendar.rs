use cadence_core::{Error, Result};
use chrono::{Datelike as _, Days, Months, NaiveDate};

/// First and last day of `month` in `year`, for calendar grid queries.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
  let first = NaiveDate::from_ymd_opt(year, month, 1)
    .ok_or_else(|| Error::Validation(format!("no such month: {year}-{month:02}")))?;
  let last = first
    .checked_add_months(Months::new(1))
    .and_then(|next| next.pred_opt())
    .ok_or_else(|| Error::Validation(format!("month out of range: {year}-{month:02}")))?;
  Ok((first, last))
}

/// Monday and Sunday of the week containing `day`.
pub fn week_bounds(day: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
  let back = Days::new(u64::from(day.weekday().num_days_from_monday()));
  day
    .checked_sub_days(back)
    .and_then(|monday| Some((monday, monday.checked_add_days(Days::new(6))?)))
    .ok_or_else(|| Error::Validation(format!("week of {day} is out of range")))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn february_in_leap_year() {
    let (first, last) = month_bounds(2028, 2).unwrap();
    assert_eq!(first, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());
    assert_eq!(last, NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
  }

  #[test]
  fn december_rolls_into_next_year() {
    let (_, last) = month_bounds(2026, 12).unwrap();
    assert_eq!(last, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
  }

  #[test]
  fn week_spans_month_boundary() {
    // 2026-01-29 is a Thursday.
    let (monday, sunday) = week_bounds(NaiveDate::from_ymd_opt(2026, 1, 29).unwrap()).unwrap();
    assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
    assert_eq!(sunday, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

    let (monday, _) = week_bounds(monday).unwrap();
    assert_eq!(monday, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
  }

  #[test]
  fn month_thirteen_is_invalid() {
    assert!(matches!(month_bounds(2026, 13), Err(Error::Validation(_))));
  }
}
