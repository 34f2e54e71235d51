//! Parsing of command-line values and human-readable rendering.

use anyhow::{Context as _, bail};
use cadence_core::{
  Color,
  area::{Area, Tag},
  revision::{DueRevision, Revision},
  session::DaySummary,
  topic::TopicOverview,
};
use chrono::NaiveDate;

// ─── Input ───────────────────────────────────────────────────────────────────

/// Accepts ISO `YYYY-MM-DD` as well as `DD/MM/YYYY`.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
    .with_context(|| format!("invalid date {s:?}; expected YYYY-MM-DD or DD/MM/YYYY"))
}

/// `YYYY-MM` into `(year, month)`.
pub fn parse_month(s: &str) -> anyhow::Result<(i32, u32)> {
  let (year, month) = s
    .split_once('-')
    .with_context(|| format!("invalid month {s:?}; expected YYYY-MM"))?;
  Ok((
    year.parse().with_context(|| format!("invalid year in {s:?}"))?,
    month.parse().with_context(|| format!("invalid month in {s:?}"))?,
  ))
}

/// Durations such as `90`, `45s`, `25m`, `1h30m`. A bare number is seconds.
pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
  let s = s.trim();
  if let Ok(secs) = s.parse::<u64>() {
    return Ok(secs);
  }

  let mut total: u64 = 0;
  let mut digits = String::new();
  for c in s.chars() {
    if c.is_ascii_digit() {
      digits.push(c);
      continue;
    }
    let unit = match c {
      'h' => 3_600,
      'm' => 60,
      's' => 1,
      _ => bail!("invalid duration {s:?}: unexpected {c:?}"),
    };
    if digits.is_empty() {
      bail!("invalid duration {s:?}: unit {c:?} without a number");
    }
    let n: u64 = digits.parse()?;
    total = n
      .checked_mul(unit)
      .and_then(|v| total.checked_add(v))
      .with_context(|| format!("duration {s:?} is too long"))?;
    digits.clear();
  }
  if !digits.is_empty() {
    bail!("invalid duration {s:?}: trailing number without a unit");
  }
  Ok(total)
}

/// Lenient color input: anything unparseable means "no color".
pub fn parse_color(raw: Option<&str>) -> Option<Color> {
  let color = Color::lenient(raw);
  if let Some(raw) = raw
    && color.is_none()
  {
    tracing::warn!(%raw, "ignoring invalid color");
  }
  color
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// `1h 05min`, `25min`, `0min`.
pub fn format_duration(secs: u64) -> String {
  let hours = secs / 3_600;
  let minutes = (secs % 3_600) / 60;
  if hours > 0 {
    format!("{hours}h {minutes:02}min")
  } else {
    format!("{minutes}min")
  }
}

fn swatch(color: Option<&Color>) -> String {
  color.map(|c| format!(" [{c}]")).unwrap_or_default()
}

pub fn area_line(area: &Area) -> String {
  format!("{:>4}  {}{}", area.id, area.name, swatch(area.color.as_ref()))
}

pub fn tag_line(tag: &Tag) -> String {
  format!("{:>4}  {}{}", tag.id, tag.name, swatch(tag.color.as_ref()))
}

pub fn topic_line(o: &TopicOverview) -> String {
  format!(
    "{:>4}  {}  ({}, from {}, studied {}){}",
    o.topic.id,
    o.topic.title,
    o.area_name.as_deref().unwrap_or("no area"),
    o.topic.start_date,
    format_duration(o.time_spent_seconds),
    swatch(o.effective_color.as_ref()),
  )
}

pub fn revision_line(r: &Revision) -> String {
  format!(
    "{:>4}  {}  +{}d  {}",
    r.id, r.scheduled_date, r.interval_days, r.status
  )
}

pub fn due_line(d: &DueRevision) -> String {
  let mark = if d.revision.status.is_studied() { "x" } else { " " };
  format!(
    "[{mark}] {:>4}  {} ({}) topic {}, +{}d{}",
    d.revision.id,
    d.topic_title,
    d.area_name.as_deref().unwrap_or("no area"),
    d.revision.topic_id,
    d.revision.interval_days,
    swatch(d.effective_color.as_ref()),
  )
}

pub fn summary_lines(s: &DaySummary) -> Vec<String> {
  vec![
    format!("Date:            {}", s.date),
    format!("Revisions:       {} ({} pending)", s.revisions, s.pending),
    format!("Study time:      {}", format_duration(s.study_seconds)),
    format!("Total time:      {}", format_duration(s.total_study_seconds)),
  ]
}
