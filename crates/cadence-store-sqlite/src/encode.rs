//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` so lexical order is chronological.
//! Session timestamps are local wall-clock `YYYY-MM-DD HH:MM:SS`. Colors are
//! stored as entered; unreadable colors decode to `None`.

use cadence_core::{
  AreaId, Color, RevisionId, SessionId, TagId, TopicId,
  area::{Area, Tag},
  color::effective_color,
  revision::{DueRevision, Revision, RevisionStatus},
  session::StudySession,
  topic::{Topic, TopicOverview},
};
use chrono::{NaiveDate, NaiveDateTime};

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── NaiveDateTime ───────────────────────────────────────────────────────────

pub fn encode_datetime(dt: NaiveDateTime) -> String {
  dt.format(DATETIME_FORMAT).to_string()
}

pub fn decode_datetime(s: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── RevisionStatus ──────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<RevisionStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown revision status: {s:?}")))
}

// ─── Durations ───────────────────────────────────────────────────────────────

pub fn encode_seconds(secs: u64) -> Result<i64> {
  i64::try_from(secs).map_err(|_| Error::Decode(format!("duration out of range: {secs}")))
}

/// Aggregates come back from `SUM` as signed integers; the column is
/// constrained non-negative.
pub fn decode_seconds(raw: i64) -> u64 { u64::try_from(raw).unwrap_or(0) }

// ─── Colors ──────────────────────────────────────────────────────────────────

pub fn encode_color(c: Option<&Color>) -> Option<&str> { c.map(Color::as_str) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawLabel`]; shared by areas and tags.
pub const LABEL_COLUMNS: &str = "id, name, color";

/// Raw values read from an `areas` or `tags` row.
pub struct RawLabel {
  pub id:    i64,
  pub name:  String,
  pub color: Option<String>,
}

impl RawLabel {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { id: row.get(0)?, name: row.get(1)?, color: row.get(2)? })
  }

  pub fn into_area(self) -> Area {
    Area {
      id:    AreaId(self.id),
      name:  self.name,
      color: Color::lenient(self.color.as_deref()),
    }
  }

  pub fn into_tag(self) -> Tag {
    Tag {
      id:    TagId(self.id),
      name:  self.name,
      color: Color::lenient(self.color.as_deref()),
    }
  }
}

/// Select list matching [`RawTopic::from_row`]. The area id is taken from
/// the joined `areas` row so a deleted area reads back as `NULL`.
pub const TOPIC_COLUMNS: &str = "
  t.id, t.title, a.id, t.start_date, t.tags, t.color, t.description,
  a.name, a.color,
  COALESCE(
    (SELECT SUM(s.duration_seconds) FROM study_sessions s WHERE s.topic_id = t.id),
    0
  )";

/// `FROM` clause every topic read uses.
pub const TOPIC_FROM: &str = "topics t LEFT JOIN areas a ON a.id = t.area_id";

/// Raw values read from a `topics` row joined with its area and time spent.
pub struct RawTopic {
  pub id:          i64,
  pub title:       String,
  pub area_id:     Option<i64>,
  pub start_date:  String,
  pub tags:        String,
  pub color:       Option<String>,
  pub description: String,
  pub area_name:   Option<String>,
  pub area_color:  Option<String>,
  pub time_spent:  i64,
}

impl RawTopic {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      area_id:     row.get(2)?,
      start_date:  row.get(3)?,
      tags:        row.get(4)?,
      color:       row.get(5)?,
      description: row.get(6)?,
      area_name:   row.get(7)?,
      area_color:  row.get(8)?,
      time_spent:  row.get(9)?,
    })
  }

  pub fn into_overview(self) -> Result<TopicOverview> {
    let color = Color::lenient(self.color.as_deref());
    let area_color = Color::lenient(self.area_color.as_deref());
    let effective_color = effective_color(area_color.as_ref(), color.as_ref());

    Ok(TopicOverview {
      topic: Topic {
        id: TopicId(self.id),
        title: self.title,
        area_id: self.area_id.map(AreaId),
        start_date: decode_date(&self.start_date)?,
        tags: self.tags,
        color,
        description: self.description,
      },
      area_name: self.area_name,
      effective_color,
      time_spent_seconds: decode_seconds(self.time_spent),
    })
  }
}

/// Column list matching [`RawRevision::from_row`].
pub const REVISION_COLUMNS: &str =
  "r.id, r.topic_id, r.scheduled_date, r.status, r.interval_days";

/// Raw values read from a `revisions` row.
pub struct RawRevision {
  pub id:             i64,
  pub topic_id:       i64,
  pub scheduled_date: String,
  pub status:         String,
  pub interval_days:  u32,
}

impl RawRevision {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      topic_id:       row.get(1)?,
      scheduled_date: row.get(2)?,
      status:         row.get(3)?,
      interval_days:  row.get(4)?,
    })
  }

  pub fn into_revision(self) -> Result<Revision> {
    Ok(Revision {
      id:             RevisionId(self.id),
      topic_id:       TopicId(self.topic_id),
      scheduled_date: decode_date(&self.scheduled_date)?,
      status:         decode_status(&self.status)?,
      interval_days:  self.interval_days,
    })
  }
}

/// Select list matching [`RawDueRevision::from_row`].
pub const DUE_REVISION_COLUMNS: &str = "
  r.id, r.topic_id, r.scheduled_date, r.status, r.interval_days,
  t.title, a.id, a.name, a.color, t.color";

/// A revision row joined with its topic and area.
pub struct RawDueRevision {
  pub revision:    RawRevision,
  pub title:       String,
  pub area_id:     Option<i64>,
  pub area_name:   Option<String>,
  pub area_color:  Option<String>,
  pub topic_color: Option<String>,
}

impl RawDueRevision {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      revision:    RawRevision::from_row(row)?,
      title:       row.get(5)?,
      area_id:     row.get(6)?,
      area_name:   row.get(7)?,
      area_color:  row.get(8)?,
      topic_color: row.get(9)?,
    })
  }

  pub fn into_due(self) -> Result<DueRevision> {
    let area_color = Color::lenient(self.area_color.as_deref());
    let topic_color = Color::lenient(self.topic_color.as_deref());

    Ok(DueRevision {
      revision:        self.revision.into_revision()?,
      topic_title:     self.title,
      area_id:         self.area_id.map(AreaId),
      area_name:       self.area_name,
      effective_color: effective_color(area_color.as_ref(), topic_color.as_ref()),
    })
  }
}

/// Raw values read from a `study_sessions` row.
pub struct RawSession {
  pub id:               i64,
  pub topic_id:         i64,
  pub duration_seconds: i64,
  pub occurred_at:      String,
}

impl RawSession {
  pub fn into_session(self) -> Result<StudySession> {
    Ok(StudySession {
      id:               SessionId(self.id),
      topic_id:         TopicId(self.topic_id),
      duration_seconds: decode_seconds(self.duration_seconds),
      occurred_at:      decode_datetime(&self.occurred_at)?,
    })
  }
}
