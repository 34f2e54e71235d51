//! [`SqliteStore`]: the SQLite implementation of [`StudyStore`].

use std::{path::Path, time::Duration};

use cadence_core::{
  AreaId, Color, EntityKind, RevisionId, TagId, TopicId,
  area::{Area, Tag},
  policy::PlannedRevision,
  revision::{DueRevision, Revision, RevisionMove, RevisionStatus},
  session::StudySession,
  store::StudyStore,
  topic::{NewTopic, Topic, TopicOverview, TopicUpdate},
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::{
  Error, Result,
  encode::{
    DUE_REVISION_COLUMNS, LABEL_COLUMNS, REVISION_COLUMNS, RawDueRevision, RawLabel,
    RawRevision, RawSession, RawTopic, TOPIC_COLUMNS, TOPIC_FROM, decode_seconds,
    encode_color, encode_date, encode_datetime, encode_seconds,
  },
  error::is_unique_violation,
  schema::SCHEMA,
};

/// How long a writer waits on a lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Label tables ────────────────────────────────────────────────────────────

/// Areas and tags share a shape: `(id, name UNIQUE, color)`.
#[derive(Clone, Copy)]
enum LabelTable {
  Areas,
  Tags,
}

impl LabelTable {
  fn name(self) -> &'static str {
    match self {
      Self::Areas => "areas",
      Self::Tags => "tags",
    }
  }

  fn kind(self) -> EntityKind {
    match self {
      Self::Areas => EntityKind::Area,
      Self::Tags => EntityKind::Tag,
    }
  }

  /// Map a `UNIQUE` violation on `name` to [`Error::DuplicateName`].
  fn name_conflict(self, name: &str) -> impl FnOnce(rusqlite::Error) -> Error + '_ {
    move |e| {
      if is_unique_violation(&e) {
        Error::DuplicateName { kind: self.kind(), name: name.to_owned() }
      } else {
        Error::Database(e)
      }
    }
  }

  fn insert(self, conn: &Connection, name: &str, color: Option<&Color>) -> Result<RawLabel> {
    conn
      .execute(
        &format!("INSERT INTO {} (name, color) VALUES (?1, ?2)", self.name()),
        params![name, encode_color(color)],
      )
      .map_err(self.name_conflict(name))?;

    Ok(RawLabel {
      id:    conn.last_insert_rowid(),
      name:  name.to_owned(),
      color: color.map(|c| c.to_string()),
    })
  }

  fn update(
    self,
    conn: &Connection,
    id: i64,
    name: &str,
    color: Option<&Color>,
  ) -> Result<RawLabel> {
    let changed = conn
      .execute(
        &format!("UPDATE {} SET name = ?1, color = ?2 WHERE id = ?3", self.name()),
        params![name, encode_color(color), id],
      )
      .map_err(self.name_conflict(name))?;

    if changed == 0 {
      return Err(Error::NotFound { kind: self.kind(), id });
    }

    Ok(RawLabel { id, name: name.to_owned(), color: color.map(|c| c.to_string()) })
  }

  fn delete(self, conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute(
      &format!("DELETE FROM {} WHERE id = ?1", self.name()),
      params![id],
    )?;
    if changed == 0 {
      return Err(Error::NotFound { kind: self.kind(), id });
    }
    Ok(())
  }

  fn get(self, conn: &Connection, id: i64) -> Result<Option<RawLabel>> {
    Ok(
      conn
        .query_row(
          &format!("SELECT {LABEL_COLUMNS} FROM {} WHERE id = ?1", self.name()),
          params![id],
          RawLabel::from_row,
        )
        .optional()?,
    )
  }

  fn list(self, conn: &Connection) -> Result<Vec<RawLabel>> {
    let mut stmt = conn.prepare(&format!(
      "SELECT {LABEL_COLUMNS} FROM {} ORDER BY name COLLATE NOCASE, id",
      self.name()
    ))?;
    let rows = stmt
      .query_map([], RawLabel::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadence store backed by a single SQLite file.
///
/// The connection is opened once and owned for the lifetime of the store;
/// SQLite's own locking serializes writers from other processes.
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path)?;
    Self::init(conn)
  }

  /// Open a private in-memory store.
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    Self::init(conn)
  }

  fn init(conn: Connection) -> Result<Self> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch(SCHEMA)?;
    tracing::debug!("sqlite schema initialised");
    Ok(Self { conn })
  }

  /// The underlying connection, for maintenance tasks and tests.
  pub fn connection(&self) -> &Connection { &self.conn }

  /// Run `f` against the connection, converting errors into the core
  /// taxonomy.
  fn call<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> cadence_core::Result<T> {
    f(&self.conn).map_err(Into::into)
  }
}

fn read_topic(conn: &Connection, id: TopicId) -> Result<Option<RawTopic>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {TOPIC_COLUMNS} FROM {TOPIC_FROM} WHERE t.id = ?1"),
        params![id.0],
        RawTopic::from_row,
      )
      .optional()?,
  )
}

/// Insert one topic and its revisions. Runs inside the caller's transaction.
fn insert_topic(
  conn: &Connection,
  topic: &NewTopic,
  revisions: &[PlannedRevision],
) -> Result<(Topic, Vec<Revision>)> {
  conn.execute(
    "INSERT INTO topics (title, area_id, start_date, tags, color, description)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      topic.title,
      topic.area_id.map(|a| a.0),
      encode_date(topic.start_date),
      topic.tags,
      encode_color(topic.color.as_ref()),
      topic.description,
    ],
  )?;
  let topic_id = TopicId(conn.last_insert_rowid());

  let mut stmt = conn.prepare_cached(
    "INSERT INTO revisions (topic_id, scheduled_date, status, interval_days)
     VALUES (?1, ?2, ?3, ?4)",
  )?;
  let mut created = Vec::with_capacity(revisions.len());
  for planned in revisions {
    stmt.execute(params![
      topic_id.0,
      encode_date(planned.scheduled_date),
      RevisionStatus::Pending.as_str(),
      planned.interval_days,
    ])?;
    created.push(Revision {
      id:             RevisionId(conn.last_insert_rowid()),
      topic_id,
      scheduled_date: planned.scheduled_date,
      status:         RevisionStatus::Pending,
      interval_days:  planned.interval_days,
    });
  }

  let stored = Topic {
    id:          topic_id,
    title:       topic.title.clone(),
    area_id:     topic.area_id,
    start_date:  topic.start_date,
    tags:        topic.tags.clone(),
    color:       topic.color.clone(),
    description: topic.description.clone(),
  };
  Ok((stored, created))
}

fn read_due_revisions(
  conn: &Connection,
  from: NaiveDate,
  to: NaiveDate,
) -> Result<Vec<DueRevision>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {DUE_REVISION_COLUMNS}
     FROM revisions r
     JOIN topics t ON t.id = r.topic_id
     LEFT JOIN areas a ON a.id = t.area_id
     WHERE r.scheduled_date BETWEEN ?1 AND ?2
     ORDER BY r.scheduled_date, r.status, t.title COLLATE NOCASE, r.id"
  ))?;

  let raws = stmt
    .query_map(
      params![encode_date(from), encode_date(to)],
      RawDueRevision::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  raws.into_iter().map(RawDueRevision::into_due).collect()
}

// ─── StudyStore impl ─────────────────────────────────────────────────────────

impl StudyStore for SqliteStore {
  // ── Areas ─────────────────────────────────────────────────────────────────

  fn add_area(&self, name: &str, color: Option<&Color>) -> cadence_core::Result<Area> {
    self.call(|conn| Ok(LabelTable::Areas.insert(conn, name, color)?.into_area()))
  }

  fn update_area(
    &self,
    id: AreaId,
    name: &str,
    color: Option<&Color>,
  ) -> cadence_core::Result<Area> {
    self.call(|conn| Ok(LabelTable::Areas.update(conn, id.0, name, color)?.into_area()))
  }

  fn delete_area(&self, id: AreaId) -> cadence_core::Result<()> {
    self.call(|conn| LabelTable::Areas.delete(conn, id.0))
  }

  fn get_area(&self, id: AreaId) -> cadence_core::Result<Option<Area>> {
    self.call(|conn| Ok(LabelTable::Areas.get(conn, id.0)?.map(RawLabel::into_area)))
  }

  fn list_areas(&self) -> cadence_core::Result<Vec<Area>> {
    self.call(|conn| {
      Ok(
        LabelTable::Areas
          .list(conn)?
          .into_iter()
          .map(RawLabel::into_area)
          .collect(),
      )
    })
  }

  // ── Managed tags ──────────────────────────────────────────────────────────

  fn add_tag(&self, name: &str, color: Option<&Color>) -> cadence_core::Result<Tag> {
    self.call(|conn| Ok(LabelTable::Tags.insert(conn, name, color)?.into_tag()))
  }

  fn update_tag(
    &self,
    id: TagId,
    name: &str,
    color: Option<&Color>,
  ) -> cadence_core::Result<Tag> {
    self.call(|conn| Ok(LabelTable::Tags.update(conn, id.0, name, color)?.into_tag()))
  }

  fn delete_tag(&self, id: TagId) -> cadence_core::Result<()> {
    self.call(|conn| LabelTable::Tags.delete(conn, id.0))
  }

  fn list_tags(&self) -> cadence_core::Result<Vec<Tag>> {
    self.call(|conn| {
      Ok(
        LabelTable::Tags
          .list(conn)?
          .into_iter()
          .map(RawLabel::into_tag)
          .collect(),
      )
    })
  }

  // ── Topics ────────────────────────────────────────────────────────────────

  fn add_topic_with_revisions(
    &self,
    topic: &NewTopic,
    revisions: &[PlannedRevision],
  ) -> cadence_core::Result<(Topic, Vec<Revision>)> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;
      let created = insert_topic(&tx, topic, revisions)?;
      tx.commit()?;
      Ok(created)
    })
  }

  fn add_topics_with_revisions(
    &self,
    batch: &[(NewTopic, Vec<PlannedRevision>)],
  ) -> cadence_core::Result<Vec<(Topic, Vec<Revision>)>> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;
      let created = batch
        .iter()
        .map(|(topic, revisions)| insert_topic(&tx, topic, revisions))
        .collect::<Result<Vec<_>>>()?;
      tx.commit()?;
      Ok(created)
    })
  }

  fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> cadence_core::Result<Topic> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;

      let mut topic = read_topic(&tx, id)?
        .ok_or(Error::NotFound { kind: EntityKind::Topic, id: id.0 })?
        .into_overview()?
        .topic;

      if let Some(title) = &update.title {
        topic.title.clone_from(title);
      }
      if let Some(area_id) = update.area_id {
        topic.area_id = area_id;
      }
      if let Some(tags) = &update.tags {
        topic.tags.clone_from(tags);
      }
      if let Some(color) = &update.color {
        topic.color.clone_from(color);
      }
      if let Some(description) = &update.description {
        topic.description.clone_from(description);
      }

      tx.execute(
        "UPDATE topics
         SET title = ?1, area_id = ?2, tags = ?3, color = ?4, description = ?5
         WHERE id = ?6",
        params![
          topic.title,
          topic.area_id.map(|a| a.0),
          topic.tags,
          encode_color(topic.color.as_ref()),
          topic.description,
          id.0,
        ],
      )?;

      tx.commit()?;
      Ok(topic)
    })
  }

  fn delete_topic(&self, id: TopicId) -> cadence_core::Result<()> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;
      // Explicit so the result does not depend on `foreign_keys` being on.
      tx.execute("DELETE FROM revisions WHERE topic_id = ?1", params![id.0])?;
      let changed = tx.execute("DELETE FROM topics WHERE id = ?1", params![id.0])?;
      if changed == 0 {
        return Err(Error::NotFound { kind: EntityKind::Topic, id: id.0 });
      }
      tx.commit()?;
      Ok(())
    })
  }

  fn get_topic(&self, id: TopicId) -> cadence_core::Result<Option<Topic>> {
    Ok(self.get_topic_overview(id)?.map(|o| o.topic))
  }

  fn get_topic_overview(&self, id: TopicId) -> cadence_core::Result<Option<TopicOverview>> {
    self.call(|conn| read_topic(conn, id)?.map(RawTopic::into_overview).transpose())
  }

  fn list_topics(&self) -> cadence_core::Result<Vec<TopicOverview>> {
    self.call(|conn| {
      let mut stmt = conn.prepare(&format!(
        "SELECT {TOPIC_COLUMNS} FROM {TOPIC_FROM}
         ORDER BY t.title COLLATE NOCASE, t.id"
      ))?;
      let raws = stmt
        .query_map([], RawTopic::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawTopic::into_overview).collect()
    })
  }

  fn is_empty(&self) -> cadence_core::Result<bool> {
    self.call(|conn| {
      Ok(conn.query_row("SELECT NOT EXISTS (SELECT 1 FROM topics)", [], |r| r.get(0))?)
    })
  }

  // ── Revisions ─────────────────────────────────────────────────────────────

  fn get_revision(&self, id: RevisionId) -> cadence_core::Result<Option<Revision>> {
    self.call(|conn| {
      conn
        .query_row(
          &format!("SELECT {REVISION_COLUMNS} FROM revisions r WHERE r.id = ?1"),
          params![id.0],
          RawRevision::from_row,
        )
        .optional()?
        .map(RawRevision::into_revision)
        .transpose()
    })
  }

  fn revisions_for_topic(&self, topic_id: TopicId) -> cadence_core::Result<Vec<Revision>> {
    self.call(|conn| {
      let mut stmt = conn.prepare(&format!(
        "SELECT {REVISION_COLUMNS} FROM revisions r
         WHERE r.topic_id = ?1
         ORDER BY r.scheduled_date, r.id"
      ))?;
      let raws = stmt
        .query_map(params![topic_id.0], RawRevision::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawRevision::into_revision).collect()
    })
  }

  fn revisions_for_date(&self, date: NaiveDate) -> cadence_core::Result<Vec<DueRevision>> {
    self.call(|conn| read_due_revisions(conn, date, date))
  }

  fn revisions_between(
    &self,
    from: NaiveDate,
    to: NaiveDate,
  ) -> cadence_core::Result<Vec<DueRevision>> {
    self.call(|conn| read_due_revisions(conn, from, to))
  }

  fn set_revision_status(
    &self,
    id: RevisionId,
    status: RevisionStatus,
  ) -> cadence_core::Result<()> {
    self.call(|conn| {
      let changed = conn.execute(
        "UPDATE revisions SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id.0],
      )?;
      if changed == 0 {
        return Err(Error::NotFound { kind: EntityKind::Revision, id: id.0 });
      }
      Ok(())
    })
  }

  fn reschedule_pending(&self, moves: &[RevisionMove]) -> cadence_core::Result<()> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;
      {
        let mut stmt = tx.prepare(
          "UPDATE revisions SET scheduled_date = ?1, status = ?2
           WHERE id = ?3 AND scheduled_date = ?4",
        )?;
        for m in moves {
          let changed = stmt.execute(params![
            encode_date(m.to),
            RevisionStatus::Pending.as_str(),
            m.id.0,
            encode_date(m.from),
          ])?;
          if changed == 0 {
            let exists: bool = tx.query_row(
              "SELECT EXISTS (SELECT 1 FROM revisions WHERE id = ?1)",
              params![m.id.0],
              |r| r.get(0),
            )?;
            // Dropping `tx` rolls back the moves already applied.
            return Err(if exists {
              Error::Stale { kind: EntityKind::Revision, id: m.id.0 }
            } else {
              Error::NotFound { kind: EntityKind::Revision, id: m.id.0 }
            });
          }
        }
      }
      tx.commit()?;
      Ok(())
    })
  }

  // ── Study sessions ────────────────────────────────────────────────────────

  fn add_study_session(
    &self,
    topic_id: TopicId,
    duration_seconds: u64,
    occurred_at: NaiveDateTime,
  ) -> cadence_core::Result<StudySession> {
    self.call(|conn| {
      let occurred_at_str = encode_datetime(occurred_at);
      conn.execute(
        "INSERT INTO study_sessions (topic_id, duration_seconds, occurred_at)
         VALUES (?1, ?2, ?3)",
        params![topic_id.0, encode_seconds(duration_seconds)?, occurred_at_str],
      )?;

      RawSession {
        id: conn.last_insert_rowid(),
        topic_id: topic_id.0,
        duration_seconds: encode_seconds(duration_seconds)?,
        occurred_at: occurred_at_str,
      }
      .into_session()
    })
  }

  fn study_sessions(&self, topic_id: TopicId) -> cadence_core::Result<Vec<StudySession>> {
    self.call(|conn| {
      let mut stmt = conn.prepare(
        "SELECT id, topic_id, duration_seconds, occurred_at
         FROM study_sessions
         WHERE topic_id = ?1
         ORDER BY occurred_at, id",
      )?;
      let raws = stmt
        .query_map(params![topic_id.0], |row| {
          Ok(RawSession {
            id:               row.get(0)?,
            topic_id:         row.get(1)?,
            duration_seconds: row.get(2)?,
            occurred_at:      row.get(3)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      raws.into_iter().map(RawSession::into_session).collect()
    })
  }

  fn study_time_for_date(&self, date: NaiveDate) -> cadence_core::Result<u64> {
    self.call(|conn| {
      let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(duration_seconds), 0)
         FROM study_sessions
         WHERE date(occurred_at) = ?1",
        params![encode_date(date)],
        |r| r.get(0),
      )?;
      Ok(decode_seconds(total))
    })
  }

  fn study_time_total(&self) -> cadence_core::Result<u64> {
    self.call(|conn| {
      let total: i64 = conn.query_row(
        "SELECT COALESCE(SUM(duration_seconds), 0) FROM study_sessions",
        [],
        |r| r.get(0),
      )?;
      Ok(decode_seconds(total))
    })
  }

  // ── Maintenance ───────────────────────────────────────────────────────────

  fn reset(&self) -> cadence_core::Result<()> {
    self.call(|conn| {
      let tx = conn.unchecked_transaction()?;
      tx.execute_batch(
        "DELETE FROM revisions;
         DELETE FROM study_sessions;
         DELETE FROM topics;
         DELETE FROM areas;
         DELETE FROM tags;
         DELETE FROM sqlite_sequence;",
      )?;
      tx.commit()?;
      tracing::debug!("all tables truncated");
      Ok(())
    })
  }
}
