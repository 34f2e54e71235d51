//! [`Scheduler`]: the public face of the engine.

use std::collections::BTreeMap;

use cadence_core::{
  AreaId, Color, EntityKind, Error, Result, RevisionId, TagId, TopicId,
  area::{Area, Tag},
  error::require_non_empty,
  policy::{PlannedRevision, schedule_for},
  revision::{DueRevision, Revision, RevisionStatus},
  session::{DaySummary, StudySession},
  store::StudyStore,
  topic::{NewTopic, TopicFilter, TopicOverview, TopicUpdate},
};
use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::{
  calendar::{month_bounds, week_bounds},
  shift::plan_shift,
};

/// The spaced-repetition engine, generic over its storage backend.
///
/// Every operation is synchronous and either fully applies or fails with an
/// error; nothing is retried or silently skipped.
pub struct Scheduler<S> {
  store: S,
}

impl<S: StudyStore> Scheduler<S> {
  pub fn new(store: S) -> Self { Self { store } }

  /// Borrow the underlying store.
  pub fn store(&self) -> &S { &self.store }

  pub fn into_store(self) -> S { self.store }

  // ── Areas ─────────────────────────────────────────────────────────────

  pub fn add_area(&self, name: &str, color: Option<&Color>) -> Result<Area> {
    let name = require_non_empty("area name", name)?;
    let area = self.store.add_area(&name, color)?;
    info!(area = %area.id, name = %area.name, "area created");
    Ok(area)
  }

  /// Rename or recolor an area. Topics follow the change automatically.
  pub fn update_area(&self, id: AreaId, name: &str, color: Option<&Color>) -> Result<Area> {
    let name = require_non_empty("area name", name)?;
    let area = self.store.update_area(id, &name, color)?;
    info!(area = %id, name = %area.name, "area updated");
    Ok(area)
  }

  /// Delete an area. Its topics stay, with no area and their own color.
  pub fn delete_area(&self, id: AreaId) -> Result<()> {
    self.store.delete_area(id)?;
    info!(area = %id, "area deleted");
    Ok(())
  }

  pub fn areas(&self) -> Result<Vec<Area>> { self.store.list_areas() }

  // ── Managed tags ──────────────────────────────────────────────────────

  pub fn add_tag(&self, name: &str, color: Option<&Color>) -> Result<Tag> {
    let name = require_non_empty("tag name", name)?;
    let tag = self.store.add_tag(&name, color)?;
    info!(tag = %tag.id, name = %tag.name, "tag created");
    Ok(tag)
  }

  pub fn update_tag(&self, id: TagId, name: &str, color: Option<&Color>) -> Result<Tag> {
    let name = require_non_empty("tag name", name)?;
    let tag = self.store.update_tag(id, &name, color)?;
    info!(tag = %id, name = %tag.name, "tag updated");
    Ok(tag)
  }

  pub fn delete_tag(&self, id: TagId) -> Result<()> {
    self.store.delete_tag(id)?;
    info!(tag = %id, "tag deleted");
    Ok(())
  }

  pub fn tags(&self) -> Result<Vec<Tag>> { self.store.list_tags() }

  // ── Topics ────────────────────────────────────────────────────────────

  fn require_area(&self, id: AreaId) -> Result<()> {
    match self.store.get_area(id)? {
      Some(_) => Ok(()),
      None => Err(Error::not_found(EntityKind::Area, id)),
    }
  }

  fn require_topic(&self, id: TopicId) -> Result<()> {
    match self.store.get_topic(id)? {
      Some(_) => Ok(()),
      None => Err(Error::not_found(EntityKind::Topic, id)),
    }
  }

  /// Create a topic together with one pending revision per entry of the
  /// interval policy, atomically.
  pub fn create_topic_with_revisions(&self, topic: NewTopic) -> Result<TopicId> {
    let (topic, plan) = self.prepare_topic(topic)?;
    let (created, revisions) = self.store.add_topic_with_revisions(&topic, &plan)?;
    info!(
      topic = %created.id,
      title = %created.title,
      revisions = revisions.len(),
      "topic created"
    );
    Ok(created.id)
  }

  /// Create several topics at once, each with its full schedule. The batch is
  /// all-or-nothing: one invalid entry or storage failure persists nothing.
  /// Validation errors name the 1-based position of the offending entry.
  pub fn create_topics_with_revisions(&self, topics: Vec<NewTopic>) -> Result<Vec<TopicId>> {
    let batch = topics
      .into_iter()
      .enumerate()
      .map(|(i, topic)| {
        self.prepare_topic(topic).map_err(|e| match e {
          Error::Validation(msg) => Error::Validation(format!("topic {}: {msg}", i + 1)),
          other => other,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    if batch.is_empty() {
      return Ok(Vec::new());
    }

    let created = self.store.add_topics_with_revisions(&batch)?;
    info!(topics = created.len(), "topic batch created");
    Ok(created.into_iter().map(|(topic, _)| topic.id).collect())
  }

  /// Validate a new topic and compute its initial schedule.
  fn prepare_topic(&self, topic: NewTopic) -> Result<(NewTopic, Vec<PlannedRevision>)> {
    let topic = NewTopic { title: require_non_empty("title", &topic.title)?, ..topic };
    if let Some(area_id) = topic.area_id {
      self.require_area(area_id)?;
    }
    let plan = schedule_for(topic.start_date).ok_or_else(|| {
      Error::Validation(format!("start date {} is out of range", topic.start_date))
    })?;
    Ok((topic, plan))
  }

  /// Edit a topic's descriptive fields. Its schedule is not touched.
  pub fn update_topic(&self, id: TopicId, update: TopicUpdate) -> Result<TopicOverview> {
    let update = TopicUpdate {
      title: update
        .title
        .as_deref()
        .map(|t| require_non_empty("title", t))
        .transpose()?,
      ..update
    };
    if let Some(Some(area_id)) = update.area_id {
      self.require_area(area_id)?;
    }

    if !update.is_empty() {
      self.store.update_topic(id, &update)?;
      info!(topic = %id, "topic updated");
    }
    self.topic(id)
  }

  /// Delete a topic and its revisions. Its study sessions remain in the
  /// ledger and keep counting towards total study time.
  pub fn delete_topic(&self, id: TopicId) -> Result<()> {
    self.store.delete_topic(id)?;
    info!(topic = %id, "topic deleted");
    Ok(())
  }

  /// A single topic with its area, effective color and time spent.
  pub fn topic(&self, id: TopicId) -> Result<TopicOverview> {
    self
      .store
      .get_topic_overview(id)?
      .ok_or_else(|| Error::not_found(EntityKind::Topic, id))
  }

  /// Every topic with its area, effective color and time spent.
  pub fn topics(&self) -> Result<Vec<TopicOverview>> { self.store.list_topics() }

  /// Topics matching `filter`, in the same order as [`topics`](Self::topics).
  pub fn search_topics(&self, filter: &TopicFilter) -> Result<Vec<TopicOverview>> {
    let mut topics = self.store.list_topics()?;
    topics.retain(|t| filter.matches(t));
    Ok(topics)
  }

  // ── Revisions ─────────────────────────────────────────────────────────

  /// The schedule of one topic, ordered by date.
  pub fn revisions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Revision>> {
    self.require_topic(topic_id)?;
    self.store.revisions_for_topic(topic_id)
  }

  /// Everything scheduled on `date`, pending first.
  pub fn revisions_for_date(&self, date: NaiveDate) -> Result<Vec<DueRevision>> {
    self.store.revisions_for_date(date)
  }

  /// Everything scheduled in `from..=to`, ordered by date, then as in
  /// [`revisions_for_date`](Self::revisions_for_date).
  pub fn revisions_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DueRevision>> {
    if from > to {
      return Err(Error::Validation(format!("empty date range: {from} to {to}")));
    }
    self.store.revisions_between(from, to)
  }

  /// Revisions of one calendar month grouped by day. Days with nothing
  /// scheduled are absent.
  pub fn calendar_month(
    &self,
    year: i32,
    month: u32,
  ) -> Result<BTreeMap<NaiveDate, Vec<DueRevision>>> {
    let (first, last) = month_bounds(year, month)?;
    self.grouped_by_day(first, last)
  }

  /// Revisions of the Monday-to-Sunday week containing `day`, grouped by day.
  pub fn calendar_week(&self, day: NaiveDate) -> Result<BTreeMap<NaiveDate, Vec<DueRevision>>> {
    let (first, last) = week_bounds(day)?;
    self.grouped_by_day(first, last)
  }

  fn grouped_by_day(
    &self,
    first: NaiveDate,
    last: NaiveDate,
  ) -> Result<BTreeMap<NaiveDate, Vec<DueRevision>>> {
    let mut days: BTreeMap<NaiveDate, Vec<DueRevision>> = BTreeMap::new();
    for due in self.revisions_between(first, last)? {
      days.entry(due.revision.scheduled_date).or_default().push(due);
    }
    Ok(days)
  }

  pub fn mark_as_studied(&self, id: RevisionId) -> Result<()> {
    self.store.set_revision_status(id, RevisionStatus::Studied)?;
    info!(revision = %id, "revision studied");
    Ok(())
  }

  /// Undo [`mark_as_studied`](Self::mark_as_studied). The date is unchanged.
  pub fn mark_as_pending(&self, id: RevisionId) -> Result<()> {
    self.store.set_revision_status(id, RevisionStatus::Pending)?;
    info!(revision = %id, "revision back to pending");
    Ok(())
  }

  /// Record a missed review: the revision moves one day later and every
  /// pending revision of `topic_id` on or after its original date moves with
  /// it, in one transaction. Returns the topic's schedule afterwards.
  ///
  /// Fails with [`Error::Validation`] if a moving revision would land on the
  /// date of a studied one, or if the schedule changed between the read and
  /// the write; nothing is moved in either case.
  pub fn mark_as_not_studied(
    &self,
    revision_id: RevisionId,
    topic_id: TopicId,
  ) -> Result<Vec<Revision>> {
    let revision = self
      .store
      .get_revision(revision_id)?
      .ok_or_else(|| Error::not_found(EntityKind::Revision, revision_id))?;

    if revision.topic_id != topic_id {
      warn!(
        revision = %revision_id,
        expected = %topic_id,
        actual = %revision.topic_id,
        "revision does not belong to topic"
      );
      return Err(Error::not_found(EntityKind::Revision, revision_id));
    }

    let schedule = self.store.revisions_for_topic(topic_id)?;
    let moves = plan_shift(&schedule, revision_id)?;
    self.store.reschedule_pending(&moves)?;

    info!(
      revision = %revision_id,
      topic = %topic_id,
      from = %revision.scheduled_date,
      moved = moves.len(),
      "revision missed, schedule shifted"
    );
    self.store.revisions_for_topic(topic_id)
  }

  // ── Study time ────────────────────────────────────────────────────────

  /// Append a finished study interval to the ledger, stamped with the
  /// current local time. Zero-length sessions (a timer stopped right away)
  /// are recorded like any other.
  pub fn register_study_session(
    &self,
    topic_id: TopicId,
    duration_seconds: u64,
  ) -> Result<StudySession> {
    self.register_study_session_at(topic_id, duration_seconds, Local::now().naive_local())
  }

  /// As [`register_study_session`](Self::register_study_session), with an
  /// explicit timestamp.
  pub fn register_study_session_at(
    &self,
    topic_id: TopicId,
    duration_seconds: u64,
    occurred_at: NaiveDateTime,
  ) -> Result<StudySession> {
    if i64::try_from(duration_seconds).is_err() {
      return Err(Error::Validation(format!(
        "study session duration out of range: {duration_seconds}s"
      )));
    }
    self.require_topic(topic_id)?;

    let session = self.store.add_study_session(topic_id, duration_seconds, occurred_at)?;
    info!(
      topic = %topic_id,
      seconds = duration_seconds,
      "study session recorded"
    );
    Ok(session)
  }

  pub fn study_time_for_date(&self, date: NaiveDate) -> Result<u64> {
    self.store.study_time_for_date(date)
  }

  pub fn study_time_total(&self) -> Result<u64> { self.store.study_time_total() }

  /// Counts and study time for the "today" dashboard.
  pub fn day_summary(&self, date: NaiveDate) -> Result<DaySummary> {
    let due = self.store.revisions_for_date(date)?;
    Ok(DaySummary {
      date,
      revisions: due.len(),
      pending: due.iter().filter(|d| !d.revision.status.is_studied()).count(),
      study_seconds: self.store.study_time_for_date(date)?,
      total_study_seconds: self.store.study_time_total()?,
    })
  }

  // ── Maintenance ───────────────────────────────────────────────────────

  /// `true` if no topics exist yet.
  pub fn is_empty(&self) -> Result<bool> { self.store.is_empty() }

  /// Irreversibly delete every area, tag, topic, revision and session.
  /// Callers are expected to obtain explicit confirmation first.
  pub fn reset_database(&self) -> Result<()> {
    warn!("resetting database");
    self.store.reset()?;
    debug!("database reset complete");
    Ok(())
  }
}
