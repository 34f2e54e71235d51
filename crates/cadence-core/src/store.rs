//! The `StudyStore` trait: raw persistence primitives.
//!
//! The trait is implemented by storage backends (e.g. `cadence-store-sqlite`).
//! It carries no scheduling policy; the engine in `cadence-engine` decides
//! *which* rows to write, the store only guarantees that each call is applied
//! atomically.
//!
//! All methods are synchronous and run on the caller's thread.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
  AreaId, Color, Result, RevisionId, TagId, TopicId,
  area::{Area, Tag},
  policy::PlannedRevision,
  revision::{DueRevision, Revision, RevisionMove, RevisionStatus},
  session::StudySession,
  topic::{NewTopic, Topic, TopicOverview, TopicUpdate},
};

/// Abstraction over a Cadence storage backend.
///
/// Errors follow the [`crate::Error`] taxonomy: unique-name violations are
/// [`DuplicateName`](crate::Error::DuplicateName), writes against missing
/// rows are [`NotFound`](crate::Error::NotFound), and backend failures are
/// [`Storage`](crate::Error::Storage).
pub trait StudyStore {
  // ── Areas ─────────────────────────────────────────────────────────────

  fn add_area(&self, name: &str, color: Option<&Color>) -> Result<Area>;

  fn update_area(&self, id: AreaId, name: &str, color: Option<&Color>) -> Result<Area>;

  /// Delete an area. Topics referencing it are left untouched and resolve to
  /// "no area" from then on.
  fn delete_area(&self, id: AreaId) -> Result<()>;

  fn get_area(&self, id: AreaId) -> Result<Option<Area>>;

  /// All areas ordered by name.
  fn list_areas(&self) -> Result<Vec<Area>>;

  // ── Managed tags ──────────────────────────────────────────────────────

  fn add_tag(&self, name: &str, color: Option<&Color>) -> Result<Tag>;

  fn update_tag(&self, id: TagId, name: &str, color: Option<&Color>) -> Result<Tag>;

  fn delete_tag(&self, id: TagId) -> Result<()>;

  /// All managed tags ordered by name.
  fn list_tags(&self) -> Result<Vec<Tag>>;

  // ── Topics ────────────────────────────────────────────────────────────

  /// Insert a topic together with its initial revisions in one transaction.
  /// Either everything is persisted or nothing is.
  fn add_topic_with_revisions(
    &self,
    topic: &NewTopic,
    revisions: &[PlannedRevision],
  ) -> Result<(Topic, Vec<Revision>)>;

  /// Insert several topics with their revisions in one transaction. Either
  /// every topic of the batch is persisted or none is.
  fn add_topics_with_revisions(
    &self,
    batch: &[(NewTopic, Vec<PlannedRevision>)],
  ) -> Result<Vec<(Topic, Vec<Revision>)>>;

  fn update_topic(&self, id: TopicId, update: &TopicUpdate) -> Result<Topic>;

  /// Delete a topic and its revisions. Study sessions are kept.
  fn delete_topic(&self, id: TopicId) -> Result<()>;

  fn get_topic(&self, id: TopicId) -> Result<Option<Topic>>;

  /// A single topic joined with its area, resolved color and time spent.
  fn get_topic_overview(&self, id: TopicId) -> Result<Option<TopicOverview>>;

  /// Every topic joined with its area, resolved color and time spent,
  /// ordered by title (case-insensitive), then id.
  fn list_topics(&self) -> Result<Vec<TopicOverview>>;

  /// `true` if no topics exist.
  fn is_empty(&self) -> Result<bool>;

  // ── Revisions ─────────────────────────────────────────────────────────

  fn get_revision(&self, id: RevisionId) -> Result<Option<Revision>>;

  /// Revisions of one topic ordered by `scheduled_date`, then id.
  fn revisions_for_topic(&self, topic_id: TopicId) -> Result<Vec<Revision>>;

  /// Revisions scheduled on `date`, pending first, then by topic title.
  fn revisions_for_date(&self, date: NaiveDate) -> Result<Vec<DueRevision>>;

  /// Revisions scheduled in `from..=to`, ordered by date, then as in
  /// [`revisions_for_date`](Self::revisions_for_date).
  fn revisions_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DueRevision>>;

  fn set_revision_status(&self, id: RevisionId, status: RevisionStatus) -> Result<()>;

  /// Move each listed revision from `from` to `to` and mark it pending, all
  /// in one transaction. Nothing is written if any id does not exist
  /// (`NotFound`) or any revision is no longer on its `from` date
  /// (`Validation`), so a plan computed from an outdated read never
  /// overwrites a newer schedule.
  fn reschedule_pending(&self, moves: &[RevisionMove]) -> Result<()>;

  // ── Study sessions ────────────────────────────────────────────────────

  /// Append one session to the ledger.
  fn add_study_session(
    &self,
    topic_id: TopicId,
    duration_seconds: u64,
    occurred_at: NaiveDateTime,
  ) -> Result<StudySession>;

  /// Every session recorded against `topic_id`, oldest first. Sessions of
  /// deleted topics are still returned.
  fn study_sessions(&self, topic_id: TopicId) -> Result<Vec<StudySession>>;

  /// Sum of session durations recorded on `date`.
  fn study_time_for_date(&self, date: NaiveDate) -> Result<u64>;

  /// Sum of every session duration ever recorded.
  fn study_time_total(&self) -> Result<u64>;

  // ── Maintenance ───────────────────────────────────────────────────────

  /// Delete every row of every table.
  fn reset(&self) -> Result<()>;
}
