//! Engine tests against an in-memory SQLite store.

use cadence_core::{
  Color, EntityKind, Error, RevisionId, TopicId,
  policy::REVISION_INTERVALS,
  revision::{Revision, RevisionStatus},
  store::StudyStore,
  topic::{NewTopic, TopicFilter, TopicUpdate},
};
use cadence_store_sqlite::SqliteStore;
use chrono::{NaiveDate, NaiveDateTime};

use crate::Scheduler;

fn scheduler() -> Scheduler<SqliteStore> {
  Scheduler::new(SqliteStore::open_in_memory().expect("in-memory store"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn at(d: NaiveDate, h: u32) -> NaiveDateTime { d.and_hms_opt(h, 0, 0).unwrap() }

fn color(raw: &str) -> Color { raw.parse().unwrap() }

fn start() -> NaiveDate { date(2026, 2, 5) }

fn new_topic(title: &str) -> NewTopic { NewTopic::new(title, start()) }

fn dates(revisions: &[Revision]) -> Vec<NaiveDate> {
  revisions.iter().map(|r| r.scheduled_date).collect()
}

// ─── Schedule generation ─────────────────────────────────────────────────────

#[test]
fn creation_generates_one_revision_per_interval() {
  let s = scheduler();
  let id = s
    .create_topic_with_revisions(new_topic("Direito Constitucional"))
    .unwrap();

  let revisions = s.revisions_for_topic(id).unwrap();
  assert_eq!(revisions.len(), REVISION_INTERVALS.len());
  for (revision, offset) in revisions.iter().zip(REVISION_INTERVALS) {
    assert_eq!(revision.status, RevisionStatus::Pending);
    assert_eq!(revision.interval_days, offset);
    assert_eq!(
      revision.scheduled_date,
      start() + chrono::Days::new(u64::from(offset))
    );
  }
}

#[test]
fn injected_failure_leaves_nothing_behind() {
  let s = scheduler();
  s.store()
    .connection()
    .execute_batch(
      "CREATE TRIGGER reject_last BEFORE INSERT ON revisions
       WHEN NEW.interval_days = 120
       BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

  let err = s.create_topic_with_revisions(new_topic("Calculus")).unwrap_err();
  assert!(matches!(err, Error::Storage(_)));
  assert!(s.is_empty().unwrap());
  assert!(s.topics().unwrap().is_empty());
  assert!(s.revisions_for_date(date(2026, 2, 12)).unwrap().is_empty());
}

#[test]
fn blank_title_is_a_validation_error() {
  let s = scheduler();
  let err = s.create_topic_with_revisions(new_topic("   ")).unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(s.is_empty().unwrap());
}

#[test]
fn unknown_area_is_rejected_on_create() {
  let s = scheduler();
  let mut topic = new_topic("Calculus");
  topic.area_id = Some(cadence_core::AreaId(12));
  let err = s.create_topic_with_revisions(topic).unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: EntityKind::Area, id: 12 }));
}

// ─── Status transitions ──────────────────────────────────────────────────────

#[test]
fn studied_then_pending_restores_revision() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let original = s.revisions_for_topic(id).unwrap()[0].clone();

  s.mark_as_studied(original.id).unwrap();
  let studied = s.store().get_revision(original.id).unwrap().unwrap();
  assert_eq!(studied.status, RevisionStatus::Studied);

  s.mark_as_pending(original.id).unwrap();
  let restored = s.store().get_revision(original.id).unwrap().unwrap();
  assert_eq!(restored, original);
}

#[test]
fn marking_does_not_touch_siblings() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();

  s.mark_as_studied(before[1].id).unwrap();

  let after = s.revisions_for_topic(id).unwrap();
  for (b, a) in before.iter().zip(&after) {
    if b.id != before[1].id {
      assert_eq!(a, b);
    }
  }
}

#[test]
fn marking_missing_revision_is_not_found() {
  let s = scheduler();
  assert!(s.mark_as_studied(RevisionId(1)).unwrap_err().is_not_found());
  assert!(s.mark_as_pending(RevisionId(1)).unwrap_err().is_not_found());
}

// ─── Missed-review shift ─────────────────────────────────────────────────────

#[test]
fn missed_review_shifts_whole_schedule_by_one_day() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();

  let after = s.mark_as_not_studied(before[0].id, id).unwrap();

  assert_eq!(after.len(), before.len());
  for (b, a) in before.iter().zip(&after) {
    assert_eq!(a.id, b.id);
    assert_eq!((a.scheduled_date - b.scheduled_date).num_days(), 1);
    assert_eq!(a.status, RevisionStatus::Pending);
  }
  assert!(after.windows(2).all(|w| w[0].scheduled_date < w[1].scheduled_date));
}

#[test]
fn shift_excludes_studied_history() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();
  s.mark_as_studied(before[1].id).unwrap();

  let after = s.mark_as_not_studied(before[0].id, id).unwrap();
  let by_id = |rid: RevisionId| after.iter().find(|r| r.id == rid).unwrap().clone();

  assert_eq!(by_id(before[0].id).scheduled_date, before[0].scheduled_date.succ_opt().unwrap());
  assert_eq!(by_id(before[1].id).scheduled_date, before[1].scheduled_date);
  assert_eq!(by_id(before[1].id).status, RevisionStatus::Studied);
  assert_eq!(by_id(before[2].id).scheduled_date, before[2].scheduled_date.succ_opt().unwrap());
}

#[test]
fn shift_leaves_earlier_revisions_alone() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();

  let after = s.mark_as_not_studied(before[2].id, id).unwrap();

  assert_eq!(dates(&after[..2]), dates(&before[..2]));
  for (b, a) in before[2..].iter().zip(&after[2..]) {
    assert_eq!(a.scheduled_date, b.scheduled_date.succ_opt().unwrap());
  }
}

#[test]
fn repeated_misses_compound() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();

  s.mark_as_not_studied(before[0].id, id).unwrap();
  let after = s.mark_as_not_studied(before[0].id, id).unwrap();

  for (b, a) in before.iter().zip(&after) {
    assert_eq!((a.scheduled_date - b.scheduled_date).num_days(), 2);
  }
}

/// Dates of one topic's schedule in interval order.
fn dates_by_interval(revisions: &[Revision]) -> Vec<NaiveDate> {
  let mut by_interval = revisions.to_vec();
  by_interval.sort_by_key(|r| r.interval_days);
  dates(&by_interval)
}

#[test]
fn repeated_misses_never_collide_with_studied_history() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();
  let (first, second) = (before[0].id, before[1].id);
  s.mark_as_studied(second).unwrap();

  // The +7 review walks towards the studied +15 one, a day per miss.
  let gap = (before[1].scheduled_date - before[0].scheduled_date).num_days();
  for _ in 1..gap {
    let after = s.mark_as_not_studied(first, id).unwrap();
    let by_interval = dates_by_interval(&after);
    assert!(
      by_interval.windows(2).all(|w| w[0] < w[1]),
      "dates must stay unique and in interval order: {by_interval:?}"
    );
  }

  let settled = s.revisions_for_topic(id).unwrap();
  assert_eq!(
    settled[0].scheduled_date.succ_opt(),
    Some(before[1].scheduled_date)
  );

  // One more miss would land on the studied date.
  let err = s.mark_as_not_studied(first, id).unwrap_err();
  assert!(matches!(err, Error::Validation(_)), "{err:?}");
  assert_eq!(s.revisions_for_topic(id).unwrap(), settled);

  // Undoing the studied mark lets the whole schedule move again.
  s.mark_as_pending(second).unwrap();
  let after = s.mark_as_not_studied(first, id).unwrap();
  let by_interval = dates_by_interval(&after);
  assert!(by_interval.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn shift_does_not_touch_other_topics() {
  let s = scheduler();
  let calculus = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let algebra = s.create_topic_with_revisions(new_topic("Algebra")).unwrap();
  let algebra_before = s.revisions_for_topic(algebra).unwrap();

  let first = s.revisions_for_topic(calculus).unwrap()[0].id;
  s.mark_as_not_studied(first, calculus).unwrap();

  assert_eq!(s.revisions_for_topic(algebra).unwrap(), algebra_before);
}

#[test]
fn shift_with_mismatched_topic_is_not_found_and_writes_nothing() {
  let s = scheduler();
  let calculus = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let algebra = s.create_topic_with_revisions(new_topic("Algebra")).unwrap();
  let before = s.revisions_for_topic(calculus).unwrap();

  let err = s.mark_as_not_studied(before[0].id, algebra).unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: EntityKind::Revision, .. }));
  assert_eq!(s.revisions_for_topic(calculus).unwrap(), before);

  assert!(
    s.mark_as_not_studied(RevisionId(999), calculus)
      .unwrap_err()
      .is_not_found()
  );
}

#[test]
fn failed_shift_rolls_back() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let before = s.revisions_for_topic(id).unwrap();

  s.store()
    .connection()
    .execute_batch(
      "CREATE TRIGGER reject_last_move BEFORE UPDATE OF scheduled_date ON revisions
       WHEN NEW.interval_days = 120
       BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

  let err = s.mark_as_not_studied(before[0].id, id).unwrap_err();
  assert!(matches!(err, Error::Storage(_)));
  assert_eq!(s.revisions_for_topic(id).unwrap(), before);
}

// ─── Colors ──────────────────────────────────────────────────────────────────

#[test]
fn color_inheritance_in_topics_and_day_view() {
  let s = scheduler();
  let math = s.add_area("Math", Some(&color("#FF0000"))).unwrap();
  let topic = NewTopic {
    area_id: Some(math.id),
    color: Some(color("#0000FF")),
    ..new_topic("Calculus")
  };
  s.create_topic_with_revisions(topic).unwrap();
  let day = date(2026, 2, 12);

  assert_eq!(s.topics().unwrap()[0].effective_color, Some(color("#FF0000")));
  assert_eq!(s.revisions_for_date(day).unwrap()[0].effective_color, Some(color("#FF0000")));

  s.update_area(math.id, "Math", None).unwrap();

  assert_eq!(s.topics().unwrap()[0].effective_color, Some(color("#0000FF")));
  assert_eq!(s.revisions_for_date(day).unwrap()[0].effective_color, Some(color("#0000FF")));
}

// ─── Areas and tags ──────────────────────────────────────────────────────────

#[test]
fn duplicate_area_leaves_single_row() {
  let s = scheduler();
  s.add_area("Math", None).unwrap();
  let err = s.add_area("Math", Some(&color("#abc"))).unwrap_err();

  assert!(err.is_duplicate_name());
  let areas = s.areas().unwrap();
  assert_eq!(areas.iter().filter(|a| a.name == "Math").count(), 1);
}

#[test]
fn names_are_trimmed_and_required() {
  let s = scheduler();
  let area = s.add_area("  Law  ", None).unwrap();
  assert_eq!(area.name, "Law");
  assert!(matches!(s.add_area("", None), Err(Error::Validation(_))));
  assert!(matches!(s.update_area(area.id, " ", None), Err(Error::Validation(_))));
  assert!(matches!(s.add_tag("\t", None), Err(Error::Validation(_))));
  assert!(s.add_area("Law", None).unwrap_err().is_duplicate_name());
}

#[test]
fn tags_crud() {
  let s = scheduler();
  let tag = s.add_tag("essencial", Some(&color("#00FF00"))).unwrap();
  s.update_tag(tag.id, "essential", None).unwrap();
  assert_eq!(s.tags().unwrap()[0].name, "essential");
  s.delete_tag(tag.id).unwrap();
  assert!(s.tags().unwrap().is_empty());
}

// ─── Topics ──────────────────────────────────────────────────────────────────

#[test]
fn update_topic_validates_and_applies() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let schedule = s.revisions_for_topic(id).unwrap();

  let err = s
    .update_topic(id, TopicUpdate { title: Some(" ".into()), ..Default::default() })
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));

  let err = s
    .update_topic(id, TopicUpdate {
      area_id: Some(Some(cadence_core::AreaId(5))),
      ..Default::default()
    })
    .unwrap_err();
  assert!(err.is_not_found());

  let overview = s
    .update_topic(id, TopicUpdate {
      title: Some("Calculus II".into()),
      description: Some("Integrals".into()),
      ..Default::default()
    })
    .unwrap();
  assert_eq!(overview.topic.title, "Calculus II");
  assert_eq!(overview.topic.description, "Integrals");
  assert_eq!(s.revisions_for_topic(id).unwrap(), schedule);
}

#[test]
fn search_is_accent_and_case_insensitive() {
  let s = scheduler();
  let law = s.add_area("Direito", None).unwrap();
  s.create_topic_with_revisions(NewTopic {
    area_id: Some(law.id),
    ..new_topic("Organização do Estado")
  })
  .unwrap();
  s.create_topic_with_revisions(new_topic("Funções")).unwrap();

  let hits = s
    .search_topics(&TopicFilter { text: Some("organizacao".into()), area_id: None })
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].area_name.as_deref(), Some("Direito"));

  let in_area = s
    .search_topics(&TopicFilter { text: None, area_id: Some(law.id) })
    .unwrap();
  assert_eq!(in_area.len(), 1);

  assert_eq!(s.search_topics(&TopicFilter::default()).unwrap().len(), 2);
}

#[test]
fn unknown_topic_lookups_are_not_found() {
  let s = scheduler();
  assert!(s.topic(TopicId(3)).unwrap_err().is_not_found());
  assert!(s.revisions_for_topic(TopicId(3)).unwrap_err().is_not_found());
  assert!(s.delete_topic(TopicId(3)).unwrap_err().is_not_found());
}

#[test]
fn calendar_groups_by_day() {
  let s = scheduler();
  s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  s.create_topic_with_revisions(new_topic("Algebra")).unwrap();

  let february = s.calendar_month(2026, 2).unwrap();
  assert_eq!(february.keys().copied().collect::<Vec<_>>(), [
    date(2026, 2, 12),
    date(2026, 2, 20),
  ]);
  assert_eq!(february[&date(2026, 2, 12)].len(), 2);

  assert!(s.calendar_month(2026, 0).is_err());
}

#[test]
fn topic_batch_creates_every_schedule() {
  let s = scheduler();
  let law = s.add_area("Direito", None).unwrap();
  let batch = vec![
    NewTopic { area_id: Some(law.id), ..new_topic("Direito Constitucional") },
    new_topic("Funções"),
    NewTopic::new("Genética", date(2026, 3, 1)),
  ];

  let ids = s.create_topics_with_revisions(batch).unwrap();
  assert_eq!(ids.len(), 3);
  for id in &ids {
    assert_eq!(s.revisions_for_topic(*id).unwrap().len(), REVISION_INTERVALS.len());
  }
  assert_eq!(s.topic(ids[0]).unwrap().area_name.as_deref(), Some("Direito"));
  assert!(s.create_topics_with_revisions(Vec::new()).unwrap().is_empty());
}

#[test]
fn invalid_entry_rejects_whole_batch() {
  let s = scheduler();
  let batch = vec![new_topic("Calculus"), new_topic("  "), new_topic("Algebra")];

  let err = s.create_topics_with_revisions(batch).unwrap_err();
  assert!(
    matches!(&err, Error::Validation(msg) if msg.starts_with("topic 2:")),
    "{err:?}"
  );
  assert!(s.is_empty().unwrap());

  let batch = vec![
    new_topic("Calculus"),
    NewTopic { area_id: Some(cadence_core::AreaId(9)), ..new_topic("Algebra") },
  ];
  assert!(s.create_topics_with_revisions(batch).unwrap_err().is_not_found());
  assert!(s.is_empty().unwrap());
}

#[test]
fn storage_failure_rolls_back_whole_batch() {
  let s = scheduler();
  s.store()
    .connection()
    .execute_batch(
      "CREATE TRIGGER reject_algebra BEFORE INSERT ON topics
       WHEN NEW.title = 'Algebra'
       BEGIN SELECT RAISE(ABORT, 'injected failure'); END;",
    )
    .unwrap();

  let batch = vec![new_topic("Calculus"), new_topic("Algebra")];
  let err = s.create_topics_with_revisions(batch).unwrap_err();
  assert!(matches!(err, Error::Storage(_)));
  assert!(s.is_empty().unwrap());
  assert!(s.revisions_for_date(date(2026, 2, 12)).unwrap().is_empty());
}

#[test]
fn week_range_crosses_month_boundary() {
  let s = scheduler();
  // +7 lands on Friday 2026-01-30, +15 on Wednesday 2026-02-04.
  let late_jan = s
    .create_topic_with_revisions(NewTopic::new("Calculus", date(2026, 1, 23)))
    .unwrap();
  let mid_jan = s
    .create_topic_with_revisions(NewTopic::new("Algebra", date(2026, 1, 20)))
    .unwrap();

  let due = s.revisions_between(date(2026, 1, 29), date(2026, 2, 4)).unwrap();
  let found: Vec<_> = due
    .iter()
    .map(|d| (d.revision.topic_id, d.revision.scheduled_date))
    .collect();
  assert_eq!(found, [
    (late_jan, date(2026, 1, 30)),
    (mid_jan, date(2026, 2, 4)),
  ]);

  assert!(matches!(
    s.revisions_between(date(2026, 2, 4), date(2026, 1, 29)),
    Err(Error::Validation(_))
  ));

  // Monday 2026-01-26 to Sunday 2026-02-01 also holds the Algebra +7.
  let week = s.calendar_week(date(2026, 1, 29)).unwrap();
  assert_eq!(week.keys().copied().collect::<Vec<_>>(), [
    date(2026, 1, 27),
    date(2026, 1, 30),
  ]);
  // Monday 2026-02-02 to Sunday 2026-02-08 holds both +15 reviews.
  let week = s.calendar_week(date(2026, 2, 2)).unwrap();
  assert_eq!(week.keys().copied().collect::<Vec<_>>(), [
    date(2026, 2, 4),
    date(2026, 2, 7),
  ]);
}

// ─── Study time ──────────────────────────────────────────────────────────────

#[test]
fn study_time_aggregates_per_day() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let day = date(2026, 2, 12);

  s.register_study_session_at(id, 600, at(day, 9)).unwrap();
  s.register_study_session_at(id, 300, at(day, 18)).unwrap();

  assert_eq!(s.study_time_for_date(day).unwrap(), 900);
  assert_eq!(s.study_time_total().unwrap(), 900);
  assert_eq!(s.topic(id).unwrap().time_spent_seconds, 900);
}

#[test]
fn register_study_session_uses_local_clock() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let session = s.register_study_session(id, 60).unwrap();
  assert_eq!(session.duration_seconds, 60);
  assert_eq!(s.study_time_for_date(session.occurred_at.date()).unwrap(), 60);
}

#[test]
fn zero_length_sessions_are_recorded() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  let day = date(2026, 2, 12);

  let session = s.register_study_session_at(id, 0, at(day, 9)).unwrap();
  assert_eq!(session.duration_seconds, 0);
  assert_eq!(s.store().study_sessions(id).unwrap().len(), 1);
  assert_eq!(s.study_time_for_date(day).unwrap(), 0);
}

#[test]
fn session_validation() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  assert!(matches!(
    s.register_study_session(id, u64::MAX),
    Err(Error::Validation(_))
  ));
  assert!(s.store().study_sessions(id).unwrap().is_empty());
  assert!(s.register_study_session(TopicId(77), 30).unwrap_err().is_not_found());
}

#[test]
fn sessions_survive_topic_deletion() {
  let s = scheduler();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  s.register_study_session_at(id, 1_200, at(start(), 8)).unwrap();

  s.delete_topic(id).unwrap();

  assert_eq!(s.study_time_total().unwrap(), 1_200);
  assert_eq!(s.study_time_for_date(start()).unwrap(), 1_200);
}

#[test]
fn day_summary_counts_pending_and_time() {
  let s = scheduler();
  let calculus = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  s.create_topic_with_revisions(new_topic("Algebra")).unwrap();
  let day = date(2026, 2, 12);

  let first = s.revisions_for_topic(calculus).unwrap()[0].id;
  s.mark_as_studied(first).unwrap();
  s.register_study_session_at(calculus, 1_500, at(day, 20)).unwrap();
  s.register_study_session_at(calculus, 100, at(start(), 20)).unwrap();

  let summary = s.day_summary(day).unwrap();
  assert_eq!(summary.revisions, 2);
  assert_eq!(summary.pending, 1);
  assert_eq!(summary.study_seconds, 1_500);
  assert_eq!(summary.total_study_seconds, 1_600);
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

#[test]
fn reset_database_empties_everything() {
  let s = scheduler();
  s.add_area("Math", None).unwrap();
  let id = s.create_topic_with_revisions(new_topic("Calculus")).unwrap();
  s.register_study_session_at(id, 60, at(start(), 9)).unwrap();
  assert!(!s.is_empty().unwrap());

  s.reset_database().unwrap();

  assert!(s.is_empty().unwrap());
  assert!(s.areas().unwrap().is_empty());
  assert_eq!(s.study_time_total().unwrap(), 0);
}
