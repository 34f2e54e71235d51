//! Study sessions: the append-only study-time ledger.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{SessionId, TopicId};

/// A finished, timed study interval. Never edited or deleted once written;
/// rows survive deletion of their topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
  pub id:               SessionId,
  pub topic_id:         TopicId,
  pub duration_seconds: u64,
  /// Local wall-clock time the session was recorded.
  pub occurred_at:      NaiveDateTime,
}

/// Aggregates shown on the "today" dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
  pub date:                NaiveDate,
  pub revisions:           usize,
  pub pending:             usize,
  pub study_seconds:       u64,
  pub total_study_seconds: u64,
}
