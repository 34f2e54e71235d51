//! Revisions: individual scheduled reviews of a topic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{AreaId, Color, RevisionId, TopicId};

/// Whether a scheduled review has been done. Both states are re-enterable.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RevisionStatus {
  #[default]
  Pending,
  Studied,
}

impl RevisionStatus {
  /// The text stored in the `status` column.
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_studied(self) -> bool { matches!(self, Self::Studied) }
}

/// One scheduled review occurrence for a topic.
///
/// Only `status` and `scheduled_date` ever change after creation, and the
/// date only through a missed-review shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
  pub id:             RevisionId,
  pub topic_id:       TopicId,
  pub scheduled_date: NaiveDate,
  pub status:         RevisionStatus,
  /// Offset in days from the topic's start date at creation time.
  pub interval_days:  u32,
}

/// One step of a planned reschedule. `from` is the date the plan was computed
/// against; the move only applies while the revision is still there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionMove {
  pub id:   RevisionId,
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// A revision joined with the topic fields needed to render it in a day,
/// calendar or "today" view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRevision {
  pub revision:        Revision,
  pub topic_title:     String,
  pub area_id:         Option<AreaId>,
  pub area_name:       Option<String>,
  /// Area color if set, otherwise the topic's own color.
  pub effective_color: Option<Color>,
}
