//! Topics: the units of study that own a revision schedule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{AreaId, Color, TopicId};

/// A subject of study.
///
/// `area_id` is a weak reference: the area may since have been deleted, in
/// which case the topic is treated as having no area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
  pub id:          TopicId,
  pub title:       String,
  pub area_id:     Option<AreaId>,
  pub start_date:  NaiveDate,
  /// Comma-separated free text; see [`Topic::tag_list`].
  pub tags:        String,
  pub color:       Option<Color>,
  pub description: String,
}

impl Topic {
  /// The individual entries of the free-text `tags` field.
  pub fn tag_list(&self) -> Vec<&str> { split_tags(&self.tags) }
}

pub fn split_tags(tags: &str) -> Vec<&str> {
  tags
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .collect()
}

/// Input to topic creation. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
  pub title:       String,
  pub area_id:     Option<AreaId>,
  pub start_date:  NaiveDate,
  pub tags:        String,
  pub color:       Option<Color>,
  pub description: String,
}

impl NewTopic {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(title: impl Into<String>, start_date: NaiveDate) -> Self {
    Self {
      title: title.into(),
      area_id: None,
      start_date,
      tags: String::new(),
      color: None,
      description: String::new(),
    }
  }
}

/// Edits applied to an existing topic. `None` leaves a field unchanged; the
/// nested `Option` fields use `Some(None)` to clear the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicUpdate {
  pub title:       Option<String>,
  pub area_id:     Option<Option<AreaId>>,
  pub tags:        Option<String>,
  pub color:       Option<Option<Color>>,
  pub description: Option<String>,
}

impl TopicUpdate {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

/// A topic joined with its area and aggregate study time: the read model
/// behind topic lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicOverview {
  pub topic:              Topic,
  /// `None` when the topic has no area or its area was deleted.
  pub area_name:          Option<String>,
  /// Area color if set, otherwise the topic's own color.
  pub effective_color:    Option<Color>,
  pub time_spent_seconds: u64,
}

/// Criteria for narrowing a topic list.
#[derive(Debug, Clone, Default)]
pub struct TopicFilter {
  /// Matched against titles ignoring case and accents.
  pub text:    Option<String>,
  pub area_id: Option<AreaId>,
}

impl TopicFilter {
  pub fn matches(&self, overview: &TopicOverview) -> bool {
    if let Some(area_id) = self.area_id
      && overview.topic.area_id != Some(area_id)
    {
      return false;
    }
    match self.text.as_deref().map(fold_for_search) {
      Some(needle) if !needle.is_empty() => {
        fold_for_search(&overview.topic.title).contains(&needle)
      }
      _ => true,
    }
  }
}

/// Lowercase `text` and strip diacritics, so "Introdução" matches "introducao".
pub fn fold_for_search(text: &str) -> String {
  text
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .collect::<String>()
    .to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn overview(title: &str, area_id: Option<AreaId>) -> TopicOverview {
    let mut new = NewTopic::new(title, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    new.area_id = area_id;
    TopicOverview {
      topic:              Topic {
        id:          TopicId(1),
        title:       new.title,
        area_id:     new.area_id,
        start_date:  new.start_date,
        tags:        new.tags,
        color:       new.color,
        description: new.description,
      },
      area_name:          None,
      effective_color:    None,
      time_spent_seconds: 0,
    }
  }

  #[test]
  fn folding_strips_accents_and_case() {
    assert_eq!(fold_for_search("Introdução à Álgebra"), "introducao a algebra");
  }

  #[test]
  fn filter_matches_text_ignoring_accents() {
    let filter = TopicFilter { text: Some("CONSTITUCIONAL".into()), area_id: None };
    assert!(filter.matches(&overview("Direito Constitucional", None)));

    let filter = TopicFilter { text: Some("funcao".into()), area_id: None };
    assert!(filter.matches(&overview("Função Exponencial", None)));
    assert!(!filter.matches(&overview("Logaritmos", None)));
  }

  #[test]
  fn filter_restricts_area() {
    let filter = TopicFilter { text: None, area_id: Some(AreaId(2)) };
    assert!(filter.matches(&overview("Calculus", Some(AreaId(2)))));
    assert!(!filter.matches(&overview("Calculus", Some(AreaId(3)))));
    assert!(!filter.matches(&overview("Calculus", None)));
  }

  #[test]
  fn tags_split_on_commas() {
    assert_eq!(split_tags("concurso, essencial,,  "), vec!["concurso", "essencial"]);
  }
}
