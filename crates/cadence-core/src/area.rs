//! Areas and managed tags: the two user-maintained label tables.
//!
//! Both enforce unique names. Neither is referentially tied to topics in a
//! way that blocks deletion: deleting an area leaves its topics in place with
//! no area, and tags are only ever associated with topics through free text.

use serde::{Deserialize, Serialize};

use crate::{AreaId, Color, TagId};

/// A named grouping for topics. Its color, when set, overrides the color of
/// every topic in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
  pub id:    AreaId,
  pub name:  String,
  pub color: Option<Color>,
}

/// A free-standing label the user manages alongside areas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:    TagId,
  pub name:  String,
  pub color: Option<Color>,
}
