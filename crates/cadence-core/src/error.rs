//! Error types for `cadence-core`.
//!
//! This is the error surface every caller sees: storage backends convert
//! their own failures into [`Error::Storage`].

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Area,
  Tag,
  Topic,
  Revision,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("{kind} named {name:?} already exists")]
  DuplicateName { kind: EntityKind, name: String },

  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: i64 },

  #[error("invalid input: {0}")]
  Validation(String),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: impl Into<i64>) -> Self {
    Self::NotFound { kind, id: id.into() }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }

  pub fn is_duplicate_name(&self) -> bool {
    matches!(self, Self::DuplicateName { .. })
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Trim `value` and reject it if nothing is left.
pub fn require_non_empty(field: &str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Validation(format!("{field} must not be blank")));
  }
  Ok(trimmed.to_owned())
}
