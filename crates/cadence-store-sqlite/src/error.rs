//! Error type for `cadence-store-sqlite`.

use cadence_core::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// A column held text that does not decode into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("{kind} named {name:?} already exists")]
  DuplicateName { kind: EntityKind, name: String },

  #[error("{kind} not found: {id}")]
  NotFound { kind: EntityKind, id: i64 },

  /// A conditional write found the row in a different state than expected.
  #[error("{kind} {id} changed since it was read")]
  Stale { kind: EntityKind, id: i64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for cadence_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::DuplicateName { kind, name } => Self::DuplicateName { kind, name },
      Error::NotFound { kind, id } => Self::NotFound { kind, id },
      e @ Error::Stale { .. } => Self::Validation(e.to_string()),
      other => Self::Storage(Box::new(other)),
    }
  }
}

/// `true` if `e` is a violation of a `UNIQUE` constraint.
pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}
