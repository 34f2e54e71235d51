//! Strongly-typed row identifiers.
//!
//! Every table uses an SQLite `INTEGER PRIMARY KEY`; the newtypes keep a
//! revision id from being passed where a topic id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! row_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
    }

    impl From<i64> for $name {
      fn from(raw: i64) -> Self { Self(raw) }
    }

    impl From<$name> for i64 {
      fn from(id: $name) -> Self { id.0 }
    }
  };
}

row_id!(
  /// Identifier of an [`Area`](crate::area::Area).
  AreaId
);
row_id!(
  /// Identifier of a managed [`Tag`](crate::area::Tag).
  TagId
);
row_id!(
  /// Identifier of a [`Topic`](crate::topic::Topic).
  TopicId
);
row_id!(
  /// Identifier of a [`Revision`](crate::revision::Revision).
  RevisionId
);
row_id!(
  /// Identifier of a [`StudySession`](crate::session::StudySession).
  SessionId
);
