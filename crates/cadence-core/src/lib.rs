//! Core types and trait definitions for the Cadence study tracker.
//!
//! This crate has no database dependencies. The storage
//! backend implements [`store::StudyStore`]; the scheduling engine is written
//! against that trait.

pub mod area;
pub mod color;
pub mod error;
pub mod id;
pub mod policy;
pub mod revision;
pub mod session;
pub mod store;
pub mod topic;

pub use color::Color;
pub use error::{EntityKind, Error, Result};
pub use id::{AreaId, RevisionId, SessionId, TagId, TopicId};
