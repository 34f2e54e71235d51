//! The Cadence scheduling engine.
//!
//! [`Scheduler`] owns a [`StudyStore`](cadence_core::store::StudyStore) handle
//! for its whole lifetime and layers the spaced-repetition policy on top of
//! it: generating the initial schedule of a topic, shifting the schedule when
//! a review is missed, toggling completion, and aggregating study time.
//!
//! The engine keeps no state of its own; every answer is read from the store.

mod calendar;
mod scheduler;
mod shift;

pub use calendar::{month_bounds, week_bounds};
pub use scheduler::Scheduler;
pub use shift::plan_shift;

#[cfg(test)]
mod tests;
