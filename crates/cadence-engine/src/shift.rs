//! The missed-review shift.
//!
//! Marking a revision as not studied pushes it back one day, and every other
//! pending revision of the same topic scheduled on or after its original date
//! moves with it. Studied revisions are history and never move, so a shift
//! that would land a moving revision on a studied revision's date is refused:
//! revisions of one topic never share a date and never change order.

use cadence_core::{
  EntityKind, Error, Result, RevisionId,
  revision::{Revision, RevisionMove},
};
use chrono::Days;

/// How far a missed review is pushed back.
const SHIFT: Days = Days::new(1);

/// Compute the moves for a missed `target` within `schedule` (all revisions of
/// the target's topic).
///
/// The target itself always moves, whatever its status; other revisions move
/// only while pending. Moves are returned in ascending date order. Fails with
/// [`Error::Validation`] when a moved revision would reach the date of a
/// revision that stays put.
pub fn plan_shift(schedule: &[Revision], target: RevisionId) -> Result<Vec<RevisionMove>> {
  let original = schedule
    .iter()
    .find(|r| r.id == target)
    .ok_or_else(|| Error::not_found(EntityKind::Revision, target))?
    .scheduled_date;

  let (moving, staying): (Vec<&Revision>, Vec<&Revision>) = schedule
    .iter()
    .partition(|r| r.id == target || (!r.status.is_studied() && r.scheduled_date >= original));

  let mut moves = moving
    .iter()
    .map(|r| {
      let to = r.scheduled_date.checked_add_days(SHIFT).ok_or_else(|| {
        Error::Validation(format!("revision {} cannot move past {}", r.id, r.scheduled_date))
      })?;
      Ok(RevisionMove { id: r.id, from: r.scheduled_date, to })
    })
    .collect::<Result<Vec<_>>>()?;

  if let Some((m, blocker)) = moves
    .iter()
    .find_map(|m| staying.iter().find(|s| s.scheduled_date == m.to).map(|s| (m, s)))
  {
    return Err(Error::Validation(format!(
      "revision {} cannot move to {}: studied revision {} is scheduled there; \
       mark it pending first",
      m.id, m.to, blocker.id
    )));
  }

  moves.sort_by_key(|m| (m.to, m.id));
  Ok(moves)
}
