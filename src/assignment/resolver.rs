use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use super::absence::has_absence_conflict;
use super::conflict::{probe_scheduling_conflict, GameLookup};
use super::types::{AbsenceInterval, Referee, Role, Selections, SlotKey};

/// Everything the resolver needs to answer availability questions for one
/// candidate game: the directory snapshot, the absence snapshot, the
/// candidate date/time (either may be unset while the form is incomplete)
/// and the same-day game lookup.
pub struct AvailabilityContext<'a> {
    pub referees: &'a [Referee],
    pub absences: &'a [AbsenceInterval],
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub lookup: &'a dyn GameLookup,
}

/// Per-referee availability for one candidate date/time, computed with one
/// same-day lookup per referee and reused across every slot and role.
#[derive(Debug, Clone)]
pub struct Availability {
    by_id: HashMap<String, bool>,
}

impl Availability {
    /// Referees not in the map (directory changed underneath us) count as
    /// available; the exclusion filter is the only thing that can still
    /// remove them.
    pub fn is_available(&self, referee_id: &str) -> bool {
        self.by_id.get(referee_id).copied().unwrap_or(true)
    }
}

/// Probes every referee once against the candidate date/time.
/// Without a date the probe is skipped entirely (vacuous eligibility);
/// with a date but no time only the absence check runs, since absences
/// are whole-day blocks.
pub fn compute_availability(ctx: &AvailabilityContext) -> Availability {
    let mut by_id = HashMap::new();
    for referee in ctx.referees {
        let mut available = true;
        if let Some(date) = ctx.date {
            if has_absence_conflict(&referee.personal_code, date, ctx.absences) {
                available = false;
            } else if let Some(time) = ctx.time {
                available = !probe_scheduling_conflict(ctx.lookup, &referee.id, date, time);
            }
        }
        by_id.insert(referee.id.clone(), available);
    }
    Availability { by_id }
}

/// Eligible candidates for one slot, in directory order.
/// A referee selected in any other slot of any role is excluded; the
/// referee already selected in this exact slot stays selectable.
pub fn available_candidates(
    slot: SlotKey,
    referees: &[Referee],
    selections: &Selections,
    availability: &Availability,
) -> Vec<Referee> {
    referees
        .iter()
        .filter(|referee| referee.role == slot.role)
        .filter(|referee| !selections.is_selected_elsewhere(&referee.id, slot))
        .filter(|referee| availability.is_available(&referee.id))
        .cloned()
        .collect()
}

/// How many referees of the role fail the availability probe, ignoring the
/// "already selected elsewhere" exclusion. Informational only.
pub fn unavailable_count(role: Role, referees: &[Referee], availability: &Availability) -> usize {
    referees
        .iter()
        .filter(|referee| referee.role == role && !availability.is_available(&referee.id))
        .count()
}

/// Filled slots whose selected referee fails the availability probe
pub fn unavailable_selections(
    selections: &Selections,
    availability: &Availability,
) -> Vec<SlotKey> {
    selections
        .filled()
        .filter(|(_, id)| !availability.is_available(id))
        .map(|(slot, _)| slot)
        .collect()
}

/// Clears every slot whose selected referee is no longer available and
/// returns the cleared slots. Slots whose referee remains available are
/// untouched.
pub fn clear_unavailable(selections: &mut Selections, availability: &Availability) -> Vec<SlotKey> {
    let cleared = unavailable_selections(selections, availability);
    for slot in &cleared {
        selections.clear(*slot);
    }
    cleared
}
