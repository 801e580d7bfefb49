use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The three assignable roles on a game, each with its own slot-count rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Referee,
    AssistantReferee,
    Delegate,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Referee, Role::AssistantReferee, Role::Delegate];

    /// Number of selectable slots the assignment form offers for this role
    pub fn slot_count(self) -> u8 {
        match self {
            Role::Referee | Role::AssistantReferee => 3,
            Role::Delegate => 1,
        }
    }

    /// Minimum number of filled slots required before a game can be submitted
    pub fn min_filled(self) -> usize {
        match self {
            Role::Referee | Role::AssistantReferee => 2,
            Role::Delegate => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Referee => "Referee",
            Role::AssistantReferee => "Assistant referee",
            Role::Delegate => "Delegate",
        }
    }

    /// Parses the role strings used by the CSV files and the API
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "referee" | "primary referee" | "primary" => Some(Role::Referee),
            "assistant" | "assistant referee" | "assistant_referee" => {
                Some(Role::AssistantReferee)
            }
            "delegate" => Some(Role::Delegate),
            _ => None,
        }
    }
}

/// A member of the referee directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referee {
    pub id: String,
    pub name: String,
    pub role: Role,
    /// Matched against absence records, which are keyed by personal code
    pub personal_code: String,
}

/// A closed date range during which a referee is unavailable for any assignment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsenceInterval {
    pub personal_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: Option<String>,
}

/// An already-scheduled game as seen by the conflict checker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// A position (role + 1-based index) in the assignment form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub role: Role,
    pub slot: u8,
}

impl SlotKey {
    pub fn new(role: Role, slot: u8) -> SlotKey {
        SlotKey { role, slot }
    }

    /// True iff the slot index is within the role's slot count
    pub fn is_valid(self) -> bool {
        self.slot >= 1 && self.slot <= self.role.slot_count()
    }
}

/// All form slots in display order: referees, assistants, then the delegate
pub fn all_slots() -> Vec<SlotKey> {
    let mut slots = Vec::new();
    for role in Role::ALL {
        for slot in 1..=role.slot_count() {
            slots.push(SlotKey::new(role, slot));
        }
    }
    slots
}

/// An accepted (role, slot, referee) triple on a stored game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub role: Role,
    pub slot: u8,
    pub referee_id: String,
}

/// The in-progress selection map of the assignment form.
/// Only filled slots are stored; an absent key means the slot is empty.
/// Exposed to the API as a list of `SlotAssignment`s, never as a map.
#[derive(Debug, Clone, Default)]
pub struct Selections {
    slots: BTreeMap<SlotKey, String>,
}

impl Selections {
    pub fn new() -> Selections {
        Selections::default()
    }

    pub fn get(&self, slot: SlotKey) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }

    /// Sets or clears a slot without any invariant checking.
    /// The duplicate-selection invariant is enforced by the session.
    pub fn set(&mut self, slot: SlotKey, referee_id: Option<String>) {
        match referee_id {
            Some(id) if !id.trim().is_empty() => {
                self.slots.insert(slot, id);
            }
            _ => {
                self.slots.remove(&slot);
            }
        }
    }

    pub fn clear(&mut self, slot: SlotKey) {
        self.slots.remove(&slot);
    }

    /// True iff the referee is selected in a slot other than `except`
    pub fn is_selected_elsewhere(&self, referee_id: &str, except: SlotKey) -> bool {
        self.slots
            .iter()
            .any(|(key, id)| *key != except && id == referee_id)
    }

    /// Filled slots in deterministic form order
    pub fn filled(&self) -> impl Iterator<Item = (SlotKey, &str)> {
        self.slots.iter().map(|(key, id)| (*key, id.as_str()))
    }

    pub fn filled_count(&self, role: Role) -> usize {
        self.slots.keys().filter(|key| key.role == role).count()
    }

    /// Every selected referee id, one entry per filled slot
    pub fn selected_ids(&self) -> Vec<&str> {
        self.slots.values().map(String::as_str).collect()
    }

    pub fn to_assignments(&self) -> Vec<SlotAssignment> {
        self.filled()
            .map(|(key, id)| SlotAssignment {
                role: key.role,
                slot: key.slot,
                referee_id: id.to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_covers_directory_spellings() {
        assert_eq!(Role::parse("referee"), Some(Role::Referee));
        assert_eq!(Role::parse(" Assistant Referee "), Some(Role::AssistantReferee));
        assert_eq!(Role::parse("DELEGATE"), Some(Role::Delegate));
        assert_eq!(Role::parse("coach"), None);
    }

    #[test]
    fn slot_layout_matches_form() {
        let slots = all_slots();
        assert_eq!(slots.len(), 7);
        assert_eq!(slots[0], SlotKey::new(Role::Referee, 1));
        assert_eq!(slots[3], SlotKey::new(Role::AssistantReferee, 1));
        assert_eq!(slots[6], SlotKey::new(Role::Delegate, 1));
        assert!(!SlotKey::new(Role::Delegate, 2).is_valid());
        assert!(SlotKey::new(Role::Referee, 3).is_valid());
    }

    #[test]
    fn selections_track_filled_slots_only() {
        let mut selections = Selections::new();
        selections.set(SlotKey::new(Role::Referee, 1), Some("U1".to_string()));
        selections.set(SlotKey::new(Role::Referee, 2), Some("  ".to_string()));
        assert_eq!(selections.filled_count(Role::Referee), 1);
        assert_eq!(selections.get(SlotKey::new(Role::Referee, 2)), None);

        selections.set(SlotKey::new(Role::Referee, 1), None);
        assert_eq!(selections.filled_count(Role::Referee), 0);
    }

    #[test]
    fn elsewhere_check_skips_own_slot() {
        let mut selections = Selections::new();
        let slot = SlotKey::new(Role::Referee, 1);
        selections.set(slot, Some("U1".to_string()));
        assert!(!selections.is_selected_elsewhere("U1", slot));
        assert!(selections.is_selected_elsewhere("U1", SlotKey::new(Role::Referee, 2)));
        assert!(selections.is_selected_elsewhere("U1", SlotKey::new(Role::Delegate, 1)));
    }
}
