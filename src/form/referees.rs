use std::collections::HashSet;

use super::ValidationError;
use crate::assignment::types::{Role, Selections};

/// Validates the referee-assignment step: no referee selected twice across
/// all roles, and minimum filled slots per role. The delegate slot is
/// optional but participates in the duplicate check when filled.
pub fn validate_referee_assignments(selections: &Selections) -> Result<(), ValidationError> {
    // Compare total selections against distinct ids; a mismatch means
    // somebody holds two slots.
    let ids = selections.selected_ids();
    let distinct: HashSet<&str> = ids.iter().copied().collect();
    if distinct.len() != ids.len() {
        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(*id) {
                return Err(ValidationError::DuplicateAssignment((*id).to_string()));
            }
        }
    }

    for role in [Role::Referee, Role::AssistantReferee] {
        let minimum = role.min_filled();
        if selections.filled_count(role) < minimum {
            return Err(ValidationError::TooFewSelected { role, minimum });
        }
    }
    Ok(())
}
