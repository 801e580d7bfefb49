use thiserror::Error;

use crate::assignment::types::Role;

pub mod game;
pub mod referees;

pub use game::{validate_game_form, validate_game_form_at, GameForm, COMPETITIONS};
pub use referees::validate_referee_assignments;

/// Local, synchronous validation failures. All are recoverable: the form
/// stays open and the user corrects the input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    RequiredField(&'static str),
    #[error("home and away team must be different")]
    DuplicateTeams,
    #[error("date must not be in the past")]
    PastDate,
    #[error("unknown competition: {0}")]
    UnknownCompetition(String),
    #[error("at least {minimum} {} selections are required", .role.label())]
    TooFewSelected { role: Role, minimum: usize },
    #[error("referee {0} is assigned to more than one slot")]
    DuplicateAssignment(String),
    #[error("no slot {slot} for {}", .role.label())]
    InvalidSlot { role: Role, slot: u8 },
    #[error("{0}")]
    StepOrder(&'static str),
}
