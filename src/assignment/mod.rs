pub mod absence;
pub mod conflict;
pub mod resolver;
pub mod session;
pub mod store;
pub mod timeutil;
pub mod types;

pub use conflict::{GameLookup, LookupError, MIN_SEPARATION_MINUTES};
pub use resolver::{
    available_candidates, compute_availability, unavailable_count, Availability,
    AvailabilityContext,
};
pub use session::{RecomputeOutcome, SchedulingSession, Submission, WizardStep};
pub use store::{GameDetails, GameStore, StoredGame};
pub use types::{
    all_slots, AbsenceInterval, GameRecord, Referee, Role, Selections, SlotAssignment, SlotKey,
};
