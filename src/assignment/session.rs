use serde::Serialize;

use super::conflict::GameLookup;
use super::resolver::{
    clear_unavailable, compute_availability, unavailable_selections, Availability,
    AvailabilityContext,
};
use super::types::{AbsenceInterval, Referee, Selections, SlotKey};
use crate::form::{
    validate_game_form, validate_referee_assignments, GameForm, ValidationError,
};

/// The two steps of the scheduling wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Details,
    Referees,
}

/// The payload handed to the store once the wizard completes
#[derive(Debug, Clone)]
pub struct Submission {
    pub form: GameForm,
    pub selections: Selections,
}

/// One availability resolution round, tagged with the session revision it
/// was computed for. `cleared` lists the slots whose selected referee fell
/// out of the recomputed available set.
#[derive(Debug)]
pub struct RecomputeOutcome {
    revision: u64,
    pub availability: Availability,
    pub cleared: Vec<SlotKey>,
}

impl RecomputeOutcome {
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// The in-progress scheduling form: wizard step, game details, referee
/// selections and a revision counter. The revision increases on every
/// date/time or selection change; a resolution round computed for an older
/// revision is stale and must not be applied (latest wins).
#[derive(Debug)]
pub struct SchedulingSession {
    step: WizardStep,
    form: GameForm,
    selections: Selections,
    revision: u64,
}

impl Default for SchedulingSession {
    fn default() -> SchedulingSession {
        SchedulingSession::new()
    }
}

impl SchedulingSession {
    pub fn new() -> SchedulingSession {
        SchedulingSession {
            step: WizardStep::Details,
            form: GameForm::default(),
            selections: Selections::new(),
            revision: 0,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &GameForm {
        &self.form
    }

    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Stores the entered details. Changing the candidate date or time
    /// starts a new resolution round, so the revision is bumped.
    pub fn update_form(&mut self, form: GameForm) {
        let datetime_changed = form.parsed_date() != self.form.parsed_date()
            || form.parsed_time() != self.form.parsed_time();
        self.form = form;
        if datetime_changed {
            self.revision += 1;
        }
    }

    /// DETAILS -> REFEREES, guarded by game-detail validation.
    /// Already being on the referee step is a no-op success.
    pub fn advance(&mut self) -> Result<(), ValidationError> {
        if self.step() == WizardStep::Referees {
            return Ok(());
        }
        validate_game_form(&self.form)?;
        self.step = WizardStep::Referees;
        Ok(())
    }

    /// REFEREES -> DETAILS, always allowed; entered data is preserved
    pub fn back(&mut self) {
        self.step = WizardStep::Details;
    }

    /// Sets or clears one slot. Selecting a referee who already holds a
    /// different slot is rejected; re-selecting the same slot is fine.
    pub fn select(
        &mut self,
        slot: SlotKey,
        referee_id: Option<String>,
    ) -> Result<(), ValidationError> {
        if self.step() != WizardStep::Referees {
            return Err(ValidationError::StepOrder("complete the game details first"));
        }
        if !slot.is_valid() {
            return Err(ValidationError::InvalidSlot {
                role: slot.role,
                slot: slot.slot,
            });
        }
        if let Some(id) = referee_id.as_deref() {
            let id = id.trim();
            if !id.is_empty() && self.selections.is_selected_elsewhere(id, slot) {
                return Err(ValidationError::DuplicateAssignment(id.to_string()));
            }
        }
        self.selections.set(slot, referee_id);
        self.revision += 1;
        Ok(())
    }

    /// Builds the resolver context for the current form state
    pub fn context<'a>(
        &self,
        referees: &'a [Referee],
        absences: &'a [AbsenceInterval],
        lookup: &'a dyn GameLookup,
    ) -> AvailabilityContext<'a> {
        AvailabilityContext {
            referees,
            absences,
            date: self.form.parsed_date(),
            time: self.form.parsed_time(),
            lookup,
        }
    }

    /// Computes one resolution round without touching the session
    pub fn resolve(&self, ctx: &AvailabilityContext) -> RecomputeOutcome {
        let availability = compute_availability(ctx);
        let cleared = unavailable_selections(&self.selections, &availability);
        RecomputeOutcome {
            revision: self.revision,
            availability,
            cleared,
        }
    }

    /// Applies a resolution round. Returns false and leaves the session
    /// untouched when the round is stale. A matching revision means the
    /// selections are unchanged since the round was computed, so clearing
    /// against its availability map reproduces `cleared` exactly.
    pub fn apply(&mut self, outcome: &RecomputeOutcome) -> bool {
        if outcome.revision != self.revision {
            return false;
        }
        clear_unavailable(&mut self.selections, &outcome.availability);
        true
    }

    /// resolve + apply in one step for synchronous callers
    pub fn refresh(&mut self, ctx: &AvailabilityContext) -> RecomputeOutcome {
        let outcome = self.resolve(ctx);
        self.apply(&outcome);
        outcome
    }

    /// Final submission. Both validation passes gate creation: the details
    /// may have been edited (or the date gone stale) since the wizard
    /// advanced, so they are checked again alongside the assignments. On
    /// success the wizard resets to a fresh details step and the submitted
    /// form and selections are returned for the store.
    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        if self.step() != WizardStep::Referees {
            return Err(ValidationError::StepOrder("complete the game details first"));
        }
        validate_game_form(&self.form)?;
        validate_referee_assignments(&self.selections)?;
        let submission = Submission {
            form: std::mem::take(&mut self.form),
            selections: std::mem::take(&mut self.selections),
        };
        self.step = WizardStep::Details;
        self.revision += 1;
        Ok(submission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::store::GameStore;
    use crate::assignment::timeutil::parse_date;
    use crate::assignment::types::Role;

    fn referee(id: &str, role: Role) -> Referee {
        Referee {
            id: id.to_string(),
            name: format!("Referee {}", id),
            role,
            personal_code: format!("RS-{}", id),
        }
    }

    fn directory() -> Vec<Referee> {
        vec![
            referee("U1", Role::Referee),
            referee("U2", Role::Referee),
            referee("A1", Role::AssistantReferee),
            referee("A2", Role::AssistantReferee),
            referee("D1", Role::Delegate),
        ]
    }

    fn future_form(date: &str) -> GameForm {
        GameForm {
            home_team: "Split".to_string(),
            away_team: "Zadar".to_string(),
            date: date.to_string(),
            time: "18:00".to_string(),
            venue: "Gripe".to_string(),
            competition: "Premijer liga".to_string(),
            notes: String::new(),
        }
    }

    fn session_on_referee_step(date: &str) -> SchedulingSession {
        let mut session = SchedulingSession::new();
        session.update_form(future_form(date));
        session.advance().unwrap();
        session
    }

    #[test]
    fn advance_is_guarded_by_detail_validation() {
        let mut session = SchedulingSession::new();
        assert_eq!(
            session.advance(),
            Err(ValidationError::RequiredField("home team"))
        );
        assert_eq!(session.step(), WizardStep::Details);

        session.update_form(future_form("2099-06-10"));
        assert_eq!(session.advance(), Ok(()));
        assert_eq!(session.step(), WizardStep::Referees);
    }

    #[test]
    fn back_preserves_entered_data() {
        let mut session = session_on_referee_step("2099-06-10");
        session
            .select(SlotKey::new(Role::Referee, 1), Some("U1".to_string()))
            .unwrap();

        session.back();
        assert_eq!(session.step(), WizardStep::Details);
        assert_eq!(session.form().home_team, "Split");
        assert_eq!(
            session.selections().get(SlotKey::new(Role::Referee, 1)),
            Some("U1")
        );
    }

    #[test]
    fn selecting_before_details_is_rejected() {
        let mut session = SchedulingSession::new();
        assert!(matches!(
            session.select(SlotKey::new(Role::Referee, 1), Some("U1".to_string())),
            Err(ValidationError::StepOrder(_))
        ));
    }

    #[test]
    fn selecting_a_referee_twice_is_rejected() {
        let mut session = session_on_referee_step("2099-06-10");
        let first = SlotKey::new(Role::Referee, 1);
        session.select(first, Some("U1".to_string())).unwrap();

        assert_eq!(
            session.select(SlotKey::new(Role::Delegate, 1), Some("U1".to_string())),
            Err(ValidationError::DuplicateAssignment("U1".to_string()))
        );
        // Re-selecting the held slot stays allowed
        assert_eq!(session.select(first, Some("U1".to_string())), Ok(()));
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut session = session_on_referee_step("2099-06-10");
        assert_eq!(
            session.select(SlotKey::new(Role::Delegate, 2), Some("D1".to_string())),
            Err(ValidationError::InvalidSlot {
                role: Role::Delegate,
                slot: 2
            })
        );
    }

    #[test]
    fn date_change_clears_newly_unavailable_slots() {
        let referees = directory();
        let absences = vec![AbsenceInterval {
            personal_code: "RS-U1".to_string(),
            start: parse_date("2099-06-01").unwrap(),
            end: parse_date("2099-06-03").unwrap(),
            reason: None,
        }];
        let store = GameStore::new();

        let mut session = session_on_referee_step("2099-06-10");
        let slot_u1 = SlotKey::new(Role::Referee, 1);
        let slot_u2 = SlotKey::new(Role::Referee, 2);
        session.select(slot_u1, Some("U1".to_string())).unwrap();
        session.select(slot_u2, Some("U2".to_string())).unwrap();

        // Move the game onto U1's absence
        session.back();
        session.update_form(future_form("2099-06-02"));
        let ctx = session.context(&referees, &absences, &store);
        let outcome = session.refresh(&ctx);

        assert_eq!(outcome.cleared, vec![slot_u1]);
        assert_eq!(session.selections().get(slot_u1), None);
        assert_eq!(session.selections().get(slot_u2), Some("U2"));
    }

    #[test]
    fn stale_resolution_rounds_are_rejected() {
        let referees = directory();
        let absences = vec![AbsenceInterval {
            personal_code: "RS-U1".to_string(),
            start: parse_date("2099-06-01").unwrap(),
            end: parse_date("2099-06-03").unwrap(),
            reason: None,
        }];
        let store = GameStore::new();

        let mut session = session_on_referee_step("2099-06-02");
        let slot_u1 = SlotKey::new(Role::Referee, 1);
        session.select(slot_u1, Some("U1".to_string())).unwrap();

        // Resolution round starts, then the user keeps editing
        let ctx = session.context(&referees, &absences, &store);
        let outcome = session.resolve(&ctx);
        session
            .select(SlotKey::new(Role::Referee, 2), Some("U2".to_string()))
            .unwrap();

        // The in-flight round is now stale and must not clear anything
        assert!(!session.apply(&outcome));
        assert_eq!(session.selections().get(slot_u1), Some("U1"));
    }

    #[test]
    fn submission_revalidates_the_game_details() {
        let mut session = session_on_referee_step("2099-06-10");
        session
            .select(SlotKey::new(Role::Referee, 1), Some("U1".to_string()))
            .unwrap();
        session
            .select(SlotKey::new(Role::Referee, 2), Some("U2".to_string()))
            .unwrap();
        session
            .select(SlotKey::new(Role::AssistantReferee, 1), Some("A1".to_string()))
            .unwrap();
        session
            .select(SlotKey::new(Role::AssistantReferee, 2), Some("A2".to_string()))
            .unwrap();

        // The details are replaced with identical teams after the wizard
        // already advanced; submission must catch it
        let mut form = future_form("2099-06-10");
        form.away_team = "Split ".to_string();
        session.update_form(form);
        assert!(matches!(
            session.submit(),
            Err(ValidationError::DuplicateTeams)
        ));
        assert_eq!(session.step(), WizardStep::Referees);
        assert_eq!(session.selections().selected_ids().len(), 4);

        // Corrected details go through
        session.update_form(future_form("2099-06-10"));
        assert!(session.submit().is_ok());
    }

    #[test]
    fn submission_resets_the_wizard() {
        let mut session = session_on_referee_step("2099-06-10");
        session
            .select(SlotKey::new(Role::Referee, 1), Some("U1".to_string()))
            .unwrap();
        session
            .select(SlotKey::new(Role::Referee, 2), Some("U2".to_string()))
            .unwrap();

        // Assistants missing: rejected, state kept
        assert!(matches!(
            session.submit(),
            Err(ValidationError::TooFewSelected { .. })
        ));
        assert_eq!(session.step(), WizardStep::Referees);

        session
            .select(SlotKey::new(Role::AssistantReferee, 1), Some("A1".to_string()))
            .unwrap();
        session
            .select(SlotKey::new(Role::AssistantReferee, 2), Some("A2".to_string()))
            .unwrap();

        let submission = session.submit().unwrap();
        assert_eq!(submission.form.home_team, "Split");
        assert_eq!(submission.selections.selected_ids().len(), 4);

        assert_eq!(session.step(), WizardStep::Details);
        assert!(session.form().home_team.is_empty());
        assert!(session.selections().selected_ids().is_empty());
    }
}
