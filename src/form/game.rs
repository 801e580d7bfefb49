use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::ValidationError;
use crate::assignment::store::GameDetails;
use crate::assignment::timeutil::{parse_date, parse_time};

/// The fixed list of competitions a game can belong to
pub const COMPETITIONS: &[&str] = &[
    "Premijer liga",
    "Prva liga",
    "Druga liga",
    "Kup",
    "Juniorska liga",
];

/// Game-detail fields exactly as received from the form; validation parses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameForm {
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub competition: String,
    #[serde(default)]
    pub notes: String,
}

impl GameForm {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn parsed_time(&self) -> Option<NaiveTime> {
        parse_time(&self.time)
    }

    /// The validated, trimmed detail fields; None until date and time parse
    pub fn details(&self) -> Option<GameDetails> {
        Some(GameDetails {
            home_team: self.home_team.trim().to_string(),
            away_team: self.away_team.trim().to_string(),
            date: self.parsed_date()?,
            time: self.parsed_time()?,
            venue: self.venue.trim().to_string(),
            competition: self.competition.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Validates the game-detail step against the current calendar date
pub fn validate_game_form(form: &GameForm) -> Result<(), ValidationError> {
    validate_game_form_at(form, Local::now().date_naive())
}

/// Ordered rules, stop at the first failure. `today` is date-only.
pub fn validate_game_form_at(form: &GameForm, today: NaiveDate) -> Result<(), ValidationError> {
    if form.home_team.trim().is_empty() {
        return Err(ValidationError::RequiredField("home team"));
    }
    if form.away_team.trim().is_empty() {
        return Err(ValidationError::RequiredField("away team"));
    }
    if form.home_team.trim().to_lowercase() == form.away_team.trim().to_lowercase() {
        return Err(ValidationError::DuplicateTeams);
    }
    let date = match form.parsed_date() {
        Some(date) => date,
        None => return Err(ValidationError::RequiredField("date")),
    };
    if date < today {
        return Err(ValidationError::PastDate);
    }
    if form.parsed_time().is_none() {
        return Err(ValidationError::RequiredField("time"));
    }
    if form.venue.trim().is_empty() {
        return Err(ValidationError::RequiredField("venue"));
    }
    let competition = form.competition.trim();
    if competition.is_empty() {
        return Err(ValidationError::RequiredField("competition"));
    }
    if !COMPETITIONS.contains(&competition) {
        return Err(ValidationError::UnknownCompetition(competition.to_string()));
    }
    Ok(())
}
