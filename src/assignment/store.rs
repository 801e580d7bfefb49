use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::conflict::{GameLookup, LookupError};
use super::types::{GameRecord, SlotAssignment};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate game id: {0}")]
    DuplicateId(String),
}

/// Validated detail fields of a game being created
#[derive(Debug, Clone)]
pub struct GameDetails {
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: String,
    pub competition: String,
    pub notes: String,
}

/// A created game with its accepted referee assignments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: String,
    pub home_team: String,
    pub away_team: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub venue: String,
    pub competition: String,
    pub notes: String,
    pub assignments: Vec<SlotAssignment>,
}

impl StoredGame {
    pub fn has_referee(&self, referee_id: &str) -> bool {
        self.assignments
            .iter()
            .any(|assignment| assignment.referee_id == referee_id)
    }
}

/// In-memory store of scheduled games. Created games immediately take part
/// in conflict checks through the `GameLookup` implementation below.
#[derive(Debug, Default)]
pub struct GameStore {
    games: Vec<StoredGame>,
}

impl GameStore {
    pub fn new() -> GameStore {
        GameStore::default()
    }

    pub fn games(&self) -> &[StoredGame] {
        &self.games
    }

    /// Inserts a game carrying its own id (CSV seeding). Ids must be unique.
    pub fn insert(&mut self, game: StoredGame) -> Result<(), StoreError> {
        if self.games.iter().any(|existing| existing.id == game.id) {
            return Err(StoreError::DuplicateId(game.id));
        }
        self.games.push(game);
        Ok(())
    }

    /// Creates a game from validated details, assigning the next free id
    pub fn create(
        &mut self,
        details: GameDetails,
        assignments: Vec<SlotAssignment>,
    ) -> &StoredGame {
        let id = self.next_id();
        self.games.push(StoredGame {
            id,
            home_team: details.home_team,
            away_team: details.away_team,
            date: details.date,
            time: details.time,
            venue: details.venue,
            competition: details.competition,
            notes: details.notes,
            assignments,
        });
        self.games.last().expect("game was just pushed")
    }

    fn next_id(&self) -> String {
        let mut candidate = self.games.len() as u64 + 1;
        loop {
            let id = format!("G{:04}", candidate);
            if !self.games.iter().any(|game| game.id == id) {
                return id;
            }
            candidate += 1;
        }
    }
}

impl GameLookup for GameStore {
    fn games_by_referee_and_date(
        &self,
        referee_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<GameRecord>, LookupError> {
        Ok(self
            .games
            .iter()
            .filter(|game| game.date == date && game.has_referee(referee_id))
            .map(|game| GameRecord {
                date: game.date,
                time: game.time,
            })
            .collect())
    }
}
