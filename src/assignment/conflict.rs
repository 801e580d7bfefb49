use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use super::timeutil::minutes_between;
use super::types::GameRecord;

/// Minimum separation between two games assigned to the same referee on the
/// same date. A difference of exactly this many minutes is NOT a conflict.
pub const MIN_SEPARATION_MINUTES: i64 = 60;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("game lookup failed: {0}")]
    Backend(String),
}

/// Same-day game lookup, provided by whatever holds the scheduled games
/// (the in-process store here, a remote backend in a larger deployment).
pub trait GameLookup {
    fn games_by_referee_and_date(
        &self,
        referee_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<GameRecord>, LookupError>;
}

/// True iff any of the referee's same-day games starts strictly less than
/// `MIN_SEPARATION_MINUTES` away from the candidate instant.
pub fn has_scheduling_conflict(
    candidate_date: NaiveDate,
    candidate_time: NaiveTime,
    same_day_games: &[GameRecord],
) -> bool {
    same_day_games.iter().any(|game| {
        minutes_between(candidate_date, candidate_time, game.date, game.time)
            < MIN_SEPARATION_MINUTES
    })
}

/// Runs the same-day lookup and the separation check for one referee.
/// A failed lookup is logged and treated as "no conflict" so a transient
/// backend error cannot block the whole scheduling flow.
pub fn probe_scheduling_conflict(
    lookup: &dyn GameLookup,
    referee_id: &str,
    candidate_date: NaiveDate,
    candidate_time: NaiveTime,
) -> bool {
    match lookup.games_by_referee_and_date(referee_id, candidate_date) {
        Ok(games) => has_scheduling_conflict(candidate_date, candidate_time, &games),
        Err(err) => {
            log::warn!(
                "same-day game lookup for referee {} on {} failed, assuming no conflict: {}",
                referee_id,
                candidate_date,
                err
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::timeutil::{parse_date, parse_time};

    fn game(date: &str, time: &str) -> GameRecord {
        GameRecord {
            date: parse_date(date).unwrap(),
            time: parse_time(time).unwrap(),
        }
    }

    struct FailingLookup;

    impl GameLookup for FailingLookup {
        fn games_by_referee_and_date(
            &self,
            _referee_id: &str,
            _date: NaiveDate,
        ) -> Result<Vec<GameRecord>, LookupError> {
            Err(LookupError::Backend("connection refused".to_string()))
        }
    }

    #[test]
    fn closer_than_sixty_minutes_conflicts() {
        let games = vec![game("2025-06-10", "18:00")];
        let date = parse_date("2025-06-10").unwrap();
        assert!(has_scheduling_conflict(date, parse_time("18:30").unwrap(), &games));
        assert!(has_scheduling_conflict(date, parse_time("17:01").unwrap(), &games));
        assert!(has_scheduling_conflict(date, parse_time("18:00").unwrap(), &games));
    }

    #[test]
    fn exactly_sixty_minutes_is_not_a_conflict() {
        let games = vec![game("2025-06-10", "18:00")];
        let date = parse_date("2025-06-10").unwrap();
        assert!(!has_scheduling_conflict(date, parse_time("19:00").unwrap(), &games));
        assert!(!has_scheduling_conflict(date, parse_time("17:00").unwrap(), &games));
        assert!(!has_scheduling_conflict(date, parse_time("19:30").unwrap(), &games));
    }

    #[test]
    fn no_games_means_no_conflict() {
        let date = parse_date("2025-06-10").unwrap();
        assert!(!has_scheduling_conflict(date, parse_time("18:00").unwrap(), &[]));
    }

    #[test]
    fn any_of_several_games_can_conflict() {
        let games = vec![game("2025-06-10", "12:00"), game("2025-06-10", "20:00")];
        let date = parse_date("2025-06-10").unwrap();
        assert!(has_scheduling_conflict(date, parse_time("19:15").unwrap(), &games));
        assert!(!has_scheduling_conflict(date, parse_time("15:00").unwrap(), &games));
    }

    #[test]
    fn failed_lookup_fails_open() {
        let date = parse_date("2025-06-10").unwrap();
        let time = parse_time("18:00").unwrap();
        assert!(!probe_scheduling_conflict(&FailingLookup, "U1", date, time));
    }
}
