use csv::Reader;
use std::error::Error;
use std::io;
use std::path::Path;

use crate::assignment::store::StoredGame;
use crate::assignment::timeutil::{parse_date, parse_time};
use crate::assignment::types::{AbsenceInterval, Referee, Role, SlotAssignment};

/// Loads the referee directory from a CSV file
pub fn load_referees<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Referee>, Box<dyn Error>> {
    read_referees(Reader::from_path(csv_path)?)
}

/// Parses an uploaded referee directory CSV
pub fn parse_referees_csv(data: &[u8]) -> Result<Vec<Referee>, Box<dyn Error>> {
    read_referees(Reader::from_reader(data))
}

fn read_referees<R: io::Read>(mut reader: Reader<R>) -> Result<Vec<Referee>, Box<dyn Error>> {
    let headers = reader.headers()?;

    // Find column indices
    let id_col = headers.iter().position(|h| h.trim().eq_ignore_ascii_case("id")).unwrap_or(0);
    let name_col = headers.iter().position(|h| h.to_lowercase().contains("name")).unwrap_or(1);
    let role_col = headers.iter().position(|h| h.to_lowercase().contains("role")).unwrap_or(2);
    let code_col = headers.iter().position(|h| h.to_lowercase().contains("code")).unwrap_or(3);

    let mut referees: Vec<Referee> = Vec::new();
    for result in reader.records() {
        let record = result?;

        let id = record.get(id_col).unwrap_or("").trim().to_string();
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        let personal_code = record.get(code_col).unwrap_or("").trim().to_string();

        // Skip if essential fields are missing
        if id.is_empty() || name.is_empty() || personal_code.is_empty() {
            continue;
        }

        let role = match Role::parse(record.get(role_col).unwrap_or("")) {
            Some(role) => role,
            None => continue,
        };

        let referee = Referee { id, name, role, personal_code };

        // A later row for the same id replaces the earlier one, keeping
        // the directory position of the first occurrence
        if let Some(existing) = referees.iter_mut().find(|r| r.id == referee.id) {
            *existing = referee;
        } else {
            referees.push(referee);
        }
    }

    Ok(referees)
}

/// Loads the absence list from a CSV file
pub fn load_absences<P: AsRef<Path>>(csv_path: P) -> Result<Vec<AbsenceInterval>, Box<dyn Error>> {
    read_absences(Reader::from_path(csv_path)?)
}

/// Parses an uploaded absence list CSV
pub fn parse_absences_csv(data: &[u8]) -> Result<Vec<AbsenceInterval>, Box<dyn Error>> {
    read_absences(Reader::from_reader(data))
}

fn read_absences<R: io::Read>(
    mut reader: Reader<R>,
) -> Result<Vec<AbsenceInterval>, Box<dyn Error>> {
    let headers = reader.headers()?;

    let code_col = headers.iter().position(|h| h.to_lowercase().contains("code")).unwrap_or(0);
    let start_col = headers.iter().position(|h| h.to_lowercase().contains("start")).unwrap_or(1);
    let end_col = headers.iter().position(|h| h.to_lowercase().contains("end")).unwrap_or(2);
    let reason_col = headers.iter().position(|h| h.to_lowercase().contains("reason")).unwrap_or(3);

    let mut absences = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = index + 2; // 1-based, after the header line

        let personal_code = record.get(code_col).unwrap_or("").trim().to_string();
        if personal_code.is_empty() {
            continue;
        }

        // A dropped absence would make somebody look available who is not,
        // so malformed rows are errors rather than skips
        let start = parse_date(record.get(start_col).unwrap_or(""))
            .ok_or_else(|| format!("absence row {}: invalid start date", row))?;
        let end = parse_date(record.get(end_col).unwrap_or(""))
            .ok_or_else(|| format!("absence row {}: invalid end date", row))?;
        if end < start {
            return Err(format!("absence row {}: end date before start date", row).into());
        }

        let reason = record
            .get(reason_col)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        absences.push(AbsenceInterval { personal_code, start, end, reason });
    }

    Ok(absences)
}

/// Loads already-scheduled games (with their referee assignments) from a
/// CSV file, used to seed the store in CLI mode
pub fn load_games<P: AsRef<Path>>(csv_path: P) -> Result<Vec<StoredGame>, Box<dyn Error>> {
    read_games(Reader::from_path(csv_path)?)
}

/// Parses an uploaded schedule CSV
pub fn parse_games_csv(data: &[u8]) -> Result<Vec<StoredGame>, Box<dyn Error>> {
    read_games(Reader::from_reader(data))
}

fn read_games<R: io::Read>(mut reader: Reader<R>) -> Result<Vec<StoredGame>, Box<dyn Error>> {
    let headers = reader.headers()?;

    let id_col = headers.iter().position(|h| h.trim().eq_ignore_ascii_case("id")).unwrap_or(0);
    let home_col = headers.iter().position(|h| h.to_lowercase().contains("home")).unwrap_or(1);
    let away_col = headers.iter().position(|h| h.to_lowercase().contains("away")).unwrap_or(2);
    let date_col = headers.iter().position(|h| h.to_lowercase().contains("date")).unwrap_or(3);
    let time_col = headers.iter().position(|h| h.to_lowercase().contains("time")).unwrap_or(4);
    let venue_col = headers.iter().position(|h| h.to_lowercase().contains("venue")).unwrap_or(5);
    let competition_col =
        headers.iter().position(|h| h.to_lowercase().contains("competition")).unwrap_or(6);
    let referees_col =
        headers.iter().position(|h| h.to_lowercase().contains("referees")).unwrap_or(7);
    let assistants_col =
        headers.iter().position(|h| h.to_lowercase().contains("assistants")).unwrap_or(8);
    let delegate_col =
        headers.iter().position(|h| h.to_lowercase().contains("delegate")).unwrap_or(9);

    let mut games = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        let row = index + 2;

        let id = record.get(id_col).unwrap_or("").trim().to_string();
        if id.is_empty() {
            continue;
        }

        // Seeded games feed the conflict checker; malformed date/time rows
        // would silently hide conflicts, so they are errors
        let date = parse_date(record.get(date_col).unwrap_or(""))
            .ok_or_else(|| format!("game row {}: invalid date", row))?;
        let time = parse_time(record.get(time_col).unwrap_or(""))
            .ok_or_else(|| format!("game row {}: invalid time", row))?;

        let mut assignments = Vec::new();
        push_assignments(
            &mut assignments,
            Role::Referee,
            record.get(referees_col).unwrap_or(""),
        );
        push_assignments(
            &mut assignments,
            Role::AssistantReferee,
            record.get(assistants_col).unwrap_or(""),
        );
        push_assignments(
            &mut assignments,
            Role::Delegate,
            record.get(delegate_col).unwrap_or(""),
        );

        games.push(StoredGame {
            id,
            home_team: record.get(home_col).unwrap_or("").trim().to_string(),
            away_team: record.get(away_col).unwrap_or("").trim().to_string(),
            date,
            time,
            venue: record.get(venue_col).unwrap_or("").trim().to_string(),
            competition: record.get(competition_col).unwrap_or("").trim().to_string(),
            notes: String::new(),
            assignments,
        });
    }

    Ok(games)
}

/// Expands a semicolon-separated id list into slot assignments (slot = position)
fn push_assignments(assignments: &mut Vec<SlotAssignment>, role: Role, ids: &str) {
    for (position, id) in ids
        .split(';')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .enumerate()
    {
        assignments.push(SlotAssignment {
            role,
            slot: position as u8 + 1,
            referee_id: id.to_string(),
        });
    }
}
