use chrono::NaiveDate;

use super::timeutil::dates_overlap;
use super::types::AbsenceInterval;

/// True iff any declared absence of the given personal code covers the date.
/// Absences are whole-day blocks; the candidate's time-of-day plays no part.
pub fn has_absence_conflict(
    personal_code: &str,
    date: NaiveDate,
    absences: &[AbsenceInterval],
) -> bool {
    absences
        .iter()
        .filter(|absence| absence.personal_code == personal_code)
        .any(|absence| dates_overlap(absence.start, absence.end, date, date))
}
