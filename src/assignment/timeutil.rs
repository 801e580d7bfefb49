use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// True iff two inclusive date intervals intersect (date-only, time ignored)
pub fn dates_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Absolute difference in whole minutes between two date+time instants
pub fn minutes_between(
    date_a: NaiveDate,
    time_a: NaiveTime,
    date_b: NaiveDate,
    time_b: NaiveTime,
) -> i64 {
    let a = NaiveDateTime::new(date_a, time_a);
    let b = NaiveDateTime::new(date_b, time_b);
    (a - b).num_minutes().abs()
}

/// Parses a "YYYY-MM-DD" date string
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parses an "HH:MM" time string ("HH:MM:SS" is tolerated)
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}
