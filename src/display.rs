use std::fs::File;
use std::io::Write;

use crate::assignment::resolver::{unavailable_count, Availability};
use crate::assignment::types::{Referee, Role};

/// Formats a referee name with the personal code used on absence records
pub fn format_referee_name(referee: &Referee) -> String {
    format!("{} ({})", referee.name, referee.personal_code)
}

/// Builds the per-role availability report for a candidate date/time
pub fn availability_report(
    date: &str,
    time: &str,
    referees: &[Referee],
    availability: &Availability,
) -> String {
    let mut report = String::new();
    report.push_str(&format!("** Availability for {} {} **\n", date, time));

    for role in Role::ALL {
        let of_role: Vec<&Referee> = referees.iter().filter(|r| r.role == role).collect();
        report.push_str(&format!("\n=== {} ===\n", role.label()));

        if of_role.is_empty() {
            report.push_str("  (no referees of this role in the directory)\n");
            continue;
        }

        for referee in &of_role {
            let status = if availability.is_available(&referee.id) {
                "available"
            } else {
                "unavailable"
            };
            report.push_str(&format!("  {} -> {}\n", format_referee_name(referee), status));
        }

        let unavailable = unavailable_count(role, referees, availability);
        report.push_str(&format!(
            "  {} of {} unavailable\n",
            unavailable,
            of_role.len()
        ));
    }

    report
}

/// Prints the availability report to stdout
pub fn print_availability_report(
    date: &str,
    time: &str,
    referees: &[Referee],
    availability: &Availability,
) {
    print!("{}", availability_report(date, time, referees, availability));
}

/// Writes the availability report to a file
pub fn write_availability_report(
    filename: &str,
    report: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = File::create(filename)?;
    file.write_all(report.as_bytes())?;
    Ok(())
}
