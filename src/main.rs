mod assignment;
mod display;
mod form;
mod parser;
mod web;

use assignment::resolver::{compute_availability, AvailabilityContext};
use assignment::store::GameStore;
use assignment::timeutil::{parse_date, parse_time};
use display::{availability_report, print_availability_report, write_availability_report};
use parser::{load_absences, load_games, load_referees};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    // Web mode
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2).and_then(|p| p.parse::<u16>().ok()).unwrap_or(8080);
        let password =
            std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, password).await?;
        return Ok(());
    }

    // CLI report mode: availability for a candidate date/time
    if args.len() > 3 && args[1] == "report" {
        let date_arg = &args[2];
        let time_arg = &args[3];
        let date = parse_date(date_arg).ok_or("date must be YYYY-MM-DD")?;
        let time = parse_time(time_arg).ok_or("time must be HH:MM")?;

        println!("Loading referee directory and absence list...");
        let referees = load_referees("data/referees.csv")?;
        let absences = load_absences("data/absences.csv")?;

        let mut store = GameStore::new();
        if std::path::Path::new("data/games.csv").exists() {
            for game in load_games("data/games.csv")? {
                store.insert(game)?;
            }
        }
        println!(
            "Loaded {} referees, {} absences, {} scheduled games",
            referees.len(),
            absences.len(),
            store.games().len()
        );

        let ctx = AvailabilityContext {
            referees: &referees,
            absences: &absences,
            date: Some(date),
            time: Some(time),
            lookup: &store,
        };
        let availability = compute_availability(&ctx);

        print_availability_report(date_arg, time_arg, &referees, &availability);

        let report = availability_report(date_arg, time_arg, &referees, &availability);
        write_availability_report("availability_report.txt", &report)?;
        println!("\nReport saved to availability_report.txt");
        return Ok(());
    }

    println!("Usage:");
    println!("  referee-scheduler web [port]          start the web interface");
    println!("  referee-scheduler report DATE TIME    print the availability report");
    println!("                                        (DATE as YYYY-MM-DD, TIME as HH:MM,");
    println!("                                         data read from data/*.csv)");
    Ok(())
}
