use std::path::Path;
use tracing_subscriber::EnvFilter;

use flight_assignments::assignment::{assign, AssignmentConfig, AssignmentMap, SquadronDirectory};
use flight_assignments::config::ServerConfig;
use flight_assignments::display::{print_assignment, write_assignment_to_file};
use flight_assignments::parser::{load_config, load_flights, load_pilots, load_squadrons};
use flight_assignments::web;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args.get(2).and_then(|p| p.parse::<u16>().ok());
        let config = ServerConfig::from_env(port)?;

        println!("Access the site at http://localhost:{}", config.port);
        web::start_server(config).await?;
        return Ok(());
    }

    // CLI mode: pilots.csv flights.csv squadrons.csv [config.json]
    let pilots_path = args.get(1).map(String::as_str).unwrap_or("data/pilots.csv");
    let flights_path = args.get(2).map(String::as_str).unwrap_or("data/flights.csv");
    let squadrons_path = args.get(3).map(String::as_str).unwrap_or("data/squadrons.csv");
    let config_path = args.get(4).map(String::as_str).unwrap_or("data/config.json");

    println!("Loading roster from CSV...");
    let pilots = load_pilots(pilots_path)?;
    let flights = load_flights(flights_path)?;
    let squadrons = load_squadrons(squadrons_path)?;
    let config = if Path::new(config_path).exists() {
        load_config(config_path)?
    } else {
        AssignmentConfig::default()
    };

    println!(
        "Loaded {} pilots, {} flights, {} squadrons",
        pilots.len(),
        flights.len(),
        squadrons.len()
    );

    println!("\n\n=== Running Auto-Assignment ===");
    let directory = SquadronDirectory::new(&squadrons);
    let existing = AssignmentMap::from_flights(&flights);
    let result = assign(&flights, &pilots, &existing, &directory, &config);

    print_assignment("Flight Assignment", &result, &flights, &pilots);

    println!("\n=== Writing Assignment to File ===");
    write_assignment_to_file("Flight Assignment", &result, &flights, &pilots, "assignment.txt")?;
    println!("Assignment saved to:");
    println!("  - assignment.txt");

    Ok(())
}
