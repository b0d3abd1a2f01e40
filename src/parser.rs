use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::assignment::{
    validate_config, AssignmentConfig, AssignmentConfigRequest, Attendance, Flight, Pilot, Qualification, Squadron,
};
use crate::error::Result;

/// Finds a column by header name, ignoring case, spaces, dashes and underscores
fn find_column(headers: &StringRecord, names: &[&str], fallback: usize) -> usize {
    let normalize = |h: &str| -> String {
        h.chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase()
    };
    headers
        .iter()
        .position(|h| names.iter().any(|name| normalize(h) == *name))
        .unwrap_or(fallback)
}

fn field(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

/// Parses a number, returning 0 if empty or invalid
fn parse_number(value: &str) -> u32 {
    value.trim().parse().unwrap_or(0)
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split([';', '|']).map(str::trim).filter(|s| !s.is_empty())
}

/// Parses a `;`-separated qualification list. Unknown tags are skipped.
pub fn parse_qualifications(value: &str) -> Vec<Qualification> {
    let mut qualifications = Vec::new();
    for tag in split_list(value) {
        match Qualification::parse(tag) {
            Some(q) if !qualifications.contains(&q) => qualifications.push(q),
            Some(_) => {}
            None => warn!(tag, "unknown qualification tag skipped"),
        }
    }
    qualifications
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().trim(Trim::All).flexible(true).from_reader(reader)
}

/// Reads a pilot roster. A repeated pilot id replaces the earlier row but keeps its position.
pub fn read_pilots<R: Read>(reader: R) -> Result<Vec<Pilot>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();

    let id_col = find_column(&headers, &["id", "pilotid"], 0);
    let board_col = find_column(&headers, &["boardnumber", "board", "modex"], 1);
    let callsign_col = find_column(&headers, &["callsign"], 2);
    let squadron_col = find_column(&headers, &["squadron", "squadronid"], 3);
    let quals_col = find_column(&headers, &["qualifications", "quals"], 4);
    let attendance_col = find_column(&headers, &["attendance", "status", "rsvp"], 5);

    let mut pilots: Vec<Pilot> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record = result?;
        let id = field(&record, id_col).to_string();
        if id.is_empty() {
            continue;
        }
        let squadron = field(&record, squadron_col);
        let pilot = Pilot {
            id: id.clone(),
            board_number: field(&record, board_col).to_string(),
            callsign: field(&record, callsign_col).to_string(),
            squadron_id: (!squadron.is_empty()).then(|| squadron.to_string()),
            qualifications: parse_qualifications(field(&record, quals_col)),
            attendance: Attendance::parse(field(&record, attendance_col)),
        };

        if let Some(&existing) = index.get(&id) {
            debug!(pilot = %id, "roster row replaces an earlier row");
            pilots[existing] = pilot;
        } else {
            index.insert(id, pilots.len());
            pilots.push(pilot);
        }
    }

    Ok(pilots)
}

/// Reads flights with their current slot occupancy. Row order is creation order.
pub fn read_flights<R: Read>(reader: R) -> Result<Vec<Flight>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();

    let id_col = find_column(&headers, &["id", "flightid"], 0);
    let callsign_col = find_column(&headers, &["callsign"], 1);
    let number_col = find_column(&headers, &["flightnumber", "number"], 2);
    let primary_col = find_column(&headers, &["channelprimary", "primary"], 3);
    let secondary_col = find_column(&headers, &["channelsecondary", "secondary"], 4);
    let dash_cols = [
        find_column(&headers, &["dash1"], 5),
        find_column(&headers, &["dash2"], 6),
        find_column(&headers, &["dash3"], 7),
        find_column(&headers, &["dash4"], 8),
    ];

    let mut flights = Vec::new();
    for result in reader.records() {
        let record = result?;
        let id = field(&record, id_col);
        let callsign = field(&record, callsign_col);
        if id.is_empty() || callsign.is_empty() {
            continue;
        }

        let mut flight = Flight::new(id, callsign, parse_number(field(&record, number_col)));
        flight.channel_primary = parse_number(field(&record, primary_col));
        flight.channel_secondary = parse_number(field(&record, secondary_col));
        flight.creation_order = flights.len() as u32;
        flight.slots = dash_cols.map(|col| {
            let pilot_id = field(&record, col);
            (!pilot_id.is_empty()).then(|| pilot_id.to_string())
        });
        flights.push(flight);
    }

    Ok(flights)
}

pub fn read_squadrons<R: Read>(reader: R) -> Result<Vec<Squadron>> {
    let mut reader = csv_reader(reader);
    let headers = reader.headers()?.clone();

    let id_col = find_column(&headers, &["id", "squadronid"], 0);
    let name_col = find_column(&headers, &["name"], 1);
    let callsigns_col = find_column(&headers, &["callsigns", "callsign"], 2);

    let mut squadrons = Vec::new();
    for result in reader.records() {
        let record = result?;
        let id = field(&record, id_col);
        if id.is_empty() {
            continue;
        }
        squadrons.push(Squadron {
            id: id.to_string(),
            name: field(&record, name_col).to_string(),
            callsigns: split_list(field(&record, callsigns_col)).map(str::to_string).collect(),
        });
    }

    Ok(squadrons)
}

pub fn load_pilots<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Pilot>> {
    read_pilots(File::open(csv_path)?)
}

pub fn load_flights<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Flight>> {
    read_flights(File::open(csv_path)?)
}

pub fn load_squadrons<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Squadron>> {
    read_squadrons(File::open(csv_path)?)
}

/// Reads and validates an assignment policy. Missing fields take their defaults.
pub fn read_config<R: Read>(reader: R) -> Result<AssignmentConfig> {
    let request: AssignmentConfigRequest = serde_json::from_reader(reader)?;
    Ok(validate_config(&request)?)
}

pub fn load_config<P: AsRef<Path>>(json_path: P) -> Result<AssignmentConfig> {
    read_config(File::open(json_path)?)
}
