use std::collections::HashMap;
use std::fs::File;
use std::io::Write;

use crate::assignment::{creation_ordered, flight_slots, AssignmentResult, CommanderCandidate, Flight, Pilot};
use crate::error::Result;

/// Formats a pilot with board number, e.g. "[201] Maverick"
pub fn format_pilot_name(board_number: &str, callsign: &str) -> String {
    if board_number.is_empty() {
        callsign.to_string()
    } else {
        format!("[{}] {}", board_number, callsign)
    }
}

/// e.g. "STING 1-3"
pub fn slot_label(flight: &Flight, dash: u8) -> String {
    format!("{} {}-{}", flight.callsign, flight.flight_number, dash)
}

fn pilot_label(pilot_id: &str, pilots: &HashMap<&str, &Pilot>) -> String {
    pilots
        .get(pilot_id)
        .map(|p| format_pilot_name(&p.board_number, &p.callsign))
        .unwrap_or_else(|| format!("<unknown {}>", pilot_id))
}

pub fn format_commander(candidate: &CommanderCandidate, pilots: &[Pilot]) -> String {
    let pilot_map: HashMap<&str, &Pilot> = pilots.iter().map(|p| (p.id.as_str(), p)).collect();
    format!(
        "{} ({} {}-{})",
        pilot_label(&candidate.pilot_id, &pilot_map),
        candidate.flight_callsign,
        candidate.flight_number,
        candidate.dash
    )
}

/// One line per slot: "STING 1-1 [201] Maverick" or "STING 1-2 [EMPTY]"
pub fn assignment_lines(result: &AssignmentResult, flights: &[Flight], pilots: &[Pilot]) -> Vec<String> {
    let pilot_map: HashMap<&str, &Pilot> = pilots.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut lines = Vec::new();
    for flight in creation_ordered(flights) {
        for slot in flight_slots(&flight.id, &result.assignments) {
            let occupant = match &slot.pilot_id {
                Some(pilot_id) => pilot_label(pilot_id, &pilot_map),
                None => "[EMPTY]".to_string(),
            };
            lines.push(format!("{} {}", slot_label(flight, slot.dash), occupant));
        }
    }
    lines
}

/// Writes the assignment to a file, one slot per line
pub fn write_assignment_to_file(
    title: &str,
    result: &AssignmentResult,
    flights: &[Flight],
    pilots: &[Pilot],
    filename: &str,
) -> Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} **", title)?;
    for line in assignment_lines(result, flights, pilots) {
        writeln!(file, "{}", line)?;
    }
    if let Some(commander) = &result.suggested_commander {
        writeln!(file, "Mission Commander: {}", format_commander(commander, pilots))?;
    }

    Ok(())
}

/// Prints an assignment in a readable format
pub fn print_assignment(title: &str, result: &AssignmentResult, flights: &[Flight], pilots: &[Pilot]) {
    let pilot_map: HashMap<&str, &Pilot> = pilots.iter().map(|p| (p.id.as_str(), p)).collect();

    println!("\n=== {} ===", title);
    println!("Pilots placed: {}", result.assignments.total_placements());
    println!("Empty slots: {}", result.empty_slots.len());

    if !result.unassigned.is_empty() {
        println!("⚠️  Available pilots without a slot ({}):", result.unassigned.len());
        for pilot_id in &result.unassigned {
            println!("  - {} (ID: {})", pilot_label(pilot_id, &pilot_map), pilot_id);
        }
    }

    println!("\nSlots:");
    for line in assignment_lines(result, flights, pilots) {
        println!("  {}", line);
    }

    match &result.suggested_commander {
        Some(commander) => println!("\nSuggested mission commander: {}", format_commander(commander, pilots)),
        None => println!("\nNo mission commander could be suggested"),
    }
}
