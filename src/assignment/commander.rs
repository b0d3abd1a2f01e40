use std::collections::HashMap;

use super::qualifications::{Qualification, QualificationRanking};
use super::slots::SlotRole;
use super::types::{creation_ordered, AssignmentMap, CommanderCandidate, Flight, Pilot};

/// Every filled flight-lead and section-lead slot, flights in creation order, dash-1 before dash-3
pub fn commander_candidates(flights: &[Flight], assignments: &AssignmentMap) -> Vec<CommanderCandidate> {
    creation_ordered(flights)
        .into_iter()
        .flat_map(|flight| {
            assignments
                .placements(&flight.id)
                .iter()
                .filter(|p| SlotRole::for_dash(p.dash).is_some_and(SlotRole::is_lead))
                .map(move |p| CommanderCandidate {
                    pilot_id: p.pilot_id.clone(),
                    flight_id: flight.id.clone(),
                    flight_callsign: flight.callsign.clone(),
                    flight_number: flight.flight_number,
                    dash: p.dash,
                })
        })
        .collect()
}

/// First candidate holding the most senior qualification present. Candidates whose best
/// qualification is Wingman are never suggested.
pub fn suggest_commander(
    candidates: &[CommanderCandidate],
    pilots: &[Pilot],
    ranking: &QualificationRanking,
) -> Option<CommanderCandidate> {
    let mut pilot_map: HashMap<&str, &Pilot> = HashMap::new();
    for pilot in pilots {
        pilot_map.entry(pilot.id.as_str()).or_insert(pilot);
    }

    let mut best: Option<(usize, &CommanderCandidate)> = None;
    for candidate in candidates {
        let Some(pilot) = pilot_map.get(candidate.pilot_id.as_str()) else {
            continue;
        };
        let highest = ranking.highest(pilot);
        if highest == Qualification::Wingman {
            continue;
        }
        let rank = ranking.rank(highest);
        if best.map_or(true, |(best_rank, _)| rank < best_rank) {
            best = Some((rank, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.clone())
}

/// A human choice of commander, accepted only if the pilot is a current candidate
pub fn select_commander(candidates: &[CommanderCandidate], pilot_id: &str) -> Option<CommanderCandidate> {
    candidates.iter().find(|c| c.pilot_id == pilot_id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::types::Attendance;

    fn pilot(id: &str, qualifications: &[Qualification]) -> Pilot {
        Pilot {
            id: id.to_string(),
            board_number: "200".to_string(),
            callsign: id.to_uppercase(),
            squadron_id: None,
            qualifications: qualifications.to_vec(),
            attendance: Attendance::Accepted,
        }
    }

    fn two_flights() -> (Vec<Flight>, AssignmentMap) {
        let mut second = Flight::new("f2", "VIPER", 1);
        second.creation_order = 1;
        let flights = vec![second, Flight::new("f1", "STING", 1)];
        let mut map = AssignmentMap::new();
        map.place("f1", 1, "a");
        map.place("f1", 2, "b");
        map.place("f1", 3, "c");
        map.place("f2", 3, "d");
        map.place("f2", 4, "e");
        (flights, map)
    }

    #[test]
    fn candidates_are_filled_leads_in_flight_order() {
        let (flights, map) = two_flights();
        let candidates = commander_candidates(&flights, &map);
        let summary: Vec<(&str, &str, u8)> = candidates
            .iter()
            .map(|c| (c.pilot_id.as_str(), c.flight_callsign.as_str(), c.dash))
            .collect();
        assert_eq!(summary, vec![("a", "STING", 1), ("c", "STING", 3), ("d", "VIPER", 3)]);
    }

    #[test]
    fn suggestion_prefers_seniority_then_first_occurrence() {
        let (flights, map) = two_flights();
        let candidates = commander_candidates(&flights, &map);
        let pilots = vec![
            pilot("a", &[Qualification::FlightLead]),
            pilot("c", &[Qualification::Instructor]),
            pilot("d", &[Qualification::Instructor, Qualification::Lso]),
        ];
        let suggested = suggest_commander(&candidates, &pilots, &QualificationRanking::default()).unwrap();
        assert_eq!(suggested.pilot_id, "c");
    }

    #[test]
    fn wingman_only_leads_give_no_suggestion() {
        let (flights, map) = two_flights();
        let candidates = commander_candidates(&flights, &map);
        let pilots = vec![pilot("a", &[]), pilot("c", &[]), pilot("d", &[])];
        assert!(suggest_commander(&candidates, &pilots, &QualificationRanking::default()).is_none());
        assert!(suggest_commander(&[], &pilots, &QualificationRanking::default()).is_none());
    }

    #[test]
    fn selection_must_be_a_candidate() {
        let (flights, map) = two_flights();
        let candidates = commander_candidates(&flights, &map);
        assert_eq!(select_commander(&candidates, "d").map(|c| c.flight_id), Some("f2".to_string()));
        assert!(select_commander(&candidates, "b").is_none());
    }
}
