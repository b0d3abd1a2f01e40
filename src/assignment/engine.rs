use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::commander::{commander_candidates, suggest_commander};
use super::policy::{AssignmentConfig, AssignmentScope, FillingPriority, NonStandardCallsigns, SquadronCohesion};
use super::qualifications::{is_qualified_for, Qualification, QualificationRanking};
use super::slots::{SlotRole, DASHES, LEAD_FIRST};
use super::types::{
    creation_ordered, AssignmentMap, AssignmentResult, EmptySlot, Flight, Pilot, SquadronDirectory,
};

/// Assigns pilots to flight slots using the default qualification ranking
pub fn assign(
    flights: &[Flight],
    pilots: &[Pilot],
    existing: &AssignmentMap,
    squadrons: &SquadronDirectory,
    config: &AssignmentConfig,
) -> AssignmentResult {
    assign_with_ranking(flights, pilots, existing, squadrons, config, &QualificationRanking::default())
}

/// Assigns pilots to flight slots. Never fails: slots without a suitable pilot stay empty
/// and are listed in the result.
pub fn assign_with_ranking(
    flights: &[Flight],
    pilots: &[Pilot],
    existing: &AssignmentMap,
    squadrons: &SquadronDirectory,
    config: &AssignmentConfig,
    ranking: &QualificationRanking,
) -> AssignmentResult {
    let mut assignments = match config.assignment_scope {
        AssignmentScope::Clear => AssignmentMap::new(),
        AssignmentScope::FillGaps => seed_existing(existing),
    };
    for flight in flights {
        assignments.ensure_flight(&flight.id);
    }

    let mut pool = eligible_pool(pilots, &assignments, config.include_tentative);
    debug!(eligible = pool.len(), "candidate pool built");

    let ordered = fill_order(flights, squadrons, config.non_standard_callsigns);
    for (flight, dash) in slot_targets(&ordered, config.flight_filling_priority) {
        if assignments.pilot_at(&flight.id, dash).is_some() {
            continue;
        }
        let requirement = SlotRole::for_dash(dash).and_then(SlotRole::requirement);
        let owner = squadrons.squadron_for(&flight.callsign);
        let tiers = cohesion_tiers(&pool, owner, config.squadron_cohesion);

        match pick_candidate(&pool, &tiers, requirement, config.assign_unqualified) {
            Some(index) => {
                let pilot = pool.remove(index);
                debug!(flight = %flight.display_name(), dash, pilot = %pilot.id, "slot filled");
                assignments.place(&flight.id, dash, &pilot.id);
            }
            None => debug!(flight = %flight.display_name(), dash, "no candidate for slot"),
        }
    }

    let candidates = commander_candidates(flights, &assignments);
    let suggested_commander = suggest_commander(&candidates, pilots, ranking);

    let empty_slots: Vec<EmptySlot> = creation_ordered(flights)
        .into_iter()
        .flat_map(|flight| {
            DASHES
                .iter()
                .filter(|dash| assignments.pilot_at(&flight.id, **dash).is_none())
                .map(|dash| EmptySlot { flight_id: flight.id.clone(), dash: *dash })
                .collect::<Vec<_>>()
        })
        .collect();
    let unassigned: Vec<String> = pool.iter().map(|p| p.id.clone()).collect();

    info!(
        placed = assignments.total_placements(),
        empty = empty_slots.len(),
        unassigned = unassigned.len(),
        "assignment run complete"
    );

    AssignmentResult {
        assignments,
        suggested_commander,
        unassigned,
        empty_slots,
    }
}

/// Copies existing placements, keeping only the first slot of a pilot listed twice
fn seed_existing(existing: &AssignmentMap) -> AssignmentMap {
    let mut seeded = AssignmentMap::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for (flight_id, placements) in existing.iter() {
        seeded.ensure_flight(flight_id);
        for placement in placements {
            if !seen.insert(placement.pilot_id.as_str()) {
                warn!(pilot = %placement.pilot_id, flight = %flight_id, dash = placement.dash, "pilot already placed, dropping duplicate");
                continue;
            }
            seeded.place(flight_id, placement.dash, &placement.pilot_id);
        }
    }
    seeded
}

/// Available pilots not yet placed, in input order. A repeated pilot id only counts once.
fn eligible_pool<'a>(pilots: &'a [Pilot], assignments: &AssignmentMap, include_tentative: bool) -> Vec<&'a Pilot> {
    let placed = assignments.pilot_ids();
    let mut seen: HashSet<&str> = HashSet::new();
    pilots
        .iter()
        .filter(|p| p.attendance.is_available(include_tentative))
        .filter(|p| !placed.contains(p.id.as_str()))
        .filter(|&p| seen.insert(p.id.as_str()))
        .collect()
}

/// Flights that may receive pilots, in the order they are offered pilots
fn fill_order<'a>(
    flights: &'a [Flight],
    squadrons: &SquadronDirectory,
    non_standard: NonStandardCallsigns,
) -> Vec<&'a Flight> {
    let ordered = creation_ordered(flights);
    let (recognized, other): (Vec<&Flight>, Vec<&Flight>) =
        ordered.iter().copied().partition(|f| squadrons.is_recognized(&f.callsign));

    match non_standard {
        NonStandardCallsigns::Ignore => recognized,
        NonStandardCallsigns::FillFirst => other.into_iter().chain(recognized).collect(),
        NonStandardCallsigns::FillLast => recognized.into_iter().chain(other).collect(),
        NonStandardCallsigns::FillInSequence => ordered,
    }
}

fn slot_targets<'a>(flights: &[&'a Flight], priority: FillingPriority) -> Vec<(&'a Flight, u8)> {
    match priority {
        FillingPriority::Depth => flights
            .iter()
            .flat_map(|flight| LEAD_FIRST.iter().map(move |dash| (*flight, *dash)))
            .collect(),
        FillingPriority::Breadth => LEAD_FIRST
            .iter()
            .flat_map(|dash| flights.iter().map(move |flight| (*flight, *dash)))
            .collect(),
    }
}

/// Pool indices grouped into tiers tried in order. Under enforced cohesion a flight with
/// no owning squadron accepts nobody; otherwise it is open to everyone.
fn cohesion_tiers(pool: &[&Pilot], owner: Option<&str>, cohesion: SquadronCohesion) -> Vec<Vec<usize>> {
    let everyone = 0..pool.len();
    let owner = match (owner, cohesion) {
        (None, SquadronCohesion::Enforced) => return vec![Vec::new()],
        (Some(owner), SquadronCohesion::Enforced | SquadronCohesion::Prioritized) => owner,
        _ => return vec![everyone.collect()],
    };
    let (same, other): (Vec<usize>, Vec<usize>) =
        everyone.partition(|i| pool[*i].squadron_id.as_deref() == Some(owner));

    if cohesion == SquadronCohesion::Enforced {
        vec![same]
    } else {
        vec![same, other]
    }
}

/// Qualified pilots are tried through every tier before falling back to unqualified ones
fn pick_candidate(
    pool: &[&Pilot],
    tiers: &[Vec<usize>],
    requirement: Option<Qualification>,
    assign_unqualified: bool,
) -> Option<usize> {
    let mut in_tier_order = tiers.iter().flatten().copied();
    if let Some(index) = in_tier_order.clone().find(|i| is_qualified_for(pool[*i], requirement)) {
        return Some(index);
    }
    if assign_unqualified {
        return in_tier_order.next();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::types::{Attendance, Squadron};

    fn pilot(id: &str, squadron: Option<&str>, qualifications: &[Qualification]) -> Pilot {
        Pilot {
            id: id.to_string(),
            board_number: id.to_string(),
            callsign: id.to_uppercase(),
            squadron_id: squadron.map(str::to_string),
            qualifications: qualifications.to_vec(),
            attendance: Attendance::Accepted,
        }
    }

    fn flight(id: &str, callsign: &str, order: u32) -> Flight {
        let mut f = Flight::new(id, callsign, 1);
        f.creation_order = order;
        f
    }

    fn directory() -> SquadronDirectory {
        SquadronDirectory::new(&[
            Squadron { id: "x".into(), name: "X".into(), callsigns: vec!["STING".into()] },
            Squadron { id: "y".into(), name: "Y".into(), callsigns: vec!["VIPER".into()] },
        ])
    }

    fn ids(flights: &[&Flight]) -> Vec<String> {
        flights.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn non_standard_ordering() {
        let flights = vec![flight("s", "STING", 0), flight("h", "HAWG", 1), flight("v", "VIPER", 2)];
        let dir = directory();
        assert_eq!(ids(&fill_order(&flights, &dir, NonStandardCallsigns::FillFirst)), vec!["h", "s", "v"]);
        assert_eq!(ids(&fill_order(&flights, &dir, NonStandardCallsigns::FillLast)), vec!["s", "v", "h"]);
        assert_eq!(ids(&fill_order(&flights, &dir, NonStandardCallsigns::FillInSequence)), vec!["s", "h", "v"]);
        assert_eq!(ids(&fill_order(&flights, &dir, NonStandardCallsigns::Ignore)), vec!["s", "v"]);
    }

    #[test]
    fn breadth_and_depth_targets() {
        let a = flight("a", "STING", 0);
        let b = flight("b", "STING", 1);
        let flights = vec![&a, &b];
        let breadth: Vec<(&str, u8)> = slot_targets(&flights, FillingPriority::Breadth)
            .iter()
            .map(|(f, d)| (f.id.as_str(), *d))
            .collect();
        assert_eq!(&breadth[..4], &[("a", 1), ("b", 1), ("a", 3), ("b", 3)]);
        let depth: Vec<(&str, u8)> = slot_targets(&flights, FillingPriority::Depth)
            .iter()
            .map(|(f, d)| (f.id.as_str(), *d))
            .collect();
        assert_eq!(&depth[..5], &[("a", 1), ("a", 3), ("a", 2), ("a", 4), ("b", 1)]);
    }

    #[test]
    fn prioritized_cohesion_tries_qualified_cross_squadron_before_unqualified() {
        let pilots = vec![
            pilot("own", Some("x"), &[]),
            pilot("other", Some("y"), &[Qualification::FlightLead]),
        ];
        let pool: Vec<&Pilot> = pilots.iter().collect();
        let tiers = cohesion_tiers(&pool, Some("x"), SquadronCohesion::Prioritized);
        assert_eq!(tiers, vec![vec![0], vec![1]]);
        assert_eq!(pick_candidate(&pool, &tiers, Some(Qualification::FlightLead), true), Some(1));
        assert_eq!(pick_candidate(&pool, &tiers, None, false), Some(0));

        let enforced = cohesion_tiers(&pool, Some("x"), SquadronCohesion::Enforced);
        assert_eq!(pick_candidate(&pool, &enforced, Some(Qualification::FlightLead), false), None);
        assert_eq!(pick_candidate(&pool, &enforced, Some(Qualification::FlightLead), true), Some(0));
    }

    #[test]
    fn ignore_cohesion_keeps_input_order() {
        let pilots = vec![pilot("a", Some("y"), &[]), pilot("b", Some("x"), &[])];
        let pool: Vec<&Pilot> = pilots.iter().collect();
        assert_eq!(cohesion_tiers(&pool, Some("x"), SquadronCohesion::Ignore), vec![vec![0, 1]]);
        assert_eq!(cohesion_tiers(&pool, None, SquadronCohesion::Prioritized), vec![vec![0, 1]]);
    }

    #[test]
    fn enforced_cohesion_leaves_unowned_flights_empty() {
        let pool_pilots = vec![pilot("a", Some("x"), &[Qualification::FlightLead])];
        let pool: Vec<&Pilot> = pool_pilots.iter().collect();
        let tiers = cohesion_tiers(&pool, None, SquadronCohesion::Enforced);
        assert_eq!(tiers, vec![Vec::<usize>::new()]);
        assert_eq!(pick_candidate(&pool, &tiers, None, true), None);

        let flights = vec![flight("h", "HAWG", 0)];
        let pilots = vec![
            pilot("px", Some("x"), &[Qualification::FlightLead, Qualification::SectionLead]),
            pilot("py", Some("y"), &[]),
        ];
        for non_standard in [NonStandardCallsigns::FillFirst, NonStandardCallsigns::FillInSequence] {
            let config = AssignmentConfig {
                squadron_cohesion: SquadronCohesion::Enforced,
                non_standard_callsigns: non_standard,
                assign_unqualified: true,
                ..Default::default()
            };
            let result = assign(&flights, &pilots, &AssignmentMap::new(), &directory(), &config);
            assert!(result.assignments.placements("h").is_empty());
            assert_eq!(result.unassigned, vec!["px".to_string(), "py".to_string()]);
            assert_eq!(result.empty_slots.len(), 4);
        }
    }

    #[test]
    fn seeding_drops_duplicate_placements() {
        let mut existing = AssignmentMap::new();
        existing.place("a", 1, "p1");
        existing.place("b", 2, "p1");
        existing.place("b", 4, "p2");
        let seeded = seed_existing(&existing);
        assert_eq!(seeded.pilot_at("a", 1), Some("p1"));
        assert_eq!(seeded.pilot_at("b", 2), None);
        assert_eq!(seeded.pilot_at("b", 4), Some("p2"));
    }

    #[test]
    fn pool_respects_attendance_and_placement() {
        let mut tentative = pilot("t", None, &[]);
        tentative.attendance = Attendance::Tentative;
        let mut declined = pilot("d", None, &[]);
        declined.attendance = Attendance::Declined;
        let pilots = vec![pilot("a", None, &[]), tentative, declined, pilot("placed", None, &[]), pilot("a", None, &[])];
        let mut map = AssignmentMap::new();
        map.place("f", 2, "placed");

        let pool: Vec<&str> = eligible_pool(&pilots, &map, false).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(pool, vec!["a"]);
        let pool: Vec<&str> = eligible_pool(&pilots, &map, true).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(pool, vec!["a", "t"]);
    }

    #[test]
    fn ignored_non_standard_flight_keeps_existing_under_fill_gaps() {
        let mut hawg = flight("h", "HAWG", 0);
        hawg.slots[1] = Some("kept".to_string());
        let flights = vec![hawg];
        let pilots = vec![pilot("kept", None, &[]), pilot("free", None, &[Qualification::FlightLead])];
        let config = AssignmentConfig {
            assignment_scope: AssignmentScope::FillGaps,
            non_standard_callsigns: NonStandardCallsigns::Ignore,
            ..Default::default()
        };
        let result = assign(&flights, &pilots, &AssignmentMap::from_flights(&flights), &directory(), &config);
        assert_eq!(result.assignments.pilot_at("h", 2), Some("kept"));
        assert_eq!(result.assignments.pilot_at("h", 1), None);
        assert_eq!(result.unassigned, vec!["free".to_string()]);
        assert_eq!(result.empty_slots.len(), 3);
    }
}
