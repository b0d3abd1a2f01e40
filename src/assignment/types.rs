use std::collections::{BTreeMap, HashSet};
use serde::{Serialize, Deserialize};
use tracing::warn;

use super::qualifications::Qualification;
use super::slots::{SlotRole, DASHES};

/// RSVP state of a pilot for the event being planned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attendance {
    Accepted,
    Tentative,
    Declined,
    NoResponse,
}

impl Attendance {
    /// Parses the attendance column of a roster export. Anything unrecognised is treated as no response.
    pub fn parse(value: &str) -> Attendance {
        match value.trim().to_lowercase().as_str() {
            "accepted" | "accept" | "yes" | "attending" => Attendance::Accepted,
            "tentative" | "maybe" => Attendance::Tentative,
            "declined" | "decline" | "no" => Attendance::Declined,
            _ => Attendance::NoResponse,
        }
    }

    pub fn is_available(self, include_tentative: bool) -> bool {
        match self {
            Attendance::Accepted => true,
            Attendance::Tentative => include_tentative,
            Attendance::Declined | Attendance::NoResponse => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pilot {
    pub id: String,
    pub board_number: String,
    pub callsign: String,
    #[serde(default)]
    pub squadron_id: Option<String>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    pub attendance: Attendance,
}

impl Pilot {
    pub fn holds(&self, qualification: Qualification) -> bool {
        self.qualifications.contains(&qualification)
    }
}

/// A flight of four. `slots[0]` is dash-1, `slots[3]` is dash-4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub id: String,
    pub callsign: String,
    pub flight_number: u32,
    #[serde(default)]
    pub slots: [Option<String>; 4],
    #[serde(default)]
    pub channel_primary: u32,
    #[serde(default)]
    pub channel_secondary: u32,
    #[serde(default)]
    pub creation_order: u32,
}

impl Flight {
    pub fn new(id: &str, callsign: &str, flight_number: u32) -> Self {
        Flight {
            id: id.to_string(),
            callsign: callsign.to_string(),
            flight_number,
            slots: Default::default(),
            channel_primary: 0,
            channel_secondary: 0,
            creation_order: 0,
        }
    }

    /// e.g. "STING 2"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.callsign, self.flight_number)
    }
}

/// Flights ordered by creation order; flights created at the same point keep input order.
pub fn creation_ordered(flights: &[Flight]) -> Vec<&Flight> {
    let mut ordered: Vec<&Flight> = flights.iter().collect();
    ordered.sort_by_key(|f| f.creation_order);
    ordered
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squadron {
    pub id: String,
    pub name: String,
    pub callsigns: Vec<String>,
}

/// Read-only callsign -> squadron lookup injected into the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SquadronDirectory {
    by_callsign: BTreeMap<String, String>,
}

impl SquadronDirectory {
    pub fn new(squadrons: &[Squadron]) -> Self {
        let mut by_callsign = BTreeMap::new();
        for squadron in squadrons {
            for callsign in &squadron.callsigns {
                let key = normalize_callsign(callsign);
                if key.is_empty() {
                    continue;
                }
                if let Some(owner) = by_callsign.get(&key) {
                    warn!(callsign = %key, owner = %owner, ignored = %squadron.id, "callsign claimed by two squadrons");
                    continue;
                }
                by_callsign.insert(key, squadron.id.clone());
            }
        }
        SquadronDirectory { by_callsign }
    }

    /// Squadron owning a flight callsign, if the callsign is a standard one
    pub fn squadron_for(&self, callsign: &str) -> Option<&str> {
        self.by_callsign.get(&normalize_callsign(callsign)).map(String::as_str)
    }

    pub fn is_recognized(&self, callsign: &str) -> bool {
        self.squadron_for(callsign).is_some()
    }
}

fn normalize_callsign(callsign: &str) -> String {
    callsign.trim().to_uppercase()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub dash: u8,
    pub pilot_id: String,
}

/// flight id -> placements sorted by dash number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentMap {
    flights: BTreeMap<String, Vec<Placement>>,
}

impl AssignmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from the slot occupancy carried on the flights themselves
    pub fn from_flights(flights: &[Flight]) -> Self {
        let mut map = AssignmentMap::new();
        for flight in flights {
            map.ensure_flight(&flight.id);
            for (dash, pilot_id) in DASHES.iter().zip(flight.slots.iter()) {
                if let Some(pilot_id) = pilot_id {
                    map.place(&flight.id, *dash, pilot_id);
                }
            }
        }
        map
    }

    /// Writes slot occupancy back onto the flights. Flights absent from the map are cleared.
    pub fn write_to(&self, flights: &mut [Flight]) {
        for flight in flights.iter_mut() {
            for (slot, dash) in flight.slots.iter_mut().zip(DASHES.iter()) {
                *slot = self.pilot_at(&flight.id, *dash).map(str::to_string);
            }
        }
    }

    pub fn ensure_flight(&mut self, flight_id: &str) {
        self.flights.entry(flight_id.to_string()).or_default();
    }

    /// Puts a pilot into a slot, replacing whoever held it. Returns false for an invalid dash.
    pub fn place(&mut self, flight_id: &str, dash: u8, pilot_id: &str) -> bool {
        if SlotRole::for_dash(dash).is_none() {
            return false;
        }
        let placements = self.flights.entry(flight_id.to_string()).or_default();
        placements.retain(|p| p.dash != dash);
        placements.push(Placement { dash, pilot_id: pilot_id.to_string() });
        placements.sort_by_key(|p| p.dash);
        true
    }

    pub fn pilot_at(&self, flight_id: &str, dash: u8) -> Option<&str> {
        self.placements(flight_id)
            .iter()
            .find(|p| p.dash == dash)
            .map(|p| p.pilot_id.as_str())
    }

    pub fn placements(&self, flight_id: &str) -> &[Placement] {
        self.flights.get(flight_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_pilot(&self, pilot_id: &str) -> bool {
        self.flights.values().flatten().any(|p| p.pilot_id == pilot_id)
    }

    /// Ids of every placed pilot
    pub fn pilot_ids(&self) -> HashSet<&str> {
        self.flights.values().flatten().map(|p| p.pilot_id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Placement])> {
        self.flights.iter().map(|(id, placements)| (id.as_str(), placements.as_slice()))
    }

    pub fn total_placements(&self) -> usize {
        self.flights.values().map(Vec::len).sum()
    }
}

/// A filled lead slot offered as mission commander
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommanderCandidate {
    pub pilot_id: String,
    pub flight_id: String,
    pub flight_callsign: String,
    pub flight_number: u32,
    pub dash: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptySlot {
    pub flight_id: String,
    pub dash: u8,
}

/// Output of one assignment run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub assignments: AssignmentMap,
    pub suggested_commander: Option<CommanderCandidate>,
    pub unassigned: Vec<String>, // eligible pilot IDs left without a slot
    pub empty_slots: Vec<EmptySlot>,
}
