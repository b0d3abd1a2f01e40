use serde::{Serialize, Deserialize};

use super::qualifications::Qualification;
use super::types::AssignmentMap;

/// Dash numbers in display order
pub const DASHES: [u8; 4] = [1, 2, 3, 4];

/// Dash numbers in the order slots are filled: leads before wingmen
pub const LEAD_FIRST: [u8; 4] = [1, 3, 2, 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotRole {
    FlightLead,
    Wingman,
    SectionLead,
}

impl SlotRole {
    pub fn for_dash(dash: u8) -> Option<SlotRole> {
        match dash {
            1 => Some(SlotRole::FlightLead),
            2 | 4 => Some(SlotRole::Wingman),
            3 => Some(SlotRole::SectionLead),
            _ => None,
        }
    }

    pub fn requirement(self) -> Option<Qualification> {
        match self {
            SlotRole::FlightLead => Some(Qualification::FlightLead),
            SlotRole::SectionLead => Some(Qualification::SectionLead),
            SlotRole::Wingman => None,
        }
    }

    pub fn is_lead(self) -> bool {
        !matches!(self, SlotRole::Wingman)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub dash: u8,
    pub pilot_id: Option<String>,
}

impl Slot {
    pub fn role(&self) -> Option<SlotRole> {
        SlotRole::for_dash(self.dash)
    }

    pub fn requirement(&self) -> Option<Qualification> {
        self.role().and_then(SlotRole::requirement)
    }

    pub fn is_empty(&self) -> bool {
        self.pilot_id.is_none()
    }
}

/// The four slots of a flight as currently held in the map
pub fn flight_slots(flight_id: &str, assignments: &AssignmentMap) -> [Slot; 4] {
    DASHES.map(|dash| Slot {
        dash,
        pilot_id: assignments.pilot_at(flight_id, dash).map(str::to_string),
    })
}

/// Empty dashes of a flight, leads first
pub fn empty_dashes(flight_id: &str, assignments: &AssignmentMap) -> Vec<u8> {
    LEAD_FIRST
        .iter()
        .copied()
        .filter(|dash| assignments.pilot_at(flight_id, *dash).is_none())
        .collect()
}
