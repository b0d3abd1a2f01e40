pub mod types;
pub mod qualifications;
pub mod slots;
pub mod channels;
pub mod policy;
pub mod engine;
pub mod commander;

pub use types::{
    creation_ordered, AssignmentMap, AssignmentResult, Attendance, CommanderCandidate, EmptySlot, Flight, Pilot,
    Placement, Squadron, SquadronDirectory,
};
pub use qualifications::{group_by_highest, is_qualified_for, Qualification, QualificationRanking};
pub use slots::{flight_slots, Slot, SlotRole};
pub use channels::{allocate_channels, renumber_channels, used_channels, ChannelPair};
pub use policy::{validate_config, AssignmentConfig, AssignmentConfigRequest};
pub use engine::{assign, assign_with_ranking};
pub use commander::{commander_candidates, select_commander, suggest_commander};
