//! MIDS channel allocation.
//!
//! Each flight owns a group of three consecutive channels starting at `3k + 1`: the primary, a
//! pair channel reserved beside it for the second section, and the secondary.

use std::collections::HashSet;
use serde::{Serialize, Deserialize};

use crate::error::ChannelError;
use super::types::Flight;

pub const CHANNEL_GROUP_SIZE: u32 = 3;

/// 42 groups of three cover channels 1-126
pub const MAX_CHANNEL_GROUPS: u32 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPair {
    pub primary: u32,
    pub secondary: u32,
}

impl ChannelPair {
    fn for_group(start: u32) -> Self {
        ChannelPair { primary: start, secondary: start + CHANNEL_GROUP_SIZE - 1 }
    }

    /// Every channel this pair takes, including the implicit pair channel
    pub fn reserved(&self) -> [u32; 3] {
        [self.primary, self.primary.saturating_add(1), self.secondary]
    }
}

/// Start of the first group of `group_size` consecutive ids (1-based) with no member in `used`
pub fn find_free_group(used: &HashSet<u32>, group_size: u32, max_groups: u32) -> Option<u32> {
    (0..max_groups)
        .map(|k| k * group_size + 1)
        .find(|&start| (start..start + group_size).all(|channel| !used.contains(&channel)))
}

pub fn allocate_channels(used: &HashSet<u32>) -> Result<ChannelPair, ChannelError> {
    find_free_group(used, CHANNEL_GROUP_SIZE, MAX_CHANNEL_GROUPS)
        .map(ChannelPair::for_group)
        .ok_or(ChannelError::NoneAvailable { groups: MAX_CHANNEL_GROUPS })
}

/// Channels taken by the given flights. A zero channel means "not allocated" and is skipped.
pub fn used_channels(flights: &[Flight]) -> HashSet<u32> {
    let mut used = HashSet::new();
    for flight in flights {
        if flight.channel_primary > 0 {
            used.insert(flight.channel_primary);
            used.insert(flight.channel_primary.saturating_add(1));
        }
        if flight.channel_secondary > 0 {
            used.insert(flight.channel_secondary);
        }
    }
    used
}

/// Sequential channel groups for all flights, sorted by callsign then flight number.
/// The result depends only on that ordering, so running it twice changes nothing.
pub fn renumber_channels(flights: &[Flight]) -> Result<Vec<(String, ChannelPair)>, ChannelError> {
    if flights.len() > MAX_CHANNEL_GROUPS as usize {
        return Err(ChannelError::NoneAvailable { groups: MAX_CHANNEL_GROUPS });
    }

    let mut ordered: Vec<&Flight> = flights.iter().collect();
    ordered.sort_by(|a, b| {
        a.callsign
            .to_uppercase()
            .cmp(&b.callsign.to_uppercase())
            .then(a.flight_number.cmp(&b.flight_number))
            .then(a.id.cmp(&b.id))
    });

    Ok(ordered
        .into_iter()
        .enumerate()
        .map(|(k, flight)| {
            let start = k as u32 * CHANNEL_GROUP_SIZE + 1;
            (flight.id.clone(), ChannelPair::for_group(start))
        })
        .collect())
}

/// Writes allocated pairs back onto the flights they belong to
pub fn apply_channels(flights: &mut [Flight], pairs: &[(String, ChannelPair)]) {
    for (flight_id, pair) in pairs {
        if let Some(flight) = flights.iter_mut().find(|f| f.id == *flight_id) {
            flight.channel_primary = pair.primary;
            flight.channel_secondary = pair.secondary;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_allocations_from_empty() {
        let mut used = HashSet::new();
        let mut pairs = Vec::new();
        for _ in 0..3 {
            let pair = allocate_channels(&used).unwrap();
            used.extend(pair.reserved());
            pairs.push((pair.primary, pair.secondary));
        }
        assert_eq!(pairs, vec![(1, 3), (4, 6), (7, 9)]);
    }

    #[test]
    fn any_used_member_blocks_the_group() {
        // pair channel of group 0 and secondary of group 1 taken
        let used: HashSet<u32> = [2, 6].into_iter().collect();
        let pair = allocate_channels(&used).unwrap();
        assert_eq!(pair, ChannelPair { primary: 7, secondary: 9 });
    }

    #[test]
    fn fills_holes_left_by_deleted_flights() {
        let used: HashSet<u32> = [1, 2, 3, 7, 8, 9].into_iter().collect();
        assert_eq!(allocate_channels(&used).unwrap().primary, 4);
    }

    #[test]
    fn exhausted_space_is_an_error() {
        let used: HashSet<u32> = (1..=126).collect();
        assert_eq!(
            allocate_channels(&used),
            Err(ChannelError::NoneAvailable { groups: MAX_CHANNEL_GROUPS })
        );
        // channel 127 alone is not a full group
        let used: HashSet<u32> = (1..=125).collect();
        assert!(allocate_channels(&used).is_err());
    }

    #[test]
    fn no_collisions_until_exhausted() {
        let mut used = HashSet::new();
        let mut count = 0;
        while let Ok(pair) = allocate_channels(&used) {
            for channel in pair.reserved() {
                assert!(used.insert(channel), "channel {} handed out twice", channel);
            }
            count += 1;
        }
        assert_eq!(count, MAX_CHANNEL_GROUPS);
    }

    #[test]
    fn generic_group_size() {
        let used: HashSet<u32> = [1, 6].into_iter().collect();
        assert_eq!(find_free_group(&used, 2, 10), Some(3));
        assert_eq!(find_free_group(&used, 5, 1), None);
    }

    #[test]
    fn used_channels_include_pair_channel() {
        let mut flight = Flight::new("f1", "STING", 1);
        flight.channel_primary = 4;
        flight.channel_secondary = 6;
        let unallocated = Flight::new("f2", "STING", 2);
        let used = used_channels(&[flight, unallocated]);
        assert_eq!(used, [4, 5, 6].into_iter().collect());
    }

    #[test]
    fn used_channels_tolerate_out_of_range_values() {
        let mut flight = Flight::new("f1", "STING", 1);
        flight.channel_primary = u32::MAX;
        flight.channel_secondary = u32::MAX;
        let used = used_channels(&[flight]);
        assert_eq!(used, [u32::MAX].into_iter().collect());
        assert_eq!(allocate_channels(&used).unwrap().primary, 1);
    }

    #[test]
    fn renumber_sorts_by_callsign_then_number_and_is_idempotent() {
        let mut flights = vec![
            Flight::new("v1", "VIPER", 1),
            Flight::new("s2", "STING", 2),
            Flight::new("s1", "sting", 1),
        ];
        let pairs = renumber_channels(&flights).unwrap();
        let summary: Vec<(&str, u32)> = pairs.iter().map(|(id, p)| (id.as_str(), p.primary)).collect();
        assert_eq!(summary, vec![("s1", 1), ("s2", 4), ("v1", 7)]);

        apply_channels(&mut flights, &pairs);
        assert_eq!(flights[0].channel_primary, 7);
        assert_eq!(flights[0].channel_secondary, 9);
        assert_eq!(renumber_channels(&flights).unwrap(), pairs);
    }

    #[test]
    fn renumber_rejects_too_many_flights() {
        let flights: Vec<Flight> = (0..=MAX_CHANNEL_GROUPS)
            .map(|n| Flight::new(&format!("f{}", n), "STING", n + 1))
            .collect();
        assert!(renumber_channels(&flights).is_err());
    }
}
