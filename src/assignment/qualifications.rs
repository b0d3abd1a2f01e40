use serde::{Serialize, Deserialize};

use super::types::Pilot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Qualification {
    MissionCommander,
    StrikeLead,
    Instructor,
    FlightLead,
    SectionLead,
    Lso,
    CarrierQualified,
    NightQualified,
    /// Catch-all rank for pilots holding none of the ranked tags
    Wingman,
}

impl Qualification {
    /// Parses a roster tag such as "Flight Lead", "flight-lead" or "FL"
    pub fn parse(tag: &str) -> Option<Qualification> {
        let key: String = tag
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "missioncommander" | "mc" => Some(Qualification::MissionCommander),
            "strikelead" | "stl" => Some(Qualification::StrikeLead),
            "instructor" | "ip" => Some(Qualification::Instructor),
            "flightlead" | "fl" => Some(Qualification::FlightLead),
            "sectionlead" | "sl" => Some(Qualification::SectionLead),
            "lso" => Some(Qualification::Lso),
            "carrierqualified" | "carrier" | "cq" => Some(Qualification::CarrierQualified),
            "nightqualified" | "night" | "nq" => Some(Qualification::NightQualified),
            "wingman" => Some(Qualification::Wingman),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Qualification::MissionCommander => "Mission Commander",
            Qualification::StrikeLead => "Strike Lead",
            Qualification::Instructor => "Instructor",
            Qualification::FlightLead => "Flight Lead",
            Qualification::SectionLead => "Section Lead",
            Qualification::Lso => "LSO",
            Qualification::CarrierQualified => "Carrier Qualified",
            Qualification::NightQualified => "Night Qualified",
            Qualification::Wingman => "Wingman",
        }
    }
}

/// Total order of qualifications, most senior first, with Wingman always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualificationRanking {
    order: Vec<Qualification>,
}

impl Default for QualificationRanking {
    fn default() -> Self {
        QualificationRanking::new(vec![
            Qualification::MissionCommander,
            Qualification::StrikeLead,
            Qualification::Instructor,
            Qualification::FlightLead,
            Qualification::SectionLead,
            Qualification::Lso,
            Qualification::CarrierQualified,
            Qualification::NightQualified,
        ])
    }
}

impl QualificationRanking {
    /// Duplicates keep their first position; an explicit Wingman entry is dropped.
    pub fn new(order: Vec<Qualification>) -> Self {
        let mut ranked: Vec<Qualification> = Vec::with_capacity(order.len());
        for qualification in order {
            if qualification != Qualification::Wingman && !ranked.contains(&qualification) {
                ranked.push(qualification);
            }
        }
        QualificationRanking { order: ranked }
    }

    /// 0 is the most senior rank. Unranked tags and Wingman share the lowest rank.
    pub fn rank(&self, qualification: Qualification) -> usize {
        self.order
            .iter()
            .position(|q| *q == qualification)
            .unwrap_or(self.order.len())
    }

    pub fn highest(&self, pilot: &Pilot) -> Qualification {
        self.order
            .iter()
            .copied()
            .find(|q| pilot.holds(*q))
            .unwrap_or(Qualification::Wingman)
    }

    /// Ranked qualifications followed by Wingman
    pub fn levels(&self) -> impl Iterator<Item = Qualification> + '_ {
        self.order.iter().copied().chain(std::iter::once(Qualification::Wingman))
    }
}

pub fn is_qualified_for(pilot: &Pilot, requirement: Option<Qualification>) -> bool {
    match requirement {
        None | Some(Qualification::Wingman) => true,
        Some(qualification) => pilot.holds(qualification),
    }
}

/// Groups pilots under their highest qualification. Groups follow rank order, empty groups are
/// skipped, and pilots keep input order within a group.
pub fn group_by_highest<'a>(
    pilots: &'a [Pilot],
    ranking: &QualificationRanking,
) -> Vec<(Qualification, Vec<&'a Pilot>)> {
    ranking
        .levels()
        .map(|level| {
            let members: Vec<&Pilot> = pilots.iter().filter(|p| ranking.highest(p) == level).collect();
            (level, members)
        })
        .filter(|(_, members)| !members.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::types::Attendance;

    fn pilot(id: &str, qualifications: &[Qualification]) -> Pilot {
        Pilot {
            id: id.to_string(),
            board_number: "100".to_string(),
            callsign: id.to_uppercase(),
            squadron_id: None,
            qualifications: qualifications.to_vec(),
            attendance: Attendance::Accepted,
        }
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!(Qualification::parse("Flight Lead"), Some(Qualification::FlightLead));
        assert_eq!(Qualification::parse("section-lead"), Some(Qualification::SectionLead));
        assert_eq!(Qualification::parse("LSO"), Some(Qualification::Lso));
        assert_eq!(Qualification::parse("CQ"), Some(Qualification::CarrierQualified));
        assert_eq!(Qualification::parse("tanker"), None);
    }

    #[test]
    fn highest_uses_rank_not_tag_order() {
        let ranking = QualificationRanking::default();
        let p = pilot("a", &[Qualification::NightQualified, Qualification::FlightLead]);
        assert_eq!(ranking.highest(&p), Qualification::FlightLead);
        assert_eq!(ranking.highest(&pilot("b", &[])), Qualification::Wingman);
    }

    #[test]
    fn custom_ranking_drops_wingman_and_duplicates() {
        let ranking = QualificationRanking::new(vec![
            Qualification::Lso,
            Qualification::Wingman,
            Qualification::FlightLead,
            Qualification::Lso,
        ]);
        assert_eq!(ranking.rank(Qualification::Lso), 0);
        assert_eq!(ranking.rank(Qualification::FlightLead), 1);
        assert_eq!(ranking.rank(Qualification::Wingman), 2);
        assert_eq!(ranking.rank(Qualification::Instructor), 2);
        let p = pilot("a", &[Qualification::FlightLead, Qualification::Lso]);
        assert_eq!(ranking.highest(&p), Qualification::Lso);
    }

    #[test]
    fn qualification_requirement() {
        let lead = pilot("lead", &[Qualification::FlightLead]);
        assert!(is_qualified_for(&lead, None));
        assert!(is_qualified_for(&lead, Some(Qualification::FlightLead)));
        assert!(!is_qualified_for(&lead, Some(Qualification::SectionLead)));
    }

    #[test]
    fn grouping_follows_rank_then_input_order() {
        let pilots = vec![
            pilot("w1", &[]),
            pilot("sl", &[Qualification::SectionLead]),
            pilot("fl", &[Qualification::FlightLead, Qualification::SectionLead]),
            pilot("w2", &[Qualification::NightQualified]),
            pilot("w3", &[]),
        ];
        let groups = group_by_highest(&pilots, &QualificationRanking::default());
        let summary: Vec<(Qualification, Vec<&str>)> = groups
            .iter()
            .map(|(q, members)| (*q, members.iter().map(|p| p.id.as_str()).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Qualification::FlightLead, vec!["fl"]),
                (Qualification::SectionLead, vec!["sl"]),
                (Qualification::NightQualified, vec!["w2"]),
                (Qualification::Wingman, vec!["w1", "w3"]),
            ]
        );
    }
}
