use serde::{Serialize, Deserialize};

use crate::error::InvalidConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentScope {
    /// Discard existing assignments first
    #[default]
    Clear,
    /// Keep existing assignments and only fill empty slots
    FillGaps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillingPriority {
    /// Dash-1 of every flight, then dash-3, dash-2, dash-4
    #[default]
    Breadth,
    /// Complete each flight before starting the next
    Depth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SquadronCohesion {
    Enforced,
    #[default]
    Prioritized,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NonStandardCallsigns {
    Ignore,
    FillFirst,
    FillInSequence,
    #[default]
    FillLast,
}

/// Validated policy set for one assignment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConfig {
    pub assignment_scope: AssignmentScope,
    pub include_tentative: bool,
    pub flight_filling_priority: FillingPriority,
    pub squadron_cohesion: SquadronCohesion,
    pub assign_unqualified: bool,
    pub non_standard_callsigns: NonStandardCallsigns,
}

/// Boolean options arrive either as JSON booleans or as strings from form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

/// Policy options as received from a caller, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConfigRequest {
    pub assignment_scope: Option<String>,
    pub include_tentative: Option<FlagValue>,
    pub flight_filling_priority: Option<String>,
    pub squadron_cohesion: Option<String>,
    pub assign_unqualified: Option<FlagValue>,
    pub non_standard_callsigns: Option<String>,
}

trait PolicyOption: Sized + Copy + Default + 'static {
    const FIELD: &'static str;
    const VALUES: &'static [(&'static str, Self)];
}

impl PolicyOption for AssignmentScope {
    const FIELD: &'static str = "assignmentScope";
    const VALUES: &'static [(&'static str, Self)] = &[
        ("clear", AssignmentScope::Clear),
        ("fillGaps", AssignmentScope::FillGaps),
    ];
}

impl PolicyOption for FillingPriority {
    const FIELD: &'static str = "flightFillingPriority";
    const VALUES: &'static [(&'static str, Self)] = &[
        ("breadth", FillingPriority::Breadth),
        ("depth", FillingPriority::Depth),
    ];
}

impl PolicyOption for SquadronCohesion {
    const FIELD: &'static str = "squadronCohesion";
    const VALUES: &'static [(&'static str, Self)] = &[
        ("enforced", SquadronCohesion::Enforced),
        ("prioritized", SquadronCohesion::Prioritized),
        ("ignore", SquadronCohesion::Ignore),
    ];
}

impl PolicyOption for NonStandardCallsigns {
    const FIELD: &'static str = "nonStandardCallsigns";
    const VALUES: &'static [(&'static str, Self)] = &[
        ("ignore", NonStandardCallsigns::Ignore),
        ("fillFirst", NonStandardCallsigns::FillFirst),
        ("fillInSequence", NonStandardCallsigns::FillInSequence),
        ("fillLast", NonStandardCallsigns::FillLast),
    ];
}

fn parse_option<T: PolicyOption>(value: Option<&str>) -> Result<T, InvalidConfigError> {
    let Some(value) = value else {
        return Ok(T::default());
    };
    T::VALUES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value.trim()))
        .map(|(_, option)| *option)
        .ok_or_else(|| InvalidConfigError { field: T::FIELD, value: value.to_string() })
}

fn parse_flag(field: &'static str, value: Option<&FlagValue>) -> Result<bool, InvalidConfigError> {
    match value {
        None => Ok(false),
        Some(FlagValue::Bool(flag)) => Ok(*flag),
        Some(FlagValue::Text(text)) => match text.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(InvalidConfigError { field, value: text.clone() }),
        },
    }
}

/// Validates a policy request. Missing fields take their defaults; there are no cross-field rules.
pub fn validate_config(req: &AssignmentConfigRequest) -> Result<AssignmentConfig, InvalidConfigError> {
    Ok(AssignmentConfig {
        assignment_scope: parse_option(req.assignment_scope.as_deref())?,
        include_tentative: parse_flag("includeTentative", req.include_tentative.as_ref())?,
        flight_filling_priority: parse_option(req.flight_filling_priority.as_deref())?,
        squadron_cohesion: parse_option(req.squadron_cohesion.as_deref())?,
        assign_unqualified: parse_flag("assignUnqualified", req.assign_unqualified.as_ref())?,
        non_standard_callsigns: parse_option(req.non_standard_callsigns.as_deref())?,
    })
}
