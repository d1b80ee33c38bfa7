//! Host-level scoring policy
//!
//! Who may hold scoring rights relative to the batting side is a host decision,
//! not something the core hard-codes. Grants are always per match.

use std::str::FromStr;

/// Which captain may submit deliveries while holding an approved grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorerPolicy {
    /// Holder may score any innings, including their own side's batting
    #[default]
    AnyCaptain,
    /// Holder may only score while their side is fielding
    FieldingCaptainOnly,
}

impl FromStr for ScorerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any_captain" | "any" => Ok(ScorerPolicy::AnyCaptain),
            "fielding_captain_only" | "fielding" => Ok(ScorerPolicy::FieldingCaptainOnly),
            other => Err(format!("unknown scorer policy: {other}")),
        }
    }
}

/// Rules the command pipeline consults (built from `Config`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringRules {
    pub scorer_policy: ScorerPolicy,
    /// Release the grant when innings #2 opens so the captains renegotiate
    pub rotate_rights_between_innings: bool,
}
