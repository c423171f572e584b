//! Branches: the one-time modifier set each participant picks before play.

use serde::{Serialize, Serializer};
use std::fmt;

/// Serializes as its id string; an unknown branch keeps the id it was
/// submitted with.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Branch {
    Algebra,
    Calculus,
    Geometry,
    Probability,
    Statistics,
    /// Any id outside the table. Still counts as a choice, with no effect.
    Unknown(String),
}

impl Branch {
    /// Resolve a client-supplied branch id. Matching ignores ASCII case and
    /// surrounding whitespace.
    pub fn parse(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "algebra" => Self::Algebra,
            "calculus" => Self::Calculus,
            "geometry" => Self::Geometry,
            "probability" => Self::Probability,
            "statistics" => Self::Statistics,
            _ => Self::Unknown(id.trim().to_string()),
        }
    }

    /// Static effect lookup for this branch.
    pub fn effects(&self) -> BranchEffects {
        match self {
            Self::Algebra => BranchEffects {
                initial_bonus: Some(InitialBonus {
                    resource: 15,
                    block: 5,
                }),
                description: "Start with +15 IP and +5 Block",
                ..BranchEffects::default()
            },
            Self::Calculus => BranchEffects {
                damage_bonus: 2,
                description: "All damage cards deal +2 extra damage",
                ..BranchEffects::default()
            },
            Self::Geometry => BranchEffects {
                block_bonus: 3,
                description: "All block effects are increased by 3",
                ..BranchEffects::default()
            },
            Self::Probability => BranchEffects {
                high_variance: true,
                description: "Higher risk, higher reward mechanics",
                ..BranchEffects::default()
            },
            Self::Statistics => BranchEffects {
                extra_draws: 1,
                description: "Draw an extra card each turn",
                ..BranchEffects::default()
            },
            Self::Unknown(_) => BranchEffects::default(),
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Algebra => "algebra",
            Self::Calculus => "calculus",
            Self::Geometry => "geometry",
            Self::Probability => "probability",
            Self::Statistics => "statistics",
            Self::Unknown(id) => id.as_str(),
        };
        write!(f, "{repr}")
    }
}

impl Serialize for Branch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One-time bonus applied the moment a branch is chosen.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct InitialBonus {
    pub resource: i32,
    pub block: u32,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchEffects {
    pub initial_bonus: Option<InitialBonus>,
    /// Added to the magnitude of every damage card the holder plays.
    pub damage_bonus: u32,
    /// Added to the magnitude of every block card the holder plays.
    pub block_bonus: u32,
    /// Recorded only; no rule consumes it yet.
    pub high_variance: bool,
    /// Extra cards drawn when the holder's turn begins.
    pub extra_draws: usize,
    pub description: &'static str,
}

impl BranchEffects {
    pub fn is_none(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_branches() {
        assert_eq!(Branch::parse("algebra"), Branch::Algebra);
        assert_eq!(Branch::parse(" Calculus "), Branch::Calculus);
        assert_eq!(Branch::parse("GEOMETRY"), Branch::Geometry);
        assert_eq!(Branch::parse("probability"), Branch::Probability);
        assert_eq!(Branch::parse("statistics"), Branch::Statistics);
    }

    #[test]
    fn test_unknown_branch_has_no_effect() {
        let branch = Branch::parse(" topology ");
        assert_eq!(branch, Branch::Unknown("topology".to_string()));
        assert!(branch.effects().is_none());
    }

    #[test]
    fn test_branch_serializes_as_submitted_id() {
        assert_eq!(serde_json::to_value(Branch::Calculus).unwrap(), "calculus");
        assert_eq!(
            serde_json::to_value(Branch::parse("Topology")).unwrap(),
            "Topology"
        );
    }

    #[test]
    fn test_algebra_initial_bonus() {
        let bonus = Branch::Algebra.effects().initial_bonus.unwrap();
        assert_eq!(bonus.resource, 15);
        assert_eq!(bonus.block, 5);
    }

    #[test]
    fn test_modifier_branches() {
        assert_eq!(Branch::Calculus.effects().damage_bonus, 2);
        assert_eq!(Branch::Geometry.effects().block_bonus, 3);
        assert!(Branch::Probability.effects().high_variance);
        assert_eq!(Branch::Statistics.effects().extra_draws, 1);
        assert!(Branch::Statistics.effects().initial_bonus.is_none());
    }

    #[test]
    fn test_effects_serialize_camel_case() {
        let json = serde_json::to_value(Branch::Statistics.effects()).unwrap();
        assert_eq!(json["extraDraws"], 1);
        assert_eq!(json["description"], "Draw an extra card each turn");
    }
}
