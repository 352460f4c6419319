//! State Fields
//!
//! Names and clamp domains for every indicator tracked by a scenario.
//!
//! Shock, phase and decay tables are keyed by [`Field`], so the same
//! identifiers appear in TOML configuration, JSON history and code.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field -> value map used for multiplier tables (effects, recovery rates).
///
/// A `BTreeMap` keeps iteration order fixed, which keeps runs replayable.
pub type FieldMap = BTreeMap<Field, f64>;

/// Every indicator in a [`StateVector`](crate::StateVector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Fundamentals (feed the WSI)
    Wealth,
    Trust,
    Education,
    Civilization,
    PoliticalPower,
    Religion,
    // TPC factors
    #[serde(alias = "T")]
    TimeSense,
    #[serde(alias = "P")]
    PersonalAgency,
    #[serde(alias = "C")]
    CulturalAnchoring,
    // Resistance factors
    #[serde(alias = "R")]
    Rigidity,
    #[serde(alias = "S")]
    SocialPressure,
    /// Standard of Change: nominal absorptive capacity
    Soc,
    // Actor-specific scalars
    RegimeCoercion,
    RegimeStructuralControl,
    OppositionSymbolicCapital,
    PopulationExitRate,
}

/// Which part of the model a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Fundamental,
    Tpc,
    Resistance,
    Capacity,
    Actor,
}

impl Field {
    /// All fields, in declaration order.
    pub const ALL: [Field; 16] = [
        Field::Wealth,
        Field::Trust,
        Field::Education,
        Field::Civilization,
        Field::PoliticalPower,
        Field::Religion,
        Field::TimeSense,
        Field::PersonalAgency,
        Field::CulturalAnchoring,
        Field::Rigidity,
        Field::SocialPressure,
        Field::Soc,
        Field::RegimeCoercion,
        Field::RegimeStructuralControl,
        Field::OppositionSymbolicCapital,
        Field::PopulationExitRate,
    ];

    /// The snake_case name used in configuration and output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Wealth => "wealth",
            Field::Trust => "trust",
            Field::Education => "education",
            Field::Civilization => "civilization",
            Field::PoliticalPower => "political_power",
            Field::Religion => "religion",
            Field::TimeSense => "time_sense",
            Field::PersonalAgency => "personal_agency",
            Field::CulturalAnchoring => "cultural_anchoring",
            Field::Rigidity => "rigidity",
            Field::SocialPressure => "social_pressure",
            Field::Soc => "soc",
            Field::RegimeCoercion => "regime_coercion",
            Field::RegimeStructuralControl => "regime_structural_control",
            Field::OppositionSymbolicCapital => "opposition_symbolic_capital",
            Field::PopulationExitRate => "population_exit_rate",
        }
    }

    pub fn group(self) -> FieldGroup {
        match self {
            Field::Wealth
            | Field::Trust
            | Field::Education
            | Field::Civilization
            | Field::PoliticalPower
            | Field::Religion => FieldGroup::Fundamental,
            Field::TimeSense | Field::PersonalAgency | Field::CulturalAnchoring => FieldGroup::Tpc,
            Field::Rigidity | Field::SocialPressure => FieldGroup::Resistance,
            Field::Soc => FieldGroup::Capacity,
            Field::RegimeCoercion
            | Field::RegimeStructuralControl
            | Field::OppositionSymbolicCapital
            | Field::PopulationExitRate => FieldGroup::Actor,
        }
    }

    /// The closed interval this field must stay within after every update.
    pub fn domain(self) -> Domain {
        match self {
            Field::Wealth | Field::Trust | Field::Civilization | Field::Religion => {
                Domain::new(0.05, 1.0)
            }
            Field::Education | Field::PoliticalPower => Domain::new(0.10, 1.0),
            Field::TimeSense | Field::CulturalAnchoring => Domain::new(0.20, 1.0),
            Field::PersonalAgency => Domain::new(0.10, 1.0),
            Field::Rigidity | Field::SocialPressure => Domain::new(0.0, 1.0),
            // Capacity divides theta, keep it strictly positive
            Field::Soc => Domain::new(0.02, 1.0),
            Field::RegimeCoercion
            | Field::RegimeStructuralControl
            | Field::OppositionSymbolicCapital
            | Field::PopulationExitRate => Domain::new(0.0, 0.9),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps a value into the domain. NaN is left as-is so validation can reject it.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return value;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_serialization() {
        assert_eq!(serde_json::to_string(&Field::PoliticalPower).unwrap(), r#""political_power""#);
        assert_eq!(serde_json::to_string(&Field::Soc).unwrap(), r#""soc""#);
        assert_eq!(
            serde_json::to_string(&Field::PopulationExitRate).unwrap(),
            r#""population_exit_rate""#
        );
    }

    #[test]
    fn test_field_short_aliases() {
        let t: Field = serde_json::from_str(r#""T""#).unwrap();
        let s: Field = serde_json::from_str(r#""S""#).unwrap();
        assert_eq!(t, Field::TimeSense);
        assert_eq!(s, Field::SocialPressure);
    }

    #[test]
    fn test_name_matches_serde() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.name()));
        }
    }

    #[test]
    fn test_domains_are_well_formed() {
        for field in Field::ALL {
            let domain = field.domain();
            assert!(domain.min < domain.max, "{} has an empty domain", field);
        }
        assert!(Field::Soc.domain().min > 0.0);
    }

    #[test]
    fn test_domain_clamp() {
        let domain = Domain::new(0.05, 1.0);
        assert_eq!(domain.clamp(1.4), 1.0);
        assert_eq!(domain.clamp(-0.2), 0.05);
        assert_eq!(domain.clamp(0.5), 0.5);
        assert!(domain.clamp(f64::NAN).is_nan());
        assert!(!domain.contains(f64::NAN));
        assert!(!domain.contains(f64::INFINITY));
    }

    #[test]
    fn test_groups() {
        assert_eq!(Field::Religion.group(), FieldGroup::Fundamental);
        assert_eq!(Field::CulturalAnchoring.group(), FieldGroup::Tpc);
        assert_eq!(Field::Rigidity.group(), FieldGroup::Resistance);
        assert_eq!(Field::Soc.group(), FieldGroup::Capacity);
        assert_eq!(Field::RegimeCoercion.group(), FieldGroup::Actor);
    }
}
