//! State Vector
//!
//! The normalized indicators a scenario evolves, plus clamping and validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::field::{Domain, Field, FieldMap};

/// The full set of indicators for one scenario at one instant.
///
/// Field names accept the dashboard shorthand (`T`, `P`, `C`, `R`, `S`) when
/// deserializing, so presets can be written either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub wealth: f64,
    pub trust: f64,
    pub education: f64,
    pub civilization: f64,
    pub political_power: f64,
    pub religion: f64,
    #[serde(alias = "T")]
    pub time_sense: f64,
    #[serde(alias = "P")]
    pub personal_agency: f64,
    #[serde(alias = "C")]
    pub cultural_anchoring: f64,
    #[serde(alias = "R")]
    pub rigidity: f64,
    #[serde(alias = "S")]
    pub social_pressure: f64,
    pub soc: f64,
    pub regime_coercion: f64,
    pub regime_structural_control: f64,
    pub opposition_symbolic_capital: f64,
    pub population_exit_rate: f64,
}

/// A field holding a value outside its domain (or a non-finite value).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutOfDomain {
    pub field: Field,
    pub value: f64,
    pub domain: Domain,
}

impl fmt::Display for OutOfDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside [{}, {}]",
            self.field, self.value, self.domain.min, self.domain.max
        )
    }
}

impl std::error::Error for OutOfDomain {}

impl StateVector {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Wealth => self.wealth,
            Field::Trust => self.trust,
            Field::Education => self.education,
            Field::Civilization => self.civilization,
            Field::PoliticalPower => self.political_power,
            Field::Religion => self.religion,
            Field::TimeSense => self.time_sense,
            Field::PersonalAgency => self.personal_agency,
            Field::CulturalAnchoring => self.cultural_anchoring,
            Field::Rigidity => self.rigidity,
            Field::SocialPressure => self.social_pressure,
            Field::Soc => self.soc,
            Field::RegimeCoercion => self.regime_coercion,
            Field::RegimeStructuralControl => self.regime_structural_control,
            Field::OppositionSymbolicCapital => self.opposition_symbolic_capital,
            Field::PopulationExitRate => self.population_exit_rate,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut f64 {
        match field {
            Field::Wealth => &mut self.wealth,
            Field::Trust => &mut self.trust,
            Field::Education => &mut self.education,
            Field::Civilization => &mut self.civilization,
            Field::PoliticalPower => &mut self.political_power,
            Field::Religion => &mut self.religion,
            Field::TimeSense => &mut self.time_sense,
            Field::PersonalAgency => &mut self.personal_agency,
            Field::CulturalAnchoring => &mut self.cultural_anchoring,
            Field::Rigidity => &mut self.rigidity,
            Field::SocialPressure => &mut self.social_pressure,
            Field::Soc => &mut self.soc,
            Field::RegimeCoercion => &mut self.regime_coercion,
            Field::RegimeStructuralControl => &mut self.regime_structural_control,
            Field::OppositionSymbolicCapital => &mut self.opposition_symbolic_capital,
            Field::PopulationExitRate => &mut self.population_exit_rate,
        }
    }

    /// Sets a field without clamping.
    pub fn set(&mut self, field: Field, value: f64) {
        *self.get_mut(field) = value;
    }

    /// Multiplies each listed field by its factor, then clamps those fields.
    pub fn apply_multipliers(&mut self, multipliers: &FieldMap) {
        for (&field, &factor) in multipliers {
            let value = self.get(field) * factor;
            self.set(field, field.domain().clamp(value));
        }
    }

    /// Multiplies each listed field by its factor without clamping.
    ///
    /// Used inside a step, where clamping happens once all dynamics are applied.
    pub fn scale_fields(&mut self, multipliers: &FieldMap) {
        for (&field, &factor) in multipliers {
            *self.get_mut(field) *= factor;
        }
    }

    /// Clamps every field into its domain.
    pub fn clamp_all(&mut self) {
        for field in Field::ALL {
            let value = self.get(field);
            self.set(field, field.domain().clamp(value));
        }
    }

    /// Returns the first field outside its domain, if any.
    pub fn validate(&self) -> Result<(), OutOfDomain> {
        for field in Field::ALL {
            let value = self.get(field);
            let domain = field.domain();
            if !domain.contains(value) {
                return Err(OutOfDomain { field, value, domain });
            }
        }
        Ok(())
    }

    /// Acceptance factors T + P + C.
    pub fn acceptance(&self) -> f64 {
        self.time_sense + self.personal_agency + self.cultural_anchoring
    }

    /// Resistance factors R + S.
    pub fn resistance(&self) -> f64 {
        self.rigidity + self.social_pressure
    }
}

impl Default for StateVector {
    /// A mid-range custom scenario: every field inside its domain.
    fn default() -> Self {
        Self {
            wealth: 0.40,
            trust: 0.45,
            education: 0.55,
            civilization: 0.50,
            political_power: 0.45,
            religion: 0.55,
            time_sense: 0.55,
            personal_agency: 0.50,
            cultural_anchoring: 0.50,
            rigidity: 0.60,
            social_pressure: 0.65,
            soc: 0.10,
            regime_coercion: 0.60,
            regime_structural_control: 0.50,
            opposition_symbolic_capital: 0.50,
            population_exit_rate: 0.40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(StateVector::default().validate().is_ok());
    }

    #[test]
    fn test_get_set_every_field() {
        let mut state = StateVector::default();
        for (i, field) in Field::ALL.iter().enumerate() {
            state.set(*field, i as f64);
        }
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(state.get(*field), i as f64, "{} did not round-trip", field);
        }
    }

    #[test]
    fn test_apply_multipliers_clamps() {
        let mut state = StateVector::default();
        let mut effects = FieldMap::new();
        effects.insert(Field::Wealth, 10.0);
        effects.insert(Field::Trust, 0.0);

        state.apply_multipliers(&effects);

        assert_eq!(state.wealth, 1.0);
        assert_eq!(state.trust, 0.05);
        // Untouched field
        assert_eq!(state.education, 0.55);
    }

    #[test]
    fn test_scale_fields_does_not_clamp() {
        let mut state = StateVector::default();
        let mut rates = FieldMap::new();
        rates.insert(Field::Wealth, 10.0);

        state.scale_fields(&rates);
        assert!((state.wealth - 4.0).abs() < 1e-12);
        assert!(state.validate().is_err());

        state.clamp_all();
        assert_eq!(state.wealth, 1.0);
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_field() {
        let mut state = StateVector::default();
        state.soc = 0.0;

        let err = state.validate().unwrap_err();
        assert_eq!(err.field, Field::Soc);
        assert_eq!(err.value, 0.0);
        assert!(err.to_string().contains("soc"));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut state = StateVector::default();
        state.trust = f64::NAN;
        state.clamp_all();
        assert_eq!(state.validate().unwrap_err().field, Field::Trust);
    }

    #[test]
    fn test_dual_pull_components() {
        let state = StateVector::default();
        assert!((state.acceptance() - 1.55).abs() < 1e-12);
        assert!((state.resistance() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_deserialize_with_short_names() {
        let json = r#"{
            "wealth": 0.25, "trust": 0.30, "education": 0.55, "civilization": 0.45,
            "political_power": 0.40, "religion": 0.60,
            "T": 0.45, "P": 0.35, "C": 0.40, "R": 0.70, "S": 0.80,
            "soc": 0.10, "regime_coercion": 0.70, "regime_structural_control": 0.60,
            "opposition_symbolic_capital": 0.50, "population_exit_rate": 0.40
        }"#;
        let state: StateVector = serde_json::from_str(json).unwrap();

        assert_eq!(state.time_sense, 0.45);
        assert_eq!(state.social_pressure, 0.80);
        assert!(state.validate().is_ok());
    }
}
