//! Scoring math: weighted dimensions, totals, and tiers.
//!
//! Six dimensions, each in [0.0, 1.0], combine into a weighted total.
//! The weights are fixed product constants and must sum to 1.0, so the
//! total also stays in [0.0, 1.0]. Tier is a pure function of the total.

use serde::{Deserialize, Serialize};

/// Weight applied to the skill-match dimension.
pub const WEIGHT_SKILL_MATCH: f64 = 0.35;
/// Weight applied to the experience-level dimension.
pub const WEIGHT_EXPERIENCE_LEVEL: f64 = 0.20;
/// Weight applied to the location-match dimension.
pub const WEIGHT_LOCATION_MATCH: f64 = 0.15;
/// Weight applied to the salary-fit dimension.
pub const WEIGHT_SALARY_FIT: f64 = 0.15;
/// Weight applied to the company-signals dimension.
pub const WEIGHT_COMPANY_SIGNALS: f64 = 0.10;
/// Weight applied to the recency dimension.
pub const WEIGHT_RECENCY: f64 = 0.05;

/// Neutral value substituted for any dimension the evaluator omits.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Per-dimension scores for one (profile, posting) pair.
///
/// `Default` is the neutral record: every dimension at 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub skill_match: f64,
    pub experience_level: f64,
    pub location_match: f64,
    pub salary_fit: f64,
    pub company_signals: f64,
    pub recency: f64,
}

impl Default for DimensionScores {
    fn default() -> Self {
        Self::neutral()
    }
}

impl DimensionScores {
    /// All dimensions at the neutral 0.5.
    pub fn neutral() -> Self {
        Self {
            skill_match: NEUTRAL_SCORE,
            experience_level: NEUTRAL_SCORE,
            location_match: NEUTRAL_SCORE,
            salary_fit: NEUTRAL_SCORE,
            company_signals: NEUTRAL_SCORE,
            recency: NEUTRAL_SCORE,
        }
    }

    /// Weighted total, rounded to 3 decimal places.
    pub fn weighted_total(&self) -> f64 {
        let total = self.skill_match * WEIGHT_SKILL_MATCH
            + self.experience_level * WEIGHT_EXPERIENCE_LEVEL
            + self.location_match * WEIGHT_LOCATION_MATCH
            + self.salary_fit * WEIGHT_SALARY_FIT
            + self.company_signals * WEIGHT_COMPANY_SIGNALS
            + self.recency * WEIGHT_RECENCY;
        round3(total)
    }
}

/// Round to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Discrete match bucket derived from the weighted total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    A,
    B,
    C,
    D,
}

impl Tier {
    /// Map a weighted total to its tier.
    ///
    /// Boundaries are inclusive on the lower bound of each tier and are
    /// checked highest first.
    pub fn for_total(total: f64) -> Self {
        if total >= 0.85 {
            Tier::A
        } else if total >= 0.70 {
            Tier::B
        } else if total >= 0.50 {
            Tier::C
        } else {
            Tier::D
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::A => write!(f, "A"),
            Tier::B => write!(f, "B"),
            Tier::C => write!(f, "C"),
            Tier::D => write!(f, "D"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one() {
        let sum = WEIGHT_SKILL_MATCH
            + WEIGHT_EXPERIENCE_LEVEL
            + WEIGHT_LOCATION_MATCH
            + WEIGHT_SALARY_FIT
            + WEIGHT_COMPANY_SIGNALS
            + WEIGHT_RECENCY;
        assert!((sum - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_neutral_total_is_half() {
        let scores = DimensionScores::neutral();
        assert!((scores.weighted_total() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_stays_in_unit_range() {
        let zeros = DimensionScores {
            skill_match: 0.0,
            experience_level: 0.0,
            location_match: 0.0,
            salary_fit: 0.0,
            company_signals: 0.0,
            recency: 0.0,
        };
        let ones = DimensionScores {
            skill_match: 1.0,
            experience_level: 1.0,
            location_match: 1.0,
            salary_fit: 1.0,
            company_signals: 1.0,
            recency: 1.0,
        };
        assert!((zeros.weighted_total() - 0.0).abs() < f64::EPSILON);
        assert!((ones.weighted_total() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weighted_total_rounds_to_three_places() {
        let scores = DimensionScores {
            skill_match: 0.333,
            experience_level: 0.333,
            location_match: 0.333,
            salary_fit: 0.333,
            company_signals: 0.333,
            recency: 0.333,
        };
        let total = scores.weighted_total();
        assert!((total * 1000.0 - (total * 1000.0).round()).abs() < 1e-9);
    }

    #[test]
    fn test_tier_boundaries_inclusive() {
        assert_eq!(Tier::for_total(0.85), Tier::A);
        assert_eq!(Tier::for_total(0.70), Tier::B);
        assert_eq!(Tier::for_total(0.50), Tier::C);
    }

    #[test]
    fn test_tier_just_below_boundaries() {
        assert_eq!(Tier::for_total(0.849), Tier::B);
        assert_eq!(Tier::for_total(0.699), Tier::C);
        assert_eq!(Tier::for_total(0.499), Tier::D);
    }

    #[test]
    fn test_tier_extremes() {
        assert_eq!(Tier::for_total(1.0), Tier::A);
        assert_eq!(Tier::for_total(0.0), Tier::D);
    }

    #[test]
    fn test_tier_serializes_as_letter() {
        assert_eq!(serde_json::to_string(&Tier::A).unwrap(), "\"A\"");
        assert_eq!(serde_json::to_string(&Tier::D).unwrap(), "\"D\"");
    }
}
