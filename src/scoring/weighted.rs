use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound of a weighted score, equal to the maximum pillar value.
pub const MAX_WEIGHTED_SCORE: f64 = 4.0;

/// Float noise tolerated at the range bounds before a value is rejected.
const RANGE_EPSILON: f64 = 1e-9;

pub const EXCEEDS_THRESHOLD: f64 = 85.0;
pub const MEETS_THRESHOLD: f64 = 50.0;

/// Summation error tolerated when a percentage is compared with a tier threshold.
const TIER_EPSILON: f64 = 1e-9;

/// Level-weighted score in `0..=4`. Percentage and tier are always derived from `value`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct WeightedScore {
    value: f64,
}

impl WeightedScore {
    pub fn from_value(value: f64) -> Result<Self, WeightedScoreError> {
        if !value.is_finite()
            || value < -RANGE_EPSILON
            || value > MAX_WEIGHTED_SCORE + RANGE_EPSILON
        {
            return Err(WeightedScoreError::OutOfRange { value });
        }

        Ok(Self {
            value: value.clamp(0.0, MAX_WEIGHTED_SCORE),
        })
    }

    pub const fn value(&self) -> f64 {
        self.value
    }

    pub fn percentage(&self) -> f64 {
        self.value / MAX_WEIGHTED_SCORE * 100.0
    }

    pub fn bonus_tier(&self) -> BonusTier {
        BonusTier::from_percentage(self.percentage())
    }
}

impl TryFrom<f64> for WeightedScore {
    type Error = WeightedScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<WeightedScore> for f64 {
    fn from(score: WeightedScore) -> Self {
        score.value
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightedScoreError {
    #[error("weighted score {value} is outside 0..=4")]
    OutOfRange { value: f64 },
}

/// Coarse bonus classification derived from the weighted percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BonusTier {
    Exceeds,
    Meets,
    Below,
}

impl BonusTier {
    pub const ALL: [Self; 3] = [Self::Exceeds, Self::Meets, Self::Below];

    /// Lower bounds are inclusive: exactly 85 is `Exceeds`, exactly 50 is `Meets`.
    ///
    /// A weighted sum that should land on a threshold can come out a few ulps short
    /// (3.4 as 3.3999999999999995), so the comparison allows [`TIER_EPSILON`] of slack.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage + TIER_EPSILON >= EXCEEDS_THRESHOLD {
            Self::Exceeds
        } else if percentage + TIER_EPSILON >= MEETS_THRESHOLD {
            Self::Meets
        } else {
            Self::Below
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exceeds => "EXCEEDS",
            Self::Meets => "MEETS",
            Self::Below => "BELOW",
        }
    }
}

impl fmt::Display for BonusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
