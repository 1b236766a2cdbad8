use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::pillars::Pillar;

/// Allowed drift when checking that a weight vector sums to 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Career level used to pick the weight vector for a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineerLevel {
    Junior,
    Mid,
    Senior,
    Lead,
    Manager,
}

impl EngineerLevel {
    pub const ALL: [Self; 5] = [
        Self::Junior,
        Self::Mid,
        Self::Senior,
        Self::Lead,
        Self::Manager,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Junior => "JUNIOR",
            Self::Mid => "MID",
            Self::Senior => "SENIOR",
            Self::Lead => "LEAD",
            Self::Manager => "MANAGER",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Junior => 0,
            Self::Mid => 1,
            Self::Senior => 2,
            Self::Lead => 3,
            Self::Manager => 4,
        }
    }

    /// Weights shipped with the engine. Adding a level without an arm here does not compile.
    pub const fn standard_weights(self) -> LevelWeights {
        match self {
            Self::Junior => LevelWeights::new(0.40, 0.10, 0.30, 0.15, 0.05),
            Self::Mid => LevelWeights::new(0.35, 0.15, 0.25, 0.15, 0.10),
            Self::Senior => LevelWeights::new(0.30, 0.20, 0.20, 0.15, 0.15),
            Self::Lead => LevelWeights::new(0.25, 0.25, 0.15, 0.15, 0.20),
            Self::Manager => LevelWeights::new(0.35, 0.20, 0.10, 0.10, 0.25),
        }
    }
}

impl fmt::Display for EngineerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EngineerLevel {
    type Err = UnknownLevel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "mid" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "lead" => Ok(Self::Lead),
            "manager" => Ok(Self::Manager),
            _ => Err(UnknownLevel(value.to_string())),
        }
    }
}

/// Raised when a level string names no known level.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown engineer level '{0}'")]
pub struct UnknownLevel(pub String);

/// One fractional weight per pillar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelWeights {
    pub project_impact: f64,
    pub direction: f64,
    pub engineering_excellence: f64,
    pub operational_ownership: f64,
    pub people_impact: f64,
}

impl LevelWeights {
    pub const fn new(
        project_impact: f64,
        direction: f64,
        engineering_excellence: f64,
        operational_ownership: f64,
        people_impact: f64,
    ) -> Self {
        Self {
            project_impact,
            direction,
            engineering_excellence,
            operational_ownership,
            people_impact,
        }
    }

    pub const fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::ProjectImpact => self.project_impact,
            Pillar::Direction => self.direction,
            Pillar::EngineeringExcellence => self.engineering_excellence,
            Pillar::OperationalOwnership => self.operational_ownership,
            Pillar::PeopleImpact => self.people_impact,
        }
    }

    pub fn sum(&self) -> f64 {
        Pillar::ALL.iter().map(|pillar| self.get(*pillar)).sum()
    }

    fn validate(&self, level: EngineerLevel) -> Result<(), WeightTableError> {
        for pillar in Pillar::ALL {
            let weight = self.get(pillar);
            if !weight.is_finite() || weight < 0.0 {
                return Err(WeightTableError::InvalidWeight {
                    level,
                    pillar,
                    weight,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightTableError::WeightSum { level, sum });
        }
        Ok(())
    }
}

/// Complete mapping from every level to its weight vector.
///
/// Construction checks coverage and sums, so lookups never fail afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    weights: [LevelWeights; 5],
}

impl WeightTable {
    pub fn standard() -> Self {
        Self {
            weights: EngineerLevel::ALL.map(EngineerLevel::standard_weights),
        }
    }

    /// Build a table from configured entries; every level must be present.
    pub fn from_entries(
        mut entries: BTreeMap<EngineerLevel, LevelWeights>,
    ) -> Result<Self, WeightTableError> {
        let mut weights = [LevelWeights::new(0.0, 0.0, 0.0, 0.0, 0.0); 5];
        for level in EngineerLevel::ALL {
            let entry = entries
                .remove(&level)
                .ok_or(WeightTableError::MissingLevel(level))?;
            entry.validate(level)?;
            weights[level.index()] = entry;
        }
        Ok(Self { weights })
    }

    pub fn weights_for(&self, level: EngineerLevel) -> &LevelWeights {
        &self.weights[level.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (EngineerLevel, &LevelWeights)> + '_ {
        EngineerLevel::ALL
            .into_iter()
            .map(move |level| (level, self.weights_for(level)))
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration defects in a weight table. These are deployment errors, never user errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightTableError {
    #[error("no weights defined for level {0}")]
    MissingLevel(EngineerLevel),
    #[error("weights for level {level} sum to {sum}, expected 1.0")]
    WeightSum { level: EngineerLevel, sum: f64 },
    #[error("weight {weight} for {} at level {level} must be a non-negative number", .pillar.label())]
    InvalidWeight {
        level: EngineerLevel,
        pillar: Pillar,
        weight: f64,
    },
}
