use super::level::{EngineerLevel, WeightTable};
use super::pillars::{Pillar, PillarScores};
use super::weighted::{WeightedScore, WeightedScoreError};

/// Combines pillar scores with the weight vector of a level.
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculationService {
    weights: WeightTable,
}

impl ScoreCalculationService {
    pub fn new(weights: WeightTable) -> Self {
        Self { weights }
    }

    pub fn weight_table(&self) -> &WeightTable {
        &self.weights
    }

    /// Dot product of pillar values and the level's weights.
    ///
    /// A validated [`WeightTable`] keeps the sum inside `0..=4`; the range check in
    /// [`WeightedScore::from_value`] still runs so a bad table cannot leak a bogus score.
    pub fn calculate_weighted_score(
        &self,
        scores: &PillarScores,
        level: EngineerLevel,
    ) -> Result<WeightedScore, WeightedScoreError> {
        let weights = self.weights.weights_for(level);
        let value: f64 = Pillar::ALL
            .iter()
            .map(|pillar| f64::from(scores.get(*pillar)) * weights.get(*pillar))
            .sum();

        WeightedScore::from_value(value)
    }
}
