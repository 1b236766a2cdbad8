use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::calculation::ScoreCalculationService;
use super::final_score::{CycleId, EmployeeId, FinalScore};
use super::level::EngineerLevel;
use super::peer::{PeerFeedback, PeerFeedbackAggregationService};
use super::pillars::PillarScores;
use super::weighted::WeightedScoreError;

/// Inputs gathered for one employee by the evaluation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSource {
    pub cycle_id: CycleId,
    pub employee_id: EmployeeId,
    /// Manager evaluation scores.
    pub pillar_scores: PillarScores,
    #[serde(default)]
    pub proposed_level: Option<EngineerLevel>,
    #[serde(default)]
    pub current_level: Option<EngineerLevel>,
    #[serde(default)]
    pub peer_feedback: Vec<PeerFeedback>,
}

/// Builds a fresh [`FinalScore`] from an evaluation. Does not persist.
#[derive(Debug, Clone)]
pub struct FinalScoreCalculationService {
    calculator: ScoreCalculationService,
    aggregator: PeerFeedbackAggregationService,
    default_level: EngineerLevel,
}

impl FinalScoreCalculationService {
    pub fn new(calculator: ScoreCalculationService, default_level: EngineerLevel) -> Self {
        Self {
            calculator,
            aggregator: PeerFeedbackAggregationService::new(),
            default_level,
        }
    }

    pub fn calculator(&self) -> &ScoreCalculationService {
        &self.calculator
    }

    /// Proposed level wins over current level, which wins over the configured default.
    pub fn resolve_level(&self, source: &EvaluationSource) -> EngineerLevel {
        source
            .proposed_level
            .or(source.current_level)
            .unwrap_or(self.default_level)
    }

    pub fn calculate_final_score(
        &self,
        source: &EvaluationSource,
    ) -> Result<FinalScore, WeightedScoreError> {
        self.calculate_final_score_at(source, Utc::now())
    }

    pub fn calculate_final_score_at(
        &self,
        source: &EvaluationSource,
        calculated_at: DateTime<Utc>,
    ) -> Result<FinalScore, WeightedScoreError> {
        let level = self.resolve_level(source);
        let weighted = self
            .calculator
            .calculate_weighted_score(&source.pillar_scores, level)?;
        let peers = self.aggregator.aggregate(&source.peer_feedback);

        Ok(FinalScore::new(
            source.cycle_id.clone(),
            source.employee_id.clone(),
            source.pillar_scores,
            weighted,
            level,
            &peers,
            calculated_at,
        ))
    }
}

impl Default for FinalScoreCalculationService {
    fn default() -> Self {
        Self::new(ScoreCalculationService::default(), EngineerLevel::Mid)
    }
}
