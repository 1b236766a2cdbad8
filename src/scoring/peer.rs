use serde::{Deserialize, Serialize};

use super::final_score::UserId;
use super::pillars::{Pillar, PillarError, PillarScores};

/// One peer's submission for a reviewee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerFeedback {
    pub reviewer_id: UserId,
    pub scores: PillarScores,
    #[serde(default)]
    pub comments: Option<String>,
}

/// Fractional per-pillar averages kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PillarAverages {
    pub project_impact: f64,
    pub direction: f64,
    pub engineering_excellence: f64,
    pub operational_ownership: f64,
    pub people_impact: f64,
}

impl PillarAverages {
    pub const fn get(&self, pillar: Pillar) -> f64 {
        match pillar {
            Pillar::ProjectImpact => self.project_impact,
            Pillar::Direction => self.direction,
            Pillar::EngineeringExcellence => self.engineering_excellence,
            Pillar::OperationalOwnership => self.operational_ownership,
            Pillar::PeopleImpact => self.people_impact,
        }
    }

    fn slot(&mut self, pillar: Pillar) -> &mut f64 {
        match pillar {
            Pillar::ProjectImpact => &mut self.project_impact,
            Pillar::Direction => &mut self.direction,
            Pillar::EngineeringExcellence => &mut self.engineering_excellence,
            Pillar::OperationalOwnership => &mut self.operational_ownership,
            Pillar::PeopleImpact => &mut self.people_impact,
        }
    }

    /// Round half away from zero into integral pillars.
    pub fn rounded(&self) -> Result<PillarScores, PillarError> {
        let values = Pillar::ALL.map(|pillar| self.get(pillar).round() as i64);
        PillarScores::from_values(values)
    }
}

/// Aggregated, reviewer-free view of a reviewee's peer feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAggregation {
    pub averages: PillarAverages,
    pub average_scores: PillarScores,
    pub feedback_count: u32,
    pub anonymized_comments: Vec<String>,
}

impl PeerAggregation {
    pub fn empty() -> Self {
        Self {
            averages: PillarAverages::default(),
            average_scores: PillarScores::zero(),
            feedback_count: 0,
            anonymized_comments: Vec::new(),
        }
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback_count > 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeerFeedbackAggregationService;

impl PeerFeedbackAggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Average each pillar independently and strip reviewer identity from comments.
    ///
    /// Comments come back sorted so their order cannot be matched to submission order.
    pub fn aggregate(&self, feedbacks: &[PeerFeedback]) -> PeerAggregation {
        if feedbacks.is_empty() {
            return PeerAggregation::empty();
        }

        let count = feedbacks.len() as f64;
        let mut averages = PillarAverages::default();
        for pillar in Pillar::ALL {
            let total: f64 = feedbacks
                .iter()
                .map(|feedback| f64::from(feedback.scores.get(pillar)))
                .sum();
            *averages.slot(pillar) = total / count;
        }

        let mut anonymized_comments: Vec<String> = feedbacks
            .iter()
            .filter_map(|feedback| feedback.comments.as_deref())
            .map(str::trim)
            .filter(|comment| !comment.is_empty())
            .map(str::to_string)
            .collect();
        anonymized_comments.sort();

        // Averages of values in 0..=4 stay in 0..=4, so rounding cannot leave the range.
        let rounded = averages.rounded();
        debug_assert!(rounded.is_ok(), "peer averages left 0..=4: {averages:?}");
        let average_scores = rounded.unwrap_or_else(|_| PillarScores::zero());

        PeerAggregation {
            averages,
            average_scores,
            feedback_count: u32::try_from(feedbacks.len()).unwrap_or(u32::MAX),
            anonymized_comments,
        }
    }
}
