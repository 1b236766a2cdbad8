use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::EngineerLevel;
use super::peer::PeerAggregation;
use super::pillars::PillarScores;
use super::weighted::{BonusTier, WeightedScore};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Review cycle identifier supplied by the cycle management collaborator.
    CycleId
);
string_id!(
    /// Employee under review.
    EmployeeId
);
string_id!(
    /// Any acting user: manager, reviewer, requester.
    UserId
);
string_id!(FinalScoreId);

impl FinalScoreId {
    pub fn generate() -> Self {
        Self(format!("fs-{}", uuid::Uuid::new_v4()))
    }
}

/// Mutation attempted on a score frozen by calibration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreStateError {
    #[error("final score {0} is locked and cannot be modified")]
    Locked(FinalScoreId),
}

/// Final review outcome for one employee in one cycle.
///
/// The lock flag guards [`FinalScore::update_scores`] and nothing else; deadlines and
/// authorization are enforced by the calling use case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalScore {
    pub id: FinalScoreId,
    pub cycle_id: CycleId,
    pub employee_id: EmployeeId,
    pillar_scores: PillarScores,
    weighted_score: WeightedScore,
    pub final_level: EngineerLevel,
    pub peer_average_scores: Option<PillarScores>,
    pub peer_feedback_count: u32,
    pub anonymized_comments: Vec<String>,
    locked: bool,
    locked_at: Option<DateTime<Utc>>,
    feedback_delivered: bool,
    feedback_delivered_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    delivered_by: Option<UserId>,
    feedback_notes: Option<String>,
    pub calculated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped by the store on every save.
    pub version: u64,
}

impl FinalScore {
    /// Fresh, unlocked and undelivered score.
    pub fn new(
        cycle_id: CycleId,
        employee_id: EmployeeId,
        pillar_scores: PillarScores,
        weighted_score: WeightedScore,
        final_level: EngineerLevel,
        peers: &PeerAggregation,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        let (peer_average_scores, peer_feedback_count) = if peers.has_feedback() {
            (Some(peers.average_scores), peers.feedback_count)
        } else {
            (None, 0)
        };

        Self {
            id: FinalScoreId::generate(),
            cycle_id,
            employee_id,
            pillar_scores,
            weighted_score,
            final_level,
            peer_average_scores,
            peer_feedback_count,
            anonymized_comments: peers.anonymized_comments.clone(),
            locked: false,
            locked_at: None,
            feedback_delivered: false,
            feedback_delivered_at: None,
            delivered_at: None,
            delivered_by: None,
            feedback_notes: None,
            calculated_at,
            version: 0,
        }
    }

    pub fn pillar_scores(&self) -> &PillarScores {
        &self.pillar_scores
    }

    pub fn weighted_score(&self) -> WeightedScore {
        self.weighted_score
    }

    pub fn percentage(&self) -> f64 {
        self.weighted_score.percentage()
    }

    pub fn bonus_tier(&self) -> BonusTier {
        self.weighted_score.bonus_tier()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    pub fn is_feedback_delivered(&self) -> bool {
        self.feedback_delivered
    }

    pub fn feedback_delivered_at(&self) -> Option<DateTime<Utc>> {
        self.feedback_delivered_at
    }

    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    pub fn delivered_by(&self) -> Option<&UserId> {
        self.delivered_by.as_ref()
    }

    pub fn feedback_notes(&self) -> Option<&str> {
        self.feedback_notes.as_deref()
    }

    /// Freeze the score. Returns `false` when it was already locked; `locked_at` is kept.
    pub fn lock(&mut self, at: DateTime<Utc>) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        self.locked_at = Some(at);
        true
    }

    /// Returns `false` when the score was not locked.
    pub fn unlock(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        self.locked_at = None;
        true
    }

    pub fn update_scores(
        &mut self,
        pillar_scores: PillarScores,
        weighted_score: WeightedScore,
    ) -> Result<(), ScoreStateError> {
        if self.locked {
            return Err(ScoreStateError::Locked(self.id.clone()));
        }
        self.pillar_scores = pillar_scores;
        self.weighted_score = weighted_score;
        Ok(())
    }

    /// Record delivery to the employee. Not gated by the lock; repeat calls overwrite the
    /// delivery stamp and deliverer, but omitted notes keep the previous notes.
    pub fn mark_feedback_delivered(
        &mut self,
        delivered_by: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) {
        self.feedback_delivered = true;
        self.feedback_delivered_at = Some(at);
        self.delivered_at = Some(at);
        self.delivered_by = Some(delivered_by);
        if let Some(notes) = notes {
            self.feedback_notes = Some(notes);
        }
    }
}
