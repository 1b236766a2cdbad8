//! Level-weighted final scores and the workflow that governs changes to them.
//!
//! Leaf value types (`pillars`, `level`, `weighted`) feed the pure calculators
//! (`calculation`, `peer`, `final_calculation`). `final_score` and `adjustment` hold
//! the two stateful entities, and `service` wires them to the storage traits.

pub mod adjustment;
pub mod calculation;
pub mod final_calculation;
pub mod final_score;
pub mod level;
pub mod memory;
pub mod peer;
pub mod pillars;
pub mod report;
pub mod repository;
pub mod service;
pub mod weighted;

#[cfg(test)]
mod tests;

pub use adjustment::{
    AdjustmentError, AdjustmentRequestId, AdjustmentStatus, ScoreAdjustmentRequest,
};
pub use calculation::ScoreCalculationService;
pub use final_calculation::{EvaluationSource, FinalScoreCalculationService};
pub use final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId, ScoreStateError, UserId};
pub use level::{EngineerLevel, LevelWeights, UnknownLevel, WeightTable, WeightTableError};
pub use memory::{InMemoryAdjustmentRepository, InMemoryFinalScoreRepository};
pub use peer::{PeerAggregation, PeerFeedback, PeerFeedbackAggregationService, PillarAverages};
pub use pillars::{Pillar, PillarError, PillarScores};
pub use report::{CycleReport, FinalScoreView};
pub use repository::{AdjustmentRepository, FinalScoreRepository, RepositoryError};
pub use service::{
    AdjustmentOutcome, CycleBatchOutcome, ErrorKind, ScoreCycleService, ScoreServiceError,
};
pub use weighted::{BonusTier, WeightedScore, WeightedScoreError};
