use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::scoring::adjustment::{AdjustmentRequestId, ScoreAdjustmentRequest};
use crate::scoring::final_calculation::{EvaluationSource, FinalScoreCalculationService};
use crate::scoring::final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId, UserId};
use crate::scoring::level::EngineerLevel;
use crate::scoring::memory::{InMemoryAdjustmentRepository, InMemoryFinalScoreRepository};
use crate::scoring::peer::PeerFeedback;
use crate::scoring::pillars::PillarScores;
use crate::scoring::repository::{AdjustmentRepository, FinalScoreRepository, RepositoryError};
use crate::scoring::service::ScoreCycleService;

pub(super) const CYCLE: &str = "2025-h1";

pub(super) fn cycle() -> CycleId {
    CycleId::from(CYCLE)
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, 0, 0).unwrap()
}

pub(super) fn pillars(values: [u8; 5]) -> PillarScores {
    let [a, b, c, d, e] = values;
    PillarScores::new(a, b, c, d, e).expect("valid pillar scores")
}

pub(super) fn peer(reviewer: &str, values: [u8; 5], comments: Option<&str>) -> PeerFeedback {
    PeerFeedback {
        reviewer_id: UserId::from(reviewer),
        scores: pillars(values),
        comments: comments.map(str::to_string),
    }
}

pub(super) fn source(employee: &str, values: [u8; 5]) -> EvaluationSource {
    EvaluationSource {
        cycle_id: cycle(),
        employee_id: EmployeeId::from(employee),
        pillar_scores: pillars(values),
        proposed_level: None,
        current_level: Some(EngineerLevel::Senior),
        peer_feedback: Vec::new(),
    }
}

pub(super) fn senior_score() -> FinalScore {
    FinalScoreCalculationService::default()
        .calculate_final_score_at(&source("emp-1", [3, 2, 4, 3, 2]), at(1, 9))
        .expect("in range")
}

pub(super) type MemoryService =
    ScoreCycleService<InMemoryFinalScoreRepository, InMemoryAdjustmentRepository>;

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryFinalScoreRepository>,
    Arc<InMemoryAdjustmentRepository>,
) {
    let scores = Arc::new(InMemoryFinalScoreRepository::default());
    let adjustments = Arc::new(InMemoryAdjustmentRepository::default());
    let service = ScoreCycleService::new(
        scores.clone(),
        adjustments.clone(),
        FinalScoreCalculationService::default(),
    )
    .with_batch_concurrency(2);
    (service, scores, adjustments)
}

pub(super) struct UnavailableScores;

impl FinalScoreRepository for UnavailableScores {
    async fn find_by_id(&self, _id: &FinalScoreId) -> Result<Option<FinalScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn find_by_employee(
        &self,
        _cycle_id: &CycleId,
        _employee_id: &EmployeeId,
    ) -> Result<Option<FinalScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn list_by_cycle(&self, _cycle_id: &CycleId) -> Result<Vec<FinalScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn save(&self, _score: FinalScore) -> Result<FinalScore, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn soft_delete(&self, _id: &FinalScoreId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ReadOnlyAdjustments;

impl AdjustmentRepository for ReadOnlyAdjustments {
    async fn insert(
        &self,
        _request: ScoreAdjustmentRequest,
    ) -> Result<ScoreAdjustmentRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    async fn update(&self, _request: ScoreAdjustmentRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    async fn find_by_id(
        &self,
        _id: &AdjustmentRequestId,
    ) -> Result<Option<ScoreAdjustmentRequest>, RepositoryError> {
        Ok(None)
    }

    async fn pending(
        &self,
        _cycle_id: &CycleId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        Ok(Vec::new())
    }

    async fn for_employee(
        &self,
        _cycle_id: &CycleId,
        _employee_id: &EmployeeId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        Ok(Vec::new())
    }
}

/// Accepts new requests but cannot record review decisions.
#[derive(Default)]
pub(super) struct UpdateFailingAdjustments {
    pub(super) inner: InMemoryAdjustmentRepository,
}

impl AdjustmentRepository for UpdateFailingAdjustments {
    async fn insert(
        &self,
        request: ScoreAdjustmentRequest,
    ) -> Result<ScoreAdjustmentRequest, RepositoryError> {
        self.inner.insert(request).await
    }

    async fn update(&self, _request: ScoreAdjustmentRequest) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("write timed out".to_string()))
    }

    async fn find_by_id(
        &self,
        id: &AdjustmentRequestId,
    ) -> Result<Option<ScoreAdjustmentRequest>, RepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn pending(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        self.inner.pending(cycle_id).await
    }

    async fn for_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        self.inner.for_employee(cycle_id, employee_id).await
    }
}
