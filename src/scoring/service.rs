use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::adjustment::{AdjustmentError, AdjustmentRequestId, ScoreAdjustmentRequest};
use super::final_calculation::{EvaluationSource, FinalScoreCalculationService};
use super::final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId, ScoreStateError, UserId};
use super::pillars::{PillarError, PillarScores};
use super::report::CycleReport;
use super::repository::{AdjustmentRepository, FinalScoreRepository, RepositoryError};
use super::weighted::WeightedScoreError;

const DEFAULT_BATCH_CONCURRENCY: usize = 8;

/// Use cases around final scores: cycle calculation, calibration, delivery, adjustments.
pub struct ScoreCycleService<S, A> {
    scores: Arc<S>,
    adjustments: Arc<A>,
    calculator: Arc<FinalScoreCalculationService>,
    batch_concurrency: usize,
}

/// Result of a cycle-wide calculation. Both lists follow input order.
#[derive(Debug, Default)]
pub struct CycleBatchOutcome {
    pub scored: Vec<FinalScore>,
    pub failures: Vec<(EmployeeId, ScoreServiceError)>,
}

/// Approved request together with the score it changed.
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    pub request: ScoreAdjustmentRequest,
    pub score: FinalScore,
}

impl<S, A> ScoreCycleService<S, A>
where
    S: FinalScoreRepository + 'static,
    A: AdjustmentRepository + 'static,
{
    pub fn new(
        scores: Arc<S>,
        adjustments: Arc<A>,
        calculator: FinalScoreCalculationService,
    ) -> Self {
        Self {
            scores,
            adjustments,
            calculator: Arc::new(calculator),
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Cap the number of employees calculated concurrently in a batch.
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Calculate and store one employee's final score.
    ///
    /// An existing unlocked score for the same key is replaced in place (same id); a locked
    /// one must go through the adjustment workflow instead.
    pub async fn calculate_final_score(
        &self,
        source: EvaluationSource,
    ) -> Result<FinalScore, ScoreServiceError> {
        let mut fresh = self.calculator.calculate_final_score(&source)?;

        if let Some(existing) = self
            .scores
            .find_by_employee(&source.cycle_id, &source.employee_id)
            .await?
        {
            if existing.is_locked() {
                return Err(ScoreStateError::Locked(existing.id).into());
            }
            fresh.id = existing.id;
            fresh.version = existing.version;
        }

        let saved = self.scores.save(fresh).await?;
        debug!(
            cycle_id = %saved.cycle_id,
            employee_id = %saved.employee_id,
            score_id = %saved.id,
            weighted = saved.weighted_score().value(),
            tier = %saved.bonus_tier(),
            "final score calculated"
        );
        Ok(saved)
    }

    /// Fan out per-employee calculations for a cycle and collect them in input order.
    ///
    /// A failing employee does not abort the batch; the failure is reported alongside the
    /// successful scores.
    pub async fn calculate_cycle(
        &self,
        cycle_id: &CycleId,
        sources: Vec<EvaluationSource>,
    ) -> CycleBatchOutcome {
        let total = sources.len();
        let results: Vec<(EmployeeId, Result<FinalScore, ScoreServiceError>)> =
            stream::iter(sources.into_iter().map(move |source| async move {
                let employee_id = source.employee_id.clone();
                if &source.cycle_id != cycle_id {
                    let err = ScoreServiceError::CycleMismatch {
                        expected: cycle_id.clone(),
                        actual: source.cycle_id.clone(),
                    };
                    return (employee_id, Err(err));
                }
                (employee_id, self.calculate_final_score(source).await)
            }))
            .buffered(self.batch_concurrency)
            .collect()
            .await;

        let mut outcome = CycleBatchOutcome::default();
        for (employee_id, result) in results {
            match result {
                Ok(score) => outcome.scored.push(score),
                Err(err) => {
                    warn!(%cycle_id, %employee_id, error = %err, "final score calculation failed");
                    outcome.failures.push((employee_id, err));
                }
            }
        }

        info!(
            %cycle_id,
            total,
            scored = outcome.scored.len(),
            failed = outcome.failures.len(),
            "cycle calculation finished"
        );
        outcome
    }

    pub async fn get_score(&self, id: &FinalScoreId) -> Result<FinalScore, ScoreServiceError> {
        self.scores
            .find_by_id(id)
            .await?
            .ok_or_else(|| ScoreServiceError::FinalScoreNotFound(id.to_string()))
    }

    pub async fn get_employee_score(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> Result<FinalScore, ScoreServiceError> {
        self.scores
            .find_by_employee(cycle_id, employee_id)
            .await?
            .ok_or_else(|| ScoreServiceError::FinalScoreNotFound(format!("{cycle_id}/{employee_id}")))
    }

    pub async fn lock_score(&self, id: &FinalScoreId) -> Result<FinalScore, ScoreServiceError> {
        let mut score = self.get_score(id).await?;
        if !score.lock(Utc::now()) {
            return Ok(score);
        }
        let saved = self.scores.save(score).await?;
        info!(score_id = %saved.id, employee_id = %saved.employee_id, "final score locked");
        Ok(saved)
    }

    pub async fn unlock_score(&self, id: &FinalScoreId) -> Result<FinalScore, ScoreServiceError> {
        let mut score = self.get_score(id).await?;
        if !score.unlock() {
            return Ok(score);
        }
        let saved = self.scores.save(score).await?;
        info!(score_id = %saved.id, employee_id = %saved.employee_id, "final score unlocked");
        Ok(saved)
    }

    /// Calibration freeze for a whole cycle. Returns how many scores were newly locked.
    pub async fn lock_cycle(&self, cycle_id: &CycleId) -> Result<usize, ScoreServiceError> {
        let now = Utc::now();
        let mut newly_locked = 0;
        for mut score in self.scores.list_by_cycle(cycle_id).await? {
            if score.lock(now) {
                self.scores.save(score).await?;
                newly_locked += 1;
            }
        }
        info!(%cycle_id, newly_locked, "cycle calibrated");
        Ok(newly_locked)
    }

    /// Record that the manager released the score. Allowed whether or not the score is locked.
    pub async fn deliver_feedback(
        &self,
        id: &FinalScoreId,
        delivered_by: UserId,
        notes: Option<String>,
    ) -> Result<FinalScore, ScoreServiceError> {
        let mut score = self.get_score(id).await?;
        score.mark_feedback_delivered(delivered_by, notes, Utc::now());
        let saved = self.scores.save(score).await?;
        info!(score_id = %saved.id, employee_id = %saved.employee_id, "feedback delivered");
        Ok(saved)
    }

    pub async fn request_adjustment(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
        requester: UserId,
        reason: String,
        proposed_scores: PillarScores,
    ) -> Result<ScoreAdjustmentRequest, ScoreServiceError> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(ScoreServiceError::MissingReason);
        }

        let score = self.get_employee_score(cycle_id, employee_id).await?;
        if !score.is_locked() {
            debug!(score_id = %score.id, "adjustment requested on an unlocked score");
        }

        let request = ScoreAdjustmentRequest::new(
            cycle_id.clone(),
            employee_id.clone(),
            requester,
            reason,
            proposed_scores,
            Utc::now(),
        );
        let stored = self.adjustments.insert(request).await?;
        info!(request_id = %stored.id, %cycle_id, %employee_id, "score adjustment requested");
        Ok(stored)
    }

    /// Approve a pending request and apply its proposed scores.
    ///
    /// The target score is unlocked, updated, and re-locked when it was locked before.
    pub async fn approve_adjustment(
        &self,
        request_id: &AdjustmentRequestId,
        reviewer: UserId,
        notes: Option<String>,
    ) -> Result<AdjustmentOutcome, ScoreServiceError> {
        let mut request = self.get_adjustment(request_id).await?;
        ensure_distinct_reviewer(&request, &reviewer)?;

        let mut score = self
            .get_employee_score(&request.cycle_id, &request.employee_id)
            .await?;
        let weighted = self
            .calculator
            .calculator()
            .calculate_weighted_score(&request.proposed_scores, score.final_level)?;

        let now = Utc::now();
        request.approve(reviewer, notes, now)?;

        let previous = score.clone();
        let was_locked = score.unlock();
        score.update_scores(request.proposed_scores, weighted)?;
        if was_locked {
            score.lock(now);
        }

        let score = self.scores.save(score).await?;
        if let Err(err) = self.adjustments.update(request.clone()).await {
            self.restore_score(previous, score.version, &request.id).await;
            return Err(err.into());
        }

        info!(
            request_id = %request.id,
            score_id = %score.id,
            weighted = score.weighted_score().value(),
            relocked = was_locked,
            "score adjustment approved"
        );
        Ok(AdjustmentOutcome { request, score })
    }

    /// Put a score back to its pre-approval state when the request could not be recorded.
    async fn restore_score(
        &self,
        mut previous: FinalScore,
        current_version: u64,
        request_id: &AdjustmentRequestId,
    ) {
        previous.version = current_version;
        match self.scores.save(previous).await {
            Ok(restored) => warn!(
                %request_id,
                score_id = %restored.id,
                "adjustment not recorded, score restored"
            ),
            Err(err) => error!(
                %request_id,
                error = %err,
                "adjustment not recorded and score restore failed"
            ),
        }
    }

    pub async fn reject_adjustment(
        &self,
        request_id: &AdjustmentRequestId,
        reviewer: UserId,
        reason: Option<String>,
    ) -> Result<ScoreAdjustmentRequest, ScoreServiceError> {
        let mut request = self.get_adjustment(request_id).await?;
        ensure_distinct_reviewer(&request, &reviewer)?;

        request.reject(reviewer, reason, Utc::now())?;
        self.adjustments.update(request.clone()).await?;
        info!(request_id = %request.id, "score adjustment rejected");
        Ok(request)
    }

    pub async fn get_adjustment(
        &self,
        request_id: &AdjustmentRequestId,
    ) -> Result<ScoreAdjustmentRequest, ScoreServiceError> {
        self.adjustments
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| ScoreServiceError::AdjustmentNotFound(request_id.clone()))
    }

    pub async fn pending_adjustments(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, ScoreServiceError> {
        Ok(self.adjustments.pending(cycle_id).await?)
    }

    pub async fn adjustments_for_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, ScoreServiceError> {
        Ok(self.adjustments.for_employee(cycle_id, employee_id).await?)
    }

    pub async fn cycle_report(&self, cycle_id: &CycleId) -> Result<CycleReport, ScoreServiceError> {
        let scores = self.scores.list_by_cycle(cycle_id).await?;
        Ok(CycleReport::from_scores(cycle_id.clone(), &scores))
    }
}

fn ensure_distinct_reviewer(
    request: &ScoreAdjustmentRequest,
    reviewer: &UserId,
) -> Result<(), ScoreServiceError> {
    if &request.requester_id == reviewer {
        return Err(ScoreServiceError::SelfReview {
            request_id: request.id.clone(),
            reviewer: reviewer.clone(),
        });
    }
    Ok(())
}

/// Coarse classification so callers can map failures without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    State,
    NotFound,
    Authorization,
    Storage,
}

/// Error raised by the score cycle service.
#[derive(Debug, thiserror::Error)]
pub enum ScoreServiceError {
    #[error(transparent)]
    Pillar(#[from] PillarError),
    #[error(transparent)]
    WeightedScore(#[from] WeightedScoreError),
    #[error(transparent)]
    State(#[from] ScoreStateError),
    #[error(transparent)]
    Adjustment(#[from] AdjustmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("evaluation for cycle {actual} submitted to batch for cycle {expected}")]
    CycleMismatch { expected: CycleId, actual: CycleId },
    #[error("adjustment request requires a reason")]
    MissingReason,
    #[error("final score {0} not found")]
    FinalScoreNotFound(String),
    #[error("adjustment request {0} not found")]
    AdjustmentNotFound(AdjustmentRequestId),
    #[error("reviewer {reviewer} cannot review their own adjustment request {request_id}")]
    SelfReview {
        request_id: AdjustmentRequestId,
        reviewer: UserId,
    },
}

impl ScoreServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoreServiceError::Pillar(_)
            | ScoreServiceError::WeightedScore(_)
            | ScoreServiceError::CycleMismatch { .. }
            | ScoreServiceError::MissingReason => ErrorKind::Validation,
            ScoreServiceError::State(_) | ScoreServiceError::Adjustment(_) => ErrorKind::State,
            ScoreServiceError::FinalScoreNotFound(_) | ScoreServiceError::AdjustmentNotFound(_) => {
                ErrorKind::NotFound
            }
            ScoreServiceError::SelfReview { .. } => ErrorKind::Authorization,
            ScoreServiceError::Repository(RepositoryError::NotFound) => ErrorKind::NotFound,
            ScoreServiceError::Repository(RepositoryError::VersionConflict { .. }) => {
                ErrorKind::State
            }
            ScoreServiceError::Repository(_) => ErrorKind::Storage,
        }
    }
}
