use std::future::Future;

use super::adjustment::{AdjustmentRequestId, ScoreAdjustmentRequest};
use super::final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId};

/// Storage for final scores, keyed by id and by (cycle, employee).
///
/// `save` is an upsert on (cycle, employee) guarded by [`FinalScore::version`]: the caller's
/// version must match the stored one (0 for a new key), and the returned copy carries the
/// bumped version. Soft-deleted records are invisible to every lookup.
pub trait FinalScoreRepository: Send + Sync {
    fn find_by_id(
        &self,
        id: &FinalScoreId,
    ) -> impl Future<Output = Result<Option<FinalScore>, RepositoryError>> + Send;

    fn find_by_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> impl Future<Output = Result<Option<FinalScore>, RepositoryError>> + Send;

    /// Live scores for a cycle, ordered by employee id.
    fn list_by_cycle(
        &self,
        cycle_id: &CycleId,
    ) -> impl Future<Output = Result<Vec<FinalScore>, RepositoryError>> + Send;

    fn save(
        &self,
        score: FinalScore,
    ) -> impl Future<Output = Result<FinalScore, RepositoryError>> + Send;

    fn soft_delete(
        &self,
        id: &FinalScoreId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Storage for adjustment requests.
pub trait AdjustmentRepository: Send + Sync {
    fn insert(
        &self,
        request: ScoreAdjustmentRequest,
    ) -> impl Future<Output = Result<ScoreAdjustmentRequest, RepositoryError>> + Send;

    fn update(
        &self,
        request: ScoreAdjustmentRequest,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn find_by_id(
        &self,
        id: &AdjustmentRequestId,
    ) -> impl Future<Output = Result<Option<ScoreAdjustmentRequest>, RepositoryError>> + Send;

    /// Pending requests for a cycle, oldest first.
    fn pending(
        &self,
        cycle_id: &CycleId,
    ) -> impl Future<Output = Result<Vec<ScoreAdjustmentRequest>, RepositoryError>> + Send;

    /// Every request for an employee in a cycle, oldest first.
    fn for_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> impl Future<Output = Result<Vec<ScoreAdjustmentRequest>, RepositoryError>> + Send;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("stale write: expected version {expected}, stored version is {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
