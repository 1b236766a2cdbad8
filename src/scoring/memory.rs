//! Mutex-backed stores standing in for the persistence collaborator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::adjustment::{AdjustmentRequestId, ScoreAdjustmentRequest};
use super::final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId};
use super::repository::{AdjustmentRepository, FinalScoreRepository, RepositoryError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
}

#[derive(Debug, Clone)]
struct StoredScore {
    score: FinalScore,
    deleted: bool,
}

#[derive(Default, Clone)]
pub struct InMemoryFinalScoreRepository {
    records: Arc<Mutex<HashMap<(CycleId, EmployeeId), StoredScore>>>,
}

impl InMemoryFinalScoreRepository {
    fn live<'a>(
        records: &'a HashMap<(CycleId, EmployeeId), StoredScore>,
    ) -> impl Iterator<Item = &'a FinalScore> + 'a {
        records
            .values()
            .filter(|stored| !stored.deleted)
            .map(|stored| &stored.score)
    }
}

impl FinalScoreRepository for InMemoryFinalScoreRepository {
    async fn find_by_id(&self, id: &FinalScoreId) -> Result<Option<FinalScore>, RepositoryError> {
        let guard = lock(&self.records)?;
        let found = Self::live(&guard).find(|score| &score.id == id).cloned();
        Ok(found)
    }

    async fn find_by_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> Result<Option<FinalScore>, RepositoryError> {
        let key = (cycle_id.clone(), employee_id.clone());
        let guard = lock(&self.records)?;
        let found = guard
            .get(&key)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.score.clone());
        Ok(found)
    }

    async fn list_by_cycle(&self, cycle_id: &CycleId) -> Result<Vec<FinalScore>, RepositoryError> {
        let guard = lock(&self.records)?;
        let mut scores: Vec<FinalScore> = Self::live(&guard)
            .filter(|score| &score.cycle_id == cycle_id)
            .cloned()
            .collect();
        scores.sort_by(|left, right| left.employee_id.cmp(&right.employee_id));
        Ok(scores)
    }

    async fn save(&self, mut score: FinalScore) -> Result<FinalScore, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let key = (score.cycle_id.clone(), score.employee_id.clone());

        let stored_version = guard
            .get(&key)
            .filter(|stored| !stored.deleted)
            .map(|stored| stored.score.version)
            .unwrap_or(0);
        if stored_version != score.version {
            return Err(RepositoryError::VersionConflict {
                expected: score.version,
                actual: stored_version,
            });
        }

        score.version += 1;
        guard.insert(
            key,
            StoredScore {
                score: score.clone(),
                deleted: false,
            },
        );
        Ok(score)
    }

    async fn soft_delete(&self, id: &FinalScoreId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let stored = guard
            .values_mut()
            .find(|stored| !stored.deleted && &stored.score.id == id)
            .ok_or(RepositoryError::NotFound)?;
        stored.deleted = true;
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryAdjustmentRepository {
    records: Arc<Mutex<HashMap<AdjustmentRequestId, ScoreAdjustmentRequest>>>,
}

impl InMemoryAdjustmentRepository {
    fn sorted(mut requests: Vec<ScoreAdjustmentRequest>) -> Vec<ScoreAdjustmentRequest> {
        requests.sort_by(|left, right| {
            left.requested_at
                .cmp(&right.requested_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        requests
    }
}

impl AdjustmentRepository for InMemoryAdjustmentRepository {
    async fn insert(
        &self,
        request: ScoreAdjustmentRequest,
    ) -> Result<ScoreAdjustmentRequest, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    async fn update(&self, request: ScoreAdjustmentRequest) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.contains_key(&request.id) {
            guard.insert(request.id.clone(), request);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    async fn find_by_id(
        &self,
        id: &AdjustmentRequestId,
    ) -> Result<Option<ScoreAdjustmentRequest>, RepositoryError> {
        let guard = lock(&self.records)?;
        let found = guard.get(id).cloned();
        Ok(found)
    }

    async fn pending(
        &self,
        cycle_id: &CycleId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        let guard = lock(&self.records)?;
        let pending = guard
            .values()
            .filter(|request| &request.cycle_id == cycle_id && request.is_pending())
            .cloned()
            .collect();
        Ok(Self::sorted(pending))
    }

    async fn for_employee(
        &self,
        cycle_id: &CycleId,
        employee_id: &EmployeeId,
    ) -> Result<Vec<ScoreAdjustmentRequest>, RepositoryError> {
        let guard = lock(&self.records)?;
        let history = guard
            .values()
            .filter(|request| &request.cycle_id == cycle_id && &request.employee_id == employee_id)
            .cloned()
            .collect();
        Ok(Self::sorted(history))
    }
}
