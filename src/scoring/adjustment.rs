use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::final_score::{CycleId, EmployeeId, UserId};
use super::pillars::PillarScores;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentRequestId(pub String);

impl AdjustmentRequestId {
    pub fn generate() -> Self {
        Self(format!("adj-{}", uuid::Uuid::new_v4()))
    }
}

impl fmt::Display for AdjustmentRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl AdjustmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AdjustmentStatus::Pending => "pending",
            AdjustmentStatus::Approved => "approved",
            AdjustmentStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, AdjustmentStatus::Pending)
    }
}

/// Post-calibration proposal to change an employee's pillar scores.
///
/// Starts `Pending` and moves exactly once to `Approved` or `Rejected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustmentRequest {
    pub id: AdjustmentRequestId,
    pub cycle_id: CycleId,
    pub employee_id: EmployeeId,
    pub requester_id: UserId,
    approver_id: Option<UserId>,
    pub reason: String,
    pub proposed_scores: PillarScores,
    status: AdjustmentStatus,
    pub requested_at: DateTime<Utc>,
    reviewed_at: Option<DateTime<Utc>>,
    review_notes: Option<String>,
    rejection_reason: Option<String>,
}

impl ScoreAdjustmentRequest {
    pub fn new(
        cycle_id: CycleId,
        employee_id: EmployeeId,
        requester_id: UserId,
        reason: String,
        proposed_scores: PillarScores,
        requested_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AdjustmentRequestId::generate(),
            cycle_id,
            employee_id,
            requester_id,
            approver_id: None,
            reason,
            proposed_scores,
            status: AdjustmentStatus::Pending,
            requested_at,
            reviewed_at: None,
            review_notes: None,
            rejection_reason: None,
        }
    }

    pub fn status(&self) -> AdjustmentStatus {
        self.status
    }

    pub fn approver_id(&self) -> Option<&UserId> {
        self.approver_id.as_ref()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn review_notes(&self) -> Option<&str> {
        self.review_notes.as_deref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.status == AdjustmentStatus::Pending
    }

    pub fn approve(
        &mut self,
        reviewer: UserId,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AdjustmentError> {
        self.ensure_pending()?;
        self.status = AdjustmentStatus::Approved;
        self.approver_id = Some(reviewer);
        self.reviewed_at = Some(at);
        self.review_notes = notes;
        Ok(())
    }

    pub fn reject(
        &mut self,
        reviewer: UserId,
        reason: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), AdjustmentError> {
        self.ensure_pending()?;
        self.status = AdjustmentStatus::Rejected;
        self.approver_id = Some(reviewer);
        self.reviewed_at = Some(at);
        self.rejection_reason = reason;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), AdjustmentError> {
        if self.status.is_terminal() {
            return Err(AdjustmentError::AlreadyReviewed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjustmentError {
    #[error("adjustment request {id} was already {}", .status.label())]
    AlreadyReviewed {
        id: AdjustmentRequestId,
        status: AdjustmentStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> ScoreAdjustmentRequest {
        ScoreAdjustmentRequest::new(
            CycleId::from("2025-h1"),
            EmployeeId::from("emp-7"),
            UserId::from("mgr-1"),
            "Missed launch impact during calibration".to_string(),
            PillarScores::new(4, 3, 3, 3, 2).expect("valid"),
            Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn starts_pending() {
        let request = request();
        assert_eq!(request.status(), AdjustmentStatus::Pending);
        assert!(request.approver_id().is_none());
        assert!(request.reviewed_at().is_none());
    }

    #[test]
    fn approve_is_terminal() {
        let mut request = request();
        let at = Utc.with_ymd_and_hms(2025, 7, 2, 9, 0, 0).unwrap();
        request
            .approve(UserId::from("hr-1"), Some("confirmed".to_string()), at)
            .expect("pending request approves");

        assert_eq!(request.status(), AdjustmentStatus::Approved);
        assert_eq!(request.approver_id(), Some(&UserId::from("hr-1")));
        assert_eq!(request.reviewed_at(), Some(at));
        assert_eq!(request.review_notes(), Some("confirmed"));

        let again = request.approve(UserId::from("hr-2"), None, at);
        assert!(matches!(
            again,
            Err(AdjustmentError::AlreadyReviewed {
                status: AdjustmentStatus::Approved,
                ..
            })
        ));
        assert!(request.reject(UserId::from("hr-2"), None, at).is_err());
        assert_eq!(request.approver_id(), Some(&UserId::from("hr-1")));
    }

    #[test]
    fn reject_records_reason_and_is_terminal() {
        let mut request = request();
        let at = Utc.with_ymd_and_hms(2025, 7, 3, 9, 0, 0).unwrap();
        request
            .reject(UserId::from("hr-1"), Some("no new evidence".to_string()), at)
            .expect("pending request rejects");

        assert_eq!(request.status(), AdjustmentStatus::Rejected);
        assert_eq!(request.rejection_reason(), Some("no new evidence"));
        assert!(request.approve(UserId::from("hr-1"), None, at).is_err());
    }
}
