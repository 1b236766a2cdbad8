use super::common::*;
use crate::scoring::final_score::{ScoreStateError, UserId};
use crate::scoring::weighted::WeightedScore;

#[test]
fn new_score_is_unlocked_and_undelivered() {
    let score = senior_score();
    assert!(!score.is_locked());
    assert!(score.locked_at().is_none());
    assert!(!score.is_feedback_delivered());
    assert!(score.delivered_by().is_none());
    assert!(score.feedback_notes().is_none());
    assert_eq!(score.version, 0);
}

#[test]
fn lock_is_idempotent_and_keeps_first_timestamp() {
    let mut score = senior_score();
    assert!(score.lock(at(2, 9)));
    assert!(!score.lock(at(3, 9)), "second lock is a no-op");

    assert!(score.is_locked());
    assert_eq!(score.locked_at(), Some(at(2, 9)));
}

#[test]
fn unlock_clears_flag_and_timestamp() {
    let mut score = senior_score();
    assert!(!score.unlock(), "unlocking an unlocked score is a no-op");

    score.lock(at(2, 9));
    assert!(score.unlock());
    assert!(!score.is_locked());
    assert!(score.locked_at().is_none());
}

#[test]
fn update_scores_is_rejected_while_locked() {
    let mut score = senior_score();
    let before_pillars = *score.pillar_scores();
    let before_weighted = score.weighted_score();
    score.lock(at(2, 9));

    let replacement = pillars([4, 4, 4, 4, 4]);
    let weighted = WeightedScore::from_value(4.0).expect("in range");
    match score.update_scores(replacement, weighted) {
        Err(ScoreStateError::Locked(id)) => assert_eq!(id, score.id),
        other => panic!("expected locked error, got {other:?}"),
    }
    assert_eq!(*score.pillar_scores(), before_pillars);
    assert_eq!(score.weighted_score(), before_weighted);

    score.unlock();
    score
        .update_scores(replacement, weighted)
        .expect("unlocked score accepts new scores");
    assert_eq!(*score.pillar_scores(), replacement);
    assert_eq!(score.weighted_score().value(), 4.0);
    assert_eq!(score.percentage(), 100.0);
}

#[test]
fn delivery_keeps_notes_when_omitted_and_overwrites_when_supplied() {
    let mut score = senior_score();
    score.mark_feedback_delivered(UserId::from("mgr-1"), Some("first".to_string()), at(4, 9));
    assert!(score.is_feedback_delivered());
    assert_eq!(score.feedback_notes(), Some("first"));
    assert_eq!(score.delivered_by(), Some(&UserId::from("mgr-1")));

    score.mark_feedback_delivered(UserId::from("mgr-2"), None, at(5, 9));
    assert_eq!(score.feedback_notes(), Some("first"));
    assert_eq!(score.delivered_by(), Some(&UserId::from("mgr-2")));
    assert_eq!(score.delivered_at(), Some(at(5, 9)));
    assert_eq!(score.feedback_delivered_at(), Some(at(5, 9)));

    score.mark_feedback_delivered(UserId::from("mgr-2"), Some("second".to_string()), at(6, 9));
    assert_eq!(score.feedback_notes(), Some("second"));
    assert_eq!(score.delivered_at(), Some(at(6, 9)));
}

#[test]
fn delivery_is_not_gated_by_lock_and_does_not_change_it() {
    let mut score = senior_score();
    score.lock(at(2, 9));
    score.mark_feedback_delivered(UserId::from("mgr-1"), None, at(4, 9));
    assert!(score.is_locked());
    assert_eq!(score.locked_at(), Some(at(2, 9)));
    assert!(score.is_feedback_delivered());

    score.unlock();
    score.mark_feedback_delivered(UserId::from("mgr-1"), None, at(5, 9));
    assert!(!score.is_locked());
}

#[test]
fn remediation_cycle_unlock_correct_relock_redeliver() {
    let mut score = senior_score();
    score.lock(at(2, 9));
    score.mark_feedback_delivered(UserId::from("mgr-1"), Some("v1".to_string()), at(3, 9));

    score.unlock();
    let corrected = pillars([4, 3, 4, 3, 2]);
    let weighted = WeightedScore::from_value(3.3).expect("in range");
    score.update_scores(corrected, weighted).expect("unlocked");
    score.lock(at(4, 9));
    score.mark_feedback_delivered(UserId::from("mgr-1"), Some("v2".to_string()), at(5, 9));

    assert!(score.is_locked());
    assert_eq!(score.locked_at(), Some(at(4, 9)));
    assert_eq!(*score.pillar_scores(), corrected);
    assert_eq!(score.feedback_notes(), Some("v2"));
}
