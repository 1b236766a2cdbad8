use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::final_score::{CycleId, EmployeeId, FinalScore, FinalScoreId};
use super::level::EngineerLevel;
use super::weighted::BonusTier;

/// Flat, serializable projection of a final score for reports and exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalScoreView {
    pub score_id: FinalScoreId,
    pub employee_id: EmployeeId,
    pub level: EngineerLevel,
    pub project_impact: u8,
    pub direction: u8,
    pub engineering_excellence: u8,
    pub operational_ownership: u8,
    pub people_impact: u8,
    pub weighted_score: f64,
    pub percentage: f64,
    pub bonus_tier: BonusTier,
    pub locked: bool,
    pub feedback_delivered: bool,
    pub peer_feedback_count: u32,
}

impl From<&FinalScore> for FinalScoreView {
    fn from(score: &FinalScore) -> Self {
        let pillars = score.pillar_scores();
        Self {
            score_id: score.id.clone(),
            employee_id: score.employee_id.clone(),
            level: score.final_level,
            project_impact: pillars.project_impact(),
            direction: pillars.direction(),
            engineering_excellence: pillars.engineering_excellence(),
            operational_ownership: pillars.operational_ownership(),
            people_impact: pillars.people_impact(),
            weighted_score: score.weighted_score().value(),
            percentage: score.percentage(),
            bonus_tier: score.bonus_tier(),
            locked: score.is_locked(),
            feedback_delivered: score.is_feedback_delivered(),
            peer_feedback_count: score.peer_feedback_count,
        }
    }
}

/// Cycle-wide summary: one row per employee plus the bonus tier distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub cycle_id: CycleId,
    pub rows: Vec<FinalScoreView>,
    pub tier_counts: BTreeMap<BonusTier, usize>,
}

impl CycleReport {
    pub fn from_scores(cycle_id: CycleId, scores: &[FinalScore]) -> Self {
        let rows: Vec<FinalScoreView> = scores.iter().map(FinalScoreView::from).collect();

        let mut tier_counts: BTreeMap<BonusTier, usize> =
            BonusTier::ALL.into_iter().map(|tier| (tier, 0)).collect();
        for row in &rows {
            *tier_counts.entry(row.bonus_tier).or_default() += 1;
        }

        Self {
            cycle_id,
            rows,
            tier_counts,
        }
    }

    pub fn locked_count(&self) -> usize {
        self.rows.iter().filter(|row| row.locked).count()
    }

    pub fn delivered_count(&self) -> usize {
        self.rows.iter().filter(|row| row.feedback_delivered).count()
    }

    /// One CSV record per row, with a header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::final_calculation::{EvaluationSource, FinalScoreCalculationService};
    use crate::scoring::pillars::PillarScores;

    fn score(employee: &str, pillars: [u8; 5]) -> FinalScore {
        let [a, b, c, d, e] = pillars;
        FinalScoreCalculationService::default()
            .calculate_final_score(&EvaluationSource {
                cycle_id: CycleId::from("2025-h1"),
                employee_id: EmployeeId::from(employee),
                pillar_scores: PillarScores::new(a, b, c, d, e).expect("valid"),
                proposed_level: Some(EngineerLevel::Senior),
                current_level: None,
                peer_feedback: Vec::new(),
            })
            .expect("in range")
    }

    #[test]
    fn tier_counts_cover_every_tier() {
        let scores = vec![
            score("emp-1", [4, 4, 4, 4, 4]),
            score("emp-2", [3, 2, 4, 3, 2]),
            score("emp-3", [3, 3, 3, 3, 3]),
        ];
        let report = CycleReport::from_scores(CycleId::from("2025-h1"), &scores);

        assert_eq!(report.tier_counts[&BonusTier::Exceeds], 1);
        assert_eq!(report.tier_counts[&BonusTier::Meets], 2);
        assert_eq!(report.tier_counts[&BonusTier::Below], 0);
        assert_eq!(report.locked_count(), 0);
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let scores = vec![score("emp-2", [3, 2, 4, 3, 2])];
        let report = CycleReport::from_scores(CycleId::from("2025-h1"), &scores);

        let mut buffer = Vec::new();
        report.write_csv(&mut buffer).expect("csv writes");
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();

        let header = lines.next().expect("header");
        assert!(header.starts_with("score_id,employee_id,level"));
        assert!(header.contains("bonus_tier"));
        let row = lines.next().expect("row");
        assert!(row.contains("emp-2"));
        assert!(row.contains("senior"));
        assert!(row.contains("MEETS"));
        assert!(lines.next().is_none());
    }
}
