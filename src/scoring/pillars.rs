use serde::{Deserialize, Serialize};

/// Highest value any single pillar may carry.
pub const MAX_PILLAR_SCORE: u8 = 4;

/// The five fixed performance dimensions a review is scored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    ProjectImpact,
    Direction,
    EngineeringExcellence,
    OperationalOwnership,
    PeopleImpact,
}

impl Pillar {
    pub const ALL: [Self; 5] = [
        Self::ProjectImpact,
        Self::Direction,
        Self::EngineeringExcellence,
        Self::OperationalOwnership,
        Self::PeopleImpact,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProjectImpact => "Project Impact",
            Self::Direction => "Direction",
            Self::EngineeringExcellence => "Engineering Excellence",
            Self::OperationalOwnership => "Operational Ownership",
            Self::PeopleImpact => "People Impact",
        }
    }
}

/// Validated per-pillar scores, each in `0..=4`.
///
/// Fields are private so the range check in [`PillarScores::new`] cannot be
/// bypassed; deserialization routes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPillarScores")]
pub struct PillarScores {
    project_impact: u8,
    direction: u8,
    engineering_excellence: u8,
    operational_ownership: u8,
    people_impact: u8,
}

impl PillarScores {
    pub fn new(
        project_impact: u8,
        direction: u8,
        engineering_excellence: u8,
        operational_ownership: u8,
        people_impact: u8,
    ) -> Result<Self, PillarError> {
        let scores = Self {
            project_impact,
            direction,
            engineering_excellence,
            operational_ownership,
            people_impact,
        };

        for pillar in Pillar::ALL {
            let value = scores.get(pillar);
            if value > MAX_PILLAR_SCORE {
                return Err(PillarError::OutOfRange {
                    pillar,
                    value: i64::from(value),
                });
            }
        }

        Ok(scores)
    }

    /// Build scores from wider integers, e.g. untrusted request payloads.
    pub fn from_values(values: [i64; 5]) -> Result<Self, PillarError> {
        let mut narrowed = [0u8; 5];
        for ((slot, value), pillar) in narrowed.iter_mut().zip(values).zip(Pillar::ALL) {
            *slot = u8::try_from(value)
                .ok()
                .filter(|v| *v <= MAX_PILLAR_SCORE)
                .ok_or(PillarError::OutOfRange { pillar, value })?;
        }
        let [a, b, c, d, e] = narrowed;
        Self::new(a, b, c, d, e)
    }

    pub const fn zero() -> Self {
        Self {
            project_impact: 0,
            direction: 0,
            engineering_excellence: 0,
            operational_ownership: 0,
            people_impact: 0,
        }
    }

    pub const fn get(&self, pillar: Pillar) -> u8 {
        match pillar {
            Pillar::ProjectImpact => self.project_impact,
            Pillar::Direction => self.direction,
            Pillar::EngineeringExcellence => self.engineering_excellence,
            Pillar::OperationalOwnership => self.operational_ownership,
            Pillar::PeopleImpact => self.people_impact,
        }
    }

    pub const fn project_impact(&self) -> u8 {
        self.project_impact
    }

    pub const fn direction(&self) -> u8 {
        self.direction
    }

    pub const fn engineering_excellence(&self) -> u8 {
        self.engineering_excellence
    }

    pub const fn operational_ownership(&self) -> u8 {
        self.operational_ownership
    }

    pub const fn people_impact(&self) -> u8 {
        self.people_impact
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pillar, u8)> + '_ {
        Pillar::ALL
            .into_iter()
            .map(move |pillar| (pillar, self.get(pillar)))
    }
}

#[derive(Deserialize)]
struct RawPillarScores {
    project_impact: i64,
    direction: i64,
    engineering_excellence: i64,
    operational_ownership: i64,
    people_impact: i64,
}

impl TryFrom<RawPillarScores> for PillarScores {
    type Error = PillarError;

    fn try_from(raw: RawPillarScores) -> Result<Self, Self::Error> {
        Self::from_values([
            raw.project_impact,
            raw.direction,
            raw.engineering_excellence,
            raw.operational_ownership,
            raw.people_impact,
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PillarError {
    #[error("{} score {value} is outside 0..=4", .pillar.label())]
    OutOfRange { pillar: Pillar, value: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        let scores = PillarScores::new(0, 4, 0, 4, 2).expect("bounds are valid");
        assert_eq!(scores.direction(), 4);
        assert_eq!(scores.get(Pillar::PeopleImpact), 2);
    }

    #[test]
    fn rejects_value_above_four() {
        match PillarScores::new(1, 1, 5, 1, 1) {
            Err(PillarError::OutOfRange { pillar, value }) => {
                assert_eq!(pillar, Pillar::EngineeringExcellence);
                assert_eq!(value, 5);
            }
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_values_from_wide_input() {
        let err = PillarScores::from_values([1, -1, 1, 1, 1]).expect_err("negative rejected");
        assert_eq!(
            err,
            PillarError::OutOfRange {
                pillar: Pillar::Direction,
                value: -1
            }
        );
    }

    #[test]
    fn deserialization_validates_range() {
        let ok: PillarScores = serde_json::from_str(
            r#"{"project_impact":3,"direction":2,"engineering_excellence":4,"operational_ownership":3,"people_impact":2}"#,
        )
        .expect("valid payload");
        assert_eq!(ok.engineering_excellence(), 4);

        let bad = serde_json::from_str::<PillarScores>(
            r#"{"project_impact":3,"direction":2,"engineering_excellence":7,"operational_ownership":3,"people_impact":2}"#,
        );
        assert!(bad.is_err());

        let fractional = serde_json::from_str::<PillarScores>(
            r#"{"project_impact":3.5,"direction":2,"engineering_excellence":1,"operational_ownership":3,"people_impact":2}"#,
        );
        assert!(fractional.is_err(), "non-integer pillars are rejected");
    }

    #[test]
    fn iter_follows_pillar_order() {
        let scores = PillarScores::new(3, 2, 4, 3, 2).expect("valid");
        let values: Vec<u8> = scores.iter().map(|(_, value)| value).collect();
        assert_eq!(values, vec![3, 2, 4, 3, 2]);
    }
}
