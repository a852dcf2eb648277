//! Value types the engine scores over.

use serde::{Deserialize, Serialize};

use aptitude_core::{DomainError, DomainResult, ValueObject};

/// Item difficulty in the closed range `1..=5` (5 hardest).
///
/// The only constructors are range-checked, so a `DifficultyLevel` held by the
/// engine is always in range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyLevel(u8);

impl DifficultyLevel {
    pub const MIN: DifficultyLevel = DifficultyLevel(1);
    pub const MAX: DifficultyLevel = DifficultyLevel(5);

    /// All levels, easiest first.
    pub const ALL: [DifficultyLevel; 5] = [
        DifficultyLevel(1),
        DifficultyLevel(2),
        DifficultyLevel(3),
        DifficultyLevel(4),
        DifficultyLevel(5),
    ];

    pub fn new(value: u8) -> DomainResult<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::validation(format!(
                "difficulty level must be within 1..=5 (got {value})"
            )))
        }
    }

    /// Clamp an arbitrary integer into `1..=5`.
    pub fn clamped(value: i32) -> Self {
        Self(value.clamp(Self::MIN.0 as i32, Self::MAX.0 as i32) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// One level harder, saturating at 5.
    pub fn step_up(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX.0))
    }

    /// One level easier, saturating at 1.
    pub fn step_down(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN.0))
    }
}

impl ValueObject for DifficultyLevel {}

impl TryFrom<u8> for DifficultyLevel {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DifficultyLevel> for u8 {
    fn from(value: DifficultyLevel) -> Self {
        value.0
    }
}

impl core::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Coarse ability bucket decided by the screener.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Low.
    L,
    /// Medium.
    M,
    /// High.
    H,
}

/// Test phase that produced a response.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    DiagnosticScreener,
    AdaptiveCore,
    StabilityConfirmation,
}

impl TestPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            TestPhase::DiagnosticScreener => "diagnostic_screener",
            TestPhase::AdaptiveCore => "adaptive_core",
            TestPhase::StabilityConfirmation => "stability_confirmation",
        }
    }
}

/// Reliability of the final ability estimate.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTag {
    High,
    Medium,
    Low,
}

/// Reasoning area a question exercises.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subtag {
    NumericalReasoning,
    LogicalReasoning,
    VerbalReasoning,
    SpatialReasoning,
    DataInterpretation,
    PatternRecognition,
}

impl Subtag {
    pub const ALL: [Subtag; 6] = [
        Subtag::NumericalReasoning,
        Subtag::LogicalReasoning,
        Subtag::VerbalReasoning,
        Subtag::SpatialReasoning,
        Subtag::DataInterpretation,
        Subtag::PatternRecognition,
    ];

    /// Subtags presented as data (charts, sequences).
    pub const DATA_FORMATS: [Subtag; 2] = [Subtag::DataInterpretation, Subtag::PatternRecognition];

    /// Subtags presented as reasoning prompts.
    pub const LOGIC_FORMATS: [Subtag; 4] = [
        Subtag::LogicalReasoning,
        Subtag::NumericalReasoning,
        Subtag::VerbalReasoning,
        Subtag::SpatialReasoning,
    ];
}

/// Student grade band; opaque to scoring, carried for reporting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeLevel {
    MiddleSchool,
    HighSchool,
    HigherSecondary,
}

/// One answered question.
///
/// Created by the host when a student answers; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub question_id: String,
    pub phase: TestPhase,
    pub is_correct: bool,
    pub difficulty_at_time: DifficultyLevel,
    pub subtag: Subtag,
}

impl Response {
    pub fn new(
        question_id: impl Into<String>,
        phase: TestPhase,
        is_correct: bool,
        difficulty_at_time: DifficultyLevel,
        subtag: Subtag,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            phase,
            is_correct,
            difficulty_at_time,
            subtag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_rejects_values_outside_one_to_five() {
        assert!(DifficultyLevel::new(0).is_err());
        assert!(DifficultyLevel::new(6).is_err());
        assert_eq!(DifficultyLevel::new(3).unwrap().get(), 3);
    }

    #[test]
    fn difficulty_steps_saturate_at_the_bounds() {
        assert_eq!(DifficultyLevel::MAX.step_up(), DifficultyLevel::MAX);
        assert_eq!(DifficultyLevel::MIN.step_down(), DifficultyLevel::MIN);
        assert_eq!(DifficultyLevel::clamped(-4), DifficultyLevel::MIN);
        assert_eq!(DifficultyLevel::clamped(9), DifficultyLevel::MAX);
    }

    #[test]
    fn out_of_range_difficulty_fails_to_deserialize() {
        assert!(serde_json::from_str::<DifficultyLevel>("7").is_err());
        let d: DifficultyLevel = serde_json::from_str("4").unwrap();
        assert_eq!(d.get(), 4);
    }

    #[test]
    fn response_uses_camel_case_wire_names() {
        let r = Response::new(
            "q-1",
            TestPhase::DiagnosticScreener,
            true,
            DifficultyLevel::new(2).unwrap(),
            Subtag::PatternRecognition,
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["phase"], "diagnostic_screener");
        assert_eq!(json["isCorrect"], true);
        assert_eq!(json["difficultyAtTime"], 2);
        assert_eq!(json["subtag"], "pattern_recognition");
    }
}
