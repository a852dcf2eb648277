//! Adaptive test configuration.
//!
//! One explicit value passed to the engine; the JSON shape matches the
//! camelCase `DEFAULT_ADAPTIVE_TEST_CONFIG` object hosts already store.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use aptitude_core::{DomainError, DomainResult};

use crate::types::{DifficultyLevel, TestPhase, Tier};

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "APTITUDE_CONFIG";

/// Starting difficulty of the adaptive core for each tier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierStartingDifficulty {
    #[serde(rename = "L")]
    pub low: DifficultyLevel,
    #[serde(rename = "M")]
    pub medium: DifficultyLevel,
    #[serde(rename = "H")]
    pub high: DifficultyLevel,
}

impl TierStartingDifficulty {
    pub fn for_tier(&self, tier: Tier) -> DifficultyLevel {
        match tier {
            Tier::L => self.low,
            Tier::M => self.medium,
            Tier::H => self.high,
        }
    }
}

impl Default for TierStartingDifficulty {
    fn default() -> Self {
        Self {
            low: DifficultyLevel::ALL[1],
            medium: DifficultyLevel::ALL[2],
            high: DifficultyLevel::ALL[3],
        }
    }
}

/// Question bounds for one phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseConfig {
    /// For the screener, the number of items administered before classification.
    pub min_questions: usize,
    pub max_questions: usize,
    pub max_consecutive_same_subtag: usize,
}

impl PhaseConfig {
    pub const fn new(min_questions: usize, max_questions: usize, max_consecutive_same_subtag: usize) -> Self {
        Self {
            min_questions,
            max_questions,
            max_consecutive_same_subtag,
        }
    }

    /// Clamp a requested item count into `[min_questions, max_questions]`.
    pub fn clamp_count(&self, requested: usize) -> usize {
        requested.max(self.min_questions).min(self.max_questions)
    }
}

/// Per-phase bounds.
///
/// Deserializes field by field over the defaults, so `{ "adaptive_core": { "maxQuestions": 20 } }`
/// changes only that one bound.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PhasesOverride")]
pub struct PhasesConfig {
    pub diagnostic_screener: PhaseConfig,
    pub adaptive_core: PhaseConfig,
    pub stability_confirmation: PhaseConfig,
}

impl PhasesConfig {
    pub fn get(&self, phase: TestPhase) -> &PhaseConfig {
        match phase {
            TestPhase::DiagnosticScreener => &self.diagnostic_screener,
            TestPhase::AdaptiveCore => &self.adaptive_core,
            TestPhase::StabilityConfirmation => &self.stability_confirmation,
        }
    }
}

impl Default for PhasesConfig {
    fn default() -> Self {
        Self {
            diagnostic_screener: PhaseConfig::new(6, 8, 2),
            adaptive_core: PhaseConfig::new(8, 36, 2),
            stability_confirmation: PhaseConfig::new(4, 6, 2),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhaseOverride {
    min_questions: Option<usize>,
    max_questions: Option<usize>,
    max_consecutive_same_subtag: Option<usize>,
}

impl PhaseOverride {
    fn over(self, base: PhaseConfig) -> PhaseConfig {
        PhaseConfig {
            min_questions: self.min_questions.unwrap_or(base.min_questions),
            max_questions: self.max_questions.unwrap_or(base.max_questions),
            max_consecutive_same_subtag: self
                .max_consecutive_same_subtag
                .unwrap_or(base.max_consecutive_same_subtag),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct PhasesOverride {
    diagnostic_screener: Option<PhaseOverride>,
    adaptive_core: Option<PhaseOverride>,
    stability_confirmation: Option<PhaseOverride>,
}

impl From<PhasesOverride> for PhasesConfig {
    fn from(raw: PhasesOverride) -> Self {
        let base = PhasesConfig::default();
        Self {
            diagnostic_screener: raw.diagnostic_screener.unwrap_or_default().over(base.diagnostic_screener),
            adaptive_core: raw.adaptive_core.unwrap_or_default().over(base.adaptive_core),
            stability_confirmation: raw
                .stability_confirmation
                .unwrap_or_default()
                .over(base.stability_confirmation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveTestConfig {
    pub tier_starting_difficulty: TierStartingDifficulty,
    pub screener_starting_difficulty: DifficultyLevel,
    pub consistency_window_size: usize,
    pub minimum_questions_for_stop: usize,
    pub max_direction_changes_for_high_confidence: usize,
    pub max_direction_changes_for_medium_confidence: usize,
    /// Requested stability-confirmation items; clamped to that phase's bounds.
    pub stability_item_count: usize,
    pub phases: PhasesConfig,
}

impl Default for AdaptiveTestConfig {
    fn default() -> Self {
        Self {
            tier_starting_difficulty: TierStartingDifficulty::default(),
            screener_starting_difficulty: DifficultyLevel::MIN,
            consistency_window_size: 5,
            minimum_questions_for_stop: 16,
            max_direction_changes_for_high_confidence: 2,
            max_direction_changes_for_medium_confidence: 4,
            stability_item_count: 5,
            phases: PhasesConfig::default(),
        }
    }
}

impl AdaptiveTestConfig {
    /// Hard ceiling on answered questions: the sum of every phase's cap.
    pub fn max_total_questions(&self) -> usize {
        self.phases.diagnostic_screener.max_questions
            + self.phases.adaptive_core.max_questions
            + self.phases.stability_confirmation.max_questions
    }

    /// Planned stability-confirmation length.
    pub fn stability_items(&self) -> usize {
        self.phases
            .stability_confirmation
            .clamp_count(self.stability_item_count)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.consistency_window_size == 0 {
            return Err(DomainError::validation("consistencyWindowSize must be >= 1"));
        }

        if self.max_direction_changes_for_medium_confidence < self.max_direction_changes_for_high_confidence {
            return Err(DomainError::validation(
                "maxDirectionChangesForMediumConfidence must be >= maxDirectionChangesForHighConfidence",
            ));
        }

        for phase in [
            TestPhase::DiagnosticScreener,
            TestPhase::AdaptiveCore,
            TestPhase::StabilityConfirmation,
        ] {
            let p = self.phases.get(phase);
            if p.max_questions == 0 {
                return Err(DomainError::validation(format!(
                    "{}.maxQuestions must be >= 1",
                    phase.as_str()
                )));
            }
            if p.min_questions > p.max_questions {
                return Err(DomainError::validation(format!(
                    "{}.minQuestions ({}) exceeds maxQuestions ({})",
                    phase.as_str(),
                    p.min_questions,
                    p.max_questions
                )));
            }
        }

        if self.phases.diagnostic_screener.min_questions == 0 {
            return Err(DomainError::validation(
                "diagnostic_screener.minQuestions must be >= 1",
            ));
        }

        if self.stability_items() == 0 {
            return Err(DomainError::validation(
                "stabilityItemCount clamped to stability_confirmation bounds must be >= 1",
            ));
        }

        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// Missing fields take their defaults at every level, including inside
    /// `tierStartingDifficulty` and each phase.
    pub fn from_json_str(json: &str) -> DomainResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("invalid adaptive test config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read adaptive test config {}", path.display()))?;
        let config = Self::from_json_str(&raw)
            .with_context(|| format!("failed to load adaptive test config {}", path.display()))?;
        Ok(config)
    }

    /// Load from the file named by `APTITUDE_CONFIG`, or fall back to defaults.
    pub fn from_env_or_default() -> anyhow::Result<Self> {
        Self::from_env_value(std::env::var(CONFIG_ENV_VAR).ok())
    }

    /// Resolve an already-read `APTITUDE_CONFIG` value.
    pub fn from_env_value(path: Option<String>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::warn!("{CONFIG_ENV_VAR} not set; using default adaptive test config");
                Ok(Self::default())
            }
        }
    }
}
