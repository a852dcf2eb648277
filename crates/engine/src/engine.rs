//! Engine facade: the scoring operations bound to one validated config.

use rand::Rng;

use aptitude_core::DomainResult;

use crate::adjuster::{self, DifficultyAdjustment};
use crate::analytics::{self, TestResults};
use crate::classifier::{self, TierClassification};
use crate::config::AdaptiveTestConfig;
use crate::path;
use crate::planner::{self, ItemSpec};
use crate::stop::{self, ConfidenceAssessment, StopConditionResult};
use crate::types::{DifficultyLevel, Response, Tier};

/// Engine bound to one validated configuration.
///
/// Holds no per-session state; cloning it or sharing it across threads is free of
/// coordination. Methods delegate to the free functions of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdaptiveEngine {
    config: AdaptiveTestConfig,
}

impl AdaptiveEngine {
    pub fn new(config: AdaptiveTestConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AdaptiveTestConfig {
        &self.config
    }

    pub fn classify_tier(&self, responses: &[Response]) -> TierClassification {
        classifier::classify_tier(responses, &self.config)
    }

    pub fn adjust_difficulty(&self, current: DifficultyLevel, is_correct: bool) -> DifficultyAdjustment {
        adjuster::adjust_difficulty(current, is_correct)
    }

    pub fn count_direction_changes(&self, path: &[DifficultyLevel]) -> usize {
        path::count_direction_changes(path)
    }

    /// Consistency over the configured window.
    pub fn check_last_items_consistency(&self, path: &[DifficultyLevel]) -> bool {
        path::check_last_items_consistency(path, self.config.consistency_window_size)
    }

    pub fn determine_confidence_tag(&self, path: &[DifficultyLevel], responses: &[Response]) -> ConfidenceAssessment {
        stop::determine_confidence_tag(path, responses, &self.config)
    }

    pub fn check_stop_conditions(
        &self,
        total_questions_answered: usize,
        path: &[DifficultyLevel],
        responses: &[Response],
    ) -> StopConditionResult {
        stop::check_stop_conditions(total_questions_answered, path, responses, &self.config)
    }

    /// Plan the configured number of stability items around `band`.
    pub fn plan_stability_confirmation<R: Rng + ?Sized>(&self, band: DifficultyLevel, rng: &mut R) -> Vec<ItemSpec> {
        planner::plan_stability_confirmation(band, self.config.stability_item_count, &self.config, rng)
    }

    pub fn summarize_results(&self, responses: &[Response], path: &[DifficultyLevel], tier: Option<Tier>) -> TestResults {
        analytics::summarize_results(responses, path, tier, &self.config)
    }
}
