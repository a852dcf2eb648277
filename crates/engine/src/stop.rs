//! Stop-condition and confidence evaluation.

use serde::{Deserialize, Serialize};

use crate::config::AdaptiveTestConfig;
use crate::path::{check_last_items_consistency, count_direction_changes, trailing_mode, trailing_window_is_stable};
use crate::types::{ConfidenceTag, DifficultyLevel, Response};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceAssessment {
    pub confidence_tag: ConfidenceTag,
    pub direction_changes: usize,
    pub is_stable: bool,
    pub reason: String,
}

/// Tag how reliable the final estimate is from the shape of the path.
///
/// First match wins: few reversals with a stable tail is `High`, a moderate
/// number of reversals is `Medium`, anything else is `Low`.
///
/// `responses` is accepted for accuracy-weighted confidence and not read yet.
pub fn determine_confidence_tag(
    path: &[DifficultyLevel],
    _responses: &[Response],
    config: &AdaptiveTestConfig,
) -> ConfidenceAssessment {
    let direction_changes = count_direction_changes(path);
    let is_stable = check_last_items_consistency(path, config.consistency_window_size);

    let (confidence_tag, reason) = if direction_changes <= config.max_direction_changes_for_high_confidence && is_stable {
        (
            ConfidenceTag::High,
            "Few direction changes and stable final difficulty".to_string(),
        )
    } else if direction_changes <= config.max_direction_changes_for_medium_confidence {
        (
            ConfidenceTag::Medium,
            "Moderate direction changes or unstable final difficulty".to_string(),
        )
    } else {
        (
            ConfidenceTag::Low,
            format!("High number of direction changes ({direction_changes}) indicates inconsistent performance"),
        )
    };

    ConfidenceAssessment {
        confidence_tag,
        direction_changes,
        is_stable,
        reason,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Total answered reached the sum of all phase caps.
    MaximumReached,
    /// Minimum met, tail consistent, and difficulty confirmed stable.
    StabilityAchieved,
    /// Minimum met and tail consistent.
    MinimumReached,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopConditionResult {
    pub should_stop: bool,
    pub reason: Option<StopReason>,
    pub minimum_questions_completed: bool,
    pub last_items_consistent: bool,
    pub difficulty_stable: bool,
    /// Diagnostic only; not part of the decision.
    pub direction_changes: usize,
    pub suggested_aptitude_level: Option<DifficultyLevel>,
    pub suggested_confidence_tag: Option<ConfidenceTag>,
}

/// Decide whether the test should end after `total_questions_answered` answers.
///
/// Reasons are checked in priority order: the hard maximum, then full stability,
/// then the weaker minimum-plus-consistency gate. When stopping with at least a
/// full window of path, the suggested level is the mode of that window and the
/// confidence tag comes from [`determine_confidence_tag`].
pub fn check_stop_conditions(
    total_questions_answered: usize,
    path: &[DifficultyLevel],
    responses: &[Response],
    config: &AdaptiveTestConfig,
) -> StopConditionResult {
    let window = config.consistency_window_size;

    let minimum_questions_completed = total_questions_answered >= config.minimum_questions_for_stop;
    let last_items_consistent = check_last_items_consistency(path, window);
    let difficulty_stable = trailing_window_is_stable(path, window);
    let direction_changes = count_direction_changes(path);

    let reason = if total_questions_answered >= config.max_total_questions() {
        Some(StopReason::MaximumReached)
    } else if minimum_questions_completed && last_items_consistent && difficulty_stable {
        Some(StopReason::StabilityAchieved)
    } else if minimum_questions_completed && last_items_consistent {
        Some(StopReason::MinimumReached)
    } else {
        None
    };
    let should_stop = reason.is_some();

    let (suggested_aptitude_level, suggested_confidence_tag) = if should_stop && path.len() >= window {
        let level = trailing_mode(path, window).or_else(|| path.last().copied());
        let tag = determine_confidence_tag(path, responses, config).confidence_tag;
        (level, Some(tag))
    } else {
        (None, None)
    };

    if should_stop {
        tracing::info!(
            total_questions_answered,
            ?reason,
            direction_changes,
            suggested_aptitude_level = suggested_aptitude_level.map(DifficultyLevel::get),
            ?suggested_confidence_tag,
            "stop condition met"
        );
    } else {
        tracing::debug!(
            total_questions_answered,
            minimum_questions_completed,
            last_items_consistent,
            "continuing adaptive test"
        );
    }

    StopConditionResult {
        should_stop,
        reason,
        minimum_questions_completed,
        last_items_consistent,
        difficulty_stable,
        direction_changes,
        suggested_aptitude_level,
        suggested_confidence_tag,
    }
}
