//! `aptitude-engine`
//!
//! **Responsibility:** the adaptive aptitude scoring engine.
//!
//! Every operation here is a pure function of its inputs and the
//! [`AdaptiveTestConfig`]: no IO, no hidden state, safe to call from any number of
//! concurrent sessions. The caller owns each session's responses and difficulty
//! path and threads them through.
//!
//! Evaluation order within a session:
//! 1. [`classify_tier`] once, at the end of the diagnostic screener.
//! 2. [`adjust_difficulty`] after every answered question.
//! 3. [`check_stop_conditions`] after every adaptive-core answer; it runs the path
//!    analysis and, when stopping, [`determine_confidence_tag`].

pub mod adjuster;
pub mod analytics;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod path;
pub mod planner;
pub mod stop;
pub mod types;

pub use adjuster::{adjust_difficulty, DifficultyAdjustment, DifficultyChange};
pub use analytics::{accuracy_by_difficulty, accuracy_by_subtag, summarize_results, AccuracyBreakdown, TestResults};
pub use classifier::{classify_tier, TierClassification};
pub use config::{AdaptiveTestConfig, PhaseConfig, PhasesConfig, TierStartingDifficulty};
pub use engine::AdaptiveEngine;
pub use path::{
    check_last_items_consistency, classify_path, count_direction_changes, provisional_band, PathClassification,
};
pub use planner::{plan_stability_confirmation, ItemSpec};
pub use stop::{check_stop_conditions, determine_confidence_tag, ConfidenceAssessment, StopConditionResult, StopReason};
pub use types::{ConfidenceTag, DifficultyLevel, GradeLevel, Response, Subtag, TestPhase, Tier};
