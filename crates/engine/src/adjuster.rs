//! Difficulty adjustment: a bounded ±1 walk over `1..=5`.

use serde::{Deserialize, Serialize};

use crate::types::DifficultyLevel;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyChange {
    Increased,
    Decreased,
    Unchanged,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAdjustment {
    pub previous_difficulty: DifficultyLevel,
    pub new_difficulty: DifficultyLevel,
    pub change: DifficultyChange,
}

/// Next difficulty after an answer: one up on correct, one down on incorrect.
///
/// At the ceiling (5) or floor (1) the level stays put and the change is
/// `Unchanged`; the walk keeps going from there on later answers.
pub fn adjust_difficulty(current: DifficultyLevel, is_correct: bool) -> DifficultyAdjustment {
    let new_difficulty = if is_correct {
        current.step_up()
    } else {
        current.step_down()
    };

    let change = match new_difficulty.cmp(&current) {
        core::cmp::Ordering::Greater => DifficultyChange::Increased,
        core::cmp::Ordering::Less => DifficultyChange::Decreased,
        core::cmp::Ordering::Equal => DifficultyChange::Unchanged,
    };

    DifficultyAdjustment {
        previous_difficulty: current,
        new_difficulty,
        change,
    }
}
