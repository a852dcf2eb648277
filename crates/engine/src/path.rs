//! Statistics over the difficulty path (the ordered difficulty history of a session).

use serde::{Deserialize, Serialize};

use crate::types::DifficultyLevel;

/// Largest max-min spread a trailing window may have and still count as stable.
pub const STABLE_SPREAD: u8 = 1;

/// Window used for the provisional ability band during the adaptive core.
pub const PROVISIONAL_BAND_WINDOW: usize = 3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Same,
}

fn direction(from: DifficultyLevel, to: DifficultyLevel) -> Direction {
    match to.cmp(&from) {
        core::cmp::Ordering::Greater => Direction::Up,
        core::cmp::Ordering::Less => Direction::Down,
        core::cmp::Ordering::Equal => Direction::Same,
    }
}

/// Number of reversals between rising and falling difficulty.
///
/// Flat steps are transparent: they neither count nor reset the remembered
/// direction. The first non-flat step only sets the baseline.
pub fn count_direction_changes(path: &[DifficultyLevel]) -> usize {
    if path.len() < 3 {
        return 0;
    }

    let mut changes = 0;
    let mut last: Option<Direction> = None;

    for pair in path.windows(2) {
        let dir = direction(pair[0], pair[1]);
        if dir == Direction::Same {
            continue;
        }
        if last.is_some_and(|prev| prev != dir) {
            changes += 1;
        }
        last = Some(dir);
    }

    changes
}

/// The last `window` entries, or `None` when the path is shorter than that.
pub fn trailing_window(path: &[DifficultyLevel], window: usize) -> Option<&[DifficultyLevel]> {
    if path.len() < window {
        return None;
    }
    Some(&path[path.len() - window..])
}

fn spread(levels: &[DifficultyLevel]) -> u8 {
    let max = levels.iter().max().map_or(0, |d| d.get());
    let min = levels.iter().min().map_or(0, |d| d.get());
    max - min
}

/// Shared stability test: the trailing window exists, is non-empty, and its
/// spread is at most 1.
///
/// Both the consistency check and the stop evaluator's separate
/// `difficulty_stable` flag go through here so they cannot drift apart.
pub(crate) fn trailing_window_is_stable(path: &[DifficultyLevel], window: usize) -> bool {
    window > 0 && trailing_window(path, window).is_some_and(|w| spread(w) <= STABLE_SPREAD)
}

/// `true` iff the last `window_size` entries span at most one level.
///
/// Returns `false` until the path holds at least `window_size` entries, and
/// always for a zero-width window.
pub fn check_last_items_consistency(path: &[DifficultyLevel], window_size: usize) -> bool {
    trailing_window_is_stable(path, window_size)
}

/// Most frequent level in `levels`.
///
/// Ties go to the value whose first occurrence comes earliest: candidates are
/// scanned in first-occurrence order and only a strictly greater count replaces
/// the current pick.
pub fn mode(levels: &[DifficultyLevel]) -> Option<DifficultyLevel> {
    let mut counts: Vec<(DifficultyLevel, usize)> = Vec::with_capacity(DifficultyLevel::ALL.len());
    for &d in levels {
        match counts.iter_mut().find(|(v, _)| *v == d) {
            Some((_, c)) => *c += 1,
            None => counts.push((d, 1)),
        }
    }

    let mut best: Option<(DifficultyLevel, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Mode of the trailing `window` entries; `None` while the path is shorter.
pub fn trailing_mode(path: &[DifficultyLevel], window: usize) -> Option<DifficultyLevel> {
    trailing_window(path, window).and_then(mode)
}

/// Provisional ability band: mode of the last three path entries.
pub fn provisional_band(path: &[DifficultyLevel]) -> Option<DifficultyLevel> {
    trailing_mode(path, PROVISIONAL_BAND_WINDOW)
}

/// Overall shape of a difficulty path.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathClassification {
    Ascending,
    Descending,
    Stable,
    Fluctuating,
}

/// Share of steps a movement needs to dominate the path.
const DOMINANT_RATIO: f64 = 0.6;

/// Classify the path by its dominant step direction.
///
/// Flat steps are checked first, then rising, then falling; a path where none
/// reaches 60% of the steps is `Fluctuating`.
pub fn classify_path(path: &[DifficultyLevel]) -> PathClassification {
    if path.len() < 2 {
        return PathClassification::Stable;
    }

    let (mut up, mut down, mut same) = (0usize, 0usize, 0usize);
    for pair in path.windows(2) {
        match direction(pair[0], pair[1]) {
            Direction::Up => up += 1,
            Direction::Down => down += 1,
            Direction::Same => same += 1,
        }
    }

    let steps = (path.len() - 1) as f64;
    let ratio = |n: usize| n as f64 / steps;

    if ratio(same) >= DOMINANT_RATIO {
        PathClassification::Stable
    } else if ratio(up) >= DOMINANT_RATIO {
        PathClassification::Ascending
    } else if ratio(down) >= DOMINANT_RATIO {
        PathClassification::Descending
    } else {
        PathClassification::Fluctuating
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn path(levels: &[u8]) -> Vec<DifficultyLevel> {
        levels
            .iter()
            .map(|&v| DifficultyLevel::new(v).unwrap())
            .collect()
    }

    #[test]
    fn direction_change_examples() {
        assert_eq!(count_direction_changes(&path(&[2, 3, 4])), 0);
        assert_eq!(count_direction_changes(&path(&[2, 3, 2, 3, 2])), 3);
        assert_eq!(count_direction_changes(&path(&[2, 2, 2])), 0);
        assert_eq!(count_direction_changes(&path(&[1, 2])), 0);
        assert_eq!(count_direction_changes(&[]), 0);
    }

    #[test]
    fn flat_steps_do_not_reset_direction_memory() {
        // up, same, same, up: still one direction.
        assert_eq!(count_direction_changes(&path(&[2, 3, 3, 3, 4])), 0);
        // up, same, down: the flat step is transparent, so this is one reversal.
        assert_eq!(count_direction_changes(&path(&[2, 3, 3, 2])), 1);
        // leading flats before the baseline.
        assert_eq!(count_direction_changes(&path(&[3, 3, 3, 4, 3])), 1);
    }

    #[test]
    fn consistency_window_examples() {
        assert!(check_last_items_consistency(&path(&[3, 3, 4, 3, 4]), 5));
        assert!(!check_last_items_consistency(&path(&[1, 5, 2, 4, 3]), 5));
        assert!(!check_last_items_consistency(&path(&[1, 2]), 5));
    }

    #[test]
    fn zero_width_window_is_never_consistent() {
        assert!(!check_last_items_consistency(&path(&[3, 3, 3]), 0));
        assert!(!check_last_items_consistency(&[], 0));
        assert!(check_last_items_consistency(&path(&[3, 3, 3]), 1));
    }

    #[test]
    fn consistency_only_looks_at_the_tail() {
        assert!(check_last_items_consistency(&path(&[1, 5, 1, 4, 4, 3, 4, 4]), 5));
        assert!(!check_last_items_consistency(&path(&[3, 3, 3, 3, 3, 5]), 5));
    }

    #[test]
    fn mode_tie_goes_to_first_occurrence() {
        assert_eq!(mode(&path(&[3, 4, 3, 4, 3])), Some(path(&[3])[0]));
        assert_eq!(mode(&path(&[4, 3, 3, 4])), Some(path(&[4])[0]));
        assert_eq!(mode(&path(&[2, 5, 5, 1, 1])), Some(path(&[5])[0]));
        assert_eq!(mode(&[]), None);
    }

    #[test]
    fn provisional_band_needs_three_entries() {
        assert_eq!(provisional_band(&path(&[3, 4])), None);
        assert_eq!(provisional_band(&path(&[1, 1, 4, 5, 4])), Some(path(&[4])[0]));
        assert_eq!(provisional_band(&path(&[2, 3, 4])), Some(path(&[2])[0]));
    }

    #[test]
    fn path_classification_by_dominant_step() {
        assert_eq!(classify_path(&path(&[3])), PathClassification::Stable);
        assert_eq!(classify_path(&path(&[3, 3, 3, 4])), PathClassification::Stable);
        assert_eq!(classify_path(&path(&[1, 2, 3, 4, 4])), PathClassification::Ascending);
        assert_eq!(classify_path(&path(&[5, 4, 3, 3])), PathClassification::Descending);
        assert_eq!(classify_path(&path(&[2, 3, 2, 3, 2])), PathClassification::Fluctuating);
    }

    fn arb_path() -> impl Strategy<Value = Vec<DifficultyLevel>> {
        prop::collection::vec(1u8..=5, 0..40).prop_map(|v| path(&v))
    }

    proptest! {
        /// Property: a path of n entries has at most n-2 reversals.
        #[test]
        fn direction_changes_bounded_by_steps(p in arb_path()) {
            let changes = count_direction_changes(&p);
            prop_assert!(changes <= p.len().saturating_sub(2));
        }

        /// Property: consistency is decided by the tail alone.
        #[test]
        fn consistency_ignores_prefix(prefix in arb_path(), tail in prop::collection::vec(1u8..=5, 5)) {
            let tail = path(&tail);
            let mut full = prefix.clone();
            full.extend_from_slice(&tail);
            prop_assert_eq!(
                check_last_items_consistency(&full, 5),
                check_last_items_consistency(&tail, 5)
            );
        }

        /// Property: pure functions, same answer twice.
        #[test]
        fn path_statistics_are_idempotent(p in arb_path()) {
            prop_assert_eq!(count_direction_changes(&p), count_direction_changes(&p));
            prop_assert_eq!(check_last_items_consistency(&p, 5), check_last_items_consistency(&p, 5));
            prop_assert_eq!(trailing_mode(&p, 5), trailing_mode(&p, 5));
        }

        /// Property: the mode is an element of the window with maximal count.
        #[test]
        fn mode_has_maximal_count(p in arb_path()) {
            if let Some(m) = mode(&p) {
                let count = |d: DifficultyLevel| p.iter().filter(|&&x| x == d).count();
                prop_assert!(p.iter().all(|&d| count(d) <= count(m)));
            } else {
                prop_assert!(p.is_empty());
            }
        }
    }
}
