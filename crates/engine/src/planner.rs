//! Stability-confirmation planning: which difficulties and subtags to present
//! once the adaptive core has settled on a provisional band.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::AdaptiveTestConfig;
use crate::types::{DifficultyLevel, Subtag};

/// One planned item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub difficulty: DifficultyLevel,
    pub subtag: Subtag,
}

/// Difficulties within ±1 of `band`.
///
/// The first item sits on the band; the second probes the lower boundary and the
/// third the upper boundary when those differ from the band. Remaining items are
/// drawn from the distinct values of {lower, band, upper}.
pub fn plan_stability_difficulties<R: Rng + ?Sized>(
    band: DifficultyLevel,
    count: usize,
    rng: &mut R,
) -> Vec<DifficultyLevel> {
    let lower = band.step_down();
    let upper = band.step_up();

    let mut range = vec![lower];
    if band != lower {
        range.push(band);
    }
    if upper != band {
        range.push(upper);
    }

    (0..count)
        .map(|i| match i {
            0 => band,
            1 if lower < band => lower,
            2 if upper > band => upper,
            _ => range.choose(rng).copied().unwrap_or(band),
        })
        .collect()
}

/// Length of the identical-subtag run at the end of `sequence`, capped at `limit`.
fn trailing_run(sequence: &[Subtag], limit: usize) -> Option<(Subtag, usize)> {
    let last = *sequence.last()?;
    let run = sequence
        .iter()
        .rev()
        .take(limit)
        .take_while(|&&s| s == last)
        .count();
    Some((last, run))
}

/// Subtags alternating between data-format and logic-format pools.
///
/// Never produces more than `max_consecutive` identical subtags in a row (for
/// `max_consecutive >= 1`).
pub fn plan_mixed_format_subtags<R: Rng + ?Sized>(
    count: usize,
    max_consecutive: usize,
    rng: &mut R,
) -> Vec<Subtag> {
    let mut sequence: Vec<Subtag> = Vec::with_capacity(count);
    let mut use_data_format = true;

    for _ in 0..count {
        let (pool, other_pool): (&[Subtag], &[Subtag]) = if use_data_format {
            (&Subtag::DATA_FORMATS[..], &Subtag::LOGIC_FORMATS[..])
        } else {
            (&Subtag::LOGIC_FORMATS[..], &Subtag::DATA_FORMATS[..])
        };

        let selected = match trailing_run(&sequence, max_consecutive) {
            Some((last, run)) if run >= max_consecutive => {
                let available: Vec<Subtag> = pool.iter().copied().filter(|&s| s != last).collect();
                match available.choose(rng) {
                    Some(&s) => s,
                    None => other_pool.choose(rng).copied().unwrap_or(pool[0]),
                }
            }
            _ => pool.choose(rng).copied().unwrap_or(Subtag::ALL[0]),
        };

        sequence.push(selected);
        use_data_format = !use_data_format;
    }

    sequence
}

/// Full stability-confirmation plan around `band`.
///
/// `requested` is clamped to the stability phase's question bounds.
pub fn plan_stability_confirmation<R: Rng + ?Sized>(
    band: DifficultyLevel,
    requested: usize,
    config: &AdaptiveTestConfig,
    rng: &mut R,
) -> Vec<ItemSpec> {
    let phase = &config.phases.stability_confirmation;
    let count = phase.clamp_count(requested);

    let difficulties = plan_stability_difficulties(band, count, rng);
    let subtags = plan_mixed_format_subtags(count, phase.max_consecutive_same_subtag, rng);

    tracing::debug!(band = band.get(), requested, count, "planned stability confirmation");

    difficulties
        .into_iter()
        .zip(subtags)
        .map(|(difficulty, subtag)| ItemSpec { difficulty, subtag })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn level(v: u8) -> DifficultyLevel {
        DifficultyLevel::new(v).unwrap()
    }

    #[test]
    fn first_three_items_probe_band_and_both_boundaries() {
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_stability_difficulties(level(3), 5, &mut rng);
        assert_eq!(&plan[..3], &[level(3), level(2), level(4)]);
        assert!(plan.iter().all(|d| (2..=4).contains(&d.get())));
    }

    #[test]
    fn band_at_floor_has_no_lower_probe() {
        let mut rng = StdRng::seed_from_u64(11);
        let plan = plan_stability_difficulties(level(1), 4, &mut rng);
        assert_eq!(plan[0], level(1));
        assert_eq!(plan[2], level(2));
        assert!(plan.iter().all(|d| d.get() <= 2));
    }

    #[test]
    fn plan_length_is_clamped_to_phase_bounds() {
        let config = AdaptiveTestConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(plan_stability_confirmation(level(3), 1, &config, &mut rng).len(), 4);
        assert_eq!(plan_stability_confirmation(level(3), 5, &config, &mut rng).len(), 5);
        assert_eq!(plan_stability_confirmation(level(3), 40, &config, &mut rng).len(), 6);
    }

    #[test]
    fn subtags_alternate_between_data_and_logic_formats() {
        let mut rng = StdRng::seed_from_u64(42);
        let subtags = plan_mixed_format_subtags(6, 2, &mut rng);
        for (i, s) in subtags.iter().enumerate() {
            if i % 2 == 0 {
                assert!(Subtag::DATA_FORMATS.contains(s), "item {i} should be a data format");
            } else {
                assert!(Subtag::LOGIC_FORMATS.contains(s), "item {i} should be a logic format");
            }
        }
    }

    proptest! {
        /// Property: every planned difficulty stays within one level of the band.
        #[test]
        fn stability_items_stay_near_band(band in 1u8..=5, count in 0usize..12, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let band = level(band);
            let plan = plan_stability_difficulties(band, count, &mut rng);
            prop_assert_eq!(plan.len(), count);
            for d in plan {
                prop_assert!((d.get() as i32 - band.get() as i32).abs() <= 1);
            }
        }

        /// Property: runs of identical subtags never exceed the limit.
        #[test]
        fn subtag_runs_respect_limit(count in 0usize..30, max_consecutive in 1usize..4, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let subtags = plan_mixed_format_subtags(count, max_consecutive, &mut rng);
            let mut run = 0;
            for (i, s) in subtags.iter().enumerate() {
                run = if i > 0 && subtags[i - 1] == *s { run + 1 } else { 1 };
                prop_assert!(run <= max_consecutive);
            }
        }
    }
}
