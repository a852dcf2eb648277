//! Tier classification from the diagnostic screener.

use serde::{Deserialize, Serialize};

use crate::config::AdaptiveTestConfig;
use crate::types::{DifficultyLevel, Response, TestPhase, Tier};

/// Outcome of classifying the screener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierClassification {
    pub tier: Tier,
    pub starting_difficulty: DifficultyLevel,
    pub correct_count: usize,
    pub total_count: usize,
    /// Percentage in `0..=100`; 0 when no screener responses exist.
    pub accuracy: f64,
}

/// Classify the student into a tier from the screener responses.
///
/// `responses` may hold the whole session; only `diagnostic_screener` entries count.
/// Thresholds assume a six-item screener: at most 2 correct is `L`, 3-4 is `M`,
/// 5 or more is `H`. An empty screener classifies as `L` with zero accuracy.
pub fn classify_tier(responses: &[Response], config: &AdaptiveTestConfig) -> TierClassification {
    let (total_count, correct_count) = responses
        .iter()
        .filter(|r| r.phase == TestPhase::DiagnosticScreener)
        .fold((0usize, 0usize), |(total, correct), r| {
            (total + 1, correct + usize::from(r.is_correct))
        });

    let accuracy = if total_count == 0 {
        0.0
    } else {
        correct_count as f64 / total_count as f64 * 100.0
    };

    let tier = match correct_count {
        0..=2 => Tier::L,
        3..=4 => Tier::M,
        _ => Tier::H,
    };

    let starting_difficulty = config.tier_starting_difficulty.for_tier(tier);

    tracing::debug!(
        ?tier,
        correct_count,
        total_count,
        accuracy,
        starting_difficulty = starting_difficulty.get(),
        "screener classified"
    );

    TierClassification {
        tier,
        starting_difficulty,
        correct_count,
        total_count,
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subtag;

    fn screener(correct: usize, total: usize) -> Vec<Response> {
        (0..total)
            .map(|i| {
                Response::new(
                    format!("s-{i}"),
                    TestPhase::DiagnosticScreener,
                    i < correct,
                    DifficultyLevel::MIN,
                    Subtag::LogicalReasoning,
                )
            })
            .collect()
    }

    #[test]
    fn six_item_screener_boundaries() {
        let config = AdaptiveTestConfig::default();
        let expected = [
            (0, Tier::L),
            (1, Tier::L),
            (2, Tier::L),
            (3, Tier::M),
            (4, Tier::M),
            (5, Tier::H),
            (6, Tier::H),
        ];
        for (correct, tier) in expected {
            let result = classify_tier(&screener(correct, 6), &config);
            assert_eq!(result.tier, tier, "{correct} correct");
            assert_eq!(result.correct_count, correct);
            assert_eq!(result.total_count, 6);
        }
    }

    #[test]
    fn empty_screener_is_low_tier_with_zero_accuracy() {
        let result = classify_tier(&[], &AdaptiveTestConfig::default());
        assert_eq!(
            result,
            TierClassification {
                tier: Tier::L,
                starting_difficulty: DifficultyLevel::new(2).unwrap(),
                correct_count: 0,
                total_count: 0,
                accuracy: 0.0,
            }
        );
    }

    #[test]
    fn responses_from_other_phases_are_ignored() {
        let mut responses = screener(3, 6);
        for i in 0..4 {
            responses.push(Response::new(
                format!("a-{i}"),
                TestPhase::AdaptiveCore,
                true,
                DifficultyLevel::MAX,
                Subtag::VerbalReasoning,
            ));
        }

        let result = classify_tier(&responses, &AdaptiveTestConfig::default());
        assert_eq!(result.tier, Tier::M);
        assert_eq!(result.total_count, 6);
        assert_eq!(result.starting_difficulty.get(), 3);
        assert!((result.accuracy - 50.0).abs() < 1e-9);
    }

    #[test]
    fn starting_difficulty_follows_configured_map() {
        let mut config = AdaptiveTestConfig::default();
        config.tier_starting_difficulty.high = DifficultyLevel::MAX;
        let result = classify_tier(&screener(6, 6), &config);
        assert_eq!(result.starting_difficulty, DifficultyLevel::MAX);
        assert!((result.accuracy - 100.0).abs() < 1e-9);
    }
}
