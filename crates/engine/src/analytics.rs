//! End-of-test results: accuracy breakdowns and the final ability summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AdaptiveTestConfig;
use crate::path::{classify_path, count_direction_changes, mode, PathClassification};
use crate::stop::determine_confidence_tag;
use crate::types::{ConfidenceTag, DifficultyLevel, Response, Subtag, Tier};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyBreakdown {
    pub correct: usize,
    pub total: usize,
    /// Percentage; 0 for an empty bucket.
    pub accuracy: f64,
}

impl AccuracyBreakdown {
    fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    fn finish(&mut self) {
        self.accuracy = percentage(self.correct, self.total);
    }
}

fn percentage(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

/// Accuracy per difficulty level; every level is present, even if unused.
pub fn accuracy_by_difficulty(responses: &[Response]) -> BTreeMap<DifficultyLevel, AccuracyBreakdown> {
    let mut out: BTreeMap<DifficultyLevel, AccuracyBreakdown> = DifficultyLevel::ALL
        .iter()
        .map(|&d| (d, AccuracyBreakdown::default()))
        .collect();

    for r in responses {
        out.entry(r.difficulty_at_time).or_default().record(r.is_correct);
    }
    out.values_mut().for_each(AccuracyBreakdown::finish);
    out
}

/// Accuracy per subtag; every subtag is present, even if unused.
pub fn accuracy_by_subtag(responses: &[Response]) -> BTreeMap<Subtag, AccuracyBreakdown> {
    let mut out: BTreeMap<Subtag, AccuracyBreakdown> = Subtag::ALL
        .iter()
        .map(|&s| (s, AccuracyBreakdown::default()))
        .collect();

    for r in responses {
        out.entry(r.subtag).or_default().record(r.is_correct);
    }
    out.values_mut().for_each(AccuracyBreakdown::finish);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    /// `None` only when no question was answered.
    pub aptitude_level: Option<DifficultyLevel>,
    pub confidence_tag: ConfidenceTag,
    pub tier: Option<Tier>,
    pub total_questions: usize,
    pub total_correct: usize,
    pub overall_accuracy: f64,
    pub accuracy_by_difficulty: BTreeMap<DifficultyLevel, AccuracyBreakdown>,
    pub accuracy_by_subtag: BTreeMap<Subtag, AccuracyBreakdown>,
    pub path_classification: PathClassification,
    pub direction_changes: usize,
    pub difficulty_path: Vec<DifficultyLevel>,
}

/// Summarise a finished (or abandoned-at-maximum) session.
///
/// The aptitude level is the mode of the trailing consistency window, or of the
/// whole path when it is shorter than the window.
pub fn summarize_results(
    responses: &[Response],
    path: &[DifficultyLevel],
    tier: Option<Tier>,
    config: &AdaptiveTestConfig,
) -> TestResults {
    let window = config.consistency_window_size.min(path.len());
    let aptitude_level = mode(&path[path.len() - window..]);
    let confidence = determine_confidence_tag(path, responses, config);

    let total_questions = responses.len();
    let total_correct = responses.iter().filter(|r| r.is_correct).count();

    TestResults {
        aptitude_level,
        confidence_tag: confidence.confidence_tag,
        tier,
        total_questions,
        total_correct,
        overall_accuracy: percentage(total_correct, total_questions),
        accuracy_by_difficulty: accuracy_by_difficulty(responses),
        accuracy_by_subtag: accuracy_by_subtag(responses),
        path_classification: classify_path(path),
        direction_changes: count_direction_changes(path),
        difficulty_path: path.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::tests::path;
    use crate::types::TestPhase;

    fn response(id: &str, correct: bool, difficulty: u8, subtag: Subtag) -> Response {
        Response::new(
            id,
            TestPhase::AdaptiveCore,
            correct,
            DifficultyLevel::new(difficulty).unwrap(),
            subtag,
        )
    }

    #[test]
    fn breakdowns_cover_every_bucket() {
        let by_difficulty = accuracy_by_difficulty(&[]);
        assert_eq!(by_difficulty.len(), 5);
        assert!(by_difficulty.values().all(|b| b.total == 0 && b.accuracy == 0.0));

        let by_subtag = accuracy_by_subtag(&[]);
        assert_eq!(by_subtag.len(), 6);
    }

    #[test]
    fn breakdowns_count_correct_answers_per_bucket() {
        let responses = vec![
            response("a", true, 3, Subtag::NumericalReasoning),
            response("b", false, 3, Subtag::NumericalReasoning),
            response("c", true, 4, Subtag::VerbalReasoning),
            response("d", true, 3, Subtag::VerbalReasoning),
        ];

        let by_difficulty = accuracy_by_difficulty(&responses);
        let three = by_difficulty[&DifficultyLevel::new(3).unwrap()];
        assert_eq!((three.correct, three.total), (2, 3));
        assert!((three.accuracy - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(by_difficulty[&DifficultyLevel::new(4).unwrap()].accuracy, 100.0);

        let by_subtag = accuracy_by_subtag(&responses);
        assert_eq!(by_subtag[&Subtag::NumericalReasoning].accuracy, 50.0);
        assert_eq!(by_subtag[&Subtag::VerbalReasoning].accuracy, 100.0);
        assert_eq!(by_subtag[&Subtag::SpatialReasoning].total, 0);
    }

    #[test]
    fn summary_uses_mode_of_trailing_window() {
        let config = AdaptiveTestConfig::default();
        let p = path(&[1, 2, 3, 4, 4, 3, 4]);
        let responses: Vec<Response> = p
            .iter()
            .enumerate()
            .map(|(i, d)| response(&format!("q{i}"), i % 2 == 0, d.get(), Subtag::LogicalReasoning))
            .collect();

        let results = summarize_results(&responses, &p, Some(Tier::M), &config);
        assert_eq!(results.aptitude_level, Some(DifficultyLevel::new(4).unwrap()));
        assert_eq!(results.tier, Some(Tier::M));
        assert_eq!(results.total_questions, 7);
        assert_eq!(results.total_correct, 4);
        assert_eq!(results.difficulty_path, p);
        assert_eq!(results.path_classification, PathClassification::Ascending);
    }

    #[test]
    fn summary_of_short_path_uses_whole_path() {
        let config = AdaptiveTestConfig::default();
        let results = summarize_results(&[], &path(&[2, 2, 3]), None, &config);
        assert_eq!(results.aptitude_level, Some(DifficultyLevel::new(2).unwrap()));
        assert_eq!(results.overall_accuracy, 0.0);
    }

    #[test]
    fn summary_of_empty_session_has_no_level() {
        let results = summarize_results(&[], &[], None, &AdaptiveTestConfig::default());
        assert_eq!(results.aptitude_level, None);
        assert_eq!(results.path_classification, PathClassification::Stable);
    }

    #[test]
    fn results_serialize_difficulty_keys_as_strings() {
        let results = summarize_results(&[], &path(&[3]), None, &AdaptiveTestConfig::default());
        let json = serde_json::to_value(&results).unwrap();
        assert!(json["accuracyByDifficulty"]["3"].is_object());
        assert!(json["accuracyBySubtag"]["data_interpretation"].is_object());
        assert_eq!(json["pathClassification"], "stable");
    }
}
