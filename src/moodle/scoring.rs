//! Answer fractions and grading
//!
//! Moodle stores per-answer credit as a percentage ("fraction"). Under core
//! `multichoice` a submission's score is the sum of the fractions of the
//! selected answers, clamped to `0..=100`; `multichoiceset` only awards
//! credit for the exact set of correct answers.

use crate::bank::{Label, QuestionKind};
use crate::config::MultipleChoiceGrading;
#[cfg(test)]
use crate::bank::Question;
#[cfg(test)]
use std::collections::BTreeSet;

/// Credit, in percent, for selecting `label`.
pub fn answer_fraction(kind: &QuestionKind, label: Label, grading: MultipleChoiceGrading) -> f64 {
    match kind {
        QuestionKind::Essay => 0.0,
        QuestionKind::SingleChoice { correct } => {
            if *correct == label {
                100.0
            } else {
                0.0
            }
        }
        QuestionKind::MultipleChoice { correct } => match grading {
            MultipleChoiceGrading::PenalizeWrong if correct.contains(&label) => {
                100.0 / correct.len() as f64
            }
            MultipleChoiceGrading::PenalizeWrong => -100.0,
            // multichoiceset marks correct options with 100 and grades the set as a whole
            MultipleChoiceGrading::AllOrNothing if correct.contains(&label) => 100.0,
            MultipleChoiceGrading::AllOrNothing => 0.0,
        },
    }
}

/// Format a fraction the way Moodle exports them.
pub fn format_fraction(fraction: f64) -> String {
    if fraction.fract() == 0.0 {
        format!("{}", fraction as i64)
    } else {
        format!("{:.7}", fraction)
    }
}

/// Score (0.0..=1.0) a submission selecting `selected` would receive.
///
/// Returns `None` for essays, which are graded manually.
#[cfg(test)]
pub fn grade(
    question: &Question,
    selected: &BTreeSet<Label>,
    grading: MultipleChoiceGrading,
) -> Option<f64> {
    match (&question.kind, grading) {
        (QuestionKind::Essay, _) => None,
        (QuestionKind::MultipleChoice { correct }, MultipleChoiceGrading::AllOrNothing) => {
            Some(if selected == correct { 1.0 } else { 0.0 })
        }
        (kind, _) => {
            let total: f64 = question
                .answers
                .iter()
                .filter(|a| selected.contains(&a.label))
                .map(|a| answer_fraction(kind, a.label, grading))
                .sum();
            Some((total / 100.0).clamp(0.0, 1.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::parser::parse_block;

    const EPSILON: f64 = 1e-9;

    fn labels(s: &str) -> BTreeSet<Label> {
        s.chars().filter_map(Label::new).collect()
    }

    fn multi() -> Question {
        parse_block("Pick the odd ones\nA. 1\nB. 2\nC. 3\nD. 4\nANSWER: A, C", 1).unwrap()
    }

    #[test]
    fn test_single_choice_fractions() {
        let q = parse_block("What is 2+2?\nA. 3\nB. 4\nANSWER: B", 1).unwrap();
        let grading = MultipleChoiceGrading::default();
        assert_eq!(answer_fraction(&q.kind, Label::new('B').unwrap(), grading), 100.0);
        assert_eq!(answer_fraction(&q.kind, Label::new('A').unwrap(), grading), 0.0);

        assert_eq!(grade(&q, &labels("B"), grading), Some(1.0));
        assert_eq!(grade(&q, &labels("A"), grading), Some(0.0));
    }

    #[test]
    fn test_multiple_choice_fractions() {
        let q = multi();
        let grading = MultipleChoiceGrading::PenalizeWrong;
        assert_eq!(answer_fraction(&q.kind, Label::new('A').unwrap(), grading), 50.0);
        assert_eq!(answer_fraction(&q.kind, Label::new('D').unwrap(), grading), -100.0);
    }

    #[test]
    fn test_extra_wrong_selection_scores_zero() {
        let q = multi();
        for grading in [MultipleChoiceGrading::PenalizeWrong, MultipleChoiceGrading::AllOrNothing] {
            assert_eq!(grade(&q, &labels("ACD"), grading), Some(0.0));
            assert_eq!(grade(&q, &labels("AC"), grading), Some(1.0));
            assert_eq!(grade(&q, &labels("ABCD"), grading), Some(0.0));
        }
    }

    #[test]
    fn test_incomplete_selection_scores_zero_by_default() {
        let q = multi();
        assert_eq!(grade(&q, &labels("A"), MultipleChoiceGrading::default()), Some(0.0));
        assert_eq!(grade(&q, &labels("C"), MultipleChoiceGrading::default()), Some(0.0));
    }

    #[test]
    fn test_penalize_wrong_gives_partial_credit() {
        let q = multi();
        let partial = grade(&q, &labels("A"), MultipleChoiceGrading::PenalizeWrong).unwrap();
        assert!((partial - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_all_or_nothing_fractions() {
        let q = multi();
        let grading = MultipleChoiceGrading::default();
        assert_eq!(answer_fraction(&q.kind, Label::new('A').unwrap(), grading), 100.0);
        assert_eq!(answer_fraction(&q.kind, Label::new('B').unwrap(), grading), 0.0);
    }

    #[test]
    fn test_essay_is_manually_graded() {
        let q = parse_block("Explain.\nANSWER:", 1).unwrap();
        assert_eq!(grade(&q, &BTreeSet::new(), MultipleChoiceGrading::default()), None);
    }

    #[test]
    fn test_correct_fractions_sum_to_100() {
        let q = parse_block("Q?\nA. a\nB. b\nC. c\nANSWER: A, B, C", 1).unwrap();
        let sum: f64 = q
            .answers
            .iter()
            .map(|a| answer_fraction(&q.kind, a.label, MultipleChoiceGrading::PenalizeWrong))
            .sum();
        assert!((sum - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_format_fraction() {
        assert_eq!(format_fraction(100.0), "100");
        assert_eq!(format_fraction(0.0), "0");
        assert_eq!(format_fraction(-100.0), "-100");
        assert_eq!(format_fraction(50.0), "50");
        assert_eq!(format_fraction(100.0 / 3.0), "33.3333333");
    }
}
