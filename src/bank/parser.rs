//! Question bank text parser
//!
//! Splits the input into blank-line separated blocks and turns each block
//! into a [`Question`]. Spacing is taken at face value: two questions
//! without a blank line between them are read as one block.

use super::{Answer, Label, ParseError, Question, QuestionKind, RichText};
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Prefix of the line listing the correct labels.
const ANSWER_KEY_PREFIX: &str = "ANSWER:";

/// Prefix of the first answer; it opens the answer section.
const FIRST_ANSWER_PREFIX: &str = "A.";

// ─────────────────────────────────────────────────────────────────────────────
// Bank Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a whole question bank, in input order.
///
/// Stops at the first malformed block.
pub fn parse_bank(text: &str) -> Result<Vec<Question>, ParseError> {
    let questions = split_blocks(text)
        .into_iter()
        .enumerate()
        .map(|(i, block)| parse_block(block, i + 1))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} question blocks", questions.len());
    Ok(questions)
}

/// Split text into non-empty question blocks.
///
/// Blocks are separated by one or more blank lines (whitespace-only lines
/// count as blank). Surrounding newlines are trimmed from each block.
pub fn split_blocks(text: &str) -> Vec<&str> {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    let separator =
        SEPARATOR.get_or_init(|| Regex::new(r"\r?\n\s*\n").expect("separator pattern is valid"));

    separator
        .split(text)
        .map(|block| block.trim_matches(['\r', '\n']))
        .filter(|block| !block.trim().is_empty())
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// Answer being accumulated, with any continuation lines.
struct PendingAnswer<'a> {
    label: Label,
    lines: Vec<&'a str>,
}

/// Parse one question block. `number` is the 1-based block number used in errors.
pub fn parse_block(block: &str, number: usize) -> Result<Question, ParseError> {
    let mut question_lines: Vec<&str> = Vec::new();
    let mut answers: Vec<PendingAnswer<'_>> = Vec::new();
    let mut answer_key: Option<Vec<&str>> = None;
    let mut in_answers = false;

    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !in_answers
            && (trimmed.starts_with(FIRST_ANSWER_PREFIX) || trimmed.starts_with(ANSWER_KEY_PREFIX))
        {
            in_answers = true;
        }
        if !in_answers {
            question_lines.push(line.trim_end());
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix(ANSWER_KEY_PREFIX) {
            answer_key = Some(
                rest.split(',')
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
                    .collect(),
            );
        } else if let Some((label, text)) = split_answer_line(trimmed) {
            if answers.iter().any(|a| a.label == label) {
                return Err(ParseError::DuplicateLabel {
                    block: number,
                    label,
                    content: block.to_string(),
                });
            }
            answers.push(PendingAnswer {
                label,
                lines: vec![text],
            });
        } else if let (None, Some(last)) = (&answer_key, answers.last_mut()) {
            last.lines.push(line.trim_end());
        } else {
            warn!(
                "Question {}: ignoring line after the answer key: {}",
                number, trimmed
            );
        }
    }

    let text = RichText::parse(&question_lines.join("\n"));
    if text.is_blank() {
        return Err(ParseError::EmptyQuestionText {
            block: number,
            content: block.to_string(),
        });
    }

    let correct = resolve_answer_key(answer_key, &answers, number, block)?;
    let kind = QuestionKind::classify(correct);
    debug!("Question {} parsed as {}", number, kind.label());

    let answers = answers
        .into_iter()
        .map(|a| Answer {
            label: a.label,
            text: RichText::parse(&a.lines.join("\n")),
        })
        .collect();

    Ok(Question {
        text,
        kind,
        answers,
    })
}

/// Check the `ANSWER:` labels against the declared answers.
fn resolve_answer_key(
    answer_key: Option<Vec<&str>>,
    answers: &[PendingAnswer<'_>],
    number: usize,
    block: &str,
) -> Result<BTreeSet<Label>, ParseError> {
    let key = match answer_key {
        Some(key) => key,
        None if answers.is_empty() => return Ok(BTreeSet::new()),
        None => {
            return Err(ParseError::MissingAnswerKey {
                block: number,
                content: block.to_string(),
            })
        }
    };

    if key.is_empty() && !answers.is_empty() {
        return Err(ParseError::EmptyAnswerKey {
            block: number,
            content: block.to_string(),
        });
    }

    key.into_iter()
        .map(|raw| {
            Label::parse(raw)
                .filter(|label| answers.iter().any(|a| a.label == *label))
                .ok_or_else(|| ParseError::UnknownLabel {
                    block: number,
                    label: raw.to_string(),
                    content: block.to_string(),
                })
        })
        .collect()
}

/// Match `X. text` where `X` is an uppercase letter.
fn split_answer_line(line: &str) -> Option<(Label, &str)> {
    let mut chars = line.chars();
    let label = Label::new(chars.next()?)?;
    let rest = chars.as_str().strip_prefix('.')?;
    Some((label, rest.trim_start()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::Segment;

    fn label(c: char) -> Label {
        Label::new(c).unwrap()
    }

    #[test]
    fn test_split_blocks() {
        let text = "Q1?\nA. x\nANSWER: A\n\nQ2?\nANSWER:\n";
        assert_eq!(split_blocks(text), vec!["Q1?\nA. x\nANSWER: A", "Q2?\nANSWER:"]);
    }

    #[test]
    fn test_split_blocks_tolerates_extra_blank_lines_and_crlf() {
        let text = "\n\nQ1?\r\n\r\n  \r\n\r\nQ2?\r\n\n\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks, vec!["Q1?", "Q2?"]);
    }

    #[test]
    fn test_split_blocks_empty_input() {
        assert!(split_blocks("").is_empty());
        assert!(split_blocks("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_single_choice_scenario() {
        let q = parse_block("What is 2+2?\nA. 3\nB. 4\nANSWER: B", 1).unwrap();

        assert_eq!(q.kind, QuestionKind::SingleChoice { correct: label('B') });
        assert_eq!(q.answers.len(), 2);
        assert_eq!(q.answers[0].label, label('A'));
        assert_eq!(q.answers[0].text, RichText::parse("3"));
        assert_eq!(q.answers[1].text, RichText::parse("4"));
        assert_eq!(q.text, RichText::parse("What is 2+2?"));
    }

    #[test]
    fn test_multiple_choice() {
        let block = "Which are even?\nA. 2\nB. 3\nC. 4\nD. 5\nANSWER: A, C";
        let q = parse_block(block, 1).unwrap();

        match &q.kind {
            QuestionKind::MultipleChoice { correct } => {
                assert_eq!(correct.iter().copied().collect::<Vec<_>>(), vec![label('A'), label('C')]);
            }
            other => panic!("expected multiple choice, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_key_label_is_single_choice() {
        let q = parse_block("Q?\nA. x\nB. y\nANSWER: A, A", 1).unwrap();
        assert_eq!(q.kind, QuestionKind::SingleChoice { correct: label('A') });
    }

    #[test]
    fn test_essay_with_empty_answer_line() {
        let q = parse_block("Explain ownership.\nANSWER:", 1).unwrap();
        assert_eq!(q.kind, QuestionKind::Essay);
        assert!(q.answers.is_empty());
    }

    #[test]
    fn test_essay_without_answer_line() {
        let q = parse_block("Describe the borrow checker\nin two sentences.", 1).unwrap();
        assert_eq!(q.kind, QuestionKind::Essay);
        assert_eq!(
            q.text,
            RichText::parse("Describe the borrow checker\nin two sentences.")
        );
    }

    #[test]
    fn test_multiline_question_text_keeps_indentation() {
        let block = "What does this print?\n    x = 1\n\tprint(x)   \nA. 1\nANSWER: A";
        let q = parse_block(block, 1).unwrap();
        assert_eq!(
            q.text.segments(),
            &[Segment::Text("What does this print?\n    x = 1\n\tprint(x)".into())]
        );
    }

    #[test]
    fn test_answer_continuation_lines() {
        let block = "Pick one\nA. <code lang=\"python\">\nprint(1)\n</code>\nB. nothing\nANSWER: A";
        let q = parse_block(block, 1).unwrap();
        assert_eq!(q.answers[0].text.code_spans().next().unwrap().code, "print(1)");
    }

    #[test]
    fn test_answer_continuation_keeps_indentation() {
        let block = "Which body is valid?\nA. <code lang=\"python\">\ndef f():\n    return 1\n</code>\nB. none\nANSWER: A";
        let q = parse_block(block, 1).unwrap();
        assert_eq!(
            q.answers[0].text.code_spans().next().unwrap().code,
            "def f():\n    return 1"
        );
    }

    #[test]
    fn test_question_text_with_code() {
        let block = "Output?\n<code lang=\"python\">print(1)</code>\nA. 1\nB. 2\nANSWER: A";
        let q = parse_block(block, 1).unwrap();
        assert_eq!(q.text.code_spans().count(), 1);
        assert!(q.answers.iter().all(|a| a.text.code_spans().next().is_none()));
    }

    #[test]
    fn test_missing_answer_key() {
        let err = parse_block("Q?\nA. x\nB. y", 4).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAnswerKey {
                block: 4,
                content: "Q?\nA. x\nB. y".to_string()
            }
        );
    }

    #[test]
    fn test_empty_answer_key_with_answers() {
        let err = parse_block("Q?\nA. x\nANSWER:", 1).unwrap_err();
        assert!(matches!(err, ParseError::EmptyAnswerKey { block: 1, .. }));
    }

    #[test]
    fn test_unknown_label() {
        let err = parse_block("Q?\nA. x\nB. y\nANSWER: C", 2).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownLabel { block: 2, ref label, .. } if label == "C"
        ));
    }

    #[test]
    fn test_malformed_label() {
        let err = parse_block("Q?\nA. x\nANSWER: A, b", 1).unwrap_err();
        assert!(matches!(err, ParseError::UnknownLabel { ref label, .. } if label == "b"));
    }

    #[test]
    fn test_answer_key_without_answers() {
        let err = parse_block("Q?\nANSWER: A", 1).unwrap_err();
        assert!(matches!(err, ParseError::UnknownLabel { .. }));
    }

    #[test]
    fn test_duplicate_label() {
        let err = parse_block("Q?\nA. x\nA. y\nANSWER: A", 1).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateLabel { label: l, .. } if l == label('A')));
    }

    #[test]
    fn test_empty_question_text() {
        let err = parse_block("A. x\nANSWER: A", 6).unwrap_err();
        assert!(matches!(err, ParseError::EmptyQuestionText { block: 6, .. }));
    }

    #[test]
    fn test_parse_bank_numbers_blocks() {
        let text = "Q1?\nA. x\nANSWER: A\n\nQ2?\nA. x\nANSWER: Z\n";
        let err = parse_bank(text).unwrap_err();
        assert!(matches!(err, ParseError::UnknownLabel { block: 2, .. }));
    }

    #[test]
    fn test_parse_bank_counts() {
        let text = "Q1?\nA. x\nB. y\nANSWER: A\n\nQ2?\nA. x\nB. y\nANSWER: A, B\n\nQ3?\nANSWER:\n";
        let questions = parse_bank(text).unwrap();
        assert_eq!(questions.len(), 3);
        assert!(matches!(questions[0].kind, QuestionKind::SingleChoice { .. }));
        assert!(matches!(questions[1].kind, QuestionKind::MultipleChoice { .. }));
        assert_eq!(questions[2].kind, QuestionKind::Essay);
    }

    #[test]
    fn test_split_answer_line() {
        assert_eq!(split_answer_line("B. 4"), Some((label('B'), "4")));
        assert_eq!(split_answer_line("C.no space"), Some((label('C'), "no space")));
        assert_eq!(split_answer_line("ANSWER: A"), None);
        assert_eq!(split_answer_line("b. lower"), None);
    }
}
