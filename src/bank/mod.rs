//! Question bank model and parser
//!
//! The text format is one question per block, blocks separated by a blank
//! line:
//!
//! ```text
//! QUESTION TEXT (may span several lines, may contain <code lang="x">...</code>)
//! A. First answer
//! B. Second answer
//! ANSWER: B
//! ```
//!
//! A block without answer lines (or with an empty `ANSWER:` line) is an
//! essay question.
//!
//! # Architecture
//!
//! - `code.rs` - `<code>` span extraction into [`RichText`]
//! - `parser.rs` - block splitting and per-block parsing

pub mod code;
pub mod parser;

pub use code::{RichText, Segment};
pub use parser::parse_bank;

use std::collections::BTreeSet;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Labels and Answers
// ─────────────────────────────────────────────────────────────────────────────

/// Letter identifying an answer option (`A`..=`Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Label(char);

impl Label {
    /// Create a label from an uppercase ASCII letter.
    pub fn new(c: char) -> Option<Self> {
        c.is_ascii_uppercase().then_some(Self(c))
    }

    /// Parse a label as written on an `ANSWER:` line.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub label: Label,
    pub text: RichText,
}

// ─────────────────────────────────────────────────────────────────────────────
// Question Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Question type, derived from the set of correct labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Free-text answer, graded manually
    Essay,
    /// Exactly one correct option (radio buttons)
    SingleChoice { correct: Label },
    /// Two or more correct options (checkboxes), all-or-nothing
    MultipleChoice { correct: BTreeSet<Label> },
}

impl QuestionKind {
    /// Classify a question from its correct labels.
    pub fn classify(correct: BTreeSet<Label>) -> Self {
        let mut iter = correct.iter();
        match (iter.next(), iter.next()) {
            (None, _) => QuestionKind::Essay,
            (Some(&label), None) => QuestionKind::SingleChoice { correct: label },
            _ => QuestionKind::MultipleChoice { correct },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::Essay => "essay",
            QuestionKind::SingleChoice { .. } => "single choice",
            QuestionKind::MultipleChoice { .. } => "multiple choice",
        }
    }
}

/// A parsed question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: RichText,
    pub kind: QuestionKind,
    /// Answers in declared order (empty for essays)
    pub answers: Vec<Answer>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Parse Errors
// ─────────────────────────────────────────────────────────────────────────────

/// A malformed question block. `block` is 1-based; `content` is the block text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Answers are listed but there is no `ANSWER:` line
    MissingAnswerKey { block: usize, content: String },
    /// Answers are listed but `ANSWER:` names none of them
    EmptyAnswerKey { block: usize, content: String },
    /// `ANSWER:` names a label that no answer declares
    UnknownLabel {
        block: usize,
        label: String,
        content: String,
    },
    /// Two answers share a label
    DuplicateLabel {
        block: usize,
        label: Label,
        content: String,
    },
    /// Nothing precedes the answers
    EmptyQuestionText { block: usize, content: String },
}

impl ParseError {
    /// Text of the offending block.
    pub fn content(&self) -> &str {
        match self {
            ParseError::MissingAnswerKey { content, .. }
            | ParseError::EmptyAnswerKey { content, .. }
            | ParseError::UnknownLabel { content, .. }
            | ParseError::DuplicateLabel { content, .. }
            | ParseError::EmptyQuestionText { content, .. } => content,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingAnswerKey { block, .. } => {
                write!(f, "question {} has answers but no ANSWER: line", block)
            }
            ParseError::EmptyAnswerKey { block, .. } => {
                write!(f, "question {} has answers but ANSWER: lists none", block)
            }
            ParseError::UnknownLabel { block, label, .. } => write!(
                f,
                "question {}: ANSWER: names '{}', which is not one of its answers",
                block, label
            ),
            ParseError::DuplicateLabel { block, label, .. } => {
                write!(f, "question {} declares answer {} twice", block, label)
            }
            ParseError::EmptyQuestionText { block, .. } => {
                write!(f, "question {} has no question text", block)
            }
        }?;
        write!(f, "\n---\n{}\n---", self.content())
    }
}

impl std::error::Error for ParseError {}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(s: &str) -> BTreeSet<Label> {
        s.chars().filter_map(Label::new).collect()
    }

    #[test]
    fn test_label_parse() {
        assert_eq!(Label::parse(" B "), Label::new('B'));
        assert_eq!(Label::parse("b"), None);
        assert_eq!(Label::parse("AB"), None);
        assert_eq!(Label::parse(""), None);
    }

    #[test]
    fn test_classify_essay() {
        assert_eq!(QuestionKind::classify(BTreeSet::new()), QuestionKind::Essay);
    }

    #[test]
    fn test_classify_single_choice() {
        let kind = QuestionKind::classify(labels("B"));
        assert_eq!(
            kind,
            QuestionKind::SingleChoice {
                correct: Label::new('B').unwrap()
            }
        );
    }

    #[test]
    fn test_classify_multiple_choice() {
        let kind = QuestionKind::classify(labels("CA"));
        assert_eq!(
            kind,
            QuestionKind::MultipleChoice {
                correct: labels("AC")
            }
        );
        assert_eq!(kind.label(), "multiple choice");
    }

    #[test]
    fn test_parse_error_display_includes_block() {
        let err = ParseError::UnknownLabel {
            block: 3,
            label: "E".to_string(),
            content: "Q?\nA. x\nANSWER: E".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("question 3"));
        assert!(msg.contains("'E'"));
        assert!(msg.contains("ANSWER: E"));
        assert_eq!(err.content(), "Q?\nA. x\nANSWER: E");
    }
}
