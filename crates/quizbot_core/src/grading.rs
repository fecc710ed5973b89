//! crates/quizbot_core/src/grading.rs
//!
//! Extraction of an [`AnswerKey`] from the model's free-form grading
//! response.
//!
//! The evaluation prompt asks for one line per question in the form
//! `Question N: Correct Answer: [X], Explanation: ...`. Lines that do not
//! yield an answer are skipped rather than treated as errors; the resulting
//! key may be partial, and callers must treat missing indices as "ungraded",
//! never as a default answer.

use crate::domain::{AnswerKey, AnswerLabel};

const ANSWER_MARKER: &str = "Correct Answer:";

/// Parses raw grading text into a (possibly partial) answer key.
pub fn parse_answer_key(raw_text: &str) -> AnswerKey {
    raw_text
        .lines()
        .enumerate()
        .filter_map(|(position, line)| try_parse_grading_line(position, line))
        .collect()
}

/// Attempts to extract `(question index, correct label)` from one grading
/// line. Returns `None` on any non-match; dropping the line is the error
/// policy.
///
/// The index comes from the line's own `Question N` prefix when it has one,
/// so blank lines or spilled multi-line explanations in the response do not
/// shift later answers. Lines that carry the marker without a usable prefix
/// fall back to their 0-based position in the raw text.
pub fn try_parse_grading_line(position: usize, line: &str) -> Option<(usize, AnswerLabel)> {
    let (before, after) = line.split_once(ANSWER_MARKER)?;
    let token = after
        .split(',')
        .next()?
        .trim()
        .trim_matches(|c| c == '[' || c == ']')
        .trim();
    let label = AnswerLabel::from_grading_char(token.chars().next()?)?;
    let index = leading_question_number(before)
        .map(|n| n - 1)
        .unwrap_or(position);
    Some((index, label))
}

/// Reads the `N` out of a leading `Question N` prefix. Zero is rejected;
/// question numbering in the prompt format is 1-based.
fn leading_question_number(prefix: &str) -> Option<usize> {
    let rest = prefix.trim_start().strip_prefix("Question")?;
    let digits: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    match digits.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
