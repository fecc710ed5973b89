//! crates/quizbot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or UI layer; the only
//! serialization they know about is the JSON history-export shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

/// The two quiz formats the generator can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizKind {
    #[serde(rename = "Multiple Choice (MCQ)", alias = "mcq")]
    Mcq,
    #[serde(rename = "True/False", alias = "true_false")]
    TrueFalse,
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizKind::Mcq => write!(f, "Multiple Choice (MCQ)"),
            QuizKind::TrueFalse => write!(f, "True/False"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// The closed set of option labels a question (and a graded answer) can carry.
///
/// MCQ questions use `A`..`D`; true/false questions use `True`/`False`.
/// Keeping this an enum means an `AnswerKey` can never hold a label outside
/// the recognized set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerLabel {
    A,
    B,
    C,
    D,
    True,
    False,
}

impl AnswerLabel {
    /// The canonical string form of the label, as rendered to the user and
    /// as compared against recorded user answers during scoring.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerLabel::A => "A",
            AnswerLabel::B => "B",
            AnswerLabel::C => "C",
            AnswerLabel::D => "D",
            AnswerLabel::True => "True",
            AnswerLabel::False => "False",
        }
    }

    /// Maps the single character extracted from a grading line to a label.
    /// The grader emits `T`/`F` for true/false answers, which canonicalize
    /// to `True`/`False` so they match the labels users actually select.
    pub fn from_grading_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(AnswerLabel::A),
            'B' => Some(AnswerLabel::B),
            'C' => Some(AnswerLabel::C),
            'D' => Some(AnswerLabel::D),
            'T' => Some(AnswerLabel::True),
            'F' => Some(AnswerLabel::False),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error raised when a record would violate one of the construction
/// invariants (empty question text, duplicate option labels).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("question text is empty after trimming")]
    EmptyQuestionText,
    #[error("duplicate option label `{0}` within one question")]
    DuplicateOptionLabel(AnswerLabel),
}

/// One selectable option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: AnswerLabel,
    pub text: String,
}

/// A single parsed quiz question: its text plus its options in file order.
/// True/false questions always carry the fixed `True`/`False` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_text: String,
    pub options: Vec<QuestionOption>,
}

impl QuestionRecord {
    /// Builds a record, enforcing the construction invariants: the question
    /// text must be non-empty after trimming and option labels must be
    /// unique within the record.
    pub fn new(
        question_text: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Result<Self, DomainError> {
        let question_text = question_text.into().trim().to_string();
        if question_text.is_empty() {
            return Err(DomainError::EmptyQuestionText);
        }
        let mut seen: Vec<AnswerLabel> = Vec::with_capacity(options.len());
        for option in &options {
            if seen.contains(&option.label) {
                return Err(DomainError::DuplicateOptionLabel(option.label));
            }
            seen.push(option.label);
        }
        Ok(Self {
            question_text,
            options,
        })
    }

    /// Builds a true/false record with the fixed two-option pair.
    pub fn true_false(question_text: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(
            question_text,
            vec![
                QuestionOption {
                    label: AnswerLabel::True,
                    text: "True".to_string(),
                },
                QuestionOption {
                    label: AnswerLabel::False,
                    text: "False".to_string(),
                },
            ],
        )
    }
}

/// One generated quiz: the raw model output it came from plus the questions
/// parsed out of it. Created once per generation request and never mutated;
/// re-generation replaces the document wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDocument {
    pub raw_text: String,
    pub kind: QuizKind,
    pub difficulty: Difficulty,
    pub topics: BTreeSet<String>,
    pub questions: Vec<QuestionRecord>,
}

impl QuizDocument {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// The grader's authoritative (but possibly partial) mapping from question
/// index to the canonical correct label. Missing indices mean "ungraded",
/// never a default guess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerKey(BTreeMap<usize, AnswerLabel>);

impl AnswerKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, label: AnswerLabel) {
        self.0.insert(index, label);
    }

    pub fn get(&self, index: usize) -> Option<AnswerLabel> {
        self.0.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, AnswerLabel)> + '_ {
        self.0.iter().map(|(&i, &l)| (i, l))
    }
}

impl FromIterator<(usize, AnswerLabel)> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = (usize, AnswerLabel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The immutable outcome of one completed quiz attempt. Serializes with the
/// field names of the JSON export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: QuizKind,
    pub difficulty: Difficulty,
    pub topics: BTreeSet<String>,
    #[serde(rename = "total_questions")]
    pub question_count: usize,
    #[serde(rename = "correct_answers")]
    pub correct_count: usize,
    pub percentage: f64,
    #[serde(rename = "time_taken")]
    pub elapsed_seconds: Option<u64>,
}

/// The append-only record of completed quizzes plus running aggregates.
///
/// The aggregates are only ever touched inside [`QuizHistory::record`] and
/// [`QuizHistory::clear`], so they always equal a fold over the sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuizHistory {
    results: Vec<QuizResult>,
    total_quizzes_taken: usize,
    total_questions_asked: usize,
    total_correct_answers: usize,
}

/// The JSON export shape for the history page and the download button.
#[derive(Debug, Serialize)]
pub struct HistoryExport<'a> {
    pub total_quizzes: usize,
    pub total_questions: usize,
    pub total_correct: usize,
    pub accuracy: f64,
    pub quiz_history: &'a [QuizResult],
}

impl QuizHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one completed result and updates the running aggregates.
    pub fn record(&mut self, result: QuizResult) {
        self.total_quizzes_taken += 1;
        self.total_questions_asked += result.question_count;
        self.total_correct_answers += result.correct_count;
        self.results.push(result);
    }

    /// Empties the history and resets the aggregates. Only reachable through
    /// an explicit user action; nothing clears history implicitly.
    pub fn clear(&mut self) {
        self.results.clear();
        self.total_quizzes_taken = 0;
        self.total_questions_asked = 0;
        self.total_correct_answers = 0;
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    pub fn total_quizzes_taken(&self) -> usize {
        self.total_quizzes_taken
    }

    pub fn total_questions_asked(&self) -> usize {
        self.total_questions_asked
    }

    pub fn total_correct_answers(&self) -> usize {
        self.total_correct_answers
    }

    /// Overall accuracy across every recorded quiz, as a percentage.
    pub fn accuracy(&self) -> f64 {
        if self.total_questions_asked == 0 {
            0.0
        } else {
            self.total_correct_answers as f64 / self.total_questions_asked as f64 * 100.0
        }
    }

    pub fn export(&self) -> HistoryExport<'_> {
        HistoryExport {
            total_quizzes: self.total_quizzes_taken,
            total_questions: self.total_questions_asked,
            total_correct: self.total_correct_answers,
            accuracy: self.accuracy(),
            quiz_history: &self.results,
        }
    }
}
