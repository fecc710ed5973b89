//! crates/quizbot_core/src/session.rs
//!
//! Owns the lifecycle of one quiz attempt, from a freshly parsed document
//! through answering, grading, scoring, and the at-most-once append to
//! history.
//!
//! The phases move strictly forward:
//! `Idle -> InProgress -> AwaitingGrading -> Graded`, with [`QuizSession::start`]
//! as the only operation callable from any phase (it is a hard reset).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{AnswerKey, QuizDocument, QuizHistory, QuizResult};

/// Where a session is in the generate -> answer -> grade -> score cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    InProgress,
    AwaitingGrading,
    Graded,
}

/// Raised when a session operation is invoked from a phase that disallows
/// it. Fatal to the calling operation, never to the process.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("`{operation}` is not valid while the session is {phase:?}")]
pub struct InvalidStateError {
    pub operation: &'static str,
    pub phase: SessionPhase,
}

/// One quiz attempt: the active document, the user's answers, and (after
/// submission) the graded answer key.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    phase: SessionPhase,
    document: Option<QuizDocument>,
    user_answers: HashMap<usize, String>,
    answer_key: Option<AnswerKey>,
    started_at: Option<DateTime<Utc>>,
    committed: bool,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    /// Creates an idle session with no document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            document: None,
            user_answers: HashMap::new(),
            answer_key: None,
            started_at: None,
            committed: false,
        }
    }

    /// The id of the current attempt; changes on every [`start`](Self::start).
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn document(&self) -> Option<&QuizDocument> {
        self.document.as_ref()
    }

    pub fn user_answers(&self) -> &HashMap<usize, String> {
        &self.user_answers
    }

    pub fn answered_count(&self) -> usize {
        self.user_answers.len()
    }

    /// Begins a new attempt with a freshly parsed document, discarding any
    /// previous document, answers, and key. Callable from every phase.
    pub fn start(&mut self, document: QuizDocument, timer_enabled: bool) {
        self.id = Uuid::new_v4();
        self.phase = SessionPhase::InProgress;
        self.document = Some(document);
        self.user_answers.clear();
        self.answer_key = None;
        self.started_at = timer_enabled.then(Utc::now);
        self.committed = false;
    }

    /// Upserts the user's selection for one question. The label is not
    /// validated against the question's own options; a label that matches
    /// nothing simply never scores as correct.
    pub fn record_answer(
        &mut self,
        index: usize,
        label: impl Into<String>,
    ) -> Result<(), InvalidStateError> {
        self.require_phase(SessionPhase::InProgress, "record_answer")?;
        self.user_answers.insert(index, label.into());
        Ok(())
    }

    /// Freezes the user's answers; no further `record_answer` calls are
    /// accepted once submitted.
    pub fn submit(&mut self) -> Result<(), InvalidStateError> {
        self.require_phase(SessionPhase::InProgress, "submit")?;
        self.phase = SessionPhase::AwaitingGrading;
        Ok(())
    }

    /// Stores the graded key and moves to the `Graded` phase.
    pub fn apply_answer_key(&mut self, key: AnswerKey) -> Result<(), InvalidStateError> {
        self.require_phase(SessionPhase::AwaitingGrading, "apply_answer_key")?;
        self.answer_key = Some(key);
        self.phase = SessionPhase::Graded;
        Ok(())
    }

    /// Computes the result of a graded attempt.
    ///
    /// A question is correct iff the user answered it, the key graded it,
    /// and the two labels match exactly. Unanswered and ungraded questions
    /// both count as incorrect; there is no "unknown" bucket in the tally.
    pub fn score(&self) -> Result<QuizResult, InvalidStateError> {
        self.require_phase(SessionPhase::Graded, "score")?;
        let document = self.document.as_ref().ok_or(InvalidStateError {
            operation: "score",
            phase: self.phase,
        })?;
        let key = self.answer_key.as_ref().ok_or(InvalidStateError {
            operation: "score",
            phase: self.phase,
        })?;

        let question_count = document.question_count();
        let correct_count = (0..question_count)
            .filter(|&i| {
                match (self.user_answers.get(&i), key.get(i)) {
                    (Some(user), Some(correct)) => user == correct.as_str(),
                    _ => false,
                }
            })
            .count();
        let percentage = if question_count == 0 {
            0.0
        } else {
            correct_count as f64 / question_count as f64 * 100.0
        };
        let elapsed_seconds = self
            .started_at
            .map(|started| (Utc::now() - started).num_seconds().max(0) as u64);

        Ok(QuizResult {
            timestamp: Utc::now(),
            kind: document.kind,
            difficulty: document.difficulty,
            topics: document.topics.clone(),
            question_count,
            correct_count,
            percentage,
            elapsed_seconds,
        })
    }

    /// Appends this attempt's result to the history, at most once per
    /// attempt. Repeat calls return the already-scored result without
    /// touching the history again.
    pub fn commit_to_history(
        &mut self,
        history: &mut QuizHistory,
    ) -> Result<QuizResult, InvalidStateError> {
        let result = self.score()?;
        if !self.committed {
            history.record(result.clone());
            self.committed = true;
        }
        Ok(result)
    }

    fn require_phase(
        &self,
        expected: SessionPhase,
        operation: &'static str,
    ) -> Result<(), InvalidStateError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(InvalidStateError {
                operation,
                phase: self.phase,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnswerLabel, Difficulty, QuestionRecord, QuizKind};
    use crate::grading::parse_answer_key;
    use crate::parser::parse_questions;
    use std::collections::BTreeSet;

    fn mcq_document(question_count: usize) -> QuizDocument {
        let questions = (0..question_count)
            .map(|i| {
                let raw = format!(
                    "Question {}: Placeholder question {}?\nA) one\nB) two\nC) three\nD) four",
                    i + 1,
                    i + 1
                );
                parse_questions(&raw, QuizKind::Mcq).remove(0)
            })
            .collect::<Vec<QuestionRecord>>();
        QuizDocument {
            raw_text: String::new(),
            kind: QuizKind::Mcq,
            difficulty: Difficulty::Medium,
            topics: BTreeSet::from(["RSA".to_string()]),
            questions,
        }
    }

    fn graded_session(
        question_count: usize,
        answers: &[(usize, &str)],
        key: AnswerKey,
    ) -> QuizSession {
        let mut session = QuizSession::new();
        session.start(mcq_document(question_count), false);
        for &(index, label) in answers {
            session.record_answer(index, label).unwrap();
        }
        session.submit().unwrap();
        session.apply_answer_key(key).unwrap();
        session
    }

    #[test]
    fn full_cycle_scores_an_all_correct_attempt() {
        let key: AnswerKey = [(0, AnswerLabel::B)].into_iter().collect();
        let session = graded_session(1, &[(0, "B")], key);
        let result = session.score().unwrap();
        assert_eq!(result.question_count, 1);
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 100.0);
        assert_eq!(result.elapsed_seconds, None);
    }

    #[test]
    fn mismatched_answer_counts_as_incorrect() {
        let key: AnswerKey = [(0, AnswerLabel::A), (1, AnswerLabel::C)]
            .into_iter()
            .collect();
        let session = graded_session(2, &[(0, "A"), (1, "B")], key);
        let result = session.score().unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 50.0);
    }

    #[test]
    fn nothing_answered_scores_zero() {
        let key: AnswerKey = [(0, AnswerLabel::A), (1, AnswerLabel::B)]
            .into_iter()
            .collect();
        let session = graded_session(2, &[], key);
        assert_eq!(session.score().unwrap().correct_count, 0);
    }

    #[test]
    fn ungraded_question_is_incorrect_not_unknown() {
        // The key only covers question 0; question 1 was answered but the
        // grader yielded nothing for it.
        let key: AnswerKey = [(0, AnswerLabel::A)].into_iter().collect();
        let session = graded_session(2, &[(0, "A"), (1, "B")], key);
        let result = session.score().unwrap();
        assert_eq!(result.correct_count, 1);
    }

    #[test]
    fn garbage_labels_are_tolerated_and_never_match() {
        let key: AnswerKey = [(0, AnswerLabel::A)].into_iter().collect();
        let session = graded_session(1, &[(0, "banana")], key);
        assert_eq!(session.score().unwrap().correct_count, 0);
    }

    #[test]
    fn empty_quiz_scores_zero_percent_without_fault() {
        let session = graded_session(0, &[], AnswerKey::new());
        let result = session.score().unwrap();
        assert_eq!(result.question_count, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn score_before_grading_is_an_invalid_state() {
        let mut session = QuizSession::new();
        session.start(mcq_document(1), false);
        let err = session.score().unwrap_err();
        assert_eq!(err.phase, SessionPhase::InProgress);
        session.submit().unwrap();
        assert!(session.score().is_err());
    }

    #[test]
    fn answers_are_frozen_after_submit() {
        let mut session = QuizSession::new();
        session.start(mcq_document(1), false);
        session.record_answer(0, "A").unwrap();
        session.submit().unwrap();
        let err = session.record_answer(0, "B").unwrap_err();
        assert_eq!(err.operation, "record_answer");
        assert_eq!(err.phase, SessionPhase::AwaitingGrading);
        assert_eq!(session.user_answers().get(&0).map(String::as_str), Some("A"));
    }

    #[test]
    fn submit_twice_is_rejected() {
        let mut session = QuizSession::new();
        session.start(mcq_document(1), false);
        session.submit().unwrap();
        assert!(session.submit().is_err());
    }

    #[test]
    fn start_resets_from_any_phase() {
        let key: AnswerKey = [(0, AnswerLabel::A)].into_iter().collect();
        let mut session = graded_session(1, &[(0, "A")], key);
        let old_id = session.id();
        session.start(mcq_document(2), false);
        assert_ne!(session.id(), old_id);
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.document().unwrap().question_count(), 2);
    }

    #[test]
    fn commit_to_history_is_idempotent_per_attempt() {
        let key: AnswerKey = [(0, AnswerLabel::B)].into_iter().collect();
        let mut session = graded_session(1, &[(0, "B")], key);
        let mut history = QuizHistory::new();

        session.commit_to_history(&mut history).unwrap();
        session.commit_to_history(&mut history).unwrap();

        assert_eq!(history.results().len(), 1);
        assert_eq!(history.total_quizzes_taken(), 1);
        assert_eq!(history.total_questions_asked(), 1);
        assert_eq!(history.total_correct_answers(), 1);
    }

    #[test]
    fn a_new_attempt_may_commit_again() {
        let key: AnswerKey = [(0, AnswerLabel::B)].into_iter().collect();
        let mut session = graded_session(1, &[(0, "B")], key.clone());
        let mut history = QuizHistory::new();
        session.commit_to_history(&mut history).unwrap();

        session.start(mcq_document(1), false);
        session.record_answer(0, "B").unwrap();
        session.submit().unwrap();
        session.apply_answer_key(key).unwrap();
        session.commit_to_history(&mut history).unwrap();

        assert_eq!(history.results().len(), 2);
    }

    #[test]
    fn timer_produces_a_whole_second_elapsed_value() {
        let mut session = QuizSession::new();
        session.start(mcq_document(1), true);
        session.submit().unwrap();
        session.apply_answer_key(AnswerKey::new()).unwrap();
        let result = session.score().unwrap();
        // Started moments ago, so the elapsed value exists and is tiny.
        assert!(result.elapsed_seconds.is_some());
        assert!(result.elapsed_seconds.unwrap() <= 1);
    }

    #[test]
    fn end_to_end_with_the_raw_text_pipeline() {
        let raw_quiz = "\
Question 1: What is RSA?
A) A block cipher
B) A public-key algorithm
C) A hash function
D) A MAC scheme
";
        let questions = parse_questions(raw_quiz, QuizKind::Mcq);
        let document = QuizDocument {
            raw_text: raw_quiz.to_string(),
            kind: QuizKind::Mcq,
            difficulty: Difficulty::Medium,
            topics: BTreeSet::from(["RSA".to_string()]),
            questions,
        };

        let mut session = QuizSession::new();
        session.start(document, false);
        session.record_answer(0, "B").unwrap();
        session.submit().unwrap();

        let grading =
            "Question 1: Correct Answer: [B], Explanation: RSA is asymmetric.";
        session.apply_answer_key(parse_answer_key(grading)).unwrap();

        let result = session.score().unwrap();
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 100.0);
    }
}
