//! crates/quizbot_core/src/parser.rs
//!
//! Best-effort extraction of quiz questions from free-form model output.
//!
//! The generation prompt asks for a rigid `Question N: ... / A) ... / D) ...`
//! layout, but a local model will happily wrap that in commentary, renumber
//! things, or drop blank lines in the middle. The parser is a single forward
//! pass over trimmed lines: anything that matches a recognized pattern is
//! kept, anything else is silently ignored. Malformed input never raises; at
//! worst the result is an empty sequence, which callers treat as a failed
//! generation to retry.

use crate::domain::{AnswerLabel, QuestionOption, QuestionRecord, QuizKind};

/// Parses raw generated quiz text into an ordered sequence of questions.
pub fn parse_questions(raw_text: &str, kind: QuizKind) -> Vec<QuestionRecord> {
    match kind {
        QuizKind::Mcq => parse_mcq(raw_text),
        QuizKind::TrueFalse => parse_true_false(raw_text),
    }
}

/// A line starts a new question if it begins with the literal `Question`
/// token, or if it starts with a digit and a period appears within the
/// first three characters (`1.`, `12.` style numbering).
fn is_question_start(line: &str) -> bool {
    if line.starts_with("Question") {
        return true;
    }
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if first.is_ascii_digit() => chars.take(2).any(|c| c == '.'),
        _ => false,
    }
}

/// The question text is everything after the first colon when one is
/// present, otherwise the whole line.
fn question_text_of(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => line,
    }
}

/// An MCQ option line starts with one of `A`..`D` followed by `)` or `.`;
/// the option text is everything from the third character on.
fn parse_option_line(line: &str) -> Option<QuestionOption> {
    let mut chars = line.chars();
    let label = match chars.next()? {
        'A' => AnswerLabel::A,
        'B' => AnswerLabel::B,
        'C' => AnswerLabel::C,
        'D' => AnswerLabel::D,
        _ => return None,
    };
    match chars.next()? {
        ')' | '.' => {}
        _ => return None,
    }
    Some(QuestionOption {
        label,
        text: line[2..].trim().to_string(),
    })
}

fn parse_mcq(raw_text: &str) -> Vec<QuestionRecord> {
    let mut questions = Vec::new();
    let mut current: Option<(String, Vec<QuestionOption>)> = None;

    for line in raw_text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }
        if is_question_start(line) {
            if let Some((text, options)) = current.take() {
                flush_mcq(&mut questions, text, options);
            }
            current = Some((question_text_of(line).to_string(), Vec::new()));
        } else if let Some((_, options)) = current.as_mut() {
            if let Some(option) = parse_option_line(line) {
                options.push(option);
            }
            // Any other line is model commentary; skip it.
        }
    }
    if let Some((text, options)) = current {
        flush_mcq(&mut questions, text, options);
    }
    questions
}

/// An MCQ question with zero options is dropped entirely, as is one whose
/// accumulated lines violate the record invariants (empty text, duplicate
/// labels). Dropping is the whole error policy here.
fn flush_mcq(questions: &mut Vec<QuestionRecord>, text: String, options: Vec<QuestionOption>) {
    if options.is_empty() {
        return;
    }
    if let Ok(record) = QuestionRecord::new(text, options) {
        questions.push(record);
    }
}

fn parse_true_false(raw_text: &str) -> Vec<QuestionRecord> {
    let mut questions = Vec::new();
    for line in raw_text.lines().map(str::trim) {
        if line.is_empty() || !is_question_start(line) {
            continue;
        }
        let mut text = question_text_of(line);
        // Strip a leading "N." numeral prefix left over from the model's
        // own numbering ("Question 1: 1. RSA is...").
        if text.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            if let Some((_, rest)) = text.split_once('.') {
                text = rest.trim();
            }
        }
        if let Ok(record) = QuestionRecord::true_false(text) {
            questions.push(record);
        }
    }
    questions
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSA_QUIZ: &str = "\
Question 1: What is RSA?
A) A block cipher
B) A public-key algorithm
C) A hash function
D) A MAC scheme
";

    #[test]
    fn parses_a_single_well_formed_mcq_block() {
        let questions = parse_questions(RSA_QUIZ, QuizKind::Mcq);
        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.question_text, "What is RSA?");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.options[0].label, AnswerLabel::A);
        assert_eq!(q.options[0].text, "A block cipher");
        assert_eq!(q.options[1].text, "A public-key algorithm");
        assert_eq!(q.options[3].label, AnswerLabel::D);
        assert_eq!(q.options[3].text, "A MAC scheme");
    }

    #[test]
    fn parses_every_block_of_a_multi_question_quiz() {
        let raw = "\
Here are your questions:

Question 1: What does HMAC provide?
A) Confidentiality
B) Integrity and authenticity
C) Key exchange
D) Compression

Question 2: Which cipher is Rijndael?
A. AES
B. DES
C. RC4
D. Blowfish
";
        let questions = parse_questions(raw, QuizKind::Mcq);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].options.len(), 4);
        // `A.` style options are accepted alongside `A)`.
        assert_eq!(questions[1].options[0].text, "AES");
        let labels: Vec<_> = questions[1].options.iter().map(|o| o.label).collect();
        assert_eq!(
            labels,
            [AnswerLabel::A, AnswerLabel::B, AnswerLabel::C, AnswerLabel::D]
        );
    }

    #[test]
    fn numbered_lines_also_start_questions() {
        let raw = "\
1. Which attack targets TLS 1.0 CBC padding?
A) Lucky 13
B) Heartbleed
C) POODLE
D) BEAST
";
        let questions = parse_questions(raw, QuizKind::Mcq);
        assert_eq!(questions.len(), 1);
        // No colon on the question line, so the whole line is kept.
        assert_eq!(
            questions[0].question_text,
            "1. Which attack targets TLS 1.0 CBC padding?"
        );
    }

    #[test]
    fn mcq_question_without_options_is_dropped() {
        let raw = "\
Question 1: An orphaned question with no options.
Question 2: What is a MAC?
A) A message authentication code
B) A hash
C) A cipher
D) A signature
";
        let questions = parse_questions(raw, QuizKind::Mcq);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "What is a MAC?");
    }

    #[test]
    fn commentary_lines_are_silently_ignored() {
        let raw = "\
Sure! Here is a quiz on hash functions.

Question 1: What property prevents finding two inputs with one digest?
Note: think carefully about this one.
A) Preimage resistance
B) Collision resistance
C) Compression
D) Avalanche effect

I hope these questions are helpful!
";
        let questions = parse_questions(raw, QuizKind::Mcq);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn true_false_questions_get_the_fixed_option_pair() {
        let raw = "\
Question 1: RC4 is a block cipher.
Question 2: HMAC can be built from SHA-256.
Question 3: Diffie-Hellman provides authentication by itself.
";
        let questions = parse_questions(raw, QuizKind::TrueFalse);
        assert_eq!(questions.len(), 3);
        for q in &questions {
            assert_eq!(q.options.len(), 2);
            assert_eq!(q.options[0].label, AnswerLabel::True);
            assert_eq!(q.options[0].text, "True");
            assert_eq!(q.options[1].label, AnswerLabel::False);
            assert_eq!(q.options[1].text, "False");
        }
        assert_eq!(questions[0].question_text, "RC4 is a block cipher.");
    }

    #[test]
    fn true_false_strips_a_leading_numeral_prefix() {
        let raw = "Question 1: 1. Entropy measures unpredictability.";
        let questions = parse_questions(raw, QuizKind::TrueFalse);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_text, "Entropy measures unpredictability.");
    }

    #[test]
    fn empty_and_garbage_input_yield_an_empty_sequence() {
        assert!(parse_questions("", QuizKind::Mcq).is_empty());
        assert!(parse_questions("no questions here at all", QuizKind::Mcq).is_empty());
        assert!(parse_questions("\n\n   \n", QuizKind::TrueFalse).is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let first = parse_questions(RSA_QUIZ, QuizKind::Mcq);
        let second = parse_questions(RSA_QUIZ, QuizKind::Mcq);
        assert_eq!(first, second);
    }
}
