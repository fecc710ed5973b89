//! services/api/src/prompts.rs
//!
//! Builds the prompts sent to the completion service: the quiz-generation
//! prompt, the answer-evaluation prompt, and the free-form Q&A prompt. The
//! parsers in `quizbot_core` are written against exactly the formats
//! requested here, so the templates and the parsers evolve together.

use quizbot_core::domain::{Difficulty, QuizKind};
use rand::seq::SliceRandom;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// The fixed network-security syllabus the generator draws topics from.
pub const TOPICS: [&str; 22] = [
    "OSI architecture",
    "Symmetric Encryption",
    "Rijndael",
    "Entropy",
    "Pseudorandom Number Generator",
    "Block and Stream Ciphers",
    "RC4 Stream Cipher",
    "Public-Key Cryptography",
    "RSA",
    "Homomorphic encryption",
    "Message authentication",
    "Hash functions",
    "Secure Hash Function",
    "Length Extension Attacks",
    "Message Authentication Code",
    "HMAC",
    "Authenticated Encryption",
    "TLS 1.0 Lucky 13 Attack",
    "Digital Signatures",
    "Hybrid Encryption",
    "Symmetric key distribution",
    "Diffie-Hellman Key Exchange",
];

/// Fallback course material used when no context file is configured.
pub const FALLBACK_CONTEXT: &str = "Network security covers cryptography, authentication, protocols, and security mechanisms.
Key topics include: RSA encryption, symmetric/asymmetric encryption, hash functions, digital signatures,
TLS/SSL protocols, key exchange mechanisms, and various attack vectors.";

/// How much of the course material is prepended to a generation prompt.
const CONTEXT_BUDGET_CHARS: usize = 3000;

/// The Q&A prompt gets a smaller slice; the question itself carries most of
/// the signal there.
const QA_CONTEXT_BUDGET_CHARS: usize = 2000;

/// Picks the topics for one quiz: the chosen topic when the user named one,
/// otherwise a random pair from the syllabus.
pub fn choose_topics(requested: Option<&str>) -> BTreeSet<String> {
    match requested {
        Some(topic) => BTreeSet::from([topic.to_string()]),
        None => TOPICS
            .choose_multiple(&mut rand::thread_rng(), 2)
            .map(|t| t.to_string())
            .collect(),
    }
}

fn difficulty_context(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Generate straightforward questions with clear, direct answers.",
        Difficulty::Hard => {
            "Generate challenging questions that require deep understanding and critical thinking."
        }
        Difficulty::Medium => "Generate moderately challenging questions.",
    }
}

fn topic_text(topics: &BTreeSet<String>) -> String {
    let joined = topics
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if topics.len() == 1 {
        format!("on the topic: {joined}")
    } else {
        format!("on the topics: {joined}")
    }
}

/// Builds the full generation prompt: truncated course context followed by
/// the format instructions the question parser expects.
pub fn build_generation_prompt(
    kind: QuizKind,
    difficulty: Difficulty,
    topics: &BTreeSet<String>,
    question_count: usize,
    context: &str,
) -> String {
    let topic_text = topic_text(topics);
    let prompt = match kind {
        QuizKind::Mcq => format!(
            "{difficulty_context}

Based on network security concepts, generate {question_count} multiple-choice questions {topic_text}.

Each question should have:
- A clear question
- 4 options labeled A, B, C, D
- DO NOT show the correct answer in the output

Format:
Question 1: [question text]
A) [option]
B) [option]
C) [option]
D) [option]

Generate the quiz now (without showing correct answers):",
            difficulty_context = difficulty_context(difficulty),
        ),
        QuizKind::TrueFalse => format!(
            "Based on network security concepts, generate {question_count} true/false questions {topic_text}.

Format:
Question 1: [statement]

DO NOT show the answers. Generate the quiz now:",
        ),
    };

    let context: String = context.chars().take(CONTEXT_BUDGET_CHARS).collect();
    format!("Context from network security materials:\n{context}\n\n{prompt}")
}

/// Summarizes the user's picks for the evaluator, one entry per question in
/// order: `1. A, 2. No answer, 3. True`.
pub fn summarize_user_answers(
    user_answers: &HashMap<usize, String>,
    question_count: usize,
) -> String {
    (0..question_count)
        .map(|i| {
            let answer = user_answers.get(&i).map(String::as_str).unwrap_or("No answer");
            format!("{}. {}", i + 1, answer)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds the evaluation prompt whose response the answer-key parser reads.
pub fn build_grading_prompt(
    raw_quiz_text: &str,
    user_answers: &HashMap<usize, String>,
    question_count: usize,
) -> String {
    format!(
        "You are a quiz evaluator.

Here are the quiz questions:
{raw_quiz_text}

The user's answers are:
{user_answers}

For each question, provide ONLY:
1. The correct answer (just the letter for MCQ or True/False)
2. A brief explanation (one sentence)

Format your response as:
Question 1: Correct Answer: [X], Explanation: [brief explanation]
Question 2: Correct Answer: [X], Explanation: [brief explanation]
etc.",
        user_answers = summarize_user_answers(user_answers, question_count),
    )
}

/// Builds the free-form Q&A prompt: the user's question with a truncated
/// slice of the course material for grounding.
pub fn build_question_prompt(question: &str, context: &str) -> String {
    let context: String = context.chars().take(QA_CONTEXT_BUDGET_CHARS).collect();
    format!(
        "Based on network security concepts, answer this question:

Question: {question}

Context from materials:
{context}

Provide a clear, detailed answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_named_topic_is_used_verbatim() {
        let topics = choose_topics(Some("HMAC"));
        assert_eq!(topics, BTreeSet::from(["HMAC".to_string()]));
    }

    #[test]
    fn random_mode_samples_two_distinct_syllabus_topics() {
        let topics = choose_topics(None);
        assert_eq!(topics.len(), 2);
        for topic in &topics {
            assert!(TOPICS.contains(&topic.as_str()));
        }
    }

    #[test]
    fn mcq_prompt_carries_difficulty_count_and_format() {
        let topics = BTreeSet::from(["RSA".to_string()]);
        let prompt =
            build_generation_prompt(QuizKind::Mcq, Difficulty::Hard, &topics, 5, "materials");
        assert!(prompt.starts_with("Context from network security materials:\nmaterials"));
        assert!(prompt.contains("critical thinking"));
        assert!(prompt.contains("generate 5 multiple-choice questions on the topic: RSA"));
        assert!(prompt.contains("Question 1: [question text]"));
        assert!(prompt.contains("D) [option]"));
    }

    #[test]
    fn true_false_prompt_has_no_option_scaffolding() {
        let topics = BTreeSet::from(["Entropy".to_string(), "HMAC".to_string()]);
        let prompt =
            build_generation_prompt(QuizKind::TrueFalse, Difficulty::Easy, &topics, 3, "");
        assert!(prompt.contains("generate 3 true/false questions on the topics: Entropy, HMAC"));
        assert!(prompt.contains("Question 1: [statement]"));
        assert!(!prompt.contains("A) [option]"));
    }

    #[test]
    fn oversized_context_is_truncated() {
        let context = "x".repeat(10_000);
        let topics = BTreeSet::from(["RSA".to_string()]);
        let prompt =
            build_generation_prompt(QuizKind::Mcq, Difficulty::Medium, &topics, 5, &context);
        assert!(prompt.contains(&"x".repeat(3000)));
        assert!(!prompt.contains(&"x".repeat(3001)));
    }

    #[test]
    fn answer_summary_marks_unanswered_questions() {
        let answers = HashMap::from([(0, "A".to_string()), (2, "True".to_string())]);
        assert_eq!(
            summarize_user_answers(&answers, 3),
            "1. A, 2. No answer, 3. True"
        );
    }

    #[test]
    fn question_prompt_embeds_the_question_and_truncated_context() {
        let context = "y".repeat(10_000);
        let prompt = build_question_prompt("What is RSA encryption?", &context);
        assert!(prompt.contains("Question: What is RSA encryption?"));
        assert!(prompt.contains(&"y".repeat(2000)));
        assert!(!prompt.contains(&"y".repeat(2001)));
        assert!(prompt.ends_with("Provide a clear, detailed answer:"));
    }

    #[test]
    fn grading_prompt_embeds_quiz_and_expected_format() {
        let answers = HashMap::from([(0, "B".to_string())]);
        let prompt = build_grading_prompt("Question 1: What is RSA?", &answers, 1);
        assert!(prompt.contains("Question 1: What is RSA?"));
        assert!(prompt.contains("1. B"));
        assert!(prompt.contains("Question 1: Correct Answer: [X], Explanation:"));
    }
}
