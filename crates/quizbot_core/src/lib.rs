pub mod domain;
pub mod grading;
pub mod parser;
pub mod ports;
pub mod session;

pub use domain::{
    AnswerKey, AnswerLabel, Difficulty, DomainError, HistoryExport, QuestionOption,
    QuestionRecord, QuizDocument, QuizHistory, QuizKind, QuizResult,
};
pub use grading::{parse_answer_key, try_parse_grading_line};
pub use parser::parse_questions;
pub use ports::{PortError, PortResult, TextCompletionService};
pub use session::{InvalidStateError, QuizSession, SessionPhase};
