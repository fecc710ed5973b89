//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use chrono::{DateTime, Utc};
use quizbot_core::domain::QuizHistory;
use quizbot_core::ports::TextCompletionService;
use quizbot_core::session::QuizSession;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One answered question in the Q&A conversation.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// The shared application state, created once at startup and passed to all
/// handlers.
///
/// The session, the history, and the chat log live behind async mutexes:
/// the quiz flow is strictly request/response, and the history aggregates
/// are running sums, so every mutation goes through a serialized write path.
pub struct AppState {
    pub config: Arc<Config>,
    pub completion: Arc<dyn TextCompletionService>,
    /// The course material prepended to generation prompts, loaded once at
    /// startup (configured file or the built-in fallback).
    pub context: String,
    pub session: Mutex<QuizSession>,
    pub history: Mutex<QuizHistory>,
    pub chat_history: Mutex<Vec<ChatExchange>>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        completion: Arc<dyn TextCompletionService>,
        context: String,
    ) -> Self {
        Self {
            config,
            completion,
            context,
            session: Mutex::new(QuizSession::new()),
            history: Mutex::new(QuizHistory::new()),
            chat_history: Mutex::new(Vec::new()),
        }
    }
}
