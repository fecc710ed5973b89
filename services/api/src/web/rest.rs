//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! The handlers own the two pipeline runs: generation (prompt -> completion
//! -> question parsing -> session start) and submission (grading prompt ->
//! completion -> answer-key parsing -> score -> history). A completion
//! failure on either run leaves the session exactly as it was, so the user
//! can simply retry. The free-form Q&A endpoint shares the completion port
//! and the loaded course context but none of the session machinery.

use crate::prompts;
use crate::web::state::{AppState, ChatExchange};
use chrono::Utc;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use quizbot_core::domain::{Difficulty, QuizDocument, QuizKind, QuizResult};
use quizbot_core::grading::parse_answer_key;
use quizbot_core::parser::parse_questions;
use quizbot_core::session::{InvalidStateError, SessionPhase};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_quiz_handler,
        record_answer_handler,
        submit_quiz_handler,
        get_history_handler,
        clear_history_handler,
        ask_question_handler,
        get_chat_handler,
    ),
    components(
        schemas(
            GenerateQuizRequest,
            RecordAnswerRequest,
            QuizView,
            QuestionView,
            OptionView,
            QuizResultView,
            HistoryView,
            AskQuestionRequest,
            ChatExchangeView,
        )
    ),
    tags(
        (name = "QuizBot API", description = "API endpoints for the network-security quiz generator.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload for generating a new quiz.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateQuizRequest {
    /// `"Multiple Choice (MCQ)"` (or `"mcq"`) vs. `"True/False"` (or `"true_false"`).
    #[schema(value_type = String)]
    pub kind: QuizKind,
    #[schema(value_type = Option<String>)]
    pub difficulty: Option<Difficulty>,
    /// A specific syllabus topic; omitted means two random topics.
    pub topic: Option<String>,
    /// Defaults to 5, clamped to the 3..=10 range the UI offers.
    pub question_count: Option<usize>,
    pub timer_enabled: Option<bool>,
}

/// The request payload for recording one answer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordAnswerRequest {
    /// 0-based question index.
    pub index: usize,
    /// The selected label, e.g. `"B"` or `"True"`.
    pub label: String,
}

#[derive(Serialize, ToSchema)]
pub struct OptionView {
    pub label: String,
    pub text: String,
}

#[derive(Serialize, ToSchema)]
pub struct QuestionView {
    pub index: usize,
    pub question_text: String,
    pub options: Vec<OptionView>,
}

/// The response payload sent after successfully generating a quiz.
#[derive(Serialize, ToSchema)]
pub struct QuizView {
    pub session_id: Uuid,
    pub kind: String,
    pub difficulty: String,
    pub topics: Vec<String>,
    pub questions: Vec<QuestionView>,
}

/// One scored quiz attempt, in the export document's field names.
#[derive(Serialize, ToSchema)]
pub struct QuizResultView {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub difficulty: String,
    pub topics: Vec<String>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub percentage: f64,
    pub time_taken: Option<u64>,
}

impl From<&QuizResult> for QuizResultView {
    fn from(result: &QuizResult) -> Self {
        Self {
            date: result.timestamp.to_rfc3339(),
            kind: result.kind.to_string(),
            difficulty: result.difficulty.to_string(),
            topics: result.topics.iter().cloned().collect(),
            total_questions: result.question_count,
            correct_answers: result.correct_count,
            percentage: result.percentage,
            time_taken: result.elapsed_seconds,
        }
    }
}

/// The history export document.
#[derive(Serialize, ToSchema)]
pub struct HistoryView {
    pub total_quizzes: usize,
    pub total_questions: usize,
    pub total_correct: usize,
    pub accuracy: f64,
    pub quiz_history: Vec<QuizResultView>,
}

/// The request payload for the free-form Q&A endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AskQuestionRequest {
    /// A free-form question, e.g. `"What is RSA encryption?"`.
    pub question: String,
}

/// One question/answer pair from the Q&A conversation.
#[derive(Serialize, ToSchema)]
pub struct ChatExchangeView {
    pub question: String,
    pub answer: String,
    pub asked_at: String,
}

impl From<&ChatExchange> for ChatExchangeView {
    fn from(exchange: &ChatExchange) -> Self {
        Self {
            question: exchange.question.clone(),
            answer: exchange.answer.clone(),
            asked_at: exchange.asked_at.to_rfc3339(),
        }
    }
}

fn conflict(err: InvalidStateError) -> (StatusCode, String) {
    (StatusCode::CONFLICT, err.to_string())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a new quiz and start a session for it.
///
/// Runs the generation pipeline end to end. If the completion call fails or
/// the response yields no parseable questions, the active session is left
/// untouched and the client should retry.
#[utoipa::path(
    post,
    path = "/quiz",
    request_body = GenerateQuizRequest,
    responses(
        (status = 201, description = "Quiz generated and session started", body = QuizView),
        (status = 502, description = "Generation failed or produced no parseable questions; retry")
    )
)]
pub async fn generate_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let kind = payload.kind;
    let difficulty = payload.difficulty.unwrap_or_default();
    let question_count = payload.question_count.unwrap_or(5).clamp(3, 10);
    let timer_enabled = payload.timer_enabled.unwrap_or(false);
    let topics = prompts::choose_topics(payload.topic.as_deref());

    let prompt = prompts::build_generation_prompt(
        kind,
        difficulty,
        &topics,
        question_count,
        &app_state.context,
    );

    let raw_text = app_state.completion.complete(&prompt).await.map_err(|e| {
        error!(error = %e, "Quiz generation request failed");
        (
            StatusCode::BAD_GATEWAY,
            "Quiz generation failed; please try again.".to_string(),
        )
    })?;

    let questions = parse_questions(&raw_text, kind);
    if questions.is_empty() {
        warn!(
            response_chars = raw_text.len(),
            "Generation response yielded no parseable questions"
        );
        return Err((
            StatusCode::BAD_GATEWAY,
            "The model produced no parseable questions; please try again.".to_string(),
        ));
    }

    let document = QuizDocument {
        raw_text,
        kind,
        difficulty,
        topics,
        questions,
    };

    let questions = document
        .questions
        .iter()
        .enumerate()
        .map(|(index, q)| QuestionView {
            index,
            question_text: q.question_text.clone(),
            options: q
                .options
                .iter()
                .map(|o| OptionView {
                    label: o.label.to_string(),
                    text: o.text.clone(),
                })
                .collect(),
        })
        .collect();
    let topics = document.topics.iter().cloned().collect();
    let question_count = document.question_count();

    let mut session = app_state.session.lock().await;
    session.start(document, timer_enabled);

    info!(
        session_id = %session.id(),
        question_count,
        %kind,
        %difficulty,
        "Quiz generated"
    );

    let response = QuizView {
        session_id: session.id(),
        kind: kind.to_string(),
        difficulty: difficulty.to_string(),
        topics,
        questions,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Record the user's answer to one question of the active quiz.
#[utoipa::path(
    post,
    path = "/quiz/answers",
    request_body = RecordAnswerRequest,
    responses(
        (status = 204, description = "Answer recorded"),
        (status = 409, description = "No quiz in progress")
    )
)]
pub async fn record_answer_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut session = app_state.session.lock().await;
    session
        .record_answer(payload.index, payload.label)
        .map_err(conflict)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit the active quiz for grading and return the scored result.
///
/// The grading call happens before the session is advanced, so a completion
/// failure leaves the quiz in progress and the submission can be retried.
#[utoipa::path(
    post,
    path = "/quiz/submit",
    responses(
        (status = 200, description = "Quiz graded and recorded", body = QuizResultView),
        (status = 409, description = "No quiz in progress"),
        (status = 502, description = "Grading failed; retry")
    )
)]
pub async fn submit_quiz_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut session = app_state.session.lock().await;
    if session.phase() != SessionPhase::InProgress {
        return Err(conflict(InvalidStateError {
            operation: "submit",
            phase: session.phase(),
        }));
    }
    let document = session.document().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Session has no active document".to_string(),
        )
    })?;

    let prompt = prompts::build_grading_prompt(
        &document.raw_text,
        session.user_answers(),
        document.question_count(),
    );

    let grading_text = app_state.completion.complete(&prompt).await.map_err(|e| {
        error!(error = %e, "Grading request failed");
        (
            StatusCode::BAD_GATEWAY,
            "Grading failed; please submit again.".to_string(),
        )
    })?;

    let key = parse_answer_key(&grading_text);
    if key.is_empty() {
        warn!(
            response_chars = grading_text.len(),
            "Grading response yielded no answer key entries; every question will score as incorrect"
        );
    }

    session.submit().map_err(conflict)?;
    session.apply_answer_key(key).map_err(conflict)?;

    let mut history = app_state.history.lock().await;
    let result = session.commit_to_history(&mut history).map_err(conflict)?;

    info!(
        session_id = %session.id(),
        correct = result.correct_count,
        total = result.question_count,
        percentage = result.percentage,
        "Quiz graded"
    );

    Ok(Json(QuizResultView::from(&result)))
}

/// Fetch the history export document with running aggregates.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "Quiz history and aggregates", body = HistoryView)
    )
)]
pub async fn get_history_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let history = app_state.history.lock().await;
    let export = history.export();
    Json(HistoryView {
        total_quizzes: export.total_quizzes,
        total_questions: export.total_questions,
        total_correct: export.total_correct,
        accuracy: export.accuracy,
        quiz_history: export.quiz_history.iter().map(QuizResultView::from).collect(),
    })
}

/// Answer a free-form question about the course material.
///
/// The answer is grounded in the loaded context and the exchange is appended
/// to the in-memory chat log. A completion failure leaves the log untouched.
#[utoipa::path(
    post,
    path = "/ask",
    request_body = AskQuestionRequest,
    responses(
        (status = 200, description = "Question answered", body = ChatExchangeView),
        (status = 400, description = "Blank question"),
        (status = 502, description = "Answering failed; retry")
    )
)]
pub async fn ask_question_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AskQuestionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let question = payload.question.trim().to_string();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "The question must not be empty.".to_string(),
        ));
    }

    let prompt = prompts::build_question_prompt(&question, &app_state.context);
    let answer = app_state.completion.complete(&prompt).await.map_err(|e| {
        error!(error = %e, "Q&A request failed");
        (
            StatusCode::BAD_GATEWAY,
            "Answering failed; please try again.".to_string(),
        )
    })?;

    let exchange = ChatExchange {
        question,
        answer,
        asked_at: Utc::now(),
    };
    let view = ChatExchangeView::from(&exchange);

    let mut chat_history = app_state.chat_history.lock().await;
    chat_history.push(exchange);
    info!(exchanges = chat_history.len(), "Question answered");

    Ok(Json(view))
}

/// Fetch the Q&A conversation, oldest exchange first.
#[utoipa::path(
    get,
    path = "/chat",
    responses(
        (status = 200, description = "The chat log", body = [ChatExchangeView])
    )
)]
pub async fn get_chat_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let chat_history = app_state.chat_history.lock().await;
    Json(
        chat_history
            .iter()
            .map(ChatExchangeView::from)
            .collect::<Vec<_>>(),
    )
}

/// Clear the quiz history and its aggregates.
#[utoipa::path(
    delete,
    path = "/history",
    responses(
        (status = 204, description = "History cleared")
    )
)]
pub async fn clear_history_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut history = app_state.history.lock().await;
    history.clear();
    info!("Quiz history cleared");
    StatusCode::NO_CONTENT
}
