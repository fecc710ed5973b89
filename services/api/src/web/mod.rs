pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary
// that builds the web server router.
pub use rest::{
    ask_question_handler, clear_history_handler, generate_quiz_handler, get_chat_handler,
    get_history_handler, record_answer_handler, submit_quiz_handler,
};
