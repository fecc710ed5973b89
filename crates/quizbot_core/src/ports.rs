//! crates/quizbot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The core treats the language model as an opaque text-completion
//! collaborator: prompt in, free-form text out, or a failure. Everything the
//! core does with that text is best-effort parsing; nothing here assumes a
//! particular provider or protocol.

use async_trait::async_trait;

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The external service failed or timed out. Surfaced to the caller as
    /// retryable; no session state is mutated on this path.
    #[error("The completion service is unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The opaque text-completion collaborator (e.g. a local LLM). Given a
/// prompt, it eventually returns a response string or fails; callers that
/// need a timeout wrap the call themselves and treat expiry as a
/// recoverable failure.
#[async_trait]
pub trait TextCompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}
