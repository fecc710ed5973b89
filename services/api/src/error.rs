//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service.

use crate::config::ConfigError;
use quizbot_core::ports::PortError;
use quizbot_core::session::InvalidStateError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the completion port.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a quiz-session operation invoked from the wrong phase.
    #[error("Session Error: {0}")]
    Session(#[from] InvalidStateError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}
