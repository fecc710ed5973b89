//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    /// Base URL of the OpenAI-compatible completion endpoint. Defaults to a
    /// local Ollama instance.
    pub completion_base_url: String,
    /// API key sent to the completion endpoint. Ollama ignores it, but the
    /// client requires one, so any placeholder works locally.
    pub completion_api_key: String,
    pub quiz_model: String,
    /// Optional path to a plain-text file of course material used as quiz
    /// context. When unset, a built-in network-security summary is used.
    pub context_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let completion_base_url = std::env::var("COMPLETION_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434/v1".to_string());
        let completion_api_key =
            std::env::var("COMPLETION_API_KEY").unwrap_or_else(|_| "ollama".to_string());
        let quiz_model =
            std::env::var("QUIZ_MODEL").unwrap_or_else(|_| "llama3.2:latest".to_string());

        let context_path = std::env::var("CONTEXT_PATH").map(PathBuf::from).ok();

        Ok(Self {
            bind_address,
            log_level,
            completion_base_url,
            completion_api_key,
            quiz_model,
            context_path,
        })
    }
}
