//! Error types and handling for the travel planner

use thiserror::Error;

use crate::engine::EngineError;

/// Main error type for the travel planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors, reported to the operator and never fatal
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A phase was requested before its prerequisites exist
    #[error("Not ready: {message}")]
    NotReady { message: String },

    /// Unknown or expired session id
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    /// Failure reported by the agent engine
    #[error("Engine error: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_ready<S: Into<String>>(message: S) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    pub fn session_not_found<S: ToString>(id: S) -> Self {
        Self::SessionNotFound { id: id.to_string() }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Short machine-readable code used in API error bodies
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            PlannerError::Config { .. } => "config",
            PlannerError::Validation { .. } => "validation",
            PlannerError::NotReady { .. } => "not_ready",
            PlannerError::SessionNotFound { .. } => "session_not_found",
            PlannerError::Engine { .. } => "engine",
            PlannerError::General { .. } => "general",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file and engine settings.".to_string()
            }
            PlannerError::Validation { message } | PlannerError::NotReady { message } => {
                message.clone()
            }
            PlannerError::SessionNotFound { .. } => {
                "Your planning session has expired. Please start a new one.".to_string()
            }
            PlannerError::Engine { source } => format!(
                "The planning agents could not complete the request ({source}). Please try again."
            ),
            PlannerError::General { message } => message.clone(),
        }
    }
}
