use crate::components::schedule::models::FieldErrors;
use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the dashboard
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Validation failed: {0}")]
    #[diagnostic(code(congregation_calendar::validation))]
    Validation(FieldErrors),

    #[error("Schedule not found: {0}")]
    #[diagnostic(code(congregation_calendar::not_found))]
    NotFound(String),

    #[error("Failed to load schedules: {0}")]
    #[diagnostic(code(congregation_calendar::load))]
    Load(String),

    #[error("Remote store error: {0}")]
    #[diagnostic(code(congregation_calendar::remote))]
    Remote(String),

    #[error("Another save or delete is still in progress")]
    #[diagnostic(code(congregation_calendar::busy))]
    Busy,

    #[error("Invalid editor transition: {0}")]
    #[diagnostic(code(congregation_calendar::editor))]
    InvalidTransition(String),

    #[error("Session error: {0}")]
    #[diagnostic(code(congregation_calendar::session))]
    Session(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(congregation_calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(congregation_calendar::config))]
    Config(String),

    #[error("Component error: {0}")]
    #[diagnostic(code(congregation_calendar::component))]
    Component(String),

    #[error(transparent)]
    #[diagnostic(code(congregation_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(congregation_calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(congregation_calendar::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Transport failures talking to the schedule backend
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Remote(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Session(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create component errors
pub fn component_error(message: &str) -> Error {
    Error::Component(message.to_string())
}

/// Helper to create remote store errors
pub fn remote_error(message: &str) -> Error {
    Error::Remote(message.to_string())
}

/// Helper to create session errors
pub fn session_error(message: &str) -> Error {
    Error::Session(message.to_string())
}

/// Helper to create editor transition errors
pub fn transition_error(message: &str) -> Error {
    Error::InvalidTransition(message.to_string())
}
