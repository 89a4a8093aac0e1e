// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Not-found conditions are not errors: lookups return `Option`, and
/// mutations on missing entities return `false`/`None`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
