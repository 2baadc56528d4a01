//! Error types for PlanForge

use thiserror::Error;

/// Main error type for PlanForge operations
#[derive(Debug, Error)]
pub enum PlanForgeError {
    /// Error in solver or selector configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A numeric or temporal value range was constructed with invalid bounds
    #[error("Invalid value range: {0}")]
    InvalidRange(String),

    /// Error in domain model definition
    #[error("Domain model error: {0}")]
    DomainModel(String),

    /// No working object matches the external object
    #[error("Lookup error: {0}")]
    Lookup(String),

    /// The incrementally maintained score disagrees with a full recalculation
    #[error("Score corruption: expected {expected} but from-scratch score is {actual} ({context})")]
    ScoreCorruption {
        expected: String,
        actual: String,
        context: String,
    },

    /// Error during score calculation
    #[error("Score calculation error: {0}")]
    ScoreCalculation(String),

    /// Solver was cancelled before completion
    #[error("Solver was cancelled")]
    Cancelled,

    /// Invalid operation for current solver state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for PlanForge operations
pub type Result<T> = std::result::Result<T, PlanForgeError>;
