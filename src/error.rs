//! Error types for the gridq crate

use thiserror::Error;

/// Main error type for the gridq crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("state ({x}, {y}) is out of bounds for a {x_dims}x{y_dims} observation space")]
    StateOutOfBounds {
        x: usize,
        y: usize,
        x_dims: usize,
        y_dims: usize,
    },

    #[error("action {action} is out of bounds (action space has {num_actions} actions)")]
    ActionOutOfBounds { action: usize, num_actions: usize },

    #[error("invalid observation {observation:?}: {reason}")]
    InvalidObservation {
        observation: Vec<i64>,
        reason: String,
    },

    #[error("value table shape {table:?} does not match environment shape {environment:?}")]
    ShapeMismatch {
        table: (usize, usize, usize),
        environment: (usize, usize, usize),
    },

    #[error("{space} space must have at least one element")]
    EmptySpace { space: String },

    #[error("observation space must have at least 2 dimensions, got {got}")]
    MissingDimensions { got: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("update for state ({x}, {y}) action {action} produced non-finite value {value}")]
    NonFiniteValue {
        x: usize,
        y: usize,
        action: usize,
        value: f64,
    },

    #[error("invalid grid: {message}")]
    InvalidGrid { message: String },

    #[error("invalid move '{input}'. Expected one of: {expected}")]
    ParseMove { input: String, expected: String },

    #[error("invalid cell '{input}' (expected format: 'x:y')")]
    ParseCell { input: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
