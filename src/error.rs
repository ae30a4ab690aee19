use thiserror::Error;

/// Errors that can occur while loading a flow field or generating streamlines
#[derive(Debug, Error)]
pub enum FlowError {
    /// Input grid could not be parsed or has inconsistent array shapes
    #[error("Invalid input format: {0}")]
    InvalidInputFormat(String),

    /// Grid too small for bilinear sampling (needs at least 2×2)
    #[error("Invalid grid dimensions: {width}x{height} (need at least 2x2)")]
    InvalidGridDimensions { width: usize, height: usize },

    /// Configuration error (unreadable or malformed render properties)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation needs a loaded flow field
    #[error("No flow field loaded")]
    NoField,

    /// Generation was aborted through its cancel token
    #[error("Generation cancelled")]
    Cancelled,

    /// A generation is already running
    #[error("Generation already in progress")]
    Busy,

    /// Background worker failed to complete
    #[error("Worker error: {0}")]
    Join(String),
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        FlowError::InvalidInputFormat(err.to_string())
    }
}

/// Type alias for Results using FlowError
pub type Result<T> = std::result::Result<T, FlowError>;
