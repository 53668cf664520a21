use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiptError {
    /// The host has no interactive document context to load capabilities into.
    #[error("document environment is not available: {0}")]
    EnvironmentUnavailable(String),
    #[error("rendering engine failed to load: {0}")]
    EngineLoadFailure(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("document encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
