use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RelayError {
    /// Short error code string for logs and HTTP bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::Config(_) => "CONFIG_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
