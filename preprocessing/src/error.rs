use thiserror::Error;

#[derive(Error, Debug)]
pub enum PreprocessingError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PreprocessingError>;
