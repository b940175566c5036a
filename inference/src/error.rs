use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Vocabulary loading failed: {0}")]
    VocabularyLoad(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("Model execution failed: {0}")]
    Runtime(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    #[error("Inference unavailable: {0}")]
    Unavailable(String),
}

impl InferenceError {
    /// Errors that prevent the inference capability from starting at all.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            InferenceError::ModelLoad(_) | InferenceError::VocabularyLoad(_) | InferenceError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InferenceError>;
