//! Error handling for the resume matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Cross-encoder error: {0}")]
    CrossEncoder(String),

    #[error("External service failure: {0}")]
    ExternalService(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MatcherError>;

/// Convert anyhow errors (model2vec surface) to our custom error type
impl From<anyhow::Error> for MatcherError {
    fn from(err: anyhow::Error) -> Self {
        MatcherError::Embedding(err.to_string())
    }
}

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for MatcherError {
    fn from(err: candle_core::Error) -> Self {
        MatcherError::CrossEncoder(err.to_string())
    }
}
