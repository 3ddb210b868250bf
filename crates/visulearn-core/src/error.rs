//! Error types for VisuLearn Core.

use crate::parsing::ParseError;
use thiserror::Error;
use visulearn_abstraction::{Classify, FailureKind, ProviderError};

/// Core error type for VisuLearn operations.
#[derive(Error, Debug)]
pub enum VisuLearnError {
    /// Configuration errors (missing keys, invalid values)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The content plan needed before a batch could not be produced
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Provider call errors that escaped a batch
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Structured output could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file syntax errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Classify for VisuLearnError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Provider(err) => err.failure_kind(),
            Self::Parse(_) | Self::Precondition(_) => FailureKind::MalformedResponse,
            Self::Configuration(_) | Self::Io(_) | Self::Toml(_) => FailureKind::Configuration,
        }
    }
}

/// Result type alias for VisuLearn operations.
pub type Result<T> = std::result::Result<T, VisuLearnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_conversion_keeps_kind() {
        let err: VisuLearnError = ProviderError::from_status("gemini", 429, "").into();
        assert_eq!(err.failure_kind(), FailureKind::RateLimited);
        assert!(err.is_retryable());
        assert!(err.to_string().starts_with("Provider error:"));
    }

    #[test]
    fn test_precondition_is_terminal() {
        let err = VisuLearnError::Precondition("empty plan".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Precondition failed: empty plan");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VisuLearnError = io_err.into();
        match err {
            VisuLearnError::Io(_) => {}
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_parse_conversion() {
        let err: VisuLearnError = ParseError::Empty.into();
        assert!(matches!(err, VisuLearnError::Parse(ParseError::Empty)));
    }
}
