//! Shared error types for the estimation pipeline

use thiserror::Error;

/// Main error type for growthmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Input contained nothing to analyze
    #[error("Empty input: nothing to analyze")]
    EmptyInput,

    /// Input exceeded the configured size limit
    #[error("Input too large: {actual} bytes exceeds limit of {limit} bytes")]
    InputTooLarge { actual: usize, limit: usize },

    /// Sampling produced too few usable samples for regression
    #[error("Insufficient samples: collected {collected}, need at least {required}")]
    InsufficientSamples { collected: usize, required: usize },

    /// The caller cancelled the analysis between stages
    #[error("Analysis cancelled before {stage}")]
    Cancelled { stage: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl Error {
    /// Create an insufficient-samples error
    pub fn insufficient_samples(collected: usize, required: usize) -> Self {
        Self::InsufficientSamples {
            collected,
            required,
        }
    }

    /// Create a cancellation error naming the stage that did not run
    pub fn cancelled(stage: impl Into<String>) -> Self {
        Self::Cancelled {
            stage: stage.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_samples_message() {
        let err = Error::insufficient_samples(2, 3);
        assert_eq!(
            err.to_string(),
            "Insufficient samples: collected 2, need at least 3"
        );
    }

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(Error::Configuration("bad sizes".into()));
        let err = result.context("loading options").unwrap_err();
        assert_eq!(
            err.to_string(),
            "loading options: Configuration error: bad sizes"
        );
    }
}
