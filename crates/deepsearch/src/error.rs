//! Error types for the research pipeline
//!
//! Text parsing never produces an error: unparseable model output degrades to a
//! conservative default. Everything here comes from configuration or from the
//! external search and generation calls, and ends the run.

use std::time::Duration;
use thiserror::Error;

/// Configuration errors, raised at construction time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing credential: set {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Typed errors for the search backend
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized - check API key")]
    Unauthorized,

    #[error("Rate limited - too many requests")]
    RateLimited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("HTTP error ({0}): {1}")]
    HttpError(u16, String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Search query is empty")]
    EmptyQuery,
}

impl SearchError {
    /// Check if this error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::Timeout
                | SearchError::Connection(_)
                | SearchError::RateLimited
                | SearchError::ServerError(_, _)
        )
    }
}

/// Top-level pipeline error
#[derive(Error, Debug)]
pub enum DeepSearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Step limit of {limit} exceeded")]
    StepLimitExceeded { limit: usize },

    #[error("Research run exceeded its time budget of {0:?}")]
    Timeout(Duration),

    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_variable() {
        let err = ConfigError::MissingCredential("TAVILY_API");
        assert!(err.to_string().contains("TAVILY_API"));
    }

    #[test]
    fn test_search_error_converts_into_pipeline_error() {
        let err: DeepSearchError = SearchError::RateLimited.into();
        assert!(matches!(err, DeepSearchError::Search(SearchError::RateLimited)));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SearchError::Timeout.is_retryable());
        assert!(SearchError::RateLimited.is_retryable());
        assert!(SearchError::ServerError(503, String::new()).is_retryable());
        assert!(!SearchError::Unauthorized.is_retryable());
        assert!(!SearchError::BadRequest("bad".into()).is_retryable());
        assert!(!SearchError::EmptyQuery.is_retryable());
    }
}
