//! Tavily Search client
//!
//! Calls the Tavily Search API and returns its `results` array untouched.
//!
//! - HTTP timeout and retry with exponential backoff
//! - Typed errors for rate limits, auth failures and timeouts

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::SearchProvider;
use crate::error::SearchError;

/// Tavily search endpoint
pub const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

/// Default timeout for Tavily API requests
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum retry attempts for transient failures
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds)
const RETRY_BASE_DELAY_MS: u64 = 1000;

/// Tavily allows at most 20 results per request
const MAX_RESULTS_CAP: u32 = 20;

/// Upper bound for configured retries
const MAX_RETRIES_CAP: u32 = 10;

/// Search depth for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    /// Fast search with basic results
    #[default]
    Basic,
    /// More thorough search with detailed results
    Advanced,
}

/// Topic filter for Tavily API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    #[default]
    General,
    News,
}

/// Request body for Tavily API
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: u32,
    search_depth: SearchDepth,
    topic: Topic,
    include_answer: bool,
    include_raw_content: bool,
}

/// Tavily search client
///
/// # Example
/// ```ignore
/// let search = TavilySearch::new("tvly-...").with_max_results(8);
/// let records = search.search("quantum computing cryptography").await?;
/// ```
#[derive(Debug, Clone)]
pub struct TavilySearch {
    api_key: String,
    client: Client,
    endpoint: String,
    max_results: u32,
    search_depth: SearchDepth,
    topic: Topic,
    timeout: Duration,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl TavilySearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: Client::new(),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            max_results: 8,
            search_depth: SearchDepth::default(),
            topic: Topic::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: MAX_RETRIES,
            retry_base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
        }
    }

    /// Point the client at a different endpoint (proxies, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Results per request, clamped to 1..=20
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_CAP);
        self
    }

    pub fn with_search_depth(mut self, depth: SearchDepth) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries for transient failures, capped at 10
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.min(MAX_RETRIES_CAP);
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Execute HTTP request with retry and backoff
    async fn execute_with_retry(&self, request: &TavilyRequest<'_>) -> Result<Value, SearchError> {
        let mut attempt = 0;
        loop {
            match self.execute_single_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.backoff_delay(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "Tavily request failed, will retry");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.retry_base_delay.saturating_mul(factor)
    }

    /// Execute a single HTTP request
    async fn execute_single_request(&self, request: &TavilyRequest<'_>) -> Result<Value, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else if e.is_connect() {
                    SearchError::Connection(e.to_string())
                } else {
                    SearchError::Network(e.to_string())
                }
            })?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| SearchError::ParseError(e.to_string()));
        }

        let error_text = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(SearchError::Unauthorized),
            429 => Err(SearchError::RateLimited),
            400 => Err(SearchError::BadRequest(error_text)),
            500..=599 => Err(SearchError::ServerError(status.as_u16(), error_text)),
            code => Err(SearchError::HttpError(code, error_text)),
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<Value>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let request = TavilyRequest {
            query,
            max_results: self.max_results,
            search_depth: self.search_depth,
            topic: self.topic,
            include_answer: false,
            include_raw_content: false,
        };

        debug!(query = %query, endpoint = %self.endpoint, "Sending Tavily search");
        let body = self.execute_with_retry(&request).await?;

        let results = match body {
            Value::Object(mut fields) => match fields.remove("results") {
                Some(Value::Array(results)) => results,
                Some(_) => {
                    return Err(SearchError::ParseError(
                        "`results` is not an array".to_string(),
                    ))
                }
                None => Vec::new(),
            },
            _ => {
                return Err(SearchError::ParseError(
                    "response body is not an object".to_string(),
                ))
            }
        };

        if results.is_empty() {
            warn!(query = %query, "No search results found");
        } else {
            info!(query = %query, count = results.len(), "Search completed");
        }

        Ok(results)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}
