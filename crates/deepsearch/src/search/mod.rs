//! Web search capability
//!
//! A [`SearchProvider`] turns a query string into a list of loosely-typed
//! records. Records are returned raw; shaping them into
//! [`ResearchResult`](crate::state::ResearchResult)s is the search step's job.

mod tavily;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::SearchError;

pub use tavily::{SearchDepth, TavilySearch, Topic, TAVILY_SEARCH_URL};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one search and return the raw result records
    async fn search(&self, query: &str) -> Result<Vec<Value>, SearchError>;

    /// Provider name for logging/debugging
    fn name(&self) -> &str;
}
