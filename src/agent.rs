//! # Agent Module
//!
//! Wires concrete providers into the research pipeline:
//! - OpenAI chat models through Rig, wrapped in `RigAgentAdapter`
//! - Tavily web search through `TavilySearch`

use std::sync::Arc;

use anyhow::{Context, Result};
use rig::client::{CompletionClient, ProviderClient};
use rig::providers::openai;
use tracing::{debug, info};

use deepsearch::{DeepSearch, DeepSearchConfig, RigAgentAdapter, TavilySearch};

// =============================================================================
// RESEARCH AGENT STRUCT
// =============================================================================
/// The research agent: a configured pipeline plus the settings it was built from.
pub struct ResearchAgent {
    config: DeepSearchConfig,
    pipeline: DeepSearch,
}

impl ResearchAgent {
    /// Build the OpenAI and Tavily providers and assemble the pipeline.
    ///
    /// Research and drafting use separate Rig agents so each can run its own
    /// model; the per-call temperature is applied by the pipeline.
    ///
    /// Must be called from within a tokio runtime: building a Rig agent spawns
    /// its tool server task.
    pub fn new(config: DeepSearchConfig) -> Result<Self> {
        let client = openai::Client::from_val(config.openai_api_key.clone().into());

        let researcher = RigAgentAdapter::with_names(
            client.agent(&config.researcher_model).build(),
            "openai",
            config.researcher_model.clone(),
        );
        let drafter = RigAgentAdapter::with_names(
            client.agent(&config.drafter_model).build(),
            "openai",
            config.drafter_model.clone(),
        );

        let search = TavilySearch::new(config.tavily_api_key.clone())
            .with_max_results(config.max_search_results);

        debug!(
            researcher = %config.researcher_model,
            drafter = %config.drafter_model,
            max_results = config.max_search_results,
            "Providers configured"
        );

        let pipeline = DeepSearch::builder()
            .with_search(Arc::new(search))
            .with_researcher(Arc::new(researcher))
            .with_drafter(Arc::new(drafter))
            .with_config(config.clone())
            .build()
            .context("Failed to assemble research pipeline")?;

        Ok(Self { config, pipeline })
    }

    /// Run the full pipeline and return the final answer.
    pub async fn research(&self, query: &str) -> Result<String> {
        info!(
            query = %query,
            max_follow_ups = self.config.max_follow_up_searches,
            "Starting research task"
        );

        let outcome = self
            .pipeline
            .run(query)
            .await
            .context("Research pipeline failed")?;

        info!(
            follow_up_searches = outcome.follow_up_searches,
            sources = outcome.state.research_results.len(),
            total_tokens = outcome.usage.total_tokens,
            "Research completed successfully"
        );

        Ok(outcome.final_answer)
    }

    /// Perform a single search without any generation calls.
    pub async fn quick_search(&self, query: &str) -> Result<String> {
        info!(query = %query, "Performing quick search");

        let results = self
            .pipeline
            .quick_search(query)
            .await
            .context("Search failed")?;

        if results.is_empty() {
            return Ok(format!("No results found for: {}", query));
        }

        let formatted: String = results
            .iter()
            .enumerate()
            .map(|(i, r)| {
                format!(
                    "{}. **{}**\n   {}\n   URL: {}\n",
                    i + 1,
                    r.title().unwrap_or("Untitled"),
                    r.content(),
                    r.url()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(format!("## Search Results\n\n{}", formatted))
    }
}
