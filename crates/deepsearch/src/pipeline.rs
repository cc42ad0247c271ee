//! Research orchestrator
//!
//! Drives one [`QueryState`] through the graph in [`crate::graph`], one step at
//! a time, starting at `search_web` and ending after `finalize_answer`.
//!
//! # Example
//!
//! ```rust,ignore
//! use deepsearch::{DeepSearch, DeepSearchConfig, TavilySearch};
//!
//! let config = DeepSearchConfig::from_env()?;
//! let pipeline = DeepSearch::builder()
//!     .with_search(Arc::new(TavilySearch::new(&config.tavily_api_key)))
//!     .with_llm(llm)
//!     .with_config(config)
//!     .build()?;
//! let answer = pipeline.research("How do heat pumps work?").await?;
//! ```

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

use crate::config::DeepSearchConfig;
use crate::error::{ConfigError, DeepSearchError};
use crate::graph::{route, Node};
use crate::llm::{LLMConfig, LLMProvider, TokenUsage};
use crate::search::SearchProvider;
use crate::state::{QueryState, ResearchResult};
use crate::steps::{build_steps, Step, StepContext};

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub final_answer: String,
    /// Terminal state of the run
    pub state: QueryState,
    /// Nodes in execution order
    pub visited: Vec<Node>,
    /// How many times `conduct_follow_up_research` ran
    pub follow_up_searches: usize,
    /// Tokens spent across all generation calls
    pub usage: TokenUsage,
}

/// The research pipeline
pub struct DeepSearch {
    /// Indexed by `Node as usize`
    steps: Vec<Box<dyn Step>>,
    ctx: Arc<StepContext>,
    max_follow_up_searches: usize,
    max_steps: usize,
    run_timeout: Option<Duration>,
}

impl DeepSearch {
    pub fn builder() -> DeepSearchBuilder {
        DeepSearchBuilder::new()
    }

    /// Research a query and return only the final answer
    pub async fn research(&self, query: &str) -> Result<String, DeepSearchError> {
        Ok(self.run(query).await?.final_answer)
    }

    /// Blocking variant of [`research`](Self::research).
    ///
    /// Drives the pipeline on a fresh current-thread runtime, so it must not be
    /// called from inside an async context.
    pub fn research_blocking(&self, query: &str) -> Result<String, DeepSearchError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.research(query))
    }

    /// Search once for the query without any generation calls
    pub async fn quick_search(&self, query: &str) -> Result<Vec<ResearchResult>, DeepSearchError> {
        self.ctx.search_and_truncate(query).await
    }

    /// Run the full pipeline
    pub async fn run(&self, query: &str) -> Result<ResearchOutcome, DeepSearchError> {
        if query.trim().is_empty() {
            return Err(DeepSearchError::EmptyQuery);
        }

        let span = info_span!("research", query = %query);
        match self.run_timeout {
            Some(limit) => tokio::time::timeout(limit, self.drive(query).instrument(span))
                .await
                .map_err(|_| DeepSearchError::Timeout(limit))?,
            None => self.drive(query).instrument(span).await,
        }
    }

    async fn drive(&self, query: &str) -> Result<ResearchOutcome, DeepSearchError> {
        let mut state = QueryState::new(query);
        let mut visited = Vec::new();
        let mut follow_up_searches = 0;
        let mut usage = TokenUsage::default();
        let mut current = Some(Node::START);

        while let Some(node) = current {
            if visited.len() >= self.max_steps {
                return Err(DeepSearchError::StepLimitExceeded {
                    limit: self.max_steps,
                });
            }

            let output = self.steps[node as usize]
                .run(&mut state)
                .instrument(info_span!("step", node = %node))
                .await?;

            visited.push(node);
            if node == Node::ConductFollowUpResearch {
                follow_up_searches += 1;
            }
            if let Some(step_usage) = output.usage {
                usage += step_usage;
            }

            let exhausted = follow_up_searches >= self.max_follow_up_searches;
            current = route(node, &state, exhausted);
            debug!(
                from = %node,
                to = current.map_or("end", |next| next.as_str()),
                needs_more_research = state.needs_more_research,
                research_complete = state.research_complete,
                pending = state.follow_up_questions.len(),
                follow_ups_exhausted = exhausted,
                "Transition"
            );
        }

        info!(
            steps = visited.len(),
            follow_up_searches,
            results = state.research_results.len(),
            total_tokens = usage.total_tokens,
            "Research complete"
        );

        Ok(ResearchOutcome {
            final_answer: state.final_answer.clone(),
            state,
            visited,
            follow_up_searches,
            usage,
        })
    }
}

/// Builder for [`DeepSearch`]
pub struct DeepSearchBuilder {
    search: Option<Arc<dyn SearchProvider>>,
    researcher: Option<Arc<dyn LLMProvider>>,
    drafter: Option<Arc<dyn LLMProvider>>,
    config: DeepSearchConfig,
}

impl DeepSearchBuilder {
    pub fn new() -> Self {
        Self {
            search: None,
            researcher: None,
            drafter: None,
            config: DeepSearchConfig::default(),
        }
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Use one provider for every generation call
    pub fn with_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.researcher = Some(llm.clone());
        self.drafter = Some(llm);
        self
    }

    /// Provider for needs-analysis and draft evaluation
    pub fn with_researcher(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.researcher = Some(llm);
        self
    }

    /// Provider for drafting and finalizing
    pub fn with_drafter(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.drafter = Some(llm);
        self
    }

    pub fn with_config(mut self, config: DeepSearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<DeepSearch, ConfigError> {
        let search = self
            .search
            .ok_or_else(|| ConfigError::Invalid("a search provider is required".to_string()))?;
        let researcher = self
            .researcher
            .ok_or_else(|| ConfigError::Invalid("a researcher LLM provider is required".to_string()))?;
        let drafter = self
            .drafter
            .ok_or_else(|| ConfigError::Invalid("a drafter LLM provider is required".to_string()))?;

        let config = self.config;
        let ctx = Arc::new(StepContext {
            search,
            researcher,
            researcher_config: LLMConfig::new(&config.researcher_model)
                .with_temperature(config.researcher_temperature),
            drafter,
            drafter_config: LLMConfig::new(&config.drafter_model)
                .with_temperature(config.drafter_temperature),
            content_limit: config.content_limit,
            fingerprint_len: config.fingerprint_len,
        });

        Ok(DeepSearch {
            steps: build_steps(ctx.clone()),
            ctx,
            max_follow_up_searches: config.max_follow_up_searches,
            max_steps: config.max_steps,
            run_timeout: config.run_timeout,
        })
    }
}

impl Default for DeepSearchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::llm::{LLMResponse, Message};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct StaticSearch;

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(&self, query: &str) -> Result<Vec<Value>, SearchError> {
            Ok(vec![json!({"content": format!("about {query}"), "url": format!("http://{query}")})])
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct Fixed(&'static str);

    #[async_trait]
    impl LLMProvider for Fixed {
        async fn complete(
            &self,
            _messages: &[Message],
            _config: Option<&LLMConfig>,
        ) -> Result<LLMResponse, DeepSearchError> {
            Ok(LLMResponse::new(Message::assistant(self.0)))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn pipeline(reply: &'static str, config: DeepSearchConfig) -> DeepSearch {
        DeepSearch::builder()
            .with_search(Arc::new(StaticSearch))
            .with_llm(Arc::new(Fixed(reply)))
            .with_config(config)
            .build()
            .unwrap()
    }

    #[test]
    fn test_steps_are_indexed_by_node() {
        let pipeline = pipeline("ok", DeepSearchConfig::default());
        for (index, step) in pipeline.steps.iter().enumerate() {
            assert_eq!(step.node() as usize, index);
        }
    }

    #[test]
    fn test_build_requires_providers() {
        let err = DeepSearch::builder().with_llm(Arc::new(Fixed("ok"))).build();
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let err = DeepSearch::builder().with_search(Arc::new(StaticSearch)).build();
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_straight_run_visits_five_steps() {
        let outcome = pipeline("Fine.", DeepSearchConfig::default())
            .run("rust")
            .await
            .unwrap();

        assert_eq!(
            outcome.visited,
            vec![
                Node::SearchWeb,
                Node::AnalyzeResearchNeeds,
                Node::DraftAnswer,
                Node::EvaluateDraft,
                Node::FinalizeAnswer,
            ]
        );
        assert_eq!(outcome.final_answer, "Fine.");
        assert_eq!(outcome.follow_up_searches, 0);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let err = pipeline("ok", DeepSearchConfig::default()).run("   ").await.unwrap_err();
        assert!(matches!(err, DeepSearchError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_step_limit() {
        let config = DeepSearchConfig {
            max_steps: 3,
            ..DeepSearchConfig::default()
        };
        let err = pipeline("ok", config).run("rust").await.unwrap_err();
        assert!(matches!(err, DeepSearchError::StepLimitExceeded { limit: 3 }));
    }

    #[tokio::test]
    async fn test_quick_search_skips_generation() {
        let results = pipeline("unused", DeepSearchConfig::default())
            .quick_search("rust")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url(), "http://rust");
    }

    #[test]
    fn test_research_blocking() {
        let answer = pipeline("Blocking answer", DeepSearchConfig::default())
            .research_blocking("rust")
            .unwrap();
        assert_eq!(answer, "Blocking answer");
    }
}
