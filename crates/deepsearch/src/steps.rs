//! Pipeline steps
//!
//! Every node of the graph is a [`Step`]: one async transformation of the
//! [`QueryState`]. The only suspension points are the search and generation
//! calls. Errors from those calls propagate and end the run; parsing of model
//! output never fails.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::citations::{dedup_by_content, dedup_by_url, format_with_citations};
use crate::error::DeepSearchError;
use crate::graph::Node;
use crate::llm::{LLMConfig, LLMProvider, Message, TokenUsage};
use crate::parsing::{parse_draft_evaluation, parse_needs_analysis, DraftVerdict, NeedsAnalysis};
use crate::prompts::ResearchPrompts;
use crate::search::SearchProvider;
use crate::state::{QueryState, ResearchResult};

/// What a step reports back to the orchestrator besides its state changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    /// Tokens spent by the step's generation call, if it made one
    pub usage: Option<TokenUsage>,
}

/// A single node of the pipeline graph
#[async_trait]
pub trait Step: Send + Sync {
    /// The graph node this step implements
    fn node(&self) -> Node;

    /// Apply the step to the state
    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError>;
}

/// Providers and limits shared by all steps of one pipeline
pub struct StepContext {
    pub search: Arc<dyn SearchProvider>,
    /// Generation provider for needs-analysis and evaluation
    pub researcher: Arc<dyn LLMProvider>,
    pub researcher_config: LLMConfig,
    /// Generation provider for drafting and finalizing
    pub drafter: Arc<dyn LLMProvider>,
    pub drafter_config: LLMConfig,
    /// Max characters of `content` kept per result
    pub content_limit: usize,
    /// Characters of `content` used as the draft dedup fingerprint
    pub fingerprint_len: usize,
}

impl StepContext {
    /// Search, drop non-object records and cut content to the limit
    pub(crate) async fn search_and_truncate(&self, query: &str) -> Result<Vec<ResearchResult>, DeepSearchError> {
        if query.trim().is_empty() {
            return Err(DeepSearchError::EmptyQuery);
        }

        let raw = self.search.search(query).await?;
        let total = raw.len();
        let results: Vec<ResearchResult> = raw
            .into_iter()
            .filter_map(ResearchResult::from_value)
            .map(|mut result| {
                result.truncate_content(self.content_limit);
                result
            })
            .collect();

        if results.len() < total {
            debug!(dropped = total - results.len(), "Dropped non-object search records");
        }
        Ok(results)
    }

    async fn generate(
        provider: &dyn LLMProvider,
        messages: &[Message],
        config: &LLMConfig,
    ) -> Result<(String, StepOutput), DeepSearchError> {
        debug!(provider = provider.name(), model = %config.model, turns = messages.len(), "Calling LLM");
        let response = provider.complete(messages, Some(config)).await?;
        Ok((
            response.message.content,
            StepOutput { usage: response.usage },
        ))
    }
}

/// Search the web for the original query
pub struct SearchWeb {
    ctx: Arc<StepContext>,
}

/// Decide whether the accumulated results need follow-up research
pub struct AnalyzeResearchNeeds {
    ctx: Arc<StepContext>,
}

/// Search the oldest pending follow-up question
pub struct ConductFollowUpResearch {
    ctx: Arc<StepContext>,
}

/// Synthesize a cited draft from deduplicated results
pub struct DraftAnswer {
    ctx: Arc<StepContext>,
}

/// Judge whether the draft is sufficient
pub struct EvaluateDraft {
    ctx: Arc<StepContext>,
}

/// Produce the polished answer with a references section
pub struct FinalizeAnswer {
    ctx: Arc<StepContext>,
}

/// Build one step per graph node over a shared context
pub fn build_steps(ctx: Arc<StepContext>) -> Vec<Box<dyn Step>> {
    vec![
        Box::new(SearchWeb { ctx: ctx.clone() }),
        Box::new(AnalyzeResearchNeeds { ctx: ctx.clone() }),
        Box::new(ConductFollowUpResearch { ctx: ctx.clone() }),
        Box::new(DraftAnswer { ctx: ctx.clone() }),
        Box::new(EvaluateDraft { ctx: ctx.clone() }),
        Box::new(FinalizeAnswer { ctx }),
    ]
}

#[async_trait]
impl Step for SearchWeb {
    fn node(&self) -> Node {
        Node::SearchWeb
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        info!(query = %state.query, "Searching the web");
        let results = self.ctx.search_and_truncate(&state.query).await?;
        info!(count = results.len(), "Collected search results");
        state.append_results(results);
        Ok(StepOutput::default())
    }
}

#[async_trait]
impl Step for AnalyzeResearchNeeds {
    fn node(&self) -> Node {
        Node::AnalyzeResearchNeeds
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        info!(results = state.research_results.len(), "Analyzing research needs");
        let messages = ResearchPrompts::analyze_messages(&state.query, &state.research_results_json());
        let (response, output) =
            StepContext::generate(self.ctx.researcher.as_ref(), &messages, &self.ctx.researcher_config).await?;

        match parse_needs_analysis(&response) {
            NeedsAnalysis::Complete => {
                info!("Research judged sufficient");
                state.research_complete = true;
            }
            NeedsAnalysis::FollowUp(questions) => {
                info!(count = questions.len(), "Follow-up research requested");
                state.needs_more_research = true;
                state.enqueue_follow_ups(questions);
            }
        }
        Ok(output)
    }
}

#[async_trait]
impl Step for ConductFollowUpResearch {
    fn node(&self) -> Node {
        Node::ConductFollowUpResearch
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        let Some(question) = state.next_follow_up() else {
            debug!("No follow-up questions left");
            state.research_complete = true;
            return Ok(StepOutput::default());
        };

        info!(question = %question, pending = state.follow_up_questions.len(), "Conducting follow-up research");
        let results = self.ctx.search_and_truncate(&question).await?;
        state.append_results(
            results
                .into_iter()
                .map(|result| result.with_follow_up_query(question.clone())),
        );

        if state.follow_up_questions.is_empty() {
            state.research_complete = true;
            state.needs_more_research = false;
        }
        Ok(StepOutput::default())
    }
}

#[async_trait]
impl Step for DraftAnswer {
    fn node(&self) -> Node {
        Node::DraftAnswer
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        let unique = dedup_by_content(&state.research_results, self.ctx.fingerprint_len);
        info!(sources = unique.len(), "Drafting answer");
        let formatted = format_with_citations(&unique);

        let messages = ResearchPrompts::draft_messages(&state.query, &formatted);
        let (draft, output) =
            StepContext::generate(self.ctx.drafter.as_ref(), &messages, &self.ctx.drafter_config).await?;

        state.drafted_answer = draft;
        Ok(output)
    }
}

#[async_trait]
impl Step for EvaluateDraft {
    fn node(&self) -> Node {
        Node::EvaluateDraft
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        info!("Evaluating draft quality");
        let messages = ResearchPrompts::evaluate_messages(
            &state.query,
            &state.drafted_answer,
            &state.research_results_json(),
        );
        let (evaluation, output) =
            StepContext::generate(self.ctx.researcher.as_ref(), &messages, &self.ctx.researcher_config).await?;

        match parse_draft_evaluation(&evaluation) {
            DraftVerdict::Sufficient => {
                state.needs_more_research = false;
            }
            DraftVerdict::NeedsResearch(questions) => {
                info!(count = questions.len(), "Draft needs more research");
                state.needs_more_research = true;
                state.enqueue_follow_ups(questions);
            }
        }
        Ok(output)
    }
}

#[async_trait]
impl Step for FinalizeAnswer {
    fn node(&self) -> Node {
        Node::FinalizeAnswer
    }

    async fn run(&self, state: &mut QueryState) -> Result<StepOutput, DeepSearchError> {
        let unique = dedup_by_url(&state.research_results);
        info!(sources = unique.len(), "Finalizing answer");
        let formatted = format_with_citations(&unique);

        let messages = ResearchPrompts::finalize_messages(&state.query, &state.drafted_answer, &formatted);
        let (answer, output) =
            StepContext::generate(self.ctx.drafter.as_ref(), &messages, &self.ctx.drafter_config).await?;

        state.final_answer = answer;
        Ok(output)
    }
}
