//! deepsearch: a multi-step web research pipeline
//!
//! Given a question, the pipeline searches the web, decides whether follow-up
//! searches are needed, drafts a cited answer, evaluates the draft and writes a
//! final answer with a references section.
//!
//! - `SearchProvider` trait: web search (Tavily via `TavilySearch`)
//! - `LLMProvider` trait: text generation (any Rig agent via `RigAgentAdapter`)
//! - `DeepSearch`: the orchestrator that walks the step graph
//!
//! # Example
//!
//! ```rust,ignore
//! use rig::providers::openai::Client;
//! use rig::client::{CompletionClient, ProviderClient};
//! use deepsearch::{DeepSearch, DeepSearchConfig, RigAgentAdapter, TavilySearch};
//!
//! let config = DeepSearchConfig::from_env()?;
//! let client = Client::from_env();
//! let llm = RigAgentAdapter::new(client.agent(&config.drafter_model).build());
//!
//! let pipeline = DeepSearch::builder()
//!     .with_search(Arc::new(TavilySearch::new(&config.tavily_api_key)))
//!     .with_llm(Arc::new(llm))
//!     .with_config(config)
//!     .build()?;
//!
//! println!("{}", pipeline.research("What is retrieval-augmented generation?").await?);
//! ```

pub mod error;
pub mod config;
pub mod state;
pub mod llm;
pub mod compat;
pub mod search;
pub mod prompts;
pub mod parsing;
pub mod citations;
pub mod steps;
pub mod graph;
pub mod pipeline;

// Re-exports for convenience
pub use error::{ConfigError, DeepSearchError, SearchError};
pub use config::DeepSearchConfig;
pub use state::{QueryState, ResearchResult};
pub use llm::{LLMConfig, LLMProvider, LLMResponse, Message, Role, TokenUsage};
pub use compat::RigAgentAdapter;
pub use search::{SearchDepth, SearchProvider, TavilySearch, Topic};
pub use prompts::ResearchPrompts;
pub use parsing::{DraftVerdict, NeedsAnalysis};
pub use steps::{Step, StepOutput};
pub use graph::Node;
pub use pipeline::{DeepSearch, DeepSearchBuilder, ResearchOutcome};
