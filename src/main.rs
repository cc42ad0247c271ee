//! # Deep Search Agent
//!
//! A research assistant that searches the web, follows up on gaps, drafts an
//! answer, critiques it and prints a final answer with references.
//!
//! ## Quick Start
//! ```bash
//! export OPENAI_API=sk-...
//! export TAVILY_API=tvly-...
//! cargo run -- "How do solid-state batteries work?"
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Provider wiring and pipeline execution
mod agent;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use deepsearch::DeepSearchConfig;

use crate::agent::ResearchAgent;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "deepsearch",
    version,
    about = "A deep research agent: web search, follow-up research and cited answers",
    long_about = r#"
Deep Search Agent - multi-step web research with citations.

For every question it will:
  1. Search the web (Tavily)
  2. Decide whether follow-up searches are needed and run them
  3. Draft an answer with inline citations
  4. Evaluate the draft and research further if it falls short
  5. Print a polished answer with a References section

PREREQUISITES:
  OPENAI_API (or OPENAI_API_KEY) and TAVILY_API (or TAVILY_API_KEY)
  set in the environment or in a .env file.

EXAMPLES:
  # Full research run
  deepsearch "What changed in the EU AI Act in 2024?"

  # Search only, no generation
  deepsearch --quick "Rust web frameworks"

  # Use a different model and allow fewer follow-up searches
  deepsearch --model gpt-4o-mini --max-follow-ups 3 "Fusion energy timeline"
"#
)]
struct Args {
    /// The research topic or question to investigate
    #[arg(help = "The question to research", value_name = "QUERY")]
    query: String,

    /// Model for every generation call (overrides RESEARCHER_MODEL / DRAFTER_MODEL)
    #[arg(
        short = 'm',
        long = "model",
        help = "OpenAI model to use",
        env = "DEEPSEARCH_MODEL"
    )]
    model: Option<String>,

    /// Upper bound on follow-up searches per run
    #[arg(
        long = "max-follow-ups",
        help = "Maximum number of follow-up searches",
        value_name = "N"
    )]
    max_follow_ups: Option<usize>,

    /// Quick search mode - just search, don't synthesize
    #[arg(
        short = 'q',
        long = "quick",
        help = "Quick search mode (no AI synthesis)",
        default_value = "false"
    )]
    quick: bool,

    /// Verbose output (debug logging)
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Enable verbose/debug logging",
        default_value = "false"
    )]
    verbose: bool,
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Deep Search Agent starting up...");

    let config = load_config(&args)?;

    info!(
        researcher = %config.researcher_model,
        drafter = %config.drafter_model,
        max_follow_ups = config.max_follow_up_searches,
        "Configuration loaded"
    );

    let agent = ResearchAgent::new(config)?;

    let result = if args.quick {
        info!("Running in quick search mode");
        agent.quick_search(&args.query).await
    } else {
        info!("Running full research mode");
        agent.research(&args.query).await
    };

    match result {
        Ok(response) => {
            println!("\n{}", "=".repeat(60));
            println!("RESEARCH RESULTS");
            println!("{}\n", "=".repeat(60));
            println!("{}", response);
            println!("\n{}", "=".repeat(60));
        }
        Err(e) => {
            error!(error = %e, "Research failed");
            eprintln!("\nResearch failed: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}

/// Load settings from the environment, then apply command-line overrides.
fn load_config(args: &Args) -> Result<DeepSearchConfig> {
    let mut config =
        DeepSearchConfig::from_env().context("Failed to load configuration from environment")?;

    if let Some(model) = &args.model {
        info!(model = %model, "Using model from command line");
        config = config.with_model(model.clone());
    }
    if let Some(max) = args.max_follow_ups {
        config = config.with_max_follow_up_searches(max);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// Initialize the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over `--verbose` when it is set.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let builder = FmtSubscriber::builder()
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    let result = match EnvFilter::try_from_default_env() {
        Ok(filter) => tracing::subscriber::set_global_default(builder.with_env_filter(filter).finish()),
        Err(_) => tracing::subscriber::set_global_default(builder.with_max_level(level).finish()),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["test", "What is Rust?"]);
        assert_eq!(args.query, "What is Rust?");
        assert!(!args.quick);
        assert!(!args.verbose);
        assert_eq!(args.max_follow_ups, None);
    }

    #[test]
    fn test_args_with_flags() {
        let args = Args::parse_from([
            "test",
            "--quick",
            "--verbose",
            "--model",
            "gpt-4o-mini",
            "--max-follow-ups",
            "3",
            "Test query",
        ]);

        assert_eq!(args.query, "Test query");
        assert!(args.quick);
        assert!(args.verbose);
        assert_eq!(args.model, Some("gpt-4o-mini".to_string()));
        assert_eq!(args.max_follow_ups, Some(3));
    }

    #[test]
    fn test_query_is_required() {
        assert!(Args::try_parse_from(["test"]).is_err());
    }
}
