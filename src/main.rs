//! # AI Debate Agent
//!
//! Answers a question by staging a debate: research the topic, let an
//! optimistic and a pessimistic analyst argue and rebut each other, then let
//! a judge pick a winner.
//!
//! ## Quick Start
//! ```bash
//! cargo run -- "什么是ETF"
//! cargo run -- --deep --max-depth 2 --breadth 3 "Is nuclear power cost-competitive?"
//! cargo run -- --show-graph
//! ```

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

/// Configuration management
mod config;

/// Client and service wiring
mod agent;

// =============================================================================
// IMPORTS
// =============================================================================
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rig_deliberation::{DebateOutcome, DebateRequest, DebateSettings, DeepResearchConfig, SearchStrategy, Topology};

use crate::config::Config;

// =============================================================================
// CLI ARGUMENTS
// =============================================================================
#[derive(Parser, Debug)]
#[command(
    name = "ai-debate-agent",
    version = "0.1.0",
    about = "Research a question, debate it from both sides, and judge the outcome",
    long_about = r#"
AI Debate Agent - two analysts, one judge.

For every question it will:
  1. Search the web and summarize the evidence
  2. Draft an optimistic and a pessimistic answer in parallel
  3. Let each side rebut the other
  4. Ask a judge for a winner and a summary

With --deep, research runs as a recursive plan of sub-queries instead.

MODEL:
  By default a local Ollama model is used (ollama serve; ollama pull llama3.2).
  Set MODEL_ENDPOINT, MODEL_NAME and MODEL_API_KEY to use an OpenAI-compatible API.

EXAMPLES:
  ai-debate-agent "什么是ETF"
  ai-debate-agent --strategy duckduckgo "Will remote work keep growing?"
  ai-debate-agent --deep --json "Is nuclear power cost-competitive?"
"#
)]
struct Args {
    /// The question to debate
    #[arg(value_name = "QUESTION", required_unless_present = "show_graph")]
    question: Option<String>,

    /// Search routing strategy
    #[arg(short = 's', long = "strategy", env = "SEARCH_STRATEGY")]
    strategy: Option<SearchStrategy>,

    /// Run the deep research phase before the debate
    #[arg(short = 'd', long = "deep", default_value = "false")]
    deep: bool,

    /// Deep research depth bound
    #[arg(long = "max-depth")]
    max_depth: Option<u32>,

    /// Sub-queries per deep research level
    #[arg(long = "breadth")]
    breadth: Option<u32>,

    /// Round bound for the judge; above 2 lets it request extra rebuttal rounds
    #[arg(long = "max-rounds", env = "MAX_ROUNDS")]
    max_rounds: Option<u32>,

    /// The Ollama model to use (overrides OLLAMA_MODEL env var)
    #[arg(short = 'm', long = "model", env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Print the outcome as JSON
    #[arg(long = "json", default_value = "false")]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", default_value = "false")]
    verbose: bool,

    /// Print the Mermaid diagram of the selected topology and exit
    #[arg(long = "show-graph", default_value = "false")]
    show_graph: bool,
}

impl Args {
    fn topology(&self) -> Topology {
        match self.max_rounds {
            Some(rounds) if rounds > 2 => Topology::Looping,
            _ => Topology::Standard,
        }
    }

    fn request(&self) -> DebateRequest {
        let mut request = DebateRequest::new(self.question.clone().unwrap_or_default());
        if let Some(strategy) = self.strategy {
            request = request.with_strategy(strategy);
        }
        if self.deep {
            request = request.with_deep_research(DeepResearchConfig {
                max_depth: self.max_depth,
                breadth: self.breadth,
            });
        }
        request
    }
}

// =============================================================================
// MAIN FUNCTION
// =============================================================================
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    if args.show_graph {
        let graph = if args.deep {
            Topology::DeepResearch.build()
        } else {
            args.topology().build()
        }
        .context("Debate topology failed validation")?;
        println!("{}", graph.to_mermaid());
        return Ok(());
    }

    info!("AI Debate Agent starting up...");

    let mut config = Config::from_env()?;
    if let Some(model) = &args.model {
        info!(model = %model, "Using model from command line");
        config.ollama_model = model.clone();
    }
    if let Some(strategy) = args.strategy {
        config.search_strategy = strategy;
    }
    if let Some(rounds) = args.max_rounds {
        config.max_rounds = rounds;
    }
    config.validate()?;

    let settings = DebateSettings::default()
        .with_max_rounds(config.max_rounds)
        .with_default_strategy(config.search_strategy)
        .with_llm_classification(config.llm_classification);

    let service = agent::build_service(&config, settings, args.topology())?;

    match service.run(args.request()).await {
        Ok(outcome) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        Err(e) => {
            error!(error = %e, "Debate failed");
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e.to_body())?);
            } else {
                eprintln!("\nDebate failed: {}", e);
            }
            return Err(e.into());
        }
    }

    info!("Debate completed successfully");
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================
fn print_outcome(outcome: &DebateOutcome) {
    let rule = "=".repeat(60);

    println!("\n{}", rule);
    println!("QUESTION: {}", outcome.question);
    println!("{}\n", rule);

    if let Some(summary) = &outcome.research_summary {
        println!("RESEARCH\n{}\n", summary.summary);
        for fact in &summary.key_facts {
            println!("  - {}", fact);
        }
        println!();
    }
    if !outcome.engine_usage.is_empty() {
        let usage: Vec<String> = outcome
            .engine_usage
            .iter()
            .map(|(engine, count)| format!("{}: {}", engine, count))
            .collect();
        println!("Search engines used: {}\n", usage.join(", "));
    }

    println!("OPTIMISTIC\n{}\n", outcome.optimistic_answer);
    println!("PESSIMISTIC\n{}\n", outcome.pessimistic_answer);

    println!("{}", rule);
    println!("VERDICT: {:?} (round {})", outcome.debate_winner, outcome.round);
    println!("{}", outcome.debate_summary);
    println!("{}", rule);
}

// =============================================================================
// LOGGING INITIALIZATION
// =============================================================================
/// `--verbose` forces DEBUG; otherwise RUST_LOG applies, defaulting to INFO.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

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
        let args = Args::parse_from(["test", "What is an ETF?"]);
        assert_eq!(args.question.as_deref(), Some("What is an ETF?"));
        assert!(!args.deep);
        assert!(!args.json);
        assert_eq!(args.topology(), Topology::Standard);
    }

    #[test]
    fn test_args_with_flags() {
        let args = Args::parse_from([
            "test",
            "--deep",
            "--max-depth",
            "3",
            "--breadth",
            "2",
            "--strategy",
            "ddg",
            "--max-rounds",
            "3",
            "--json",
            "Test question",
        ]);

        assert!(args.deep);
        assert!(args.json);
        assert_eq!(args.strategy, Some(SearchStrategy::DuckDuckGo));
        assert_eq!(args.topology(), Topology::Looping);

        let request = args.request();
        assert!(request.is_deep());
        assert_eq!(request.deep_research_config.unwrap().max_depth, Some(3));
    }

    #[test]
    fn test_show_graph_needs_no_question() {
        let args = Args::parse_from(["test", "--show-graph"]);
        assert!(args.show_graph);
        assert!(args.question.is_none());
    }
}
