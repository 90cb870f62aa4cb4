mod config;

use anyhow::{anyhow, bail, Context, Result};
use bat::PrettyPrinter;
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use scout::agent::Agent;
use scout::providers::anthropic::AnthropicProvider;
use scout::search::DuckDuckGoSearch;
use scout::tool_server::ToolServerClient;
use scout::tools::{ToolDispatcher, ToolExecutor};
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[derive(Parser)]
#[command(author, version, about = "Ask Claude questions with web search capability", long_about = None)]
struct Cli {
    /// The question to ask; prompts for one when omitted
    query: Vec<String>,

    /// Run web searches in-process instead of through the tool server
    #[arg(long)]
    local: bool,

    /// Model to use (can also be set via SCOUT_PROVIDER__MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Maximum number of LLM calls for one question
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_llm_calls: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    // Logs go to stderr so the answer alone lands on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut settings = match Settings::new() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    if let Some(model) = cli.model.clone() {
        settings.provider.model = model;
    }
    if let Some(max_llm_calls) = cli.max_llm_calls {
        settings.agent.max_llm_calls = max_llm_calls;
    }

    let query = if cli.query.is_empty() {
        let query: String = input("Ask claude").placeholder("").interact()?;
        query
    } else {
        cli.query.join(" ")
    };
    if query.trim().is_empty() {
        bail!("A question is required");
    }

    let executor = build_executor(&cli, &settings).await?;
    let provider = AnthropicProvider::new(settings.provider.into_config())
        .context("Failed to build the Anthropic client")?;
    let agent = Agent::new(Box::new(provider), executor, settings.agent.into_config());

    let (cancel_tx, cancel_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = cancel_tx.send(true);
    })
    .context("Failed to install the Ctrl-C handler")?;

    println!("Searching for {}", style(&query).bold());

    let spin = spinner();
    spin.start("awaiting reply");
    let result = agent.reply_with_cancel(&[], &query, cancel_rx).await;
    spin.stop("");

    match result {
        Ok(exchange) => {
            tracing::debug!(llm_calls = exchange.llm_calls, "Exchange finished");
            render(&exchange.answer)
        }
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn build_executor(cli: &Cli, settings: &Settings) -> Result<Box<dyn ToolExecutor>> {
    if cli.local {
        let search = DuckDuckGoSearch::new(settings.search.clone().into_config())
            .context("Failed to build the search client")?;
        return Ok(Box::new(ToolDispatcher::new(Arc::new(search))));
    }

    let client =
        ToolServerClient::new(&settings.tool_server.url, settings.tool_server.timeout())?;
    if !client.health().await {
        eprintln!(
            "{} tool server at {} is not reachable; start scoutd or pass --local",
            style("warning:").yellow().bold(),
            client.base_url()
        );
    }
    Ok(Box::new(client))
}

fn render(content: &str) -> Result<()> {
    if !console::user_attended() {
        println!("{}", content);
        return Ok(());
    }

    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("Failed to render answer: {}", e))?;
    println!();
    Ok(())
}
