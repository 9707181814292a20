//! value-agent: minimal host for the `buffett_analysis` tool.
//!
//! Registers the tool the way an agent runtime would, then invokes it once per
//! ticker given on the command line.
//!
//! Usage:
//!   cargo run -p value-agent -- AAPL MSFT KO
//!   cargo run -p value-agent -- --list-tools
//!   cargo run -p value-agent -- --json AAPL

use std::sync::Arc;

use agent_tools::{register_buffett_analysis, ToolRegistry, BUFFETT_TOOL_NAME};
use anyhow::Result;
use value_analysis::ValueScorer;
use yahoo_client::YahooClient;

mod config;

use config::AgentConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AgentConfig::from_env()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "value_agent=info,value_analysis=info,agent_tools=info,yahoo_client=warn".into()
    });
    if config.json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let list_tools = args.iter().any(|a| a == "--list-tools");
    let json_output = args.iter().any(|a| a == "--json");
    let tickers: Vec<&str> = args
        .iter()
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.as_str())
        .collect();

    tracing::debug!(base_url = %config.yahoo.base_url, use_crumb = config.yahoo.use_crumb, "Configuration loaded");

    let client = YahooClient::new(config.yahoo.clone())?;
    let scorer = Arc::new(ValueScorer::new(client));

    let mut registry = ToolRegistry::new();
    register_buffett_analysis(&mut registry, scorer)?;

    if list_tools {
        println!("{}", serde_json::to_string_pretty(&registry.specs())?);
        return Ok(());
    }

    if tickers.is_empty() {
        eprintln!("usage: value-agent [--json] [--list-tools] <TICKER>...");
        std::process::exit(2);
    }

    let mut failures = 0usize;
    for ticker in &tickers {
        let result = registry
            .dispatch(BUFFETT_TOOL_NAME, serde_json::json!({ "ticker": ticker }))
            .await;
        if !result.success {
            failures += 1;
        }

        if json_output {
            println!("{}", serde_json::to_string(&result)?);
        } else if result.success {
            println!("{}\n", result.output);
        } else {
            eprintln!(
                "{}: {}",
                ticker,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    if failures > 0 {
        tracing::error!("{} of {} analyses failed", failures, tickers.len());
        std::process::exit(1);
    }

    Ok(())
}
