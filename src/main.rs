use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod agent;
mod cli;
mod command;
mod config;
mod domain;
mod github;
mod llm;
mod mcp;
mod response;
mod tools;

use cli::{Cli, Commands};
use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries MCP frames or command output.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;

    if cli.mcp {
        return mcp::run_mcp_server(config).await;
    }

    match cli.command {
        Some(Commands::Ask {
            query,
            repo,
            model,
            focus,
            session,
        }) => {
            command::run_ask(
                config,
                command::AskOptions {
                    query,
                    repo,
                    model,
                    focus,
                    session,
                },
            )
            .await?;
        }
        Some(Commands::Tools { model }) => {
            command::run_tools(&config, model)?;
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'repo-analyst ask --repo owner/name \"question\"' or 'repo-analyst --mcp' to start the MCP server.");
        }
    }

    Ok(())
}
