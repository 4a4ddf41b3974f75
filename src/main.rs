mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use membridge::config::BridgeConfig;
use membridge::worker::SearchOptions;

#[derive(Parser)]
#[command(name = "membridge", version, about = "Bridge coding-agent events to a memory worker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bridge newline-delimited host events from stdin to the worker
    Serve,
    /// Probe the worker and print a health report
    Status,
    /// Search captured memories
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
        /// Observation type filter (e.g. bash, file, web)
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Print the memory context block for a project
    Context {
        /// Defaults to the current directory's project
        project: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = BridgeConfig::load()?;

    // Log to stderr so stdout stays clean for command output.
    let filter = EnvFilter::try_new(&config.logging.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => cli::serve::serve(config).await?,
        Command::Status => cli::status::status(&config).await?,
        Command::Search {
            query,
            limit,
            kind,
            project,
        } => {
            let options = SearchOptions {
                limit,
                kind,
                project,
            };
            cli::search::search(&config, &query, &options).await?;
        }
        Command::Context { project } => {
            cli::context::context(&config, project.as_deref()).await?;
        }
    }

    Ok(())
}
