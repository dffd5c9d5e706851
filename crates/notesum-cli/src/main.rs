use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notesum::config::Config;
use notesum_cli::commands::{ConfigCommand, HealthCommand, StatsCommand, SummarizeCommand};
use notesum_cli::error::CliResult;
use notesum_cli::output::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "notesum-cli")]
#[command(about = "Notesum CLI - Summarize notes and inspect the notesum daemon")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Summarize a note file or stdin locally")]
    Summarize(SummarizeCommand),

    #[clap(about = "Show summarizer statistics from a running server")]
    Stats(StatsCommand),

    #[clap(about = "Check provider health on a running server")]
    Health(HealthCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    init_logging();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    match &cli.command {
        Command::Config(cmd) => cmd.execute(cli.config.as_deref(), format).await,
        Command::Summarize(_) | Command::Stats(_) | Command::Health(_) => {
            let config = Config::load(cli.config.as_deref())?;

            match &cli.command {
                Command::Summarize(cmd) => cmd.execute(&config, format).await,
                Command::Stats(cmd) => cmd.execute(&config, format).await,
                Command::Health(cmd) => cmd.execute(&config, format).await,
                Command::Config(_) => unreachable!(),
            }
        }
    }
}

/// Quiet by default so command output stays readable; `RUST_LOG` overrides
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
