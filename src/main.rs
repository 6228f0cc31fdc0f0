use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pivotfx::cli::OutputFormat;
use pivotfx::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for pivotfx::AppCommand {
    fn from(cmd: Commands) -> pivotfx::AppCommand {
        match cmd {
            Commands::List => pivotfx::AppCommand::List,
            Commands::Convert { base, target } => pivotfx::AppCommand::Convert { base, target },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List the currencies available in the feed
    List,
    /// Show how many TARGET units one BASE unit buys
    Convert {
        /// Currency to convert from, e.g. EUR
        base: String,
        /// Currency to convert to, e.g. CLP
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let result = match cli.command {
        Some(Commands::Setup) => pivotfx::cli::setup::setup(),
        Some(cmd) => pivotfx::run_command(cmd.into(), cli.config_path.as_deref(), format).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
