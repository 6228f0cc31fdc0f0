//! Client SDK for a USD-quoted exchange rate feed.
//!
//! [`RateQueryService`] lists the currencies a feed quotes and converts between
//! any two of them through USD. Every query fetches and normalizes the feed
//! afresh; nothing is cached between calls.

pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::{
    Conversion, ConversionResult, CurrencyList, CurrencyListResult, FeedFetcher, QueryResult,
    RateQueryService, RateTable, normalize,
};
pub use crate::providers::HttpFeedFetcher;

use crate::cli::OutputFormat;
use anyhow::Result;
use tracing::{debug, info};

/// Commands the binary can run against the feed
pub enum AppCommand {
    List,
    Convert { base: String, target: String },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("pivotfx starting...");

    let config = match config_path {
        Some(path) => crate::core::config::AppConfig::load_from_path(path)?,
        None => crate::core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let fetcher = HttpFeedFetcher::new(&config.feed)?;
    let service = RateQueryService::new(fetcher);

    match command {
        AppCommand::List => cli::list::run(&service, format).await,
        AppCommand::Convert { base, target } => {
            cli::convert::run(&service, &base, &target, format).await
        }
    }
}
