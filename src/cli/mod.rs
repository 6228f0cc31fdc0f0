pub mod convert;
pub mod list;
pub mod setup;
pub mod ui;

use crate::core::QueryResult;
use anyhow::{Result, anyhow};
use serde::Serialize;

/// How query results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Prints a query result and turns a failed query into an error for the caller.
pub(crate) fn report<T: Serialize>(
    result: &QueryResult<T>,
    format: OutputFormat,
    render: impl Fn(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Table => match result {
            QueryResult::Success(value) => println!("{}", render(value)),
            QueryResult::Error { message } => {
                eprintln!("{}", ui::style_text(message, ui::StyleType::Error))
            }
        },
    }

    match result.message() {
        Some(message) => Err(anyhow!("{message}")),
        None => Ok(()),
    }
}
