//! Public query surface: currency listing and USD-pivoted conversion.

use chrono::{DateTime, Local};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use tracing::{debug, instrument};

use super::feed::FeedFetcher;
use super::rates::{RateTable, normalize};

/// Fractional digits kept on a computed conversion rate.
pub const CONVERSION_SCALE: u32 = 4;

/// Display format of query timestamps: day-month-year and time.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Outcome of a query. Every query ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum QueryResult<T> {
    Success(T),
    Error { message: String },
}

impl<T> QueryResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success(_))
    }

    /// Failure message, if the query failed.
    pub fn message(&self) -> Option<&str> {
        match self {
            QueryResult::Success(_) => None,
            QueryResult::Error { message } => Some(message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            QueryResult::Success(value) => Ok(value),
            QueryResult::Error { message } => Err(message),
        }
    }
}

impl<T> From<Result<T, QueryError>> for QueryResult<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => QueryResult::Success(value),
            Err(e) => {
                debug!(error = %e, "Query failed");
                QueryResult::Error {
                    message: e.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyList {
    pub count: usize,
    pub currencies: Vec<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub queried_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// Pair code formatted as `BASE-TARGET`.
    pub code: String,
    /// Units of `target` per one unit of `base`.
    pub rate: Decimal,
    pub base: String,
    pub target: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub queried_at: DateTime<Local>,
}

pub type CurrencyListResult = QueryResult<CurrencyList>;
pub type ConversionResult = QueryResult<Conversion>;

/// Formats a query timestamp for display.
pub fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn serialize_timestamp<S>(timestamp: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

/// Which side of a conversion a currency was requested on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Base => write!(f, "base"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Reasons a query fails. Rendered into [`QueryResult::Error`] messages.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to fetch rate feed: {0:#}")]
    Transport(anyhow::Error),
    #[error("Failed to parse rate feed: {0:#}")]
    Feed(anyhow::Error),
    #[error("The {side} currency '{code}' was not found in the rate feed")]
    UnknownCurrency { side: Side, code: String },
    #[error("The target currency '{code}' has a zero rate, conversion is undefined")]
    ZeroRate { code: String },
}

/// Divides two USD-relative rates into a direct `base -> target` rate,
/// rounded half-up to [`CONVERSION_SCALE`] places.
pub fn cross_rate(table: &RateTable, base: &str, target: &str) -> Result<Decimal, QueryError> {
    let base_rate = table.get(base).ok_or_else(|| QueryError::UnknownCurrency {
        side: Side::Base,
        code: base.to_string(),
    })?;
    let target_rate = table.get(target).ok_or_else(|| QueryError::UnknownCurrency {
        side: Side::Target,
        code: target.to_string(),
    })?;

    let rate = base_rate
        .checked_div(target_rate)
        .ok_or_else(|| QueryError::ZeroRate {
            code: target.to_string(),
        })?;
    Ok(rate.round_dp_with_strategy(CONVERSION_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// Answers currency queries from a freshly fetched feed on every call.
pub struct RateQueryService<F: FeedFetcher> {
    fetcher: F,
}

impl<F: FeedFetcher> RateQueryService<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Lists every currency the feed quotes against USD, sorted.
    #[instrument(name = "ListCurrencies", skip(self))]
    pub async fn list_currencies(&self) -> CurrencyListResult {
        self.try_list_currencies().await.into()
    }

    /// Rate of one unit of `base` in `target` units. Codes are case-insensitive.
    #[instrument(name = "Convert", skip(self))]
    pub async fn convert(&self, base: &str, target: &str) -> ConversionResult {
        self.try_convert(base, target).await.into()
    }

    async fn try_list_currencies(&self) -> Result<CurrencyList, QueryError> {
        let table = self.load_table().await?;
        let currencies = table.codes();

        Ok(CurrencyList {
            count: currencies.len(),
            currencies,
            queried_at: Local::now(),
        })
    }

    async fn try_convert(&self, base: &str, target: &str) -> Result<Conversion, QueryError> {
        let base = base.trim().to_uppercase();
        let target = target.trim().to_uppercase();

        let table = self.load_table().await?;
        let rate = cross_rate(&table, &base, &target)?;
        debug!(%base, %target, %rate, "Computed conversion rate");

        Ok(Conversion {
            code: format!("{base}-{target}"),
            rate,
            base,
            target,
            queried_at: Local::now(),
        })
    }

    async fn load_table(&self) -> Result<RateTable, QueryError> {
        let text = self.fetcher.fetch().await.map_err(QueryError::Transport)?;
        normalize(&text).map_err(QueryError::Feed)
    }
}
