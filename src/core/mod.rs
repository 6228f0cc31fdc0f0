//! Core business logic abstractions

pub mod config;
pub mod feed;
pub mod log;
pub mod query;
pub mod rates;

// Re-export main types for cleaner imports
pub use feed::{FeedEntry, FeedFetcher};
pub use query::{
    Conversion, ConversionResult, CurrencyList, CurrencyListResult, QueryResult,
    RateQueryService,
};
pub use rates::{RateTable, normalize};
