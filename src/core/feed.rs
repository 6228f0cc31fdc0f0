//! Rate feed abstractions and structured decoding of the feed body.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Key holding the pair notation, e.g. `"EUR-USD"` or `"USD/JPY"`.
pub const CODE_KEY: &str = "codigo";
/// Key holding the quoted value of the pair.
pub const VALUE_KEY: &str = "valor_actual";

/// Source of the raw rate feed.
///
/// Implementations perform exactly one retrieval per call and hold no state
/// that a later call depends on.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self) -> Result<String>;
}

/// A single pair quotation found in the feed.
///
/// `value` is `None` when the feed carried something that is not a decimal.
/// Such entries are kept so the normalizer can account for them as skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub code: String,
    pub value: Option<Decimal>,
}

/// Decodes a feed body into its pair entries, in document order.
///
/// Any JSON object carrying both [`CODE_KEY`] and [`VALUE_KEY`] is an entry,
/// wherever it sits in the document and whatever other keys it has.
pub fn decode_feed(text: &str) -> Result<Vec<FeedEntry>> {
    let document: Value = serde_json::from_str(text).context("Failed to decode rate feed")?;

    let mut entries = Vec::new();
    collect_entries(&document, &mut entries);
    Ok(entries)
}

fn collect_entries(value: &Value, entries: &mut Vec<FeedEntry>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_entries(item, entries);
            }
        }
        Value::Object(map) => {
            if let (Some(code), Some(raw_value)) = (map.get(CODE_KEY), map.get(VALUE_KEY)) {
                if let Value::String(code) = code {
                    entries.push(FeedEntry {
                        code: code.clone(),
                        value: parse_value(raw_value),
                    });
                }
                return;
            }
            for child in map.values() {
                collect_entries(child, entries);
            }
        }
        _ => {}
    }
}

/// Older feeds publish bare numbers, newer ones quoted decimal strings.
fn parse_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text),
        _ => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}
