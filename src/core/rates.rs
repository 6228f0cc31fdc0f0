//! USD-relative rate table built from pair quotations.

use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use tracing::debug;

use super::feed::{FeedEntry, decode_feed};

/// The pivot every rate in the table is expressed against.
pub const PIVOT: &str = "USD";

/// Fractional digits kept when inverting a `USD/XXX` quotation.
pub const INVERSE_SCALE: u32 = 8;

/// Maps a currency code to the number of USD one unit of it is worth.
///
/// Always holds `USD -> 1`. Keys are kept sorted so listings come out in
/// lexicographic order.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, Decimal>,
}

/// How a pair quotation relates to the pivot.
#[derive(Debug, PartialEq)]
enum Quotation {
    /// `XXX/USD`: one XXX is worth `value` USD.
    Direct(String),
    /// `USD/XXX`: one USD is worth `value` XXX.
    Inverse(String),
    /// Neither side is USD.
    Cross,
}

impl RateTable {
    /// A table holding only the pivot.
    pub fn new() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(PIVOT.to_string(), Decimal::ONE);
        Self { rates }
    }

    /// Builds a table from feed entries, dropping any entry that can't be used.
    ///
    /// Direct quotations always overwrite while inverse quotations only fill
    /// codes that are still missing. The two policies disagree when a feed
    /// quotes the same currency both ways; the feed's published behaviour
    /// depends on it, so both are kept as is.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = FeedEntry>,
    {
        let mut table = Self::new();
        let mut accepted = 0usize;
        let mut skipped = 0usize;

        for entry in entries {
            if table.apply(&entry) {
                accepted += 1;
            } else {
                skipped += 1;
            }
        }

        debug!(
            accepted,
            skipped,
            currencies = table.len(),
            "Normalized rate feed"
        );
        table
    }

    /// Applies one entry, returning whether it was used.
    fn apply(&mut self, entry: &FeedEntry) -> bool {
        let Some(quotation) = classify(&entry.code) else {
            debug!(code = %entry.code, "Skipping entry with malformed pair code");
            return false;
        };
        let Some(value) = entry.value else {
            debug!(code = %entry.code, "Skipping entry with non-numeric value");
            return false;
        };

        match quotation {
            Quotation::Direct(code) => {
                self.rates.insert(code, value);
                true
            }
            Quotation::Inverse(code) => {
                if value.is_zero() {
                    debug!(code = %entry.code, "Skipping inverse entry with zero value");
                    return false;
                }
                if self.rates.contains_key(&code) {
                    debug!(code = %entry.code, "Inverse entry ignored, rate already known");
                    return false;
                }
                match Decimal::ONE.checked_div(value) {
                    Some(reciprocal) => {
                        let rate = reciprocal.round_dp_with_strategy(
                            INVERSE_SCALE,
                            RoundingStrategy::MidpointAwayFromZero,
                        );
                        self.rates.insert(code, rate);
                        true
                    }
                    None => {
                        debug!(code = %entry.code, "Skipping inverse entry, reciprocal overflows");
                        false
                    }
                }
            }
            Quotation::Cross => {
                debug!(code = %entry.code, "Skipping cross pair");
                false
            }
        }
    }

    /// USD value of one unit of `code`.
    pub fn get(&self, code: &str) -> Option<Decimal> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Known currency codes in lexicographic order.
    pub fn codes(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Never true in practice since the pivot is always present.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.rates.iter().map(|(code, rate)| (code.as_str(), *rate))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses raw feed text straight into a rate table.
pub fn normalize(text: &str) -> Result<RateTable> {
    let entries = decode_feed(text)?;
    Ok(RateTable::from_entries(entries))
}

/// Splits a pair code such as `"eur / usd"` or `"USD-JPY"` and works out how it
/// relates to the pivot. Returns `None` for codes that aren't exactly two
/// non-empty tokens.
fn classify(code: &str) -> Option<Quotation> {
    let tokens: Vec<String> = code
        .split(['/', '-'])
        .map(|token| token.trim().to_uppercase())
        .collect();

    let [first, second] = tokens.as_slice() else {
        return None;
    };
    if first.is_empty() || second.is_empty() {
        return None;
    }

    let quotation = match (first.as_str(), second.as_str()) {
        // USD/USD would only ever restate the pivot.
        (PIVOT, PIVOT) => Quotation::Cross,
        (_, PIVOT) => Quotation::Direct(first.clone()),
        (PIVOT, _) => Quotation::Inverse(second.clone()),
        _ => Quotation::Cross,
    };
    Some(quotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(code: &str, value: Decimal) -> FeedEntry {
        FeedEntry {
            code: code.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("EUR/USD"), Some(Quotation::Direct("EUR".into())));
        assert_eq!(classify(" eur - usd "), Some(Quotation::Direct("EUR".into())));
        assert_eq!(classify("USD-JPY"), Some(Quotation::Inverse("JPY".into())));
        assert_eq!(classify("EUR/JPY"), Some(Quotation::Cross));
        assert_eq!(classify("USD/USD"), Some(Quotation::Cross));
        assert_eq!(classify("EURUSD"), None);
        assert_eq!(classify("EUR/USD/JPY"), None);
        assert_eq!(classify("EUR-USD/JPY"), None);
        assert_eq!(classify("/USD"), None);
        assert_eq!(classify("USD/ "), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_pivot_always_present() {
        let table = RateTable::from_entries(Vec::new());
        assert_eq!(table.get("USD"), Some(Decimal::ONE));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_direct_entry() {
        let table = RateTable::from_entries(vec![entry("EUR/USD", dec!(0.85))]);
        assert_eq!(table.get("EUR"), Some(dec!(0.85)));
        assert_eq!(table.get("USD"), Some(Decimal::ONE));
    }

    #[test]
    fn test_inverse_entry_rounds_half_up_to_eight_places() {
        let table = RateTable::from_entries(vec![entry("USD/CLP", dec!(950.0))]);
        // 1 / 950 = 0.00105263157894...
        assert_eq!(table.get("CLP"), Some(dec!(0.00105263)));

        // 1 / 3 = 0.333333333...
        let table = RateTable::from_entries(vec![entry("USD-XAA", dec!(3))]);
        assert_eq!(table.get("XAA"), Some(dec!(0.33333333)));

        // 1 / 1.5 = 0.6666666666...
        let table = RateTable::from_entries(vec![entry("USD-XAB", dec!(1.5))]);
        assert_eq!(table.get("XAB"), Some(dec!(0.66666667)));

        // 1 / 200000000 = 0.000000005, a tie at the ninth digit rounds up
        let table = RateTable::from_entries(vec![entry("USD-XAC", dec!(200000000))]);
        assert_eq!(table.get("XAC"), Some(dec!(0.00000001)));
    }

    #[test]
    fn test_cross_pair_ignored() {
        let table = RateTable::from_entries(vec![entry("EUR/JPY", dec!(160.0))]);
        assert_eq!(table.codes(), vec!["USD".to_string()]);
    }

    #[test]
    fn test_zero_inverse_rejected() {
        let table = RateTable::from_entries(vec![entry("USD/XXX", Decimal::ZERO)]);
        assert!(!table.contains("XXX"));
    }

    #[test]
    fn test_pivot_cannot_be_restated() {
        let table = RateTable::from_entries(vec![
            entry("USD/USD", dec!(2)),
            entry("USD-USD", dec!(0.5)),
        ]);
        assert_eq!(table.get("USD"), Some(Decimal::ONE));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_direct_entries_last_writer_wins() {
        let table = RateTable::from_entries(vec![
            entry("EUR/USD", dec!(0.85)),
            entry("eur-usd", dec!(0.86)),
        ]);
        assert_eq!(table.get("EUR"), Some(dec!(0.86)));
    }

    #[test]
    fn test_inverse_entries_first_writer_wins() {
        let table = RateTable::from_entries(vec![
            entry("USD/JPY", dec!(4)),
            entry("USD/JPY", dec!(5)),
        ]);
        assert_eq!(table.get("JPY"), Some(dec!(0.25)));
    }

    #[test]
    fn test_direct_quote_overrides_earlier_inverse() {
        let table = RateTable::from_entries(vec![
            entry("USD/JPY", dec!(4)),
            entry("JPY/USD", dec!(0.0067)),
        ]);
        assert_eq!(table.get("JPY"), Some(dec!(0.0067)));
    }

    #[test]
    fn test_inverse_quote_does_not_override_earlier_direct() {
        let table = RateTable::from_entries(vec![
            entry("JPY/USD", dec!(0.0067)),
            entry("USD/JPY", dec!(4)),
        ]);
        assert_eq!(table.get("JPY"), Some(dec!(0.0067)));
    }

    #[test]
    fn test_malformed_entries_do_not_abort_scan() {
        let table = RateTable::from_entries(vec![
            entry("EURUSD", dec!(0.85)),
            FeedEntry {
                code: "GBP/USD".to_string(),
                value: None,
            },
            entry("CHF/USD", dec!(1.1)),
        ]);
        assert_eq!(table.codes(), vec!["CHF".to_string(), "USD".to_string()]);
    }

    #[test]
    fn test_normalize_published_feed() {
        let body = r#"[
            {"codigo": "EUR-USD", "valor_actual": "0.85", "valor_comparacion": "USD"},
            {"codigo": "USD-CLP", "valor_actual": 950.0},
            {"codigo": "EUR/JPY", "valor_actual": "160.0"},
            {"codigo": "GBP-USD", "valor_actual": "not a number"},
            {"codigo": "USD-USD", "valor_actual": "1.0"}
        ]"#;

        let table = normalize(body).unwrap();
        assert_eq!(
            table.codes(),
            vec!["CLP".to_string(), "EUR".to_string(), "USD".to_string()]
        );
        assert_eq!(table.get("EUR"), Some(dec!(0.85)));
        assert_eq!(table.get("CLP"), Some(dec!(0.00105263)));
        assert_eq!(table.get("USD"), Some(Decimal::ONE));
    }

    #[test]
    fn test_normalize_rejects_undecodable_body() {
        assert!(normalize("codigo: EUR-USD").is_err());
    }
}
