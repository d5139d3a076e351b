//! Base-relative rate tables

use crate::core::currency::BASE_CURRENCY;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Maps a currency code to the number of units of that currency one unit of
/// [`BASE_CURRENCY`] buys. The base always maps to exactly `1.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, f64>", into = "HashMap<String, f64>")]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Builds a table from raw factors, dropping anything that is not a
    /// positive finite number and pinning the base currency to `1.0`.
    pub fn from_rates<I, K>(rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut table: HashMap<String, f64> = rates
            .into_iter()
            .map(|(code, rate)| (code.into(), rate))
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    debug!("Dropping invalid rate {} for {}", rate, code);
                }
                valid
            })
            .collect();
        table.insert(BASE_CURRENCY.to_string(), 1.0);
        Self { rates: table }
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Units of `to` per unit of `from`. Falls back to `1.0` when either code
    /// is missing.
    pub fn get_rate(&self, from: &str, to: &str) -> f64 {
        match (self.rates.get(from), self.rates.get(to)) {
            (Some(from_rate), Some(to_rate)) => to_rate / from_rate,
            _ => {
                debug!("No rate for {}->{}, using identity", from, to);
                1.0
            }
        }
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        amount * self.get_rate(from, to)
    }

    /// Entries ordered by currency code.
    pub fn sorted(&self) -> BTreeMap<&str, f64> {
        self.rates.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }
}

impl From<HashMap<String, f64>> for RateTable {
    fn from(rates: HashMap<String, f64>) -> Self {
        Self::from_rates(rates)
    }
}

impl From<RateTable> for HashMap<String, f64> {
    fn from(table: RateTable) -> Self {
        table.rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RateTable {
        RateTable::from_rates([("USD", 0.00075), ("JPY", 0.105), ("EUR", 0.00064)])
    }

    #[test]
    fn test_base_is_always_one() {
        let table = RateTable::from_rates([("KRW", 3.0), ("USD", 0.00075)]);
        assert_eq!(table.get(BASE_CURRENCY), Some(1.0));

        let empty = RateTable::from_rates(Vec::<(String, f64)>::new());
        assert_eq!(empty.len(), 1);
        assert_eq!(empty.get(BASE_CURRENCY), Some(1.0));
    }

    #[test]
    fn test_invalid_rates_are_dropped() {
        let table = RateTable::from_rates([
            ("USD", 0.0),
            ("EUR", -1.0),
            ("JPY", f64::NAN),
            ("GBP", f64::INFINITY),
            ("CHF", 0.00091),
        ]);
        assert!(!table.contains("USD"));
        assert!(!table.contains("EUR"));
        assert!(!table.contains("JPY"));
        assert!(!table.contains("GBP"));
        assert_eq!(table.get("CHF"), Some(0.00091));
    }

    #[test]
    fn test_get_rate_and_convert() {
        let table = sample();
        assert_eq!(table.get_rate("KRW", "USD"), 0.00075);
        assert!((table.get_rate("USD", "KRW") - 1.0 / 0.00075).abs() < 1e-9);
        assert!((table.convert(1_000_000.0, "KRW", "USD") - 750.0).abs() < 1e-9);
        assert_eq!(table.convert(0.0, "USD", "JPY"), 0.0);
    }

    #[test]
    fn test_identity_and_inverse() {
        let table = sample();
        for (code, _) in table.sorted() {
            assert_eq!(table.get_rate(code, code), 1.0);
        }
        let forward = table.get_rate("USD", "EUR");
        let backward = table.get_rate("EUR", "USD");
        assert!((forward - 1.0 / backward).abs() < 1e-12);
    }

    #[test]
    fn test_missing_code_uses_identity() {
        let table = sample();
        assert_eq!(table.get_rate("USD", "XYZ"), 1.0);
        assert_eq!(table.get_rate("XYZ", "USD"), 1.0);
        assert_eq!(table.convert(42.0, "XYZ", "USD"), 42.0);
    }

    #[test]
    fn test_json_round_trip_keeps_base() {
        let json = r#"{"USD": 0.0009}"#;
        let table: RateTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.get("USD"), Some(0.0009));
        assert_eq!(table.get(BASE_CURRENCY), Some(1.0));

        let encoded = serde_json::to_string(&table).unwrap();
        let decoded: RateTable = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, table);
    }
}
