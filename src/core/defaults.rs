//! Compiled-in fallback rates, used when neither the network nor the local
//! cache can provide a table. Values are approximate.

use crate::core::rates::RateTable;

/// Units of each currency per 1 KRW.
const DEFAULT_RATES: &[(&str, f64)] = &[
    ("USD", 0.00094),
    ("EUR", 0.00078),
    ("JPY", 0.105),
    ("CNY", 0.0061),
    ("GBP", 0.00069),
    ("HKD", 0.0073),
    ("SGD", 0.00125),
    ("AUD", 0.00120),
    ("CAD", 0.00117),
    ("CHF", 0.00091),
    ("NZD", 0.00132),
    ("TWD", 0.030),
    ("THB", 0.030),
    ("MYR", 0.00378),
    ("IDR", 0.1266),
    ("PHP", 0.053),
    ("VND", 23.0),
    ("AED", 0.00343),
    ("SAR", 0.00350),
    ("KWD", 0.00028),
    ("BHD", 0.00035),
    ("SEK", 0.00766),
    ("NOK", 0.00765),
    ("DKK", 0.00579),
    ("RUB", 0.087),
    ("XOF", 0.5097),
    ("ATS", 0.01069),
    ("BEF", 0.03135),
    ("DEM", 0.00152),
    ("ESP", 0.1294),
    ("FIM", 0.00462),
    ("FRF", 0.00510),
    ("ITL", 1.505),
    ("NLG", 0.00171),
];

pub fn default_rate(code: &str) -> Option<f64> {
    DEFAULT_RATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, rate)| *rate)
}

pub fn default_rates() -> RateTable {
    RateTable::from_rates(DEFAULT_RATES.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::{BASE_CURRENCY, supported_codes};

    #[test]
    fn test_defaults_cover_every_supported_currency() {
        let table = default_rates();
        for code in supported_codes() {
            assert!(table.contains(code), "missing default for {code}");
            assert_eq!(table.get(code), default_rate(code));
        }
        assert_eq!(table.get(BASE_CURRENCY), Some(1.0));
        assert_eq!(table.len(), supported_codes().count() + 1);
    }

    #[test]
    fn test_default_rate_lookup() {
        assert_eq!(default_rate("USD"), Some(0.00094));
        assert_eq!(default_rate("ITL"), Some(1.505));
        assert_eq!(default_rate("CNH"), None);
    }

    #[test]
    fn test_defaults_are_pure() {
        assert_eq!(default_rates(), default_rates());
    }
}
