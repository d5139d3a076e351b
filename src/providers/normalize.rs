//! Turns provider quotes into a base-relative [`RateTable`].
//!
//! The provider quotes "1 unit of foreign currency = N KRW", sometimes per 100
//! units (`JPY(100)`), with `,` as thousands separator. A rate table wants the
//! opposite direction: units of foreign currency per 1 KRW.

use crate::core::currency::{BASE_CURRENCY, is_supported, supported_codes};
use crate::core::defaults::default_rate;
use crate::core::rates::RateTable;
use crate::core::source::RawRecord;
use std::collections::HashMap;
use tracing::debug;

/// Provider labels that name a different code than the one we display.
const ALIASES: &[(&str, &str)] = &[("CNH", "CNY")];

/// Splits a unit label into its currency code and quote multiplier.
/// `"JPY(100)"` is `("JPY", 100)`, `"USD"` is `("USD", 1)`.
pub fn parse_unit_label(label: &str) -> Option<(String, u32)> {
    let label = label.trim();
    let (code, multiplier) = match label.split_once('(') {
        Some((code, rest)) => {
            let digits = rest.strip_suffix(')')?;
            let multiplier: u32 = digits.trim().parse().ok()?;
            if multiplier == 0 {
                return None;
            }
            (code.trim(), multiplier)
        }
        None => (label, 1),
    };
    if code.is_empty() {
        return None;
    }
    let code = ALIASES
        .iter()
        .find(|(alias, _)| *alias == code)
        .map_or(code, |(_, canonical)| *canonical);
    Some((code.to_string(), multiplier))
}

/// Parses a quoted rate such as `"1,386.50"`.
pub fn parse_rate(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let rate: f64 = cleaned.trim().parse().ok()?;
    (rate.is_finite() && rate > 0.0).then_some(rate)
}

/// Builds a rate table from raw provider records.
///
/// Records that failed upstream, carry an unparseable rate, or name a currency
/// outside the catalog are skipped. When a code is quoted more than once, a
/// per-unit quote beats a multiplier-suffixed one; otherwise the later record
/// wins. Supported codes that end up without a quote get their default.
pub fn normalize(records: &[RawRecord]) -> RateTable {
    // code -> (rate, multiplier it was quoted with)
    let mut quoted: HashMap<String, (f64, u32)> = HashMap::new();

    for record in records {
        if !record.is_success() {
            debug!("Skipping failed record: {:?}", record.cur_unit);
            continue;
        }
        let Some(rate) = parse_rate(&record.deal_bas_r) else {
            debug!(
                "Skipping unparseable rate {:?} for {:?}",
                record.deal_bas_r, record.cur_unit
            );
            continue;
        };
        let Some((code, multiplier)) = parse_unit_label(&record.cur_unit) else {
            debug!("Skipping malformed unit label {:?}", record.cur_unit);
            continue;
        };
        if !is_supported(&code) {
            debug!("Ignoring unsupported currency {}", code);
            continue;
        }

        let base_relative = 1.0 / rate / f64::from(multiplier);

        match quoted.get(&code) {
            Some((_, existing)) if *existing == 1 && multiplier != 1 => {
                debug!(
                    "Keeping per-unit quote for {} over {}",
                    code, record.cur_unit
                );
            }
            _ => {
                quoted.insert(code, (base_relative, multiplier));
            }
        }
    }

    let mut rates: HashMap<String, f64> = quoted
        .into_iter()
        .map(|(code, (rate, _))| (code, rate))
        .collect();

    // Obsolete currencies are filled too, so they never fall back to identity.
    for code in supported_codes() {
        if !rates.contains_key(code)
            && let Some(rate) = default_rate(code)
        {
            rates.insert(code.to_string(), rate);
        }
    }
    rates.insert(BASE_CURRENCY.to_string(), 1.0);

    RateTable::from_rates(rates)
}
