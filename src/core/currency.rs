//! Currency reference data

/// The home currency. Every rate table is expressed relative to it.
pub const BASE_CURRENCY: &str = "KRW";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
    pub flag: &'static str,
}

const fn currency(
    code: &'static str,
    name: &'static str,
    symbol: &'static str,
    flag: &'static str,
) -> Currency {
    Currency {
        code,
        name,
        symbol,
        flag,
    }
}

/// Full catalog in picker order. The base currency comes first.
pub const ALL_CURRENCIES: &[Currency] = &[
    // Major
    currency("KRW", "South Korean Won", "₩", "🇰🇷"),
    currency("USD", "US Dollar", "$", "🇺🇸"),
    currency("EUR", "Euro", "€", "🇪🇺"),
    currency("JPY", "Japanese Yen", "¥", "🇯🇵"),
    currency("CNY", "Chinese Yuan", "¥", "🇨🇳"),
    currency("GBP", "British Pound", "£", "🇬🇧"),
    currency("HKD", "Hong Kong Dollar", "HK$", "🇭🇰"),
    currency("SGD", "Singapore Dollar", "S$", "🇸🇬"),
    currency("AUD", "Australian Dollar", "A$", "🇦🇺"),
    currency("CAD", "Canadian Dollar", "C$", "🇨🇦"),
    currency("CHF", "Swiss Franc", "CHF", "🇨🇭"),
    currency("NZD", "New Zealand Dollar", "NZ$", "🇳🇿"),
    // Asia
    currency("TWD", "New Taiwan Dollar", "NT$", "🇹🇼"),
    currency("THB", "Thai Baht", "฿", "🇹🇭"),
    currency("MYR", "Malaysian Ringgit", "RM", "🇲🇾"),
    currency("IDR", "Indonesian Rupiah", "Rp", "🇮🇩"),
    currency("PHP", "Philippine Peso", "₱", "🇵🇭"),
    currency("VND", "Vietnamese Dong", "₫", "🇻🇳"),
    // Middle East
    currency("AED", "UAE Dirham", "د.إ", "🇦🇪"),
    currency("SAR", "Saudi Riyal", "ر.س", "🇸🇦"),
    currency("KWD", "Kuwaiti Dinar", "د.ك", "🇰🇼"),
    currency("BHD", "Bahraini Dinar", ".د.ب", "🇧🇭"),
    // Europe
    currency("SEK", "Swedish Krona", "kr", "🇸🇪"),
    currency("NOK", "Norwegian Krone", "kr", "🇳🇴"),
    currency("DKK", "Danish Krone", "kr", "🇩🇰"),
    // Other
    currency("RUB", "Russian Ruble", "₽", "🇷🇺"),
    currency("XOF", "CFA Franc", "CFA", "🌍"),
    // Obsolete, kept for reference conversions
    currency("ATS", "Austrian Schilling", "ATS", "🇦🇹"),
    currency("BEF", "Belgian Franc", "BEF", "🇧🇪"),
    currency("DEM", "German Mark", "DEM", "🇩🇪"),
    currency("ESP", "Spanish Peseta", "ESP", "🇪🇸"),
    currency("FIM", "Finnish Markka", "FIM", "🇫🇮"),
    currency("FRF", "French Franc", "FRF", "🇫🇷"),
    currency("ITL", "Italian Lira", "ITL", "🇮🇹"),
    currency("NLG", "Dutch Guilder", "NLG", "🇳🇱"),
];

impl Currency {
    pub fn find_by_code(code: &str) -> Option<&'static Currency> {
        ALL_CURRENCIES.iter().find(|c| c.code == code)
    }
}

/// Codes a rate table is expected to cover, excluding the base currency.
pub fn supported_codes() -> impl Iterator<Item = &'static str> {
    ALL_CURRENCIES
        .iter()
        .map(|c| c.code)
        .filter(|code| *code != BASE_CURRENCY)
}

pub fn is_supported(code: &str) -> bool {
    code != BASE_CURRENCY && ALL_CURRENCIES.iter().any(|c| c.code == code)
}
