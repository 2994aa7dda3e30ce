//! Quote currency lookup and display signs

/// Exchange suffixes and the currency their listings trade in
const SUFFIX_CURRENCIES: &[(&str, &str)] = &[
    (".NS", "INR"),
    (".BO", "INR"),
    (".L", "GBP"),
    (".T", "JPY"),
    (".HK", "HKD"),
    (".TO", "CAD"),
    (".AX", "AUD"),
    (".SS", "CNY"),
    (".SZ", "CNY"),
    (".SW", "CHF"),
    (".SI", "SGD"),
    (".DE", "EUR"),
    (".PA", "EUR"),
];

/// Infer the trading currency from the exchange suffix, defaulting to USD
pub fn currency_for_symbol(symbol: &str) -> &'static str {
    let symbol = symbol.trim().to_ascii_uppercase();
    SUFFIX_CURRENCIES
        .iter()
        .find(|(suffix, _)| symbol.ends_with(suffix))
        .map_or("USD", |&(_, currency)| currency)
}

/// Display sign for an ISO currency code; unknown codes are shown as-is
pub fn currency_sign(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "INR" => "₹",
        "JPY" | "CNY" => "¥",
        "AUD" => "A$",
        "CAD" => "C$",
        "CHF" => "CHF",
        "HKD" => "HK$",
        "SGD" => "S$",
        other => other,
    }
}

/// `price` formatted with the sign of `code`, two decimals
pub fn format_price(code: &str, price: f64) -> String {
    format!("{}{price:.2}", currency_sign(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_for_symbol() {
        assert_eq!(currency_for_symbol("AAPL"), "USD");
        assert_eq!(currency_for_symbol("TCS.NS"), "INR");
        assert_eq!(currency_for_symbol("adanient.bo"), "INR");
        assert_eq!(currency_for_symbol("VOD.L"), "GBP");
        assert_eq!(currency_for_symbol("7203.T"), "JPY");
        assert_eq!(currency_for_symbol("SAP.DE"), "EUR");
        assert_eq!(currency_for_symbol("BRK-B"), "USD");
    }

    #[test]
    fn test_currency_sign() {
        assert_eq!(currency_sign("USD"), "$");
        assert_eq!(currency_sign("INR"), "₹");
        assert_eq!(currency_sign("CNY"), "¥");
        assert_eq!(currency_sign("HKD"), "HK$");
        assert_eq!(currency_sign("SEK"), "SEK");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("GBP", 12.345), "£12.35");
        assert_eq!(format_price("XYZ", 1.0), "XYZ1.00");
    }
}
