//! Company profile, market metrics and financial ratios for a ticker

use serde::{Deserialize, Serialize};

/// Fundamentals shown next to the price history
///
/// Every field is optional: funds, indices and thinly covered listings
/// leave most of them out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyOverview {
    pub symbol: String,
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub employees: Option<u32>,
    pub business_summary: Option<String>,
    /// ISO currency code the listing trades in
    pub currency: Option<String>,

    pub market_cap: Option<u64>,
    pub beta: Option<f64>,
    /// Trailing twelve-month earnings per share
    pub eps: Option<f64>,
    /// Trailing price/earnings
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,

    pub quick_ratio: Option<f64>,
    pub revenue_per_share: Option<f64>,
    pub profit_margin: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub return_on_equity: Option<f64>,
}

impl CompanyOverview {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    /// Long name when known, otherwise the symbol
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.symbol)
    }

    /// Market cap, beta, EPS and P/E
    pub fn market_metrics(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Market Cap", self.market_cap.map(|cap| cap as f64)),
            ("Beta", self.beta),
            ("EPS", self.eps),
            ("PE Ratio", self.pe_ratio),
        ]
    }

    pub fn financial_ratios(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("Quick Ratio", self.quick_ratio),
            ("Revenue per Share", self.revenue_per_share),
            ("Profit Margins", self.profit_margin),
            ("Debt to Equity", self.debt_to_equity),
            ("Return on Equity", self.return_on_equity),
        ]
    }
}

/// Abbreviate a large amount: `2.95T`, `410.20B`, `12.00M`
pub fn format_large_number(value: f64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];

    UNITS
        .iter()
        .find(|(scale, _)| value.abs() >= *scale)
        .map_or_else(
            || format!("{value:.2}"),
            |(scale, unit)| format!("{:.2}{unit}", value / scale),
        )
}
