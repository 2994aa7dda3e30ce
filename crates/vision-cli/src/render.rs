//! Table rendering for command output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use vision_stock::chart::IndicatorSeries;
use vision_stock::currency::{currency_sign, format_price};
use vision_stock::indicators::interpret_rsi;
use vision_stock::overview::format_large_number;
use vision_stock::{AnalysisReport, CompanyOverview, PredictionReport, Quote};

/// Rows shown from an indicator series
const INDICATOR_ROWS: usize = 10;

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("N/A").to_string()
}

fn metrics_table(header: &str, rows: &[(&'static str, Option<f64>)]) -> Table {
    let mut table = table();
    table.set_header(vec![header, "Value"]);
    for (name, value) in rows {
        let value = match (*name, value) {
            ("Market Cap", Some(cap)) => format_large_number(*cap),
            (_, value) => opt(*value),
        };
        table.add_row(vec![(*name).to_string(), value]);
    }
    table
}

/// Profile text plus market metrics and financial ratios
pub fn company_overview(overview: &CompanyOverview) -> String {
    let mut out = format!("{} Stock Overview
", overview.display_name());
    if let Some(summary) = &overview.business_summary {
        out.push_str(&format!("{summary}
"));
    }
    out.push_str(&format!(
        "Sector: {}
Employees: {}
Website: {}

{}
{}
",
        text(overview.sector.as_deref()),
        overview
            .employees
            .map_or_else(|| "N/A".to_string(), |n| n.to_string()),
        text(overview.website.as_deref()),
        metrics_table("Market Metrics", &overview.market_metrics()),
        metrics_table("Financial Ratios", &overview.financial_ratios()),
    ));
    out
}

/// Name, listing and price details shown above a forecast
pub fn stock_details(overview: &CompanyOverview, currency: &str) -> Table {
    let mut table = table();
    table.set_header(vec!["Detail", "Value"]);
    let rows = [
        ("Name", overview.display_name().to_string()),
        ("Sector", text(overview.sector.as_deref())),
        ("Industry", text(overview.industry.as_deref())),
        (
            "Market Cap",
            overview
                .market_cap
                .map_or_else(|| "N/A".to_string(), |cap| format_large_number(cap as f64)),
        ),
        ("Currency", format!("{currency} ({})", currency_sign(currency))),
        ("Previous Close", opt(overview.previous_close)),
        ("Open Price", opt(overview.open)),
        ("52-Week High", opt(overview.high_52w)),
        ("52-Week Low", opt(overview.low_52w)),
        ("Dividend Yield", opt(overview.dividend_yield)),
    ];
    for (name, value) in rows {
        table.add_row(vec![name.to_string(), value]);
    }
    table
}

pub fn quotes_table(quotes: &[Quote]) -> Table {
    let mut table = table();
    table.set_header(vec!["Date", "Open", "High", "Low", "Close", "Volume"]);
    for q in quotes {
        table.add_row(vec![
            q.date().to_string(),
            format!("{:.2}", q.open),
            format!("{:.2}", q.high),
            format!("{:.2}", q.low),
            format!("{:.2}", q.close),
            q.volume.to_string(),
        ]);
    }
    table
}

pub fn analysis(report: &AnalysisReport) -> String {
    let summary = &report.summary;
    let mut overview = table();
    overview.set_header(vec!["Metric", "Value"]);
    overview.add_row(vec!["Last close".to_string(), summary.display_price()]);
    overview.add_row(vec![
        "Daily change".to_string(),
        summary.daily_change.map_or_else(
            || "Not enough data".to_string(),
            |change| {
                format!(
                    "{change:+.2} ({:+.2}%)",
                    summary.daily_change_pct.unwrap_or_default()
                )
            },
        ),
    ]);
    overview.add_row(vec![
        "52-week range".to_string(),
        format!(
            "{} - {}",
            format_price(&summary.currency, summary.low_52w),
            format_price(&summary.currency, summary.high_52w)
        ),
    ]);
    overview.add_row(vec![
        "Average volume".to_string(),
        format!("{:.0}", summary.average_volume),
    ]);

    let mut out = report
        .overview
        .as_ref()
        .map_or_else(String::new, |o| format!("{}\n", company_overview(o)));
    out.push_str(&format!(
        "{} ({}) as of {}\n{overview}\n\nHistorical data (last {} days)\n{}\n",
        summary.symbol,
        summary.currency,
        summary.as_of,
        report.recent.len(),
        quotes_table(&report.recent)
    ));

    let chart = &report.chart;
    out.push_str(&format!(
        "\nChart {}: {} points, range {} - {}\n",
        chart.period,
        chart.line.len(),
        opt(chart.min_price),
        opt(chart.max_price)
    ));

    if let Some(indicator) = &chart.indicator {
        out.push_str(&format!("\n{}\n{}\n", indicator.kind(), indicator_table(indicator)));
    }
    out
}

pub fn indicator_table(series: &IndicatorSeries) -> Table {
    let mut table = table();
    match series {
        IndicatorSeries::Rsi(points) => {
            table.set_header(vec!["Date", "RSI", "Reading"]);
            for p in &points[points.len().saturating_sub(INDICATOR_ROWS)..] {
                table.add_row(vec![
                    p.date.to_string(),
                    opt(p.value),
                    p.value.map_or("-", interpret_rsi).to_string(),
                ]);
            }
        }
        IndicatorSeries::Sma(points) => {
            table.set_header(vec!["Date", "SMA 50"]);
            for p in &points[points.len().saturating_sub(INDICATOR_ROWS)..] {
                table.add_row(vec![p.date.to_string(), opt(p.value)]);
            }
        }
        IndicatorSeries::Macd(points) => {
            table.set_header(vec!["Date", "MACD", "Signal", "Histogram"]);
            for p in &points[points.len().saturating_sub(INDICATOR_ROWS)..] {
                table.add_row(vec![
                    p.date.to_string(),
                    opt(p.value.macd),
                    opt(p.value.signal),
                    opt(p.value.histogram),
                ]);
            }
        }
    }
    table
}

pub fn prediction(report: &PredictionReport) -> String {
    let sign = currency_sign(&report.currency);

    let mut forecast = table();
    forecast.set_header(vec!["Date".to_string(), format!("Predicted Price ({sign})")]);
    for point in &report.forecast {
        forecast.add_row(vec![point.date.to_string(), format!("{:.2}", point.price)]);
    }

    let mut overlay = table();
    overlay.set_header(vec!["Date", "Close", "Kind"]);
    for p in &report.overlay.actual {
        overlay.add_row(vec![p.date.to_string(), format!("{:.2}", p.value), "actual".to_string()]);
    }
    for p in &report.overlay.predicted {
        overlay.add_row(vec![
            p.date.to_string(),
            format!("{:.2}", p.value),
            "predicted".to_string(),
        ]);
    }

    let fit = mean_abs_error(report)
        .map_or_else(String::new, |mae| format!("In-sample mean absolute error: {sign}{mae:.2}\n"));

    let details = report.overview.as_ref().map_or_else(String::new, |o| {
        format!("Stock Details\n{}\n\n", stock_details(o, &report.currency))
    });

    format!(
        "{details}{} via {} model on {} closes (last {} on {})\n{fit}\nNext {} business days\n{forecast}\n\nLast {} actual vs predicted\n{overlay}\n",
        report.symbol,
        report.model,
        report.history_points,
        format_price(&report.currency, report.last_close),
        report.last_date,
        report.forecast.len(),
        report.overlay.actual.len(),
    )
}

fn mean_abs_error(report: &PredictionReport) -> Option<f64> {
    if report.fitted.is_empty() {
        return None;
    }
    let total: f64 = report
        .fitted
        .iter()
        .map(|p| (p.actual - p.predicted).abs())
        .sum();
    Some(total / report.fitted.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use vision_stock::chart::ForecastOverlay;
    use vision_stock::forecast::{FittedPoint, ForecastPoint};
    use vision_stock::MinMaxScaler;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn quote(date: NaiveDate, close: f64) -> Quote {
        Quote {
            symbol: "AAPL".to_string(),
            timestamp: Utc.from_utc_datetime(&date.and_hms_opt(14, 30, 0).unwrap()),
            gmt_offset: 0,
            open: close,
            high: close,
            low: close,
            close,
            volume: 10,
            adjclose: close,
        }
    }

    fn report() -> PredictionReport {
        let quotes = vec![quote(ymd(2024, 6, 6), 100.0), quote(ymd(2024, 6, 7), 101.0)];
        let forecast = vec![ForecastPoint {
            date: ymd(2024, 6, 10),
            price: 102.5,
        }];
        PredictionReport {
            symbol: "AAPL".to_string(),
            currency: "USD".to_string(),
            model: "mean".to_string(),
            scaler: MinMaxScaler::from_bounds(100.0, 101.0).unwrap(),
            overview: None,
            history_points: 2,
            last_date: ymd(2024, 6, 7),
            last_close: 101.0,
            fitted: vec![FittedPoint {
                date: ymd(2024, 6, 7),
                actual: 101.0,
                predicted: 100.0,
            }],
            overlay: ForecastOverlay::new(&quotes, &forecast),
            forecast,
            recent: quotes,
        }
    }

    #[test]
    fn test_prediction_output() {
        let out = prediction(&report());
        assert!(out.contains("Predicted Price ($)"));
        assert!(out.contains("2024-06-10"));
        assert!(out.contains("102.50"));
        assert!(out.contains("mean absolute error: $1.00"));
    }

    #[test]
    fn test_prediction_with_stock_details() {
        let mut report = report();
        report.overview = Some(CompanyOverview {
            name: Some("Apple Inc.".to_string()),
            market_cap: Some(2_950_000_000_000),
            high_52w: Some(199.62),
            ..CompanyOverview::new("AAPL")
        });

        let out = prediction(&report);
        assert!(out.starts_with("Stock Details"));
        assert!(out.contains("Apple Inc."));
        assert!(out.contains("2.95T"));
        assert!(out.contains("199.62"));
        assert!(out.contains("USD ($)"));
    }

    #[test]
    fn test_company_overview_sections() {
        let overview = CompanyOverview {
            business_summary: Some("Designs smartphones.".to_string()),
            sector: Some("Technology".to_string()),
            employees: Some(161_000),
            eps: Some(6.43),
            debt_to_equity: Some(145.8),
            ..CompanyOverview::new("AAPL")
        };

        let out = company_overview(&overview);
        assert!(out.starts_with("AAPL Stock Overview"));
        assert!(out.contains("Designs smartphones."));
        assert!(out.contains("Employees: 161000"));
        assert!(out.contains("Website: N/A"));
        assert!(out.contains("Market Metrics"));
        assert!(out.contains("6.43"));
        assert!(out.contains("Financial Ratios"));
        assert!(out.contains("145.80"));
    }

    #[test]
    fn test_quotes_table_rows() {
        let table = quotes_table(&[quote(ymd(2024, 6, 7), 1.5)]);
        assert_eq!(table.row_iter().count(), 1);
        assert!(table.to_string().contains("1.50"));
    }

    #[test]
    fn test_opt_formatting() {
        assert_eq!(opt(None), "-");
        assert_eq!(opt(Some(1.234)), "1.23");
    }
}
