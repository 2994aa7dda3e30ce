//! Command-line arguments

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vision_stock::{ChartPeriod, IndicatorKind};

#[derive(Parser, Debug)]
#[command(name = "stock-vision", version, about = "Stock analysis, forecasting and chat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a company overview, summary, recent quotes and chart series for a ticker
    Analyze(AnalyzeArgs),

    /// Forecast the next business-day closes for a ticker
    Predict(PredictArgs),

    /// Predict a close from one day's open/high/low
    Manual(ManualArgs),

    /// Ask the assistant a question, or start a chat session
    Chat(ChatArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Ticker symbol, e.g. AAPL or TCS.NS
    pub symbol: String,

    /// First day of the summarized history (default: a year before --end)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the summarized history, exclusive (default: today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Chart period: 5d, 1mo, 6mo, ytd, 1y, 5y or max
    #[arg(long, default_value = "1y")]
    pub period: ChartPeriod,

    /// Indicator to compute over the chart period
    #[arg(long)]
    pub indicator: Option<IndicatorKind>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Ticker symbol
    pub symbol: String,

    /// First day of history (default: ten years before --end)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of history, exclusive (default: today)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Business days to forecast (at most 260)
    #[arg(long, default_value_t = vision_stock::forecast::DEFAULT_HORIZON)]
    pub horizon: usize,

    /// Exported LSTM weights (JSON); falls back to STOCK_VISION_MODEL_PATH
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Saved scaler (JSON); falls back to STOCK_VISION_SCALER_PATH
    #[arg(long)]
    pub scaler: Option<PathBuf>,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ManualArgs {
    #[arg(long)]
    pub open: f64,

    #[arg(long)]
    pub high: f64,

    #[arg(long)]
    pub low: f64,

    /// Accepted for completeness; the model only sees prices
    #[arg(long, default_value_t = 0.0)]
    pub volume: f64,

    /// Exported LSTM weights (JSON); falls back to STOCK_VISION_MODEL_PATH
    #[arg(long)]
    pub model: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatBackend {
    #[default]
    Gemini,
    Openai,
}

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Question to ask; omit to start an interactive session
    pub message: Option<String>,

    #[arg(long, value_enum, default_value_t = ChatBackend::Gemini)]
    pub provider: ChatBackend,

    /// Model name (default depends on the provider)
    #[arg(long)]
    pub model: Option<String>,
}
