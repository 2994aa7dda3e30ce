//! Command-line dashboard for stock-vision
//!
//! ```bash
//! stock-vision analyze AAPL --period 6mo --indicator rsi
//! stock-vision predict TCS.NS --model lstm.json --horizon 5
//! stock-vision manual --open 180 --high 184 --low 179 --model lstm.json
//! GEMINI_API_KEY=... stock-vision chat "What does RSI above 70 mean?"
//! ```

mod cli;
mod render;

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};
use vision_llm::providers::gemini::DEFAULT_GEMINI_MODEL;
use vision_llm::providers::{GeminiProvider, OpenAIProvider};
use vision_llm::{ChatSession, LLMProvider};
use vision_stock::{
    AnalysisRequest, CachedHistoryProvider, PredictionRequest, PredictionService, StockConfig,
    YahooFinanceClient,
};

use cli::{AnalyzeArgs, ChatArgs, ChatBackend, Cli, Command, ManualArgs, PredictArgs};

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[tokio::main]
async fn main() {
    let app = match vision_utils::Config::from_env() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };
    vision_utils::init_tracing_with(&app.log_level, app.log_format);

    let cli = Cli::parse();
    debug!(environment = %app.environment, "Starting {}", app.app_name);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Analyze(args) => analyze(args).await,
        Command::Predict(args) => predict(args).await,
        Command::Manual(args) => manual(args),
        Command::Chat(args) => chat(args).await,
    }
}

fn history_provider(config: &Arc<StockConfig>) -> Arc<CachedHistoryProvider<YahooFinanceClient>> {
    Arc::new(CachedHistoryProvider::new(
        YahooFinanceClient::new(Arc::clone(config)),
        config.cache_ttl_history,
    ))
}

fn stock_config(
    model: Option<std::path::PathBuf>,
    scaler: Option<std::path::PathBuf>,
) -> anyhow::Result<Arc<StockConfig>> {
    let mut builder = StockConfig::builder();
    if let Some(model) = model {
        builder = builder.model_path(model);
    }
    if let Some(scaler) = scaler {
        builder = builder.scaler_path(scaler);
    }
    Ok(Arc::new(builder.with_env_paths().build()?))
}

async fn analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = stock_config(None, None)?;
    let provider = history_provider(&config);

    let request = AnalysisRequest::new(&args.symbol)
        .with_range(args.start, args.end)
        .with_period(args.period)
        .with_indicator(args.indicator);
    let report =
        vision_stock::analyze(provider.as_ref(), Some(&*provider), &request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::analysis(&report));
    }
    Ok(())
}

async fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let config = stock_config(args.model, args.scaler)?;
    let provider = history_provider(&config);
    let service =
        PredictionService::from_config(provider.clone(), config)?.with_overview(provider);

    let request = PredictionRequest::new(&args.symbol)
        .with_range(args.start, args.end)
        .with_horizon(args.horizon);
    let report = service.predict(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::prediction(&report));
    }
    Ok(())
}

fn manual(args: ManualArgs) -> anyhow::Result<()> {
    let config = stock_config(args.model, None)?;
    let service = PredictionService::from_config(history_provider(&config), config)?;

    let price = service.predict_manual(args.open, args.high, args.low, args.volume)?;
    println!("Predicted closing price: {price:.2}");
    Ok(())
}

fn chat_session(args: &ChatArgs) -> anyhow::Result<ChatSession> {
    let (provider, default_model): (Arc<dyn LLMProvider>, &str) = match args.provider {
        ChatBackend::Gemini => (
            Arc::new(GeminiProvider::from_env().context("Gemini is not configured")?),
            DEFAULT_GEMINI_MODEL,
        ),
        ChatBackend::Openai => (
            Arc::new(OpenAIProvider::from_env().context("OpenAI is not configured")?),
            DEFAULT_OPENAI_MODEL,
        ),
    };
    let model = args.model.as_deref().unwrap_or(default_model);
    info!(provider = provider.name(), model, "Chat session ready");
    Ok(ChatSession::new(provider, model))
}

async fn chat(args: ChatArgs) -> anyhow::Result<()> {
    let mut session = chat_session(&args)?;

    if let Some(message) = args.message {
        println!("{}", session.ask(message).await?);
        return Ok(());
    }

    println!("Ask about stocks, indicators or markets. /clear resets, /exit quits.");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }

        match input.trim() {
            "" => {}
            "/exit" | "/quit" => break,
            "/clear" => {
                session.clear();
                println!("History cleared.\n");
            }
            question => match session.ask(question).await {
                Ok(reply) => println!("{reply}\n"),
                Err(e) => eprintln!("Error: {e}\n"),
            },
        }
    }

    Ok(())
}
