//! Eventide CLI binary.
//!
//! Provides command-line interface for Eventide event studies.

mod settings;

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use eventide::EventStudyPipeline;
use eventide_data::{
    EventCatalog, FactorSource, FamaFrenchClient, FamaFrenchConfig, PriceHistorySource,
    StockSnapshot, YahooQuoteProvider,
};
use eventide_output::{
    EventStudyExport, EventStudyReport, ExportFormat, Exporter, generate_impact_metrics,
};
use eventide_study::{AnalysisRequest, EventStudyResult, ModelChoice};
use indicatif::{ProgressBar, ProgressStyle};
use settings::Settings;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "eventide")]
#[command(about = "Eventide: event-study abnormal returns", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Settings file (default: <config_dir>/eventide/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the abnormal return around an event
    Analyze {
        /// Stock symbol
        ticker: String,

        /// Event date (YYYY-MM-DD)
        #[arg(long)]
        event_date: NaiveDate,

        /// Return model: market or ff3
        #[arg(long, default_value = "market")]
        model: ModelChoice,

        /// Estimation window length, in trading days
        #[arg(long)]
        estimation_window: Option<usize>,

        /// Trading days on each side of the event
        #[arg(long)]
        radius: Option<usize>,

        /// Confidence level of the CAR band
        #[arg(long)]
        confidence: Option<f64>,

        /// Calendar days of history fetched on each side of the event
        #[arg(long)]
        offset_days: Option<u32>,

        /// Benchmark index for the market model
        #[arg(long)]
        benchmark: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fama-French daily factor table URL
        #[arg(long, conflicts_with = "ff_file")]
        ff_url: Option<String>,

        /// Fama-French daily factor table on disk
        #[arg(long)]
        ff_file: Option<PathBuf>,
    },

    /// Browse an event catalog
    Events {
        /// Catalog CSV (ticker,industry,event_date,headline,news_type,sentiment)
        #[arg(long)]
        catalog: PathBuf,

        /// Industry to list tickers for
        #[arg(long)]
        industry: Option<String>,

        /// Ticker to list events for (requires --industry)
        #[arg(long, requires = "industry")]
        ticker: Option<String>,

        /// Show the details of one event (requires --ticker)
        #[arg(long, requires = "ticker")]
        date: Option<NaiveDate>,
    },

    /// Show a stock snapshot
    Snapshot {
        /// Stock symbol
        ticker: String,

        /// Quote-summary JSON with company info
        #[arg(long)]
        info: Option<PathBuf>,

        /// Calendar days of closes in the trend
        #[arg(long, default_value = "30")]
        days: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
    Markdown,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            ticker,
            event_date,
            model,
            estimation_window,
            radius,
            confidence,
            offset_days,
            benchmark,
            format,
            output,
            ff_url,
            ff_file,
        } => {
            let study = &mut settings.study;
            if let Some(n) = estimation_window {
                study.estimation_window_length = n;
            }
            if let Some(r) = radius {
                study.event_window_radius = r;
            }
            if let Some(c) = confidence {
                study.confidence_level = c;
            }
            if let Some(d) = offset_days {
                study.fetch_offset_days = d;
            }
            if let Some(symbol) = benchmark {
                settings.yahoo.benchmark_symbol = symbol;
            }
            match (ff_url, ff_file) {
                (Some(url), _) => settings.fama_french = Some(FamaFrenchConfig::url(url)),
                (None, Some(path)) => settings.fama_french = Some(FamaFrenchConfig::path(path)),
                (None, None) => {}
            }

            let request = AnalysisRequest::new(&ticker, event_date, model)?;
            // Machine-readable output on stdout must not carry the banner.
            let announce = format == OutputFormat::Text || output.is_some();
            let result = analyze(&request, &settings, announce).await?;
            let rendered = render(&result, format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }
        Commands::Events {
            catalog,
            industry,
            ticker,
            date,
        } => {
            let catalog = EventCatalog::from_path(&catalog)?;
            list_events(&catalog, industry.as_deref(), ticker.as_deref(), date)?;
        }
        Commands::Snapshot { ticker, info, days } => {
            show_snapshot(&ticker, info.as_deref(), days, &settings).await?;
        }
    }

    Ok(())
}

async fn analyze(
    request: &AnalysisRequest,
    settings: &Settings,
    announce: bool,
) -> Result<EventStudyResult, Box<dyn std::error::Error>> {
    let ticker = request.ticker();
    if announce {
        print_banner(request, settings);
    }

    let yahoo = Arc::new(YahooQuoteProvider::with_config(settings.yahoo.clone())?);
    let factors: Arc<dyn FactorSource> = match request.model() {
        ModelChoice::MarketAdjusted => Arc::clone(&yahoo) as Arc<dyn FactorSource>,
        ModelChoice::FamaFrench3 => {
            let config = settings.fama_french.clone().ok_or(
                "the Fama-French model needs --ff-url, --ff-file or a fama_french settings entry",
            )?;
            Arc::new(FamaFrenchClient::new(config)?) as Arc<dyn FactorSource>
        }
    };
    let pipeline = EventStudyPipeline::with_config(yahoo, factors, settings.study);

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message(format!("Fetching data for {ticker}..."));

    match pipeline.run(request).await {
        Ok(result) => {
            pb.finish_with_message(format!("Computed {} event days", result.len()));
            Ok(result)
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            Err(e.into())
        }
    }
}

fn print_banner(request: &AnalysisRequest, settings: &Settings) {
    let ticker = request.ticker();
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("EVENT STUDY: {ticker}"));
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Event Date: {}", request.event_date());
    println!("Model: {}", request.model().label());
    println!(
        "Windows: {} estimation days, ±{} event days, {:.0}% confidence",
        settings.study.estimation_window_length,
        settings.study.event_window_radius,
        settings.study.confidence_level * 100.0
    );
    print_logo_status(ticker, settings.logo_dir());
    println!();
}

fn render(
    result: &EventStudyResult,
    format: OutputFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match format {
        OutputFormat::Text => {
            let report = EventStudyReport::new(result)?;
            let headline = generate_impact_metrics(result)
                .map(|m| m.to_string())
                .unwrap_or_default();
            format!("{headline}\n{}", report.to_ascii_table())
        }
        OutputFormat::Markdown => EventStudyReport::new(result)?.to_markdown(),
        OutputFormat::Json => {
            EventStudyExport::from_result(result).export_to_string(ExportFormat::PrettyJson)?
        }
        OutputFormat::Csv => {
            EventStudyExport::from_result(result).export_to_string(ExportFormat::Csv)?
        }
    };
    Ok(rendered)
}

fn print_logo_status(ticker: &str, logo_dir: &Path) {
    let logo = logo_dir.join(format!("{ticker}.png"));
    if logo.is_file() {
        println!("Logo: {}", logo.display());
    } else {
        debug!(path = %logo.display(), "no logo");
        println!("Logo: not available");
    }
}

fn list_events(
    catalog: &EventCatalog,
    industry: Option<&str>,
    ticker: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    match (industry, ticker, date) {
        (None, _, _) => {
            println!("Industries ({}):", catalog.industries().len());
            for industry in catalog.industries() {
                println!("  {industry}");
            }
        }
        (Some(industry), None, _) => {
            let tickers = catalog.tickers(industry);
            println!("Tickers in {industry} ({}):", tickers.len());
            for ticker in tickers {
                println!("  {ticker}");
            }
        }
        (Some(industry), Some(ticker), None) => {
            let dates = catalog.event_dates(industry, ticker);
            println!("Events for {} ({}):", ticker.to_ascii_uppercase(), dates.len());
            for date in dates {
                let headline = catalog
                    .find(ticker, date)
                    .map(|e| e.headline.as_str())
                    .unwrap_or_default();
                println!("  {date}  {headline}");
            }
        }
        (Some(_), Some(ticker), Some(date)) => {
            let event = catalog.get(ticker, date)?;
            println!("{} on {}", event.ticker, event.event_date);
            println!("{}", "-".repeat(40));
            println!("Headline:  {}", event.headline);
            println!("Type:      {}", event.news_type);
            println!("Sentiment: {}", event.sentiment);
        }
    }
    Ok(())
}

async fn show_snapshot(
    ticker: &str,
    info: Option<&Path>,
    days: u32,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    let ticker = ticker.trim().to_ascii_uppercase();
    let mut snapshot = match info {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            StockSnapshot::from_info(&ticker, &value)
        }
        None => StockSnapshot {
            symbol: ticker.clone(),
            ..StockSnapshot::default()
        },
    };

    let end = Utc::now().date_naive();
    let start = end - Duration::days(i64::from(days));
    let provider = YahooQuoteProvider::with_config(settings.yahoo.clone())?;
    let history = provider.fetch_price_history(&ticker, start, end).await?;
    info!(ticker = %ticker, closes = history.len(), "fetched snapshot history");
    snapshot.apply_history(&history);

    println!("{snapshot}");
    print_logo_status(&ticker, settings.logo_dir());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::parse_from([
            "eventide",
            "analyze",
            "aapl",
            "--event-date",
            "2024-06-14",
            "--model",
            "ff3",
            "--radius",
            "5",
            "--format",
            "csv",
            "--ff-file",
            "ff.csv",
        ]);
        match cli.command {
            Commands::Analyze {
                ticker,
                event_date,
                model,
                radius,
                format,
                ff_file,
                ..
            } => {
                assert_eq!(ticker, "aapl");
                assert_eq!(event_date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
                assert_eq!(model, ModelChoice::FamaFrench3);
                assert_eq!(radius, Some(5));
                assert_eq!(format, OutputFormat::Csv);
                assert_eq!(ff_file, Some(PathBuf::from("ff.csv")));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_ff_sources_conflict() {
        let parsed = Cli::try_parse_from([
            "eventide",
            "analyze",
            "AAPL",
            "--event-date",
            "2024-06-14",
            "--ff-url",
            "https://example.com/ff.csv",
            "--ff-file",
            "ff.csv",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_events_date_requires_ticker() {
        let parsed = Cli::try_parse_from([
            "eventide",
            "events",
            "--catalog",
            "events.csv",
            "--date",
            "2024-05-02",
        ]);
        assert!(parsed.is_err());
    }
}
