//! Fetches the inputs of one event study from Yahoo Finance.
//!
//! Usage: `cargo run --example event_window_data -- AAPL 2024-06-14`

use chrono::NaiveDate;
use eventide_data::{PriceHistorySource, StockSnapshot, YahooQuoteProvider};
use eventide_study::AnalysisRequest;
use eventide_study::ModelChoice;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let ticker = args.next().unwrap_or_else(|| "AAPL".to_string());
    let date: NaiveDate = args
        .next()
        .unwrap_or_else(|| "2024-06-14".to_string())
        .parse()?;

    let request = AnalysisRequest::new(&ticker, date, ModelChoice::MarketAdjusted)?;
    let (start, end) = request.fetch_range(60)?;
    println!("Fetching {request} over {start}..={end}");

    let provider = YahooQuoteProvider::new()?;
    let prices = provider
        .fetch_price_history(request.ticker(), start, end)
        .await?;
    let benchmark = provider.fetch_benchmark(start, end).await?;

    println!("{} closes, {} benchmark returns", prices.len(), benchmark.len());
    if let Some((first, last)) = prices.date_range() {
        println!("Price history: {first} to {last}");
    }

    println!("\n{}", StockSnapshot::from_history(&prices));
    Ok(())
}
