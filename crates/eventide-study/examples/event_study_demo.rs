//! Demonstration of the eventide-study engine on synthetic data
//!
//! Builds a deterministic ticker and benchmark history, injects a +4% shock on
//! the event day and runs the market-adjusted model.

use chrono::{Duration, NaiveDate};
use eventide_study::{FactorSeries, ModelChoice, PriceSeries, ReturnSeries, compute_event_study};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("==========================================================");
    println!("            Eventide - Event Study Demo");
    println!("==========================================================\n");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad start date")?;
    let n_days = 80;
    let shock_day = 60;

    // Deterministic pseudo-random market returns in roughly ±1.5%
    let market: Vec<f64> = (0..n_days)
        .map(|i| ((i * 37 % 29) as f64 - 14.0) / 1000.0)
        .collect();

    let mut close = 150.0;
    let mut prices = vec![(start, close)];
    let mut benchmark = Vec::with_capacity(n_days);
    for (i, m) in market.iter().enumerate() {
        let date = start + Duration::days(i as i64 + 1);
        let idiosyncratic = ((i * 11 % 7) as f64 - 3.0) / 2000.0;
        let shock = if i == shock_day { 0.04 } else { 0.0 };
        close *= 1.0 + 0.0002 + 1.1 * m + idiosyncratic + shock;
        prices.push((date, close));
        benchmark.push((date, *m));
    }

    let prices = PriceSeries::from_pairs("DEMO", prices)?;
    let benchmark = FactorSeries::Benchmark(ReturnSeries::from_pairs(benchmark)?);
    let event_date = start + Duration::days(shock_day as i64 + 1);

    let result = compute_event_study(
        ModelChoice::MarketAdjusted,
        &prices,
        &benchmark,
        event_date,
        40,
        5,
        0.95,
    )?;

    let fit = result.fit();
    println!("Model:        {}", result.model());
    println!("Event date:   {}", result.event_date());
    println!("Alpha:        {:.6}", fit.intercept());
    println!("Beta:         {:.4}", fit.betas()[0]);
    println!("Residual σ:   {:.6}", fit.residual_std_error());
    println!();

    println!("{:>4} {:>12} {:>10} {:>10} {:>10}", "day", "date", "AR", "CAR", "CI ±");
    for day in result.records() {
        println!(
            "{:>4} {:>12} {:>9.4}% {:>9.4}% {:>9.4}%",
            day.relative_day,
            day.date,
            day.abnormal_return * 100.0,
            day.cumulative_abnormal_return * 100.0,
            (day.ci_upper - day.cumulative_abnormal_return) * 100.0,
        );
    }

    println!("\nFinal CAR: {:.4}%", result.final_car().unwrap_or_default() * 100.0);
    Ok(())
}
