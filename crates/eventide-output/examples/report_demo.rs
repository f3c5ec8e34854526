//! Renders a synthetic event study as a table, Markdown and CSV.

use chrono::{Duration, NaiveDate};
use eventide_output::{
    CarChartSeries, EventStudyExport, EventStudyReport, ExportFormat, Exporter,
    generate_impact_metrics,
};
use eventide_study::{FactorSeries, ModelChoice, PriceSeries, ReturnSeries, compute_event_study};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 4, 1).ok_or("bad start date")?;
    let day = |i: usize| start + Duration::days(i as i64);

    let benchmark: Vec<f64> = (0..60)
        .map(|i| 0.01 * (((i * 7) % 13) as f64 / 12.0 - 0.5))
        .collect();

    let mut price = 180.0;
    let mut closes = vec![(day(0), price)];
    for (i, b) in benchmark.iter().enumerate() {
        let surprise = if i == 44 { 0.06 } else { 0.0 };
        let noise = 0.0015 * (((i * 3) % 5) as f64 - 2.0);
        price *= 1.0 + 0.0003 + 1.15 * b + noise + surprise;
        closes.push((day(i + 1), price));
    }

    let prices = PriceSeries::from_pairs("DEMO", closes)?;
    let factors = FactorSeries::Benchmark(ReturnSeries::from_pairs(
        benchmark.iter().enumerate().map(|(i, b)| (day(i + 1), *b)),
    )?);

    let result = compute_event_study(
        ModelChoice::MarketAdjusted,
        &prices,
        &factors,
        day(45),
        30,
        5,
        0.95,
    )?;

    println!("=== Impact ===");
    if let Some(metrics) = generate_impact_metrics(&result) {
        println!("{metrics}");
    }

    let report = EventStudyReport::new(&result)?;
    println!("{}", report.to_ascii_table());

    println!("=== Markdown ===\n");
    println!("{}", report.to_markdown());

    println!("=== Per-day CSV ===\n");
    let export = EventStudyExport::from_result(&result);
    println!("{}", export.export_to_string(ExportFormat::Csv)?);

    println!("=== CAR chart (JSON) ===\n");
    let chart = CarChartSeries::from_result(&result);
    println!("{}", chart.export_to_string(ExportFormat::PrettyJson)?);

    Ok(())
}
