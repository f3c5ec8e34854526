//! Integration tests for factor parsing and collaborator routing

use approx::assert_abs_diff_eq;
use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use eventide_data::{
    CompositeFactorSource, DataError, FactorSource, FamaFrenchClient, FamaFrenchConfig,
    parse_fama_french_csv,
    yahoo::{DailyQuote, quotes_to_series},
};
use eventide_study::{FactorSeries, ModelChoice, ReturnSeries, align_returns};

fn weekdays(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut date = start;
    while out.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}

fn factor_file(dates: &[NaiveDate]) -> String {
    let mut text = String::from(
        "This file was created by CMPT_ME_BEME_RETS_DAILY using the 202406 CRSP database.\n\n,Mkt-RF,SMB,HML,RF\n",
    );
    for (i, d) in dates.iter().enumerate() {
        let mkt = (i % 7) as f64 * 0.1 - 0.3;
        text.push_str(&format!(
            "{},{:8.2},{:8.2},{:8.2},{:8.3}\n",
            d.format("%Y%m%d"),
            mkt,
            0.05,
            -0.02,
            0.021
        ));
    }
    text.push_str("\nCopyright 2024 Kenneth R. French\n");
    text
}

#[test]
fn test_parsed_factors_align_with_quotes() {
    let dates = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 30);
    let factors = parse_fama_french_csv(&factor_file(&dates), true).unwrap();
    assert_eq!(factors.len(), 30);
    assert_abs_diff_eq!(factors.rows()[0].market_excess, -0.003, epsilon = 1e-12);
    assert_abs_diff_eq!(factors.rows()[0].risk_free, 0.00021, epsilon = 1e-12);

    // quotes miss the tenth trading day
    let quotes: Vec<DailyQuote> = dates
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 10)
        .map(|(i, d)| DailyQuote {
            date: *d,
            close: 50.0 + i as f64,
            adjusted_close: 50.0 + i as f64,
            volume: 10_000,
        })
        .collect();
    let prices = quotes_to_series("ibm", &quotes).unwrap();

    let aligned = align_returns(&prices, &FactorSeries::FamaFrench(factors)).unwrap();
    assert_eq!(aligned.len(), 28);
    assert!(!aligned.dates().contains(&dates[10]));
    assert!(aligned.risk_free().is_some());
}

#[derive(Debug)]
struct StaticBenchmark;

#[async_trait]
impl FactorSource for StaticBenchmark {
    async fn fetch_factor_series(
        &self,
        _model: ModelChoice,
        start: NaiveDate,
        _end: NaiveDate,
    ) -> eventide_data::Result<FactorSeries> {
        Ok(FactorSeries::Benchmark(ReturnSeries::from_pairs([(start, 0.01)])?))
    }
}

#[tokio::test]
async fn test_composite_with_local_factor_file() {
    let dates = weekdays(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), 10);
    let path = std::env::temp_dir().join(format!("eventide-factors-{}.csv", std::process::id()));
    std::fs::write(&path, factor_file(&dates)).unwrap();

    let source = CompositeFactorSource::new(
        StaticBenchmark,
        FamaFrenchClient::new(FamaFrenchConfig::path(&path)).unwrap(),
    );

    let ff3 = source
        .fetch_factor_series(ModelChoice::FamaFrench3, dates[2], dates[5])
        .await
        .unwrap();
    assert_eq!(ff3.kind(), "fama-french");
    assert_eq!(ff3.len(), 4);

    let benchmark = source
        .fetch_factor_series(ModelChoice::MarketAdjusted, dates[0], dates[5])
        .await
        .unwrap();
    assert_eq!(benchmark.kind(), "benchmark");

    let err = source
        .fetch_factor_series(ModelChoice::FamaFrench3, dates[5], dates[2])
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::InvalidDateRange { .. }));

    std::fs::remove_file(&path).unwrap();
}
