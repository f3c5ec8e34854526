#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/eventide/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod charts;
pub mod export;
pub mod report;
pub mod summary;

pub use charts::{CarChartPoint, CarChartSeries, ConfidenceChartPoint, ConfidenceChartSeries};
pub use export::{EventDayRow, EventStudyExport, ExportError, ExportFormat, Exporter};
pub use report::{EventStudyReport, Report, ReportBuilder, ReportError};
pub use summary::{ImpactMetrics, generate_impact_metrics};

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, NaiveDate};
    use eventide_study::{
        EventStudyResult, FactorSeries, ModelChoice, PriceSeries, ReturnSeries,
        compute_event_study,
    };

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
    }

    /// 40 days tracking a benchmark with beta 1.1, plus a 5% jump on day 30.
    pub(crate) fn jump_result() -> EventStudyResult {
        let bench: Vec<f64> = (0..40)
            .map(|i| 0.004 * ((i * 37 % 11) as f64 - 5.0) / 5.0)
            .collect();
        let mut price = 50.0;
        let mut prices = vec![(day(0), price)];
        for (i, b) in bench.iter().enumerate() {
            let noise = 0.0003 * ((i * 7 % 5) as f64 - 2.0);
            let jump = if i + 1 == 30 { 0.05 } else { 0.0 };
            price *= 1.0 + 0.0002 + 1.1 * b + noise + jump;
            prices.push((day(i + 1), price));
        }

        let prices = PriceSeries::from_pairs("EVNT", prices).unwrap();
        let factors = FactorSeries::Benchmark(
            ReturnSeries::from_pairs(bench.iter().enumerate().map(|(i, b)| (day(i + 1), *b)))
                .unwrap(),
        );
        compute_event_study(ModelChoice::MarketAdjusted, &prices, &factors, day(30), 20, 3, 0.95)
            .unwrap()
    }
}
