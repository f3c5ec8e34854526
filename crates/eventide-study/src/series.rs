//! Input series
//!
//! Price, return and factor series as handed to the engine by the data
//! collaborators. Every constructor validates ordering once so the rest of the
//! engine can rely on strictly increasing trading dates.

use crate::error::{Result, StudyError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date
    pub date: NaiveDate,
    /// Closing (adjusted) price
    pub close: f64,
}

/// Ordered closing prices for one instrument, one entry per trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a price series, rejecting unordered dates and unusable prices.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let ticker = ticker.into();
        ensure_increasing(points.iter().map(|p| p.date), &ticker)?;

        if let Some(bad) = points.iter().find(|p| !p.close.is_finite() || p.close <= 0.0) {
            return Err(StudyError::InvalidInput(format!(
                "{}: price {} on {} is not a positive finite number",
                ticker, bad.close, bad.date
            )));
        }

        Ok(Self { ticker, points })
    }

    /// Build from `(date, close)` pairs.
    pub fn from_pairs(
        ticker: impl Into<String>,
        pairs: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self> {
        let points = pairs
            .into_iter()
            .map(|(date, close)| PricePoint { date, close })
            .collect();
        Self::new(ticker, points)
    }

    /// Instrument identifier.
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Observations in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    /// Simple daily returns, `p[t] / p[t-1] - 1`, dated at `t`.
    pub fn returns(&self) -> ReturnSeries {
        let points = self
            .points
            .windows(2)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: w[1].close / w[0].close - 1.0,
            })
            .collect();
        ReturnSeries { points }
    }
}

/// A single daily return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Trading date the return is realised on
    pub date: NaiveDate,
    /// Simple return as a decimal
    pub value: f64,
}

/// Ordered daily simple returns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Build a return series directly, e.g. from an already-computed benchmark.
    pub fn new(points: Vec<ReturnPoint>) -> Result<Self> {
        ensure_increasing(points.iter().map(|p| p.date), "return series")?;
        ensure_finite(points.iter().map(|p| (p.date, p.value)), "return series")?;
        Ok(Self { points })
    }

    /// Build from `(date, return)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, value)| ReturnPoint { date, value })
                .collect(),
        )
    }

    /// Observations in date order.
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }
}

/// One day of Fama-French three-factor data, as decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreeFactorRow {
    /// Trading date
    pub date: NaiveDate,
    /// Market return minus risk-free rate (Mkt-RF)
    pub market_excess: f64,
    /// Small minus big (SMB)
    pub smb: f64,
    /// High minus low book-to-market (HML)
    pub hml: f64,
    /// Risk-free rate (RF)
    pub risk_free: f64,
}

/// Ordered Fama-French three-factor observations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FamaFrenchSeries {
    rows: Vec<ThreeFactorRow>,
}

impl FamaFrenchSeries {
    /// Build a factor series, rejecting unordered dates and non-finite values.
    pub fn new(rows: Vec<ThreeFactorRow>) -> Result<Self> {
        ensure_increasing(rows.iter().map(|r| r.date), "Fama-French series")?;
        ensure_finite(
            rows.iter().flat_map(|r| {
                [r.market_excess, r.smb, r.hml, r.risk_free].map(|v| (r.date, v))
            }),
            "Fama-French series",
        )?;
        Ok(Self { rows })
    }

    /// Observations in date order.
    pub fn rows(&self) -> &[ThreeFactorRow] {
        &self.rows
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Keep only rows within `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|r| r.date >= start && r.date <= end)
                .copied()
                .collect(),
        }
    }

    /// First and last dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }
}

/// Benchmark or factor data supplied alongside the ticker prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FactorSeries {
    /// Daily returns of a benchmark index (market-adjusted model).
    Benchmark(ReturnSeries),
    /// Daily Fama-French factors (three-factor model).
    FamaFrench(FamaFrenchSeries),
}

impl FactorSeries {
    /// Benchmark factor series derived from index prices.
    pub fn benchmark_from_prices(prices: &PriceSeries) -> Self {
        Self::Benchmark(prices.returns())
    }

    /// Number of dated observations.
    pub const fn len(&self) -> usize {
        match self {
            Self::Benchmark(series) => series.len(),
            Self::FamaFrench(series) => series.len(),
        }
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First and last dates, if any.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            Self::Benchmark(series) => series.date_range(),
            Self::FamaFrench(series) => series.date_range(),
        }
    }

    /// Human readable kind, used in error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Benchmark(_) => "benchmark",
            Self::FamaFrench(_) => "fama-french",
        }
    }
}

fn ensure_increasing(dates: impl Iterator<Item = NaiveDate>, what: &str) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        match previous {
            Some(prev) if date <= prev => {
                return Err(StudyError::InvalidInput(format!(
                    "{what}: dates must be strictly increasing ({date} follows {prev})"
                )));
            }
            _ => {}
        }
        previous = Some(date);
    }
    Ok(())
}

fn ensure_finite(values: impl Iterator<Item = (NaiveDate, f64)>, what: &str) -> Result<()> {
    for (date, value) in values {
        if !value.is_finite() {
            return Err(StudyError::InvalidInput(format!(
                "{what}: non-finite value on {date}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_returns_length_and_values() {
        let prices =
            PriceSeries::from_pairs("AAPL", [(d(2), 100.0), (d(3), 110.0), (d(4), 99.0)]).unwrap();
        let returns = prices.returns();

        assert_eq!(returns.len(), prices.len() - 1);
        assert_eq!(returns.points()[0].date, d(3));
        assert_abs_diff_eq!(returns.points()[0].value, 0.10, epsilon = 1e-12);
        assert_abs_diff_eq!(returns.points()[1].value, -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let result = PriceSeries::from_pairs("AAPL", [(d(3), 100.0), (d(2), 101.0)]);
        assert!(matches!(result, Err(StudyError::InvalidInput(_))));

        let duplicate = PriceSeries::from_pairs("AAPL", [(d(3), 100.0), (d(3), 101.0)]);
        assert!(matches!(duplicate, Err(StudyError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let result = PriceSeries::from_pairs("AAPL", [(d(2), 100.0), (d(3), 0.0)]);
        assert!(matches!(result, Err(StudyError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_nan_factor() {
        let rows = vec![ThreeFactorRow {
            date: d(2),
            market_excess: f64::NAN,
            smb: 0.0,
            hml: 0.0,
            risk_free: 0.0,
        }];
        assert!(FamaFrenchSeries::new(rows).is_err());
    }

    #[test]
    fn test_single_price_has_no_returns() {
        let prices = PriceSeries::from_pairs("AAPL", [(d(2), 100.0)]).unwrap();
        assert!(prices.returns().is_empty());
    }

    #[test]
    fn test_restrict_range() {
        let rows = (2..=6)
            .map(|day| ThreeFactorRow {
                date: d(day),
                market_excess: 0.001,
                smb: 0.0,
                hml: 0.0,
                risk_free: 0.0001,
            })
            .collect();
        let series = FamaFrenchSeries::new(rows).unwrap();
        let restricted = series.restrict(d(3), d(5));
        assert_eq!(restricted.len(), 3);
        assert_eq!(restricted.date_range(), Some((d(3), d(5))));
    }
}
