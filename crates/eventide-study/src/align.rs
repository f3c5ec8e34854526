//! Return Series Builder
//!
//! Turns the ticker price history and the benchmark/factor series into one
//! date-aligned table of returns. Alignment is an inner join on trading date:
//! a date missing from either side is dropped, never interpolated.

use crate::error::{Result, StudyError};
use crate::series::{FactorSeries, PriceSeries};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, s};
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

/// Minimum aligned observations for a usable table.
pub const MIN_ALIGNED_OBSERVATIONS: usize = 2;

/// Column names for a benchmark-driven table.
pub const BENCHMARK_FACTORS: &[&str] = &["market"];

/// Column names for a Fama-French table.
pub const FAMA_FRENCH_FACTORS: &[&str] = &["market_excess", "smb", "hml"];

/// Ticker returns and factor values on a common trading-date index.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<NaiveDate>,
    stock: Array1<f64>,
    factors: Array2<f64>,
    risk_free: Option<Array1<f64>>,
    factor_names: &'static [&'static str],
}

impl AlignedReturns {
    /// Assemble a table from already-aligned columns.
    ///
    /// `factors` is `T x K` with one column per entry of `factor_names`.
    pub fn new(
        dates: Vec<NaiveDate>,
        stock: Array1<f64>,
        factors: Array2<f64>,
        risk_free: Option<Array1<f64>>,
        factor_names: &'static [&'static str],
    ) -> Result<Self> {
        let n = dates.len();
        let rf_ok = risk_free.as_ref().is_none_or(|rf| rf.len() == n);
        if stock.len() != n || factors.nrows() != n || factors.ncols() != factor_names.len() || !rf_ok
        {
            return Err(StudyError::InvalidInput(format!(
                "aligned columns disagree: {} dates, {} stock returns, {}x{} factors for {} names",
                n,
                stock.len(),
                factors.nrows(),
                factors.ncols(),
                factor_names.len()
            )));
        }
        Ok(Self {
            dates,
            stock,
            factors,
            risk_free,
            factor_names,
        })
    }

    /// Trading dates, strictly increasing.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Ticker simple returns.
    pub const fn stock(&self) -> &Array1<f64> {
        &self.stock
    }

    /// Factor matrix (T x K).
    pub const fn factors(&self) -> &Array2<f64> {
        &self.factors
    }

    /// Risk-free rate, present only for factor sets that carry one.
    pub const fn risk_free(&self) -> Option<&Array1<f64>> {
        self.risk_free.as_ref()
    }

    /// Names of the factor columns.
    pub const fn factor_names(&self) -> &'static [&'static str] {
        self.factor_names
    }

    /// Number of aligned trading days.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Copy of the rows in `range`.
    ///
    /// # Panics
    /// Panics if `range` is out of bounds; callers check bounds first.
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            dates: self.dates[range.clone()].to_vec(),
            stock: self.stock.slice(s![range.clone()]).to_owned(),
            factors: self.factors.slice(s![range.clone(), ..]).to_owned(),
            risk_free: self
                .risk_free
                .as_ref()
                .map(|rf| rf.slice(s![range]).to_owned()),
            factor_names: self.factor_names,
        }
    }

    /// Index of the first trading date on or after `date`.
    pub fn first_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.dates.partition_point(|d| *d < date);
        (idx < self.dates.len()).then_some(idx)
    }
}

/// Convert prices and factors to returns and inner-join them on trading date.
///
/// # Errors
/// * `InsufficientData` when either input yields no returns, or when fewer than
///   two aligned observations survive the join.
/// * `MisalignedData` when the two date sets do not intersect at all.
pub fn align_returns(prices: &PriceSeries, factors: &FactorSeries) -> Result<AlignedReturns> {
    let stock_returns = prices.returns();
    let context = format!("aligned returns for {}", prices.ticker());

    if stock_returns.is_empty() || factors.is_empty() {
        return Err(StudyError::insufficient(
            context,
            MIN_ALIGNED_OBSERVATIONS,
            0,
        ));
    }

    // date -> (factor values, risk free)
    let (lookup, names): (HashMap<NaiveDate, (Vec<f64>, Option<f64>)>, &'static [&'static str]) =
        match factors {
            FactorSeries::Benchmark(series) => (
                series
                    .points()
                    .iter()
                    .map(|p| (p.date, (vec![p.value], None)))
                    .collect(),
                BENCHMARK_FACTORS,
            ),
            FactorSeries::FamaFrench(series) => (
                series
                    .rows()
                    .iter()
                    .map(|r| (r.date, (vec![r.market_excess, r.smb, r.hml], Some(r.risk_free))))
                    .collect(),
                FAMA_FRENCH_FACTORS,
            ),
        };

    let mut dates = Vec::new();
    let mut stock = Vec::new();
    let mut factor_values = Vec::new();
    let mut risk_free = Vec::new();

    for point in stock_returns.points() {
        if let Some((values, rf)) = lookup.get(&point.date) {
            dates.push(point.date);
            stock.push(point.value);
            factor_values.extend_from_slice(values);
            if let Some(rf) = rf {
                risk_free.push(*rf);
            }
        }
    }

    if dates.is_empty() {
        let (ticker_start, ticker_end) = stock_returns
            .date_range()
            .ok_or_else(|| StudyError::insufficient("ticker returns", 1, 0))?;
        let (factor_start, factor_end) = factors
            .date_range()
            .ok_or_else(|| StudyError::insufficient("factor series", 1, 0))?;
        return Err(StudyError::MisalignedData {
            ticker_start,
            ticker_end,
            factor_start,
            factor_end,
        });
    }

    if dates.len() < MIN_ALIGNED_OBSERVATIONS {
        return Err(StudyError::insufficient(
            context,
            MIN_ALIGNED_OBSERVATIONS,
            dates.len(),
        ));
    }

    debug!(
        ticker = %prices.ticker(),
        factors = factors.kind(),
        aligned = dates.len(),
        dropped_ticker = stock_returns.len() - dates.len(),
        dropped_factor = factors.len() - dates.len(),
        "aligned return series"
    );

    let n = dates.len();
    let factors = Array2::from_shape_vec((n, names.len()), factor_values)
        .map_err(|e| StudyError::InvalidInput(e.to_string()))?;
    let risk_free = (!risk_free.is_empty()).then(|| Array1::from_vec(risk_free));

    AlignedReturns::new(dates, Array1::from_vec(stock), factors, risk_free, names)
}
