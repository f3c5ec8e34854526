//! Return Model Fitter
//!
//! A return-generating model is fitted on the estimation window and then
//! applied, with frozen coefficients, to the event window. Both supported
//! models are linear in their factors and share one OLS routine:
//!
//! - [`MarketModel`]: `R = α + β·R_m + ε`
//! - [`FamaFrenchModel`]: `R - R_f = α + β₁·MKT + β₂·SMB + β₃·HML + ε`
//!
//! New models are added by implementing [`ReturnModelFitter`] and extending
//! [`ModelChoice`].

pub mod fama_french;
pub mod market;
pub(crate) mod ols;

pub use fama_french::FamaFrenchModel;
pub use market::MarketModel;

use crate::align::AlignedReturns;
use crate::error::{Result, StudyError};
use chrono::NaiveDate;
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The closed set of supported return models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelChoice {
    /// Single-factor regression on a benchmark index
    MarketAdjusted,
    /// Fama-French three-factor regression
    FamaFrench3,
}

impl ModelChoice {
    /// All supported models.
    pub const ALL: [Self; 2] = [Self::MarketAdjusted, Self::FamaFrench3];

    /// Display label used by dashboards and reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MarketAdjusted => "Market Adjusted Model",
            Self::FamaFrench3 => "Fama French 3-Factor Model",
        }
    }

    /// Short identifier used on the command line and in exports.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::MarketAdjusted => "market",
            Self::FamaFrench3 => "ff3",
        }
    }

    /// Number of free regression parameters, intercept included.
    pub const fn parameter_count(&self) -> usize {
        match self {
            Self::MarketAdjusted => 2,
            Self::FamaFrench3 => 4,
        }
    }

    /// The fitter implementing this model.
    pub fn fitter(&self) -> &'static dyn ReturnModelFitter {
        match self {
            Self::MarketAdjusted => &MarketModel,
            Self::FamaFrench3 => &FamaFrenchModel,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ModelChoice {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "market" | "market adjusted" | "market adjusted model" | "market model" => {
                Ok(Self::MarketAdjusted)
            }
            "ff3" | "fama french" | "fama french 3" | "fama french 3 factor"
            | "fama french 3 factor model" => Ok(Self::FamaFrench3),
            _ => Err(StudyError::InvalidInput(format!("unknown model: {s}"))),
        }
    }
}

/// Fitted sensitivity to one factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorLoading {
    /// Coefficient name, e.g. `beta_market`
    pub name: String,
    /// Fitted coefficient
    pub beta: f64,
}

/// Coefficients and residual statistics from the estimation window.
///
/// Immutable once computed; produced only by a [`ReturnModelFitter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFit {
    model: ModelChoice,
    intercept: f64,
    loadings: Vec<FactorLoading>,
    residual_std_error: f64,
    residual_variance: f64,
    r_squared: Option<f64>,
    observations: usize,
    estimation_start: NaiveDate,
    estimation_end: NaiveDate,
}

impl ModelFit {
    /// Model that produced the fit.
    pub const fn model(&self) -> ModelChoice {
        self.model
    }

    /// Fitted intercept α.
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Factor loadings in design-column order.
    pub fn loadings(&self) -> &[FactorLoading] {
        &self.loadings
    }

    /// Factor loadings as a vector.
    pub fn betas(&self) -> Array1<f64> {
        self.loadings.iter().map(|l| l.beta).collect()
    }

    /// Residual standard error, `sqrt(SSR / (n - p))`.
    pub const fn residual_std_error(&self) -> f64 {
        self.residual_std_error
    }

    /// Residual variance σ².
    pub const fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// In-sample R², if the response was not constant.
    pub const fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    /// Number of estimation observations.
    pub const fn observations(&self) -> usize {
        self.observations
    }

    /// First and last estimation-window dates.
    pub const fn estimation_date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.estimation_start, self.estimation_end)
    }
}

/// Capability shared by every return model.
pub trait ReturnModelFitter: fmt::Debug + Send + Sync {
    /// Which model this fitter implements.
    fn model(&self) -> ModelChoice;

    /// Fit the model on the estimation window.
    fn fit(&self, estimation: &AlignedReturns) -> Result<ModelFit>;

    /// Expected (normal) returns for every row of `window`, using `fit`'s
    /// frozen coefficients.
    fn predict(&self, fit: &ModelFit, window: &AlignedReturns) -> Result<Array1<f64>>;
}

/// Check that a window carries the factor columns a model needs.
pub(crate) fn require_factors(
    model: ModelChoice,
    window: &AlignedReturns,
    expected: &[&str],
) -> Result<()> {
    if window.factor_names() != expected {
        return Err(StudyError::InvalidInput(format!(
            "{} needs factors {:?}, got {:?}",
            model.label(),
            expected,
            window.factor_names()
        )));
    }
    Ok(())
}

/// OLS of `response` on an intercept plus the window's factor columns.
pub(crate) fn fit_linear(
    model: ModelChoice,
    window: &AlignedReturns,
    response: &Array1<f64>,
) -> Result<ModelFit> {
    let n = window.len();
    let parameters = window.factor_names().len() + 1;
    if n < parameters + 1 {
        return Err(StudyError::insufficient(
            format!("{} estimation window", model.label()),
            parameters + 1,
            n,
        ));
    }

    // A constant factor is collinear with the intercept; report it by name.
    for (j, name) in window.factor_names().iter().enumerate() {
        let column = window.factors().column(j);
        let first = column[0];
        if column.iter().all(|v| *v == first) {
            let (start, end) = (window.dates()[0], window.dates()[n - 1]);
            return Err(StudyError::singular(format!(
                "factor '{name}' is constant ({first}) over the estimation window {start}..={end}"
            )));
        }
    }

    let mut design = Array2::<f64>::ones((n, parameters));
    design.slice_mut(s![.., 1..]).assign(window.factors());

    let solution = ols::ols(&design, response)?;
    let residual_variance = solution.residual_variance(parameters);

    let loadings = window
        .factor_names()
        .iter()
        .zip(solution.coefficients.iter().skip(1))
        .map(|(name, beta)| FactorLoading {
            name: format!("beta_{name}"),
            beta: *beta,
        })
        .collect::<Vec<_>>();

    let fit = ModelFit {
        model,
        intercept: solution.coefficients[0],
        loadings,
        residual_std_error: residual_variance.sqrt(),
        residual_variance,
        r_squared: solution.r_squared,
        observations: n,
        estimation_start: window.dates()[0],
        estimation_end: window.dates()[n - 1],
    };

    debug!(
        model = model.short_name(),
        observations = n,
        alpha = fit.intercept,
        betas = ?fit.betas().to_vec(),
        sigma = fit.residual_std_error,
        "fitted return model"
    );

    Ok(fit)
}

/// `α + F·β` for every row of the window.
pub(crate) fn linear_prediction(fit: &ModelFit, window: &AlignedReturns) -> Result<Array1<f64>> {
    let betas = fit.betas();
    if window.factors().ncols() != betas.len() {
        return Err(StudyError::InvalidInput(format!(
            "fit has {} loadings but window has {} factors",
            betas.len(),
            window.factors().ncols()
        )));
    }
    Ok(window.factors().dot(&betas) + fit.intercept)
}
