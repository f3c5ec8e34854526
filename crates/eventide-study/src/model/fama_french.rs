//! Fama-French three-factor model
//!
//! Regresses the ticker's excess return on the market excess return, size
//! (SMB) and value (HML) factors:
//!
//! `R - R_f = α + β₁·MKT + β₂·SMB + β₃·HML + ε`
//!
//! Predictions are reported as raw returns, `R_f + α + Σ βᵢ·Fᵢ`, so that the
//! abnormal return equals the excess-return residual and the stock return
//! column is the same whichever model is chosen.

use super::{ModelChoice, ModelFit, ReturnModelFitter, fit_linear, linear_prediction, require_factors};
use crate::align::{AlignedReturns, FAMA_FRENCH_FACTORS};
use crate::error::{Result, StudyError};
use ndarray::Array1;

/// Three-factor model fitted by OLS on excess returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct FamaFrenchModel;

impl FamaFrenchModel {
    fn risk_free(window: &AlignedReturns) -> Result<&Array1<f64>> {
        window.risk_free().ok_or_else(|| {
            StudyError::InvalidInput(
                "Fama-French model needs a risk-free rate for every observation".to_string(),
            )
        })
    }
}

impl ReturnModelFitter for FamaFrenchModel {
    fn model(&self) -> ModelChoice {
        ModelChoice::FamaFrench3
    }

    fn fit(&self, estimation: &AlignedReturns) -> Result<ModelFit> {
        require_factors(self.model(), estimation, FAMA_FRENCH_FACTORS)?;
        let excess = estimation.stock() - Self::risk_free(estimation)?;
        fit_linear(self.model(), estimation, &excess)
    }

    fn predict(&self, fit: &ModelFit, window: &AlignedReturns) -> Result<Array1<f64>> {
        require_factors(fit.model(), window, FAMA_FRENCH_FACTORS)?;
        let excess = linear_prediction(fit, window)?;
        Ok(excess + Self::risk_free(window)?)
    }
}
