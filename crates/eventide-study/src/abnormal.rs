//! Abnormal Return Calculator
//!
//! Applies a frozen [`ModelFit`] out of sample: for every event-window day
//! `expected = model prediction` and `abnormal = actual - expected`.

use crate::align::AlignedReturns;
use crate::error::{Result, StudyError};
use crate::model::{ModelFit, ReturnModelFitter};
use ndarray::Array1;

/// Per-day actual, expected and abnormal returns over a window.
#[derive(Debug, Clone, PartialEq)]
pub struct AbnormalReturns {
    /// Realised ticker returns
    pub stock: Array1<f64>,
    /// Model-implied normal returns
    pub expected: Array1<f64>,
    /// `stock - expected`
    pub abnormal: Array1<f64>,
}

impl AbnormalReturns {
    /// Number of days covered.
    pub fn len(&self) -> usize {
        self.stock.len()
    }

    /// Whether no days are covered.
    pub fn is_empty(&self) -> bool {
        self.stock.is_empty()
    }
}

/// Compute abnormal returns for `window` under `fit`.
///
/// # Errors
/// `InvalidInput` if `fit` was produced by a different model than `fitter`,
/// or if the window's factors do not match the model.
pub fn abnormal_returns(
    fitter: &dyn ReturnModelFitter,
    fit: &ModelFit,
    window: &AlignedReturns,
) -> Result<AbnormalReturns> {
    if fit.model() != fitter.model() {
        return Err(StudyError::InvalidInput(format!(
            "fit from {} cannot be applied by {}",
            fit.model(),
            fitter.model()
        )));
    }

    let expected = fitter.predict(fit, window)?;
    let stock = window.stock().clone();
    let abnormal = &stock - &expected;

    Ok(AbnormalReturns {
        stock,
        expected,
        abnormal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::BENCHMARK_FACTORS;
    use crate::model::{FamaFrenchModel, MarketModel};
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};
    use ndarray::Array2;

    fn window(market: &[f64], stock: &[f64]) -> AlignedReturns {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        AlignedReturns::new(
            (0..market.len())
                .map(|i| start + Duration::days(i as i64))
                .collect(),
            Array1::from_vec(stock.to_vec()),
            Array2::from_shape_vec((market.len(), 1), market.to_vec()).unwrap(),
            None,
            BENCHMARK_FACTORS,
        )
        .unwrap()
    }

    #[test]
    fn test_abnormal_is_actual_minus_expected() {
        let market = [0.01, -0.02, 0.015, 0.0, -0.005, 0.02];
        let stock: Vec<f64> = market.iter().map(|m| 0.001 + 0.8 * m).collect();
        let fit = MarketModel.fit(&window(&market, &stock)).unwrap();

        let event = window(&[0.01, 0.0], &[0.05, 0.001]);
        let ar = abnormal_returns(&MarketModel, &fit, &event).unwrap();

        assert_eq!(ar.len(), 2);
        assert_abs_diff_eq!(ar.expected[0], 0.009, epsilon = 1e-10);
        assert_abs_diff_eq!(ar.abnormal[0], 0.041, epsilon = 1e-10);
        assert_abs_diff_eq!(ar.abnormal[1], 0.0, epsilon = 1e-10);
        for i in 0..ar.len() {
            assert_eq!(ar.abnormal[i], ar.stock[i] - ar.expected[i]);
        }
    }

    #[test]
    fn test_residual_mean_is_zero_in_sample() {
        let market = [0.01, -0.02, 0.015, 0.0, -0.005, 0.02, 0.007, -0.011];
        let stock = [0.012, -0.015, 0.02, 0.003, -0.01, 0.018, 0.001, -0.004];
        let estimation = window(&market, &stock);
        let fit = MarketModel.fit(&estimation).unwrap();

        let ar = abnormal_returns(&MarketModel, &fit, &estimation).unwrap();
        assert_abs_diff_eq!(ar.abnormal.mean().unwrap(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn test_rejects_foreign_fit() {
        let market = [0.01, -0.02, 0.015, 0.0, -0.005, 0.02];
        let stock = [0.012, -0.015, 0.02, 0.003, -0.01, 0.018];
        let estimation = window(&market, &stock);
        let fit = MarketModel.fit(&estimation).unwrap();
        assert!(abnormal_returns(&FamaFrenchModel, &fit, &estimation).is_err());
    }
}
