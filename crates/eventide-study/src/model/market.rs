//! Market-adjusted model
//!
//! Single-factor regression of the ticker's return on the benchmark index
//! return: `R = α + β·R_m + ε`.

use super::{ModelChoice, ModelFit, ReturnModelFitter, fit_linear, linear_prediction, require_factors};
use crate::align::{AlignedReturns, BENCHMARK_FACTORS};
use crate::error::Result;
use ndarray::Array1;

/// Market model fitted by OLS against a benchmark.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketModel;

impl ReturnModelFitter for MarketModel {
    fn model(&self) -> ModelChoice {
        ModelChoice::MarketAdjusted
    }

    fn fit(&self, estimation: &AlignedReturns) -> Result<ModelFit> {
        require_factors(self.model(), estimation, BENCHMARK_FACTORS)?;
        fit_linear(self.model(), estimation, estimation.stock())
    }

    fn predict(&self, fit: &ModelFit, window: &AlignedReturns) -> Result<Array1<f64>> {
        require_factors(fit.model(), window, BENCHMARK_FACTORS)?;
        linear_prediction(fit, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudyError;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};
    use ndarray::Array2;

    fn window(market: &[f64], stock: &[f64]) -> AlignedReturns {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let dates = (0..market.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let factors = Array2::from_shape_vec((market.len(), 1), market.to_vec()).unwrap();
        AlignedReturns::new(
            dates,
            Array1::from_vec(stock.to_vec()),
            factors,
            None,
            BENCHMARK_FACTORS,
        )
        .unwrap()
    }

    #[test]
    fn test_recovers_alpha_and_beta() {
        let market = [0.01, -0.004, 0.007, 0.002, -0.012, 0.015, 0.003, -0.006];
        let stock: Vec<f64> = market.iter().map(|m| 0.0005 + 1.3 * m).collect();

        let fit = MarketModel.fit(&window(&market, &stock)).unwrap();
        assert_eq!(fit.model(), ModelChoice::MarketAdjusted);
        assert_abs_diff_eq!(fit.intercept(), 0.0005, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.loadings()[0].beta, 1.3, epsilon = 1e-10);
        assert_eq!(fit.loadings()[0].name, "beta_market");
        assert_abs_diff_eq!(fit.residual_std_error(), 0.0, epsilon = 1e-12);
        assert_eq!(fit.observations(), market.len());
    }

    #[test]
    fn test_predict_uses_frozen_coefficients() {
        let market = [0.01, -0.004, 0.007, 0.002, -0.012];
        let stock: Vec<f64> = market.iter().map(|m| 2.0 * m).collect();
        let fit = MarketModel.fit(&window(&market, &stock)).unwrap();

        let event = window(&[0.02, -0.01], &[0.5, 0.5]);
        let expected = MarketModel.predict(&fit, &event).unwrap();
        assert_abs_diff_eq!(expected[0], 0.04, epsilon = 1e-10);
        assert_abs_diff_eq!(expected[1], -0.02, epsilon = 1e-10);
    }

    #[test]
    fn test_constant_zero_benchmark_is_singular() {
        let market = [0.0; 10];
        let stock = [0.01, 0.02, -0.01, 0.0, 0.005, 0.01, -0.02, 0.003, 0.0, 0.01];
        let err = MarketModel.fit(&window(&market, &stock)).unwrap_err();
        assert!(matches!(err, StudyError::SingularRegression { .. }));
    }

    #[test]
    fn test_too_few_observations() {
        let err = MarketModel
            .fit(&window(&[0.01, 0.02], &[0.01, 0.02]))
            .unwrap_err();
        assert!(matches!(
            err,
            StudyError::InsufficientData {
                required: 3,
                available: 2,
                ..
            }
        ));
    }
}
