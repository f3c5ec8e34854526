//! Ordinary least squares via a singular value decomposition
//!
//! Every design column is scaled to unit norm before the decomposition, so the
//! rank test on the singular values does not depend on the units of the
//! factors. A design whose rank is below its column count has no unique
//! least-squares solution and is reported as singular.

use crate::error::{Result, StudyError};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Solution of an OLS problem.
#[derive(Debug, Clone)]
pub(crate) struct OlsSolution {
    /// Coefficients, one per design column
    pub(crate) coefficients: Array1<f64>,
    /// `y - Xb`
    pub(crate) residuals: Array1<f64>,
    /// Sum of squared residuals
    pub(crate) ssr: f64,
    /// Coefficient of determination, undefined for a constant response
    pub(crate) r_squared: Option<f64>,
}

impl OlsSolution {
    /// Residual variance with `n - p` degrees of freedom.
    pub(crate) fn residual_variance(&self, parameters: usize) -> f64 {
        let dof = self.residuals.len().saturating_sub(parameters).max(1);
        self.ssr / dof as f64
    }
}

/// Fit `response` on `design` (which must already contain any intercept column).
///
/// # Errors
/// * `InsufficientData` when there are fewer than `p + 1` observations.
/// * `SingularRegression` when the design does not have full column rank.
pub(crate) fn ols(design: &Array2<f64>, response: &Array1<f64>) -> Result<OlsSolution> {
    let (n, p) = design.dim();
    if response.len() != n {
        return Err(StudyError::InvalidInput(format!(
            "design has {} rows but response has {}",
            n,
            response.len()
        )));
    }
    if n < p + 1 {
        return Err(StudyError::insufficient("regression", p + 1, n));
    }

    let norms: Array1<f64> = design
        .columns()
        .into_iter()
        .map(|c| c.dot(&c).sqrt())
        .collect();
    if let Some(j) = norms.iter().position(|n| *n == 0.0 || !n.is_finite()) {
        return Err(StudyError::singular(format!("design column {j} has zero norm")));
    }

    let x = DMatrix::from_fn(n, p, |i, j| design[[i, j]] / norms[j]);
    let y = DVector::from_iterator(n, response.iter().copied());

    let svd = x.svd(true, true);
    let tolerance = svd.singular_values.max() * n.max(p) as f64 * f64::EPSILON;
    let rank = svd.rank(tolerance);
    if rank < p {
        return Err(StudyError::singular(format!(
            "design has rank {rank} but {p} columns"
        )));
    }

    let scaled = svd.solve(&y, tolerance).map_err(StudyError::singular)?;
    let coefficients = Array1::from_iter(scaled.iter().copied()) / &norms;

    let fitted = design.dot(&coefficients);
    let residuals = response - &fitted;
    let ssr = residuals.iter().map(|r| r * r).sum::<f64>();

    let mean = response.sum() / n as f64;
    let tss = response.iter().map(|y| (y - mean).powi(2)).sum::<f64>();
    let r_squared = (tss > 0.0).then(|| 1.0 - ssr / tss);

    Ok(OlsSolution {
        coefficients,
        residuals,
        ssr,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn with_intercept(x: &[f64]) -> Array2<f64> {
        let mut design = Array2::<f64>::ones((x.len(), 2));
        for (i, v) in x.iter().enumerate() {
            design[[i, 1]] = *v;
        }
        design
    }

    #[test]
    fn test_exact_line() {
        let x = [0.01, -0.02, 0.005, 0.03, -0.01];
        let y: Array1<f64> = x.iter().map(|v| 0.002 + 1.5 * v).collect();

        let solution = ols(&with_intercept(&x), &y).unwrap();
        assert_abs_diff_eq!(solution.coefficients[0], 0.002, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.coefficients[1], 1.5, epsilon = 1e-10);
        assert_abs_diff_eq!(solution.ssr, 0.0, epsilon = 1e-20);
        assert_abs_diff_eq!(solution.r_squared.unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_known_regression() {
        // y = [1, 3, 2, 5], x = [1, 2, 3, 4] -> slope 1.1, intercept 0.0
        let design = with_intercept(&[1.0, 2.0, 3.0, 4.0]);
        let y = Array1::from_vec(vec![1.0, 3.0, 2.0, 5.0]);

        let solution = ols(&design, &y).unwrap();
        assert_abs_diff_eq!(solution.coefficients[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.coefficients[1], 1.1, epsilon = 1e-12);
        // residuals: -0.1, 0.8, -1.3, 0.6
        assert_abs_diff_eq!(solution.ssr, 2.7, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.residual_variance(2), 1.35, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.residuals.sum(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tiny_factor_scale_is_not_singular() {
        let x = [1e-9, -2e-9, 5e-10, 3e-9, -1e-9, 2e-9];
        let y: Array1<f64> = x.iter().map(|v| 0.001 + 4.0e5 * v).collect();

        let solution = ols(&with_intercept(&x), &y).unwrap();
        assert_abs_diff_eq!(solution.coefficients[0], 0.001, epsilon = 1e-12);
        assert_abs_diff_eq!(solution.coefficients[1], 4.0e5, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_column_is_singular() {
        let design = with_intercept(&[0.0; 6]);
        let y = Array1::from_vec(vec![0.01, 0.02, -0.01, 0.0, 0.03, 0.01]);
        assert!(matches!(
            ols(&design, &y),
            Err(StudyError::SingularRegression { .. })
        ));
    }

    #[test]
    fn test_collinear_columns_are_singular() {
        let x = [0.01, -0.02, 0.005, 0.03, -0.01, 0.02];
        let mut design = Array2::<f64>::ones((x.len(), 3));
        for (i, v) in x.iter().enumerate() {
            design[[i, 1]] = *v;
            design[[i, 2]] = 2.0 * v;
        }
        let y: Array1<f64> = x.iter().map(|v| v * 0.5).collect();
        assert!(matches!(
            ols(&design, &y),
            Err(StudyError::SingularRegression { .. })
        ));
    }

    #[test]
    fn test_requires_more_rows_than_parameters() {
        let design = with_intercept(&[0.01, 0.02]);
        let y = Array1::from_vec(vec![0.01, 0.02]);
        assert!(matches!(
            ols(&design, &y),
            Err(StudyError::InsufficientData {
                required: 3,
                available: 2,
                ..
            })
        ));
    }
}
