//! Single-feature ordinary least squares.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FitError {
    #[error("cannot fit a model without samples")]
    Empty,
    #[error("non-finite training sample at index {index}")]
    NonFinite { index: usize },
}

#[derive(Debug, Error, PartialEq)]
pub enum InferenceError {
    #[error("feature {feature} is not finite")]
    NonFiniteFeature { feature: f64 },
    #[error("model produced a non-finite output {output} for feature {feature}")]
    NonFiniteOutput { feature: f64, output: f64 },
}

/// A fitted model evaluated on one real-valued feature.
pub trait Regressor: Send + Sync {
    fn predict(&self, feature: f64) -> Result<f64, InferenceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coefficient: f64,
    pub intercept: f64,
    /// Number of samples the model was fit on.
    pub samples: usize,
}

impl LinearModel {
    pub fn new(coefficient: f64, intercept: f64) -> Self { Self { coefficient, intercept, samples: 0 } }

    /// Least-squares fit of `y = coefficient * x + intercept`.
    ///
    /// When every `x` is identical the system is rank deficient; the minimum-norm solution
    /// (`coefficient = 0`, `intercept = mean(y)`) is returned.
    pub fn fit(samples: &[(f64, f64)]) -> Result<Self, FitError> {
        if samples.is_empty() { return Err(FitError::Empty); }
        if let Some(index) = samples.iter().position(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(FitError::NonFinite { index });
        }
        let n = samples.len() as f64;
        let mean_x = samples.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = samples.iter().map(|(_, y)| y).sum::<f64>() / n;
        let (mut sxx, mut sxy) = (0.0, 0.0);
        for (x, y) in samples {
            let dx = x - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }
        let coefficient = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        let intercept = mean_y - coefficient * mean_x;
        Ok(Self { coefficient, intercept, samples: samples.len() })
    }
}

impl Regressor for LinearModel {
    fn predict(&self, feature: f64) -> Result<f64, InferenceError> {
        if !feature.is_finite() { return Err(InferenceError::NonFiniteFeature { feature }); }
        let output = self.coefficient * feature + self.intercept;
        if !output.is_finite() { return Err(InferenceError::NonFiniteOutput { feature, output }); }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_rounds_product_before_sum() {
        // a fused multiply-add would give 2.7755575615628914e-17 here
        let m = LinearModel::new(0.1, -0.3);
        let (c, f, i) = (0.1_f64, 3.0_f64, -0.3_f64);
        assert_eq!(m.predict(3.0).unwrap(), c * f + i);
        assert_eq!(m.predict(3.0).unwrap(), 5.551115123125783e-17);
    }

    #[test]
    fn recovers_exact_line() {
        let data: Vec<(f64, f64)> = (1..=10).map(|x| (x as f64, 2.0 * x as f64 + 3.0)).collect();
        let m = LinearModel::fit(&data).unwrap();
        assert!((m.coefficient - 2.0).abs() < 1e-12);
        assert!((m.intercept - 3.0).abs() < 1e-12);
        assert_eq!(m.samples, 10);
        assert!((m.predict(20.0).unwrap() - 43.0).abs() < 1e-9);
    }

    #[test]
    fn noisy_fit_matches_closed_form() {
        // x = [1,2,3,4], y = [10,12,11,15] -> slope 1.4, intercept 8.5
        let m = LinearModel::fit(&[(1.0, 10.0), (2.0, 12.0), (3.0, 11.0), (4.0, 15.0)]).unwrap();
        assert!((m.coefficient - 1.4).abs() < 1e-12);
        assert!((m.intercept - 8.5).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_falls_back_to_mean() {
        let m = LinearModel::fit(&[(15.0, 10.0), (15.0, 20.0), (15.0, 30.0)]).unwrap();
        assert_eq!(m.coefficient, 0.0);
        assert_eq!(m.intercept, 20.0);
        assert_eq!(m.predict(200.0).unwrap(), 20.0);
    }

    #[test]
    fn single_sample_predicts_its_value() {
        let m = LinearModel::fit(&[(40.0, 33.0)]).unwrap();
        assert_eq!(m.predict(1.0).unwrap(), 33.0);
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert_eq!(LinearModel::fit(&[]), Err(FitError::Empty));
        assert_eq!(LinearModel::fit(&[(1.0, 2.0), (f64::NAN, 1.0)]), Err(FitError::NonFinite { index: 1 }));
    }

    #[test]
    fn overflow_is_an_inference_error() {
        let m = LinearModel::new(f64::MAX, 0.0);
        assert!(matches!(m.predict(10.0), Err(InferenceError::NonFiniteOutput { .. })));
        assert!(matches!(m.predict(f64::INFINITY), Err(InferenceError::NonFiniteFeature { .. })));
    }

    #[test]
    fn fit_is_deterministic() {
        let data = [(3.0, 7.0), (9.0, 4.0), (27.0, 12.0), (100.0, 50.0)];
        assert_eq!(LinearModel::fit(&data).unwrap(), LinearModel::fit(&data).unwrap());
    }
}
