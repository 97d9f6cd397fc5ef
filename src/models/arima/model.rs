//! Seasonal ARIMA model fitted by conditional sum of squares.

use crate::core::{Forecast, Frequency, TimeSeries};
use crate::error::{FitFailure, ForecastError, Result};
use crate::models::arima::diff::{
    difference, differencing_polynomial, integrate, lag_polynomial, multiply, seasonal_difference,
};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use chrono::{DateTime, Utc};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// SARIMA model specification: (p, d, q)(P, D, Q)\[s\].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub seasonal_p: usize,
    /// Seasonal differencing order (D)
    pub seasonal_d: usize,
    /// Seasonal MA order (Q)
    pub seasonal_q: usize,
    /// Seasonal period (s)
    pub period: usize,
}

impl SARIMASpec {
    pub fn new(
        (p, d, q): (usize, usize, usize),
        (seasonal_p, seasonal_d, seasonal_q): (usize, usize, usize),
        period: usize,
    ) -> Self {
        Self {
            p,
            d,
            q,
            seasonal_p,
            seasonal_d,
            seasonal_q,
            period,
        }
    }

    /// The (1,1,1)(1,1,1)\[s\] "airline-style" specification.
    pub fn airline(period: usize) -> Self {
        Self::new((1, 1, 1), (1, 1, 1), period)
    }

    /// Whether a mean term is estimated (only for undifferenced models).
    pub fn has_mean(&self) -> bool {
        self.d == 0 && self.seasonal_d == 0
    }

    /// Number of estimated coefficients.
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q + usize::from(self.has_mean())
    }

    /// Observations consumed by differencing.
    pub fn differencing_lag(&self) -> usize {
        self.d + self.seasonal_d * self.period
    }

    /// Largest AR or MA lag after expanding the seasonal polynomials.
    pub fn max_lag(&self) -> usize {
        let ar = self.p + self.seasonal_p * self.period;
        let ma = self.q + self.seasonal_q * self.period;
        ar.max(ma)
    }

    /// Minimum series length for a fit.
    pub fn min_observations(&self) -> usize {
        self.differencing_lag() + self.max_lag() + self.num_params() + 1
    }
}

/// Seasonal ARIMA forecaster.
///
/// The differenced series `w = (1 - B)^d (1 - B^s)^D y` follows
/// `phi(B) Phi(B^s) (w - mu) = theta(B) Theta(B^s) e`. Coefficients are
/// estimated by minimising the conditional sum of squares with
/// Nelder-Mead and bounded to `(-0.99, 0.99)`.
#[derive(Debug, Clone)]
pub struct SARIMA {
    spec: SARIMASpec,
    optimizer: NelderMeadConfig,
    ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ar: Vec<f64>,
    seasonal_ma: Vec<f64>,
    mean: f64,
    history: Option<Vec<f64>>,
    anchor: Option<(DateTime<Utc>, Frequency)>,
    differenced: Option<Vec<f64>>,
    innovations: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    residual_variance: Option<f64>,
    aic: Option<f64>,
    bic: Option<f64>,
}

impl SARIMA {
    /// Create a new model from a specification.
    pub fn new(spec: SARIMASpec) -> Self {
        Self {
            spec,
            optimizer: NelderMeadConfig {
                max_iter: 5000,
                ..Default::default()
            },
            ar: vec![],
            ma: vec![],
            seasonal_ar: vec![],
            seasonal_ma: vec![],
            mean: 0.0,
            history: None,
            anchor: None,
            differenced: None,
            innovations: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
            aic: None,
            bic: None,
        }
    }

    /// SARIMA(1,1,1)(1,1,1)\[period\].
    pub fn airline(period: usize) -> Self {
        Self::new(SARIMASpec::airline(period))
    }

    /// Override the optimiser settings.
    pub fn with_optimizer(mut self, config: NelderMeadConfig) -> Self {
        self.optimizer = config;
        self
    }

    pub fn spec(&self) -> SARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.seasonal_ar
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.seasonal_ma
    }

    /// Mean of the differenced series (zero when differencing is applied).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.residual_variance
    }

    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    pub fn bic(&self) -> Option<f64> {
        self.bic
    }

    /// Split a parameter vector into (mean, ar, ma, seasonal ar, seasonal ma).
    fn unpack(&self, params: &[f64]) -> (f64, Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let s = &self.spec;
        let mut rest = params;
        let mean = if s.has_mean() {
            let m = rest[0];
            rest = &rest[1..];
            m
        } else {
            0.0
        };
        let (ar, rest) = rest.split_at(s.p);
        let (ma, rest) = rest.split_at(s.q);
        let (sar, sma) = rest.split_at(s.seasonal_p);
        (mean, ar.to_vec(), ma.to_vec(), sar.to_vec(), sma.to_vec())
    }

    /// Expanded AR and MA lag polynomials for the given coefficients.
    fn polynomials(&self, ar: &[f64], ma: &[f64], sar: &[f64], sma: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let period = self.spec.period.max(1);
        let ar_poly = multiply(&lag_polynomial(ar, 1, -1.0), &lag_polynomial(sar, period, -1.0));
        let ma_poly = multiply(&lag_polynomial(ma, 1, 1.0), &lag_polynomial(sma, period, 1.0));
        (ar_poly, ma_poly)
    }

    /// One-step innovations of the centered differenced series.
    ///
    /// Innovations before the largest lag are taken as zero.
    fn innovations(centered: &[f64], ar_poly: &[f64], ma_poly: &[f64], start: usize) -> Vec<f64> {
        let n = centered.len();
        let mut errors = vec![0.0; n];
        for t in start..n {
            let ar_part: f64 = (1..ar_poly.len()).map(|k| ar_poly[k] * centered[t - k]).sum();
            let ma_part: f64 = (1..ma_poly.len()).map(|k| ma_poly[k] * errors[t - k]).sum();
            errors[t] = centered[t] + ar_part - ma_part;
        }
        errors
    }

    fn css(&self, w: &[f64], params: &[f64]) -> f64 {
        let (mean, ar, ma, sar, sma) = self.unpack(params);
        let (ar_poly, ma_poly) = self.polynomials(&ar, &ma, &sar, &sma);
        let centered: Vec<f64> = w.iter().map(|x| x - mean).collect();
        let start = self.spec.max_lag();

        let css: f64 = Self::innovations(&centered, &ar_poly, &ma_poly, start)[start..]
            .iter()
            .map(|e| e * e)
            .sum();
        if css.is_finite() {
            css
        } else {
            f64::INFINITY
        }
    }

    fn validate_input(&self, values: &[f64]) -> std::result::Result<(), FitFailure> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(FitFailure::NonFinite("input series".to_string()));
        }

        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(FitFailure::TooFewObservations {
                needed,
                got: values.len(),
            });
        }
        Ok(())
    }

    fn estimate(&mut self, w: &[f64]) -> std::result::Result<(), FitFailure> {
        let spec = self.spec;
        let scale = w.iter().fold(0.0_f64, |m, x| m.max(x.abs())).max(1.0);
        if w.iter().all(|x| (x - w[0]).abs() <= 1e-10 * scale) {
            return Err(FitFailure::Degenerate(
                "differenced series is constant".to_string(),
            ));
        }

        let mut initial = Vec::with_capacity(spec.num_params());
        let mut bounds = Vec::with_capacity(spec.num_params());
        if spec.has_mean() {
            initial.push(w.iter().sum::<f64>() / w.len() as f64);
            bounds.push((f64::NEG_INFINITY, f64::INFINITY));
        }
        for order in [spec.p, spec.q, spec.seasonal_p, spec.seasonal_q] {
            for i in 0..order {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-0.99, 0.99));
            }
        }

        let params = if initial.is_empty() {
            initial
        } else {
            let result = nelder_mead(
                |params| self.css(w, params),
                &initial,
                Some(&bounds),
                self.optimizer.clone(),
            );
            if !result.optimal_value.is_finite() {
                return Err(FitFailure::NonFinite("conditional sum of squares".to_string()));
            }
            if !result.converged {
                warn!(
                    iterations = result.iterations,
                    "SARIMA optimizer did not converge"
                );
                return Err(FitFailure::NonConvergence {
                    iterations: result.iterations,
                });
            }
            debug!(
                iterations = result.iterations,
                css = result.optimal_value,
                "SARIMA optimizer converged"
            );
            result.optimal_point
        };

        let (mean, ar, ma, sar, sma) = self.unpack(&params);
        self.mean = mean;
        self.ar = ar;
        self.ma = ma;
        self.seasonal_ar = sar;
        self.seasonal_ma = sma;
        Ok(())
    }

    fn store_fit(
        &mut self,
        values: &[f64],
        w: Vec<f64>,
    ) -> std::result::Result<(), FitFailure> {
        let (ar_poly, ma_poly) =
            self.polynomials(&self.ar, &self.ma, &self.seasonal_ar, &self.seasonal_ma);
        let start = self.spec.max_lag();
        let centered: Vec<f64> = w.iter().map(|x| x - self.mean).collect();
        let errors = Self::innovations(&centered, &ar_poly, &ma_poly, start);

        let effective = &errors[start..];
        let n_eff = effective.len() as f64;
        let variance = effective.iter().map(|e| e * e).sum::<f64>() / n_eff;
        if !variance.is_finite() {
            return Err(FitFailure::NonFinite("residual variance".to_string()));
        }
        if variance <= 0.0 {
            return Err(FitFailure::Degenerate(
                "zero residual variance".to_string(),
            ));
        }

        let k = self.spec.num_params() as f64;
        let ll = -0.5 * n_eff * (1.0 + variance.ln() + (2.0 * std::f64::consts::PI).ln());
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.bic = Some(-2.0 * ll + k * n_eff.ln());
        self.residual_variance = Some(variance);

        // Innovations map one-to-one onto the original scale.
        let offset = self.spec.differencing_lag() + start;
        let mut residuals = vec![f64::NAN; values.len()];
        let mut fitted = vec![f64::NAN; values.len()];
        for t in offset..values.len() {
            let e = errors[t - self.spec.differencing_lag()];
            residuals[t] = e;
            fitted[t] = values[t] - e;
        }

        self.history = Some(values.to_vec());
        self.differenced = Some(w);
        self.innovations = Some(errors);
        self.residuals = Some(residuals);
        self.fitted = Some(fitted);
        Ok(())
    }

    /// Point forecasts on the original scale.
    fn point_forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let history = self.history.as_ref().ok_or(ForecastError::FitRequired)?;
        let w = self.differenced.as_ref().ok_or(ForecastError::FitRequired)?;
        let errors = self.innovations.as_ref().ok_or(ForecastError::FitRequired)?;

        let (ar_poly, ma_poly) =
            self.polynomials(&self.ar, &self.ma, &self.seasonal_ar, &self.seasonal_ma);
        let mut centered: Vec<f64> = w.iter().map(|x| x - self.mean).collect();
        let mut shocks = errors.clone();

        for _ in 0..horizon {
            let t = centered.len();
            let ar_part: f64 = (1..ar_poly.len())
                .filter(|&k| k <= t)
                .map(|k| ar_poly[k] * centered[t - k])
                .sum();
            let ma_part: f64 = (1..ma_poly.len())
                .filter(|&k| k <= t)
                .map(|k| ma_poly[k] * shocks[t - k])
                .sum();
            centered.push(ma_part - ar_part);
            shocks.push(0.0);
        }

        let future_w: Vec<f64> = centered[w.len()..].iter().map(|z| z + self.mean).collect();
        let poly = differencing_polynomial(self.spec.d, self.spec.seasonal_d, self.spec.period);
        Ok(integrate(&future_w, history, &poly))
    }

    /// Psi weights of the integrated model, `psi_0 = 1`.
    fn psi_weights(&self, horizon: usize) -> Vec<f64> {
        let (ar_poly, ma_poly) =
            self.polynomials(&self.ar, &self.ma, &self.seasonal_ar, &self.seasonal_ma);
        let diff_poly = differencing_polynomial(self.spec.d, self.spec.seasonal_d, self.spec.period);
        let full_ar = multiply(&diff_poly, &ar_poly);

        let mut psi = vec![0.0; horizon];
        for j in 0..horizon {
            let ma = if j == 0 {
                1.0
            } else {
                ma_poly.get(j).copied().unwrap_or(0.0)
            };
            let ar: f64 = (1..=j)
                .filter(|&k| k < full_ar.len())
                .map(|k| full_ar[k] * psi[j - k])
                .sum();
            psi[j] = ma - ar;
        }
        psi
    }

    fn future_index(&self, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
        let (last, freq) = self.anchor.ok_or(ForecastError::FitRequired)?;
        (1..=horizon as u32)
            .map(|step| freq.advance(last, step))
            .collect()
    }
}

impl Forecaster for SARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        if self.spec.seasonal_d + self.spec.seasonal_p + self.spec.seasonal_q > 0
            && self.spec.period < 2
        {
            return Err(ForecastError::InvalidParameter(
                "seasonal terms need a period of at least 2".to_string(),
            ));
        }

        let values = series.values();
        let last = series.last_timestamp().ok_or(ForecastError::EmptyData)?;
        let freq = series.resolved_frequency()?;

        self.validate_input(values)?;
        let w = seasonal_difference(
            &difference(values, self.spec.d),
            self.spec.seasonal_d,
            self.spec.period,
        );
        self.estimate(&w)?;
        self.store_fit(values, w)?;
        self.anchor = Some((last, freq));

        debug!(
            observations = values.len(),
            period = self.spec.period,
            aic = self.aic,
            "SARIMA fit complete"
        );
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let values = self.point_forecast(horizon)?;
        Forecast::from_values(self.future_index(horizon)?, values)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must be in (0, 1), got {level}"
            )));
        }

        let forecast = self.predict(horizon)?;
        let variance = self.residual_variance.ok_or(ForecastError::FitRequired)?;
        let normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let z = normal.inverse_cdf((1.0 + level) / 2.0);

        let mut cumulative = 0.0;
        let (lower, upper): (Vec<f64>, Vec<f64>) = self
            .psi_weights(horizon)
            .iter()
            .zip(forecast.values())
            .map(|(psi, point)| {
                cumulative += psi * psi;
                let se = (variance * cumulative).sqrt();
                (point - z * se, point + z * se)
            })
            .unzip();

        forecast.with_intervals(lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn seasonal_demand(n: usize, period: usize) -> TimeSeries {
        let values = (0..n)
            .map(|i| {
                let t = i as f64;
                200.0
                    + 1.5 * t
                    + 25.0 * (2.0 * std::f64::consts::PI * t / period as f64).sin()
                    + 4.0 * (t * 1.7).sin()
                    + 2.5 * (t * 0.45).cos()
            })
            .collect();
        TimeSeries::monthly(2015, 1, values).unwrap()
    }

    #[test]
    fn spec_accessors() {
        let spec = SARIMASpec::airline(12);
        assert_eq!(spec.num_params(), 4);
        assert!(!spec.has_mean());
        assert_eq!(spec.differencing_lag(), 13);
        assert_eq!(spec.max_lag(), 13);
        assert_eq!(spec.min_observations(), 31);

        let plain = SARIMASpec::new((1, 0, 0), (0, 0, 0), 1);
        assert!(plain.has_mean());
        assert_eq!(plain.num_params(), 2);
    }

    #[test]
    fn airline_fit_and_predict() {
        let series = seasonal_demand(72, 12);
        let mut model = SARIMA::airline(12);
        model.fit(&series).unwrap();

        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert_eq!(model.seasonal_ar_coefficients().len(), 1);
        assert_eq!(model.seasonal_ma_coefficients().len(), 1);
        for c in model
            .ar_coefficients()
            .iter()
            .chain(model.seasonal_ma_coefficients())
        {
            assert!(c.abs() <= 0.99);
        }

        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.horizon(), 12);
        assert!(forecast.values().iter().all(|v| v.is_finite()));
        assert_eq!(
            forecast.timestamps()[0],
            series.future_timestamps(1).unwrap()[0]
        );
    }

    #[test]
    fn forecast_tracks_trend_and_season() {
        let series = seasonal_demand(96, 12);
        let mut model = SARIMA::airline(12);
        model.fit(&series).unwrap();

        let forecast = model.predict(12).unwrap();
        let last_year = &series.values()[84..];
        let mean_forecast = forecast.values().iter().sum::<f64>() / 12.0;
        let mean_last_year = last_year.iter().sum::<f64>() / 12.0;

        // Seasonal differencing carries the level and the growth forward.
        assert!(mean_forecast > mean_last_year);
        assert!((mean_forecast - mean_last_year - 18.0).abs() < 15.0);
    }

    #[test]
    fn fitted_values_and_residuals_align() {
        let series = seasonal_demand(60, 12);
        let mut model = SARIMA::airline(12);
        model.fit(&series).unwrap();

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 60);
        assert!(fitted[..26].iter().all(|f| f.is_nan()));
        for t in 26..60 {
            assert_relative_eq!(fitted[t] + residuals[t], series.values()[t], epsilon = 1e-9);
        }
        assert!(model.aic().unwrap().is_finite());
        assert!(model.bic().unwrap() > model.aic().unwrap());
    }

    #[test]
    fn intervals_widen_with_horizon() {
        let series = seasonal_demand(72, 12);
        let mut model = SARIMA::airline(12);
        model.fit(&series).unwrap();

        let forecast = model.predict_with_intervals(6, 0.95).unwrap();
        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        for i in 0..6 {
            assert!(lower[i] < forecast.values()[i]);
            assert!(upper[i] > forecast.values()[i]);
        }
        assert!(upper[5] - lower[5] > upper[0] - lower[0]);

        assert!(model.predict_with_intervals(6, 1.5).is_err());
    }

    #[test]
    fn psi_weights_of_random_walk() {
        let values: Vec<f64> = (0..20).map(|i| (i as f64 * 0.9).sin() * 3.0 + i as f64).collect();
        let series = TimeSeries::monthly(2020, 1, values).unwrap();
        let mut model = SARIMA::new(SARIMASpec::new((0, 1, 0), (0, 0, 0), 1));
        model.fit(&series).unwrap();

        // ARIMA(0,1,0): every psi weight is one.
        for psi in model.psi_weights(5) {
            assert_relative_eq!(psi, 1.0, epsilon = 1e-12);
        }
        // And the point forecast is the last observation.
        let forecast = model.predict(3).unwrap();
        let last = *series.values().last().unwrap();
        for v in forecast.values() {
            assert_relative_eq!(*v, last, epsilon = 1e-9);
        }
    }

    #[test]
    fn too_few_observations_is_a_fit_failure() {
        let series = seasonal_demand(30, 12);
        let mut model = SARIMA::airline(12);
        assert_eq!(
            model.fit(&series),
            Err(ForecastError::ModelFitting(FitFailure::TooFewObservations {
                needed: 31,
                got: 30
            }))
        );
    }

    #[test]
    fn constant_series_is_degenerate() {
        let series = TimeSeries::monthly(2015, 1, vec![42.0; 48]).unwrap();
        let mut model = SARIMA::airline(12);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::ModelFitting(FitFailure::Degenerate(_)))
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut values: Vec<f64> = seasonal_demand(48, 12).values().to_vec();
        values[10] = f64::NAN;
        let series = TimeSeries::monthly(2015, 1, values).unwrap();
        let mut model = SARIMA::airline(12);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::ModelFitting(FitFailure::NonFinite(_)))
        ));
    }

    #[test]
    fn optimizer_budget_exhaustion_is_reported() {
        let series = seasonal_demand(60, 12);
        let mut model = SARIMA::airline(12).with_optimizer(NelderMeadConfig {
            max_iter: 2,
            ..Default::default()
        });
        assert_eq!(
            model.fit(&series),
            Err(ForecastError::ModelFitting(FitFailure::NonConvergence {
                iterations: 2
            }))
        );
    }

    #[test]
    fn requires_fit() {
        let model = SARIMA::airline(12);
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn zero_horizon() {
        let series = seasonal_demand(48, 12);
        let mut model = SARIMA::airline(12);
        model.fit(&series).unwrap();
        assert_eq!(model.predict(0).unwrap().horizon(), 0);
    }

    #[test]
    fn seasonal_terms_need_a_period() {
        let series = seasonal_demand(48, 12);
        let mut model = SARIMA::airline(1);
        assert!(matches!(
            model.fit(&series),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn name() {
        assert_eq!(SARIMA::airline(12).name(), "SARIMA");
    }
}
