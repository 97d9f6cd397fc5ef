//! Differencing and lag-polynomial helpers for seasonal ARIMA models.

/// Apply `d` rounds of first differencing.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply `d` rounds of lag-`period` differencing.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            return Vec::new();
        }
        result = result
            .iter()
            .skip(period)
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Dense lag polynomial `1 + sign * (c_1 B^step + c_2 B^{2 step} + ...)`.
pub fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// Product of two lag polynomials.
pub fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut product = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            product[i + j] += x * y;
        }
    }
    product
}

/// `(1 - B)^d (1 - B^period)^seasonal_d` as a dense lag polynomial.
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    let seasonal = lag_polynomial(&[1.0], period.max(1), -1.0);
    for _ in 0..seasonal_d {
        poly = multiply(&poly, &seasonal);
    }
    poly
}

/// Undo differencing for values that follow `history`.
///
/// `poly` is the differencing polynomial; each new level is
/// `y_t = w_t - sum_k poly[k] * y_{t-k}`.
pub fn integrate(differenced: &[f64], history: &[f64], poly: &[f64]) -> Vec<f64> {
    let mut extended = history.to_vec();
    for &w in differenced {
        let t = extended.len();
        let carried: f64 = poly
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(k, _)| k <= t)
            .map(|(k, c)| c * extended[t - k])
            .sum();
        extended.push(w - carried);
    }
    extended.split_off(history.len())
}
