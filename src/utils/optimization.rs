//! Derivative-free minimisation for model parameter estimation.

use std::cmp::Ordering;

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the relative objective spread or the simplex size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the coordinate when it is non-zero.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// Best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at the best point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex collapsed within tolerance.
    pub converged: bool,
}

/// Minimise `objective` starting from `initial`.
///
/// Points are clamped into `bounds` (one `(min, max)` pair per coordinate)
/// before every evaluation.
///
/// # Example
/// ```
/// use demand_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     None,
///     NelderMeadConfig::default(),
/// );
///
/// assert!(result.converged);
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-3);
/// assert!((result.optimal_point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    bounds: Option<&[(f64, f64)]>,
    config: NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let dim = initial.len();
    if dim == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let clamp = |point: Vec<f64>| -> Vec<f64> {
        match bounds {
            Some(b) => point
                .into_iter()
                .zip(b)
                .map(|(x, &(lo, hi))| x.clamp(lo, hi))
                .collect(),
            None => point,
        }
    };
    // NaN objectives sort last so they are replaced first.
    let eval = |point: &[f64]| {
        let value = objective(point);
        if value.is_nan() {
            f64::INFINITY
        } else {
            value
        }
    };

    let mut vertices: Vec<(Vec<f64>, f64)> = Vec::with_capacity(dim + 1);
    let start = clamp(initial.to_vec());
    let start_value = eval(&start);
    vertices.push((start, start_value));
    for i in 0..dim {
        let mut point = initial.to_vec();
        point[i] += if initial[i].abs() > 1e-10 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        let point = clamp(point);
        let value = eval(&point);
        vertices.push((point, value));
    }

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;
        vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        let best = vertices[0].1;
        let worst = vertices[dim].1;
        let second_worst = vertices[dim - 1].1;

        let centroid = centroid(&vertices[..dim]);
        let spread = (worst - best).abs();
        let size = vertices
            .iter()
            .map(|(p, _)| distance(p, &centroid))
            .fold(0.0, f64::max);
        if spread <= config.tolerance * (1.0 + best.abs()) || size < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp(along(&centroid, &vertices[dim].0, -config.alpha));
        let reflected_value = eval(&reflected);

        if reflected_value < best {
            let expanded = clamp(along(&centroid, &reflected, config.gamma));
            let expanded_value = eval(&expanded);
            vertices[dim] = if expanded_value < reflected_value {
                (expanded, expanded_value)
            } else {
                (reflected, reflected_value)
            };
            continue;
        }

        if reflected_value < second_worst {
            vertices[dim] = (reflected, reflected_value);
            continue;
        }

        let (target, target_value) = if reflected_value < worst {
            (&reflected, reflected_value)
        } else {
            (&vertices[dim].0, worst)
        };
        let contracted = clamp(along(&centroid, target, config.rho));
        let contracted_value = eval(&contracted);
        if contracted_value < target_value {
            vertices[dim] = (contracted, contracted_value);
            continue;
        }

        let anchor = vertices[0].0.clone();
        for vertex in vertices.iter_mut().skip(1) {
            let shrunk = clamp(along(&anchor, &vertex.0, config.sigma));
            let value = eval(&shrunk);
            *vertex = (shrunk, value);
        }
    }

    let (optimal_point, optimal_value) = vertices
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .unwrap_or_else(|| (initial.to_vec(), f64::NAN));

    NelderMeadResult {
        optimal_point,
        optimal_value,
        iterations,
        converged,
    }
}

fn centroid(vertices: &[(Vec<f64>, f64)]) -> Vec<f64> {
    let dim = vertices[0].0.len();
    let mut center = vec![0.0; dim];
    for (point, _) in vertices {
        for (c, x) in center.iter_mut().zip(point) {
            *c += x;
        }
    }
    let count = vertices.len() as f64;
    center.iter().map(|c| c / count).collect()
}

/// `origin + t * (point - origin)`.
fn along(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimises_quadratic() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.0, 0.0],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 2.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 3.0, epsilon = 1e-3);
    }

    #[test]
    fn minimises_three_dimensions() {
        let result = nelder_mead(
            |x| (x[0] - 1.0).powi(2) + 2.0 * x[1].powi(2) + (x[2] + 0.5).powi(2),
            &[0.3, 0.8, 0.2],
            None,
            NelderMeadConfig::default(),
        );

        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 0.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[2], -0.5, epsilon = 1e-3);
    }

    #[test]
    fn respects_bounds() {
        let result = nelder_mead(
            |x| (x[0] - 2.0).powi(2) + (x[1] - 3.0).powi(2),
            &[0.5, 0.5],
            Some(&[(0.0, 1.0), (0.0, 1.0)]),
            NelderMeadConfig::default(),
        );

        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn treats_nan_as_worst() {
        let result = nelder_mead(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 1.0).powi(2) },
            &[0.5],
            None,
            NelderMeadConfig::default(),
        );
        assert!(result.optimal_value.is_finite());
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn empty_initial_point() {
        let result = nelder_mead(|_| 0.0, &[], None, NelderMeadConfig::default());
        assert!(!result.converged);
        assert!(result.optimal_value.is_nan());
    }

    #[test]
    fn stops_at_iteration_limit() {
        let config = NelderMeadConfig {
            max_iter: 3,
            ..Default::default()
        };
        let result = nelder_mead(|x| x[0].powi(2) + x[1].powi(2), &[5.0, 5.0], None, config);
        assert!(!result.converged);
        assert_eq!(result.iterations, 3);
    }
}
