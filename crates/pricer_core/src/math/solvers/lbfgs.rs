//! Limited-memory BFGS with a finite-difference gradient.
//!
//! # Algorithm
//!
//! Each iteration builds a quasi-Newton direction from the last `m` correction
//! pairs `(sₖ, yₖ)` with the two-loop recursion, caps the trial step at
//! `max_step`, and backtracks until the Armijo condition holds:
//!
//! ```text
//! f(x + αd) ≤ f(x) + c₁ α ∇f(x)ᵀd
//! ```
//!
//! The gradient is estimated with central differences,
//! `∂f/∂xᵢ ≈ (f(x + h eᵢ) - f(x - h eᵢ)) / 2h`, so only objective values are
//! required. Trial points where the objective is not finite are treated as
//! failed decreases and the step is halved.

use std::collections::VecDeque;

use tracing::{debug, trace};

use super::config::LbfgsConfig;
use super::minimiser::{Minimiser, MinimiserReport, TerminationReason};
use crate::types::SolverError;

/// Sufficient-decrease constant of the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;

/// Correction pairs with `sᵀy` below this are skipped to keep the inverse
/// Hessian approximation positive definite.
const CURVATURE_EPS: f64 = 1e-12;

/// Limited-memory BFGS minimiser.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{LbfgsConfig, LbfgsMinimiser, Minimiser};
///
/// // Rosenbrock valley, minimum at (1, 1)
/// let rosenbrock = |p: &[f64]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
///
/// let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 500).with_max_step(1.0));
/// let report = minimiser.minimise(rosenbrock, &[-1.2, 1.0]).unwrap();
///
/// assert!(report.termination.is_converged());
/// assert!((report.params[0] - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct LbfgsMinimiser {
    config: LbfgsConfig,
}

impl LbfgsMinimiser {
    /// Create a new minimiser with the given configuration.
    pub fn new(config: LbfgsConfig) -> Self {
        Self { config }
    }

    /// Create a minimiser with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: LbfgsConfig::default(),
        }
    }

    /// Get the minimiser configuration.
    pub fn config(&self) -> &LbfgsConfig {
        &self.config
    }
}

impl Minimiser for LbfgsMinimiser {
    fn minimise<F>(&self, objective: F, initial: &[f64]) -> Result<MinimiserReport, SolverError>
    where
        F: Fn(&[f64]) -> f64,
    {
        let cfg = &self.config;
        cfg.validate()?;
        if initial.is_empty() {
            return Err(SolverError::EmptyParameters);
        }

        let mut x = initial.to_vec();
        let mut fx = objective(&x);
        if !fx.is_finite() {
            return Err(SolverError::NonFiniteInitialValue { value: fx });
        }

        let mut grad = central_gradient(&objective, &x, cfg.diff_step);
        if !all_finite(&grad) {
            return Ok(report(x, fx, 0, TerminationReason::NonFiniteObjective));
        }
        if norm(&grad) <= cfg.gradient_tolerance {
            return Ok(report(x, fx, 0, TerminationReason::GradientTolerance));
        }

        let mut history = CorrectionHistory::new(cfg.memory);

        for iteration in 1..=cfg.max_iterations {
            let mut direction = history.direction(&grad);
            let mut slope = dot(&grad, &direction);
            if slope >= 0.0 || slope.is_nan() {
                // Not a descent direction: restart from steepest descent.
                history.clear();
                direction = grad.iter().map(|g| -g).collect();
                slope = -dot(&grad, &grad);
            }

            let direction_norm = norm(&direction);
            let mut alpha = if direction_norm > cfg.max_step {
                cfg.max_step / direction_norm
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..cfg.max_line_search_steps {
                let trial: Vec<f64> = x
                    .iter()
                    .zip(&direction)
                    .map(|(xi, di)| xi + alpha * di)
                    .collect();
                let f_trial = objective(&trial);
                if f_trial.is_finite() && f_trial <= fx + ARMIJO_C1 * alpha * slope {
                    accepted = Some((trial, f_trial));
                    break;
                }
                trace!(alpha, f_trial, "backtracking");
                alpha *= 0.5;
            }

            let Some((x_new, f_new)) = accepted else {
                let reason = if alpha * direction_norm <= cfg.step_tolerance {
                    TerminationReason::StepTolerance
                } else {
                    TerminationReason::LineSearchStalled
                };
                debug!(iteration, value = fx, ?reason, "line search exhausted");
                return Ok(report(x, fx, iteration - 1, reason));
            };

            let grad_new = central_gradient(&objective, &x_new, cfg.diff_step);
            if !all_finite(&grad_new) {
                return Ok(report(
                    x_new,
                    f_new,
                    iteration,
                    TerminationReason::NonFiniteObjective,
                ));
            }

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let f_old = fx;

            x = x_new;
            fx = f_new;
            grad = grad_new;

            let grad_norm = norm(&grad);
            debug!(iteration, value = fx, grad_norm, "L-BFGS iteration");

            if (f_old - fx).abs() <= cfg.function_tolerance * f_old.abs().max(fx.abs()).max(1.0) {
                return Ok(report(x, fx, iteration, TerminationReason::FunctionTolerance));
            }
            if norm(&s) <= cfg.step_tolerance {
                return Ok(report(x, fx, iteration, TerminationReason::StepTolerance));
            }
            if grad_norm <= cfg.gradient_tolerance {
                return Ok(report(x, fx, iteration, TerminationReason::GradientTolerance));
            }

            history.push(s, y);
        }

        Ok(report(
            x,
            fx,
            cfg.max_iterations,
            TerminationReason::MaxIterations,
        ))
    }
}

/// Ring buffer of correction pairs for the two-loop recursion.
struct CorrectionHistory {
    capacity: usize,
    pairs: VecDeque<(Vec<f64>, Vec<f64>, f64)>,
}

impl CorrectionHistory {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pairs: VecDeque::with_capacity(capacity),
        }
    }

    fn clear(&mut self) {
        self.pairs.clear();
    }

    fn push(&mut self, s: Vec<f64>, y: Vec<f64>) {
        let sy = dot(&s, &y);
        if sy <= CURVATURE_EPS {
            return;
        }
        if self.pairs.len() == self.capacity {
            self.pairs.pop_front();
        }
        self.pairs.push_back((s, y, 1.0 / sy));
    }

    /// Computes `-H·g` where `H` is the implicit inverse Hessian approximation.
    fn direction(&self, grad: &[f64]) -> Vec<f64> {
        let mut q = grad.to_vec();
        let mut alphas = Vec::with_capacity(self.pairs.len());

        for (s, y, rho) in self.pairs.iter().rev() {
            let a = rho * dot(s, &q);
            for (qi, yi) in q.iter_mut().zip(y) {
                *qi -= a * yi;
            }
            alphas.push(a);
        }

        if let Some((s, y, _)) = self.pairs.back() {
            let gamma = dot(s, y) / dot(y, y);
            for qi in q.iter_mut() {
                *qi *= gamma;
            }
        }

        for ((s, y, rho), a) in self.pairs.iter().zip(alphas.iter().rev()) {
            let b = rho * dot(y, &q);
            for (qi, si) in q.iter_mut().zip(s) {
                *qi += si * (a - b);
            }
        }

        q.iter().map(|v| -v).collect()
    }
}

/// Central finite-difference gradient.
fn central_gradient<F>(objective: &F, x: &[f64], h: f64) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut point = x.to_vec();
    (0..x.len())
        .map(|i| {
            point[i] = x[i] + h;
            let f_plus = objective(&point);
            point[i] = x[i] - h;
            let f_minus = objective(&point);
            point[i] = x[i];
            (f_plus - f_minus) / (2.0 * h)
        })
        .collect()
}

#[inline]
fn report(
    params: Vec<f64>,
    value: f64,
    iterations: usize,
    termination: TerminationReason,
) -> MinimiserReport {
    MinimiserReport {
        params,
        value,
        iterations,
        termination,
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

#[inline]
fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bowl(p: &[f64]) -> f64 {
        (p[0] - 3.0).powi(2) + 2.0 * (p[1] + 1.0).powi(2)
    }

    // ========================================
    // Convergence Tests
    // ========================================

    #[test]
    fn test_quadratic_bowl_with_step_cap() {
        let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 200));
        let report = minimiser.minimise(bowl, &[0.0, 0.0]).unwrap();

        assert!(report.termination.is_converged());
        assert_abs_diff_eq!(report.params[0], 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(report.params[1], -1.0, epsilon = 1e-5);
        // Distance to the minimum is √10 and each step is capped at 0.05
        assert!(report.iterations >= 60);
    }

    #[test]
    fn test_rosenbrock() {
        let rosenbrock =
            |p: &[f64]| (1.0 - p[0]).powi(2) + 100.0 * (p[1] - p[0] * p[0]).powi(2);
        let config = LbfgsConfig::new(1e-10, 500).with_max_step(1.0);
        let report = LbfgsMinimiser::new(config)
            .minimise(rosenbrock, &[-1.2, 1.0])
            .unwrap();

        assert!(report.termination.is_converged());
        assert_abs_diff_eq!(report.params[0], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(report.params[1], 1.0, epsilon = 1e-4);
        assert!(report.value < 1e-8);
    }

    #[test]
    fn test_starting_at_minimum_reports_gradient_tolerance() {
        let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-6, 10));
        let report = minimiser.minimise(bowl, &[3.0, -1.0]).unwrap();

        assert_eq!(report.termination, TerminationReason::GradientTolerance);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.params, vec![3.0, -1.0]);
    }

    // ========================================
    // Termination Tests
    // ========================================

    #[test]
    fn test_iteration_cap_keeps_progress() {
        let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 3));
        let report = minimiser.minimise(bowl, &[0.0, 0.0]).unwrap();

        assert_eq!(report.termination, TerminationReason::MaxIterations);
        assert_eq!(report.iterations, 3);
        assert!(report.value < bowl(&[0.0, 0.0]));
    }

    #[test]
    fn test_non_finite_region_is_avoided() {
        // Undefined beyond x = 2; the unconstrained minimum at 5 is unreachable.
        let objective = |p: &[f64]| {
            if p[0] > 2.0 {
                f64::NAN
            } else {
                (p[0] - 5.0).powi(2)
            }
        };
        let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-8, 200).with_max_step(0.5));
        let report = minimiser.minimise(objective, &[0.0]).unwrap();

        assert!(report.value.is_finite());
        assert!(report.params[0] <= 2.0);
        assert!(report.params[0] > 1.5);
    }

    // ========================================
    // Error Tests
    // ========================================

    #[test]
    fn test_empty_parameters() {
        let minimiser = LbfgsMinimiser::with_defaults();
        let err = minimiser.minimise(|_: &[f64]| 0.0, &[]).unwrap_err();
        assert_eq!(err, SolverError::EmptyParameters);
    }

    #[test]
    fn test_non_finite_initial_value() {
        let minimiser = LbfgsMinimiser::with_defaults();
        let err = minimiser
            .minimise(|_: &[f64]| f64::INFINITY, &[1.0])
            .unwrap_err();
        assert!(matches!(err, SolverError::NonFiniteInitialValue { .. }));
    }

    #[test]
    fn test_invalid_config() {
        let minimiser = LbfgsMinimiser::new(LbfgsConfig::default().with_diff_step(-1.0));
        let err = minimiser.minimise(bowl, &[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, SolverError::InvalidConfig { .. }));
    }

    // ========================================
    // Two-Loop Recursion Tests
    // ========================================

    #[test]
    fn test_empty_history_is_steepest_descent() {
        let history = CorrectionHistory::new(5);
        let d = history.direction(&[1.0, -2.0]);
        assert_eq!(d, vec![-1.0, 2.0]);
    }

    #[test]
    fn test_history_recovers_quadratic_hessian() {
        // f = x² + 4y², H = diag(2, 8); after pairs along both axes the
        // direction for g = H·x must be -x.
        let mut history = CorrectionHistory::new(5);
        history.push(vec![1.0, 0.0], vec![2.0, 0.0]);
        history.push(vec![0.0, 1.0], vec![0.0, 8.0]);
        let d = history.direction(&[2.0, 8.0]);
        assert_abs_diff_eq!(d[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d[1], -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_history_skips_negative_curvature() {
        let mut history = CorrectionHistory::new(2);
        history.push(vec![1.0], vec![-1.0]);
        assert!(history.pairs.is_empty());
    }
}
