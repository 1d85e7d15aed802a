//! Minimiser configuration types.

use crate::types::SolverError;

/// Configuration for the limited-memory BFGS minimiser.
///
/// The three stopping tolerances mirror the classic quasi-Newton protocol:
/// relative function change, step length and gradient norm. The minimiser
/// stops as soon as any one of them is met.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::LbfgsConfig;
///
/// let config = LbfgsConfig::new(1e-3, 1000);
/// assert_eq!(config.gradient_tolerance, 1e-3);
/// assert_eq!(config.function_tolerance, 1e-3);
/// assert_eq!(config.step_tolerance, 1e-3);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LbfgsConfig {
    /// Stop when `‖∇f‖ ≤ gradient_tolerance`.
    pub gradient_tolerance: f64,
    /// Stop when `|fₖ - fₖ₊₁| ≤ function_tolerance · max(|fₖ|, |fₖ₊₁|, 1)`.
    pub function_tolerance: f64,
    /// Stop when the accepted step satisfies `‖xₖ₊₁ - xₖ‖ ≤ step_tolerance`.
    pub step_tolerance: f64,
    /// Maximum number of accepted iterations.
    pub max_iterations: usize,
    /// Upper bound on the Euclidean length of a trial step.
    pub max_step: f64,
    /// Step used by the central finite-difference gradient.
    pub diff_step: f64,
    /// Number of correction pairs retained by the two-loop recursion.
    pub memory: usize,
    /// Maximum number of backtracking halvings per line search.
    pub max_line_search_steps: usize,
}

impl Default for LbfgsConfig {
    fn default() -> Self {
        Self {
            gradient_tolerance: 1e-8,
            function_tolerance: 1e-10,
            step_tolerance: 1e-10,
            max_iterations: 100,
            max_step: 0.05,
            diff_step: 1e-6,
            memory: 5,
            max_line_search_steps: 40,
        }
    }
}

impl LbfgsConfig {
    /// Create a configuration with all three tolerances set to `accuracy`.
    pub fn new(accuracy: f64, max_iterations: usize) -> Self {
        Self {
            gradient_tolerance: accuracy,
            function_tolerance: accuracy,
            step_tolerance: accuracy,
            max_iterations,
            ..Default::default()
        }
    }

    /// Returns a copy with a different maximum step length.
    pub fn with_max_step(mut self, max_step: f64) -> Self {
        self.max_step = max_step;
        self
    }

    /// Returns a copy with a different finite-difference step.
    pub fn with_diff_step(mut self, diff_step: f64) -> Self {
        self.diff_step = diff_step;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::InvalidConfig` naming the first field that is
    /// negative, non-finite or zero where a positive value is required.
    pub fn validate(&self) -> Result<(), SolverError> {
        let non_negative = [
            ("gradient_tolerance", self.gradient_tolerance),
            ("function_tolerance", self.function_tolerance),
            ("step_tolerance", self.step_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(SolverError::InvalidConfig { name, value });
            }
        }

        let positive = [("max_step", self.max_step), ("diff_step", self.diff_step)];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SolverError::InvalidConfig { name, value });
            }
        }

        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig {
                name: "max_iterations",
                value: 0.0,
            });
        }
        if self.memory == 0 {
            return Err(SolverError::InvalidConfig {
                name: "memory",
                value: 0.0,
            });
        }
        Ok(())
    }
}
