//! Calibration traits and result types.
//!
//! This module defines the core abstractions for model calibration:
//! - [`Calibrator`]: Trait for a calibration session that owns its quotes
//! - [`CalibrationConfig`]: Accuracy, iteration cap and minimiser step controls
//! - [`CalibrationOutcome`]: How the last run ended
//! - [`CalibrationResult`]: Fitted parameters with diagnostics
//!
//! # Example
//!
//! ```
//! use pricer_core::traits::calibration::{
//!     Calibrator, CalibrationConfig, CalibrationOutcome, CalibrationResult,
//! };
//! use pricer_core::types::PricingError;
//!
//! // Fit a single level to a set of observations
//! struct LevelCalibrator {
//!     observations: Vec<f64>,
//!     level: f64,
//!     outcome: CalibrationOutcome,
//! }
//!
//! impl Calibrator for LevelCalibrator {
//!     type Quote = f64;
//!     type ModelParams = f64;
//!
//!     fn add_quote(&mut self, quote: f64) {
//!         self.observations.push(quote);
//!     }
//!
//!     fn objective_function(&self, level: &f64) -> f64 {
//!         let n = self.observations.len() as f64;
//!         self.observations.iter().map(|o| (o - level).powi(2)).sum::<f64>() / n
//!     }
//!
//!     fn calibrate(
//!         &mut self,
//!         _config: &CalibrationConfig,
//!     ) -> Result<CalibrationResult<f64>, PricingError> {
//!         let n = self.observations.len() as f64;
//!         self.level = self.observations.iter().sum::<f64>() / n;
//!         self.outcome = CalibrationOutcome::Converged;
//!         let mse = self.objective_function(&self.level);
//!         Ok(CalibrationResult::new(self.level, CalibrationOutcome::Converged, mse, 1))
//!     }
//!
//!     fn status(&self) -> (CalibrationOutcome, f64) {
//!         (self.outcome, self.objective_function(&self.level))
//!     }
//! }
//!
//! let mut calibrator = LevelCalibrator {
//!     observations: Vec::new(),
//!     level: 0.0,
//!     outcome: CalibrationOutcome::NotStarted,
//! };
//! calibrator.add_quote(1.0);
//! calibrator.add_quote(3.0);
//! let result = calibrator.calibrate(&CalibrationConfig::default()).unwrap();
//! assert_eq!(result.params, 2.0);
//! assert!(result.is_usable());
//! ```

use std::fmt;

use crate::math::solvers::{LbfgsConfig, TerminationReason};
use crate::types::PricingError;

/// Configuration for a calibration run.
///
/// `accuracy` is used for all three stopping tolerances of the minimiser
/// (gradient, function value and step length).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationConfig {
    /// Shared stopping tolerance.
    pub accuracy: f64,
    /// Maximum number of minimiser iterations.
    pub max_iterations: usize,
    /// Largest trial step taken by the minimiser.
    pub max_step: f64,
    /// Step for the numerical gradient.
    pub diff_step: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            accuracy: 1e-3,
            max_iterations: 1000,
            max_step: 0.05,
            diff_step: 1e-6,
        }
    }
}

impl CalibrationConfig {
    /// Create a new configuration with specified accuracy and iterations.
    pub fn new(accuracy: f64, max_iterations: usize) -> Self {
        Self {
            accuracy,
            max_iterations,
            ..Default::default()
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidArgument` if `accuracy` is not a positive
    /// finite number, `max_iterations` is zero, or a step is not positive.
    pub fn validate(&self) -> Result<(), PricingError> {
        if !self.accuracy.is_finite() || self.accuracy <= 0.0 {
            return Err(PricingError::invalid(format!(
                "accuracy must be positive, got {}",
                self.accuracy
            )));
        }
        if self.max_iterations == 0 {
            return Err(PricingError::invalid("max_iterations must be positive"));
        }
        if !self.max_step.is_finite() || self.max_step <= 0.0 {
            return Err(PricingError::invalid(format!(
                "max_step must be positive, got {}",
                self.max_step
            )));
        }
        if !self.diff_step.is_finite() || self.diff_step <= 0.0 {
            return Err(PricingError::invalid(format!(
                "diff_step must be positive, got {}",
                self.diff_step
            )));
        }
        Ok(())
    }

    /// Minimiser configuration implied by this calibration configuration.
    pub fn minimiser_config(&self) -> LbfgsConfig {
        LbfgsConfig::new(self.accuracy, self.max_iterations)
            .with_max_step(self.max_step)
            .with_diff_step(self.diff_step)
    }
}

/// How the last calibration run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CalibrationOutcome {
    /// No calibration has been run yet.
    #[default]
    NotStarted,
    /// A stopping tolerance was met.
    Converged,
    /// The iteration cap was hit; parameters are the best found so far.
    MaxIterationsReached,
    /// The minimiser stopped abnormally; parameters were not updated.
    Failed,
}

impl CalibrationOutcome {
    /// Maps a minimiser termination reason onto a calibration outcome.
    ///
    /// Function, step and gradient tolerances map to `Converged`, the
    /// iteration cap to `MaxIterationsReached`, everything else to `Failed`.
    pub fn from_termination(reason: TerminationReason) -> Self {
        match reason {
            TerminationReason::FunctionTolerance
            | TerminationReason::StepTolerance
            | TerminationReason::GradientTolerance => CalibrationOutcome::Converged,
            TerminationReason::MaxIterations => CalibrationOutcome::MaxIterationsReached,
            TerminationReason::LineSearchStalled | TerminationReason::NonFiniteObjective => {
                CalibrationOutcome::Failed
            }
        }
    }
}

impl fmt::Display for CalibrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CalibrationOutcome::NotStarted => "not started",
            CalibrationOutcome::Converged => "converged",
            CalibrationOutcome::MaxIterationsReached => "max iterations reached",
            CalibrationOutcome::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Result of a calibration run.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult<P> {
    /// Fitted parameters.
    pub params: P,
    /// How the run ended.
    pub outcome: CalibrationOutcome,
    /// Mean squared pricing error at `params`.
    pub mean_squared_error: f64,
    /// Number of minimiser iterations performed.
    pub iterations: usize,
    /// Termination code reported by the minimiser, if one ran.
    pub termination_code: Option<i32>,
}

impl<P> CalibrationResult<P> {
    /// Create a result without a minimiser termination code.
    pub fn new(
        params: P,
        outcome: CalibrationOutcome,
        mean_squared_error: f64,
        iterations: usize,
    ) -> Self {
        Self {
            params,
            outcome,
            mean_squared_error,
            iterations,
            termination_code: None,
        }
    }

    /// Attach the minimiser's termination code.
    pub fn with_termination_code(mut self, code: i32) -> Self {
        self.termination_code = Some(code);
        self
    }

    /// Returns `true` if the fitted parameters may be used (converged or capped).
    #[inline]
    pub fn is_usable(&self) -> bool {
        matches!(
            self.outcome,
            CalibrationOutcome::Converged | CalibrationOutcome::MaxIterationsReached
        )
    }

    /// Root mean squared pricing error.
    #[inline]
    pub fn rmse(&self) -> f64 {
        self.mean_squared_error.sqrt()
    }
}

impl<P: fmt::Debug> fmt::Display for CalibrationResult<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationResult {{ outcome: {}, iterations: {}, MSE: {:.6e} }}",
            self.outcome, self.iterations, self.mean_squared_error
        )
    }
}

/// A calibration session.
///
/// The calibrator owns the market quotes it fits and remembers the outcome of
/// its last run, so callers can query the status after a failure.
pub trait Calibrator {
    /// Type of a single market observation.
    type Quote;
    /// Type of model parameters.
    type ModelParams;

    /// Append a market observation.
    fn add_quote(&mut self, quote: Self::Quote);

    /// Objective value (mean squared error) of `params` against the stored quotes.
    fn objective_function(&self, params: &Self::ModelParams) -> f64;

    /// Run the calibration.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::CalibrationFailed` when the minimiser stops
    /// abnormally; the outcome is still recorded and visible via
    /// [`status`](Calibrator::status).
    fn calibrate(
        &mut self,
        config: &CalibrationConfig,
    ) -> Result<CalibrationResult<Self::ModelParams>, PricingError>;

    /// Outcome of the last run and the pricing error of the stored parameters.
    fn status(&self) -> (CalibrationOutcome, f64);

    /// Calibrate with default configuration.
    fn calibrate_default(&mut self) -> Result<CalibrationResult<Self::ModelParams>, PricingError> {
        self.calibrate(&CalibrationConfig::default())
    }
}
