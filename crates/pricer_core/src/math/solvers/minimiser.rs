//! Minimiser contract shared by calibration routines.
//!
//! A minimiser accepts a scalar objective, a starting parameter vector and its
//! own stopping tolerances, and returns the fitted vector together with a
//! termination reason. Callers decide what each termination means for them;
//! the minimiser itself never treats an iteration cap as an error.

use crate::types::SolverError;

/// Why a minimiser stopped.
///
/// The numeric [`code`](TerminationReason::code) follows the usual
/// quasi-Newton reporting convention: positive codes are orderly stops,
/// negative codes are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationReason {
    /// Relative change of the objective fell below the function tolerance.
    FunctionTolerance,
    /// Length of the accepted step fell below the step tolerance.
    StepTolerance,
    /// Gradient norm fell below the gradient tolerance.
    GradientTolerance,
    /// Iteration cap reached; the best point so far is reported.
    MaxIterations,
    /// The line search could not find a decrease and the step is not yet small.
    LineSearchStalled,
    /// The objective or its gradient became non-finite.
    NonFiniteObjective,
}

impl TerminationReason {
    /// Numeric termination code.
    ///
    /// | Reason | Code |
    /// |--------|------|
    /// | `FunctionTolerance` | 1 |
    /// | `StepTolerance` | 2 |
    /// | `GradientTolerance` | 4 |
    /// | `MaxIterations` | 5 |
    /// | `LineSearchStalled` | 7 |
    /// | `NonFiniteObjective` | -8 |
    #[inline]
    pub fn code(&self) -> i32 {
        match self {
            TerminationReason::FunctionTolerance => 1,
            TerminationReason::StepTolerance => 2,
            TerminationReason::GradientTolerance => 4,
            TerminationReason::MaxIterations => 5,
            TerminationReason::LineSearchStalled => 7,
            TerminationReason::NonFiniteObjective => -8,
        }
    }

    /// Returns `true` when one of the three tolerances was met.
    #[inline]
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            TerminationReason::FunctionTolerance
                | TerminationReason::StepTolerance
                | TerminationReason::GradientTolerance
        )
    }
}

/// Outcome of a completed minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimiserReport {
    /// Best parameter vector found.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub value: f64,
    /// Number of accepted iterations.
    pub iterations: usize,
    /// Why the run stopped.
    pub termination: TerminationReason,
}

/// Abstract unconstrained minimiser.
///
/// # Example
///
/// ```
/// use pricer_core::math::solvers::{LbfgsConfig, LbfgsMinimiser, Minimiser};
///
/// let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 200).with_max_step(1.0));
/// let report = minimiser
///     .minimise(|p: &[f64]| (p[0] - 1.0).powi(2) + (p[1] + 2.0).powi(2), &[0.0, 0.0])
///     .unwrap();
///
/// assert!(report.termination.is_converged());
/// assert!((report.params[0] - 1.0).abs() < 1e-5);
/// assert!((report.params[1] + 2.0).abs() < 1e-5);
/// ```
pub trait Minimiser {
    /// Minimise `objective` starting from `initial`.
    ///
    /// # Errors
    ///
    /// Returns `SolverError` only when the run cannot start (invalid
    /// configuration, empty vector, non-finite objective at `initial`).
    fn minimise<F>(&self, objective: F, initial: &[f64]) -> Result<MinimiserReport, SolverError>
    where
        F: Fn(&[f64]) -> f64;
}
