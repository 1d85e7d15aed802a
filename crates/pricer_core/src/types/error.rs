//! Error types for structured error handling.
//!
//! This module provides:
//! - `PricingError`: the error taxonomy surfaced by every pricing and calibration call
//! - `SolverError`: errors raised by the minimisers before or during a run

use thiserror::Error;

/// Categorised pricing errors.
///
/// Every failure is deterministic given the same inputs and is surfaced to the
/// caller; nothing in the workspace retries.
///
/// # Variants
/// - `InvalidArgument`: malformed or out-of-domain input, raised before any work
/// - `NumericalInstability`: degenerate arithmetic during simulation or evaluation
/// - `SingularConfiguration`: a denominator of the characteristic function vanished
/// - `NoAssets`: a basket was priced without registered assets
/// - `CalibrationFailed`: the minimiser stopped for a reason other than
///   convergence or the iteration cap
///
/// # Examples
/// ```
/// use pricer_core::types::PricingError;
///
/// let err = PricingError::InvalidArgument("maturity must be positive".to_string());
/// assert_eq!(format!("{}", err), "Invalid argument: maturity must be positive");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// Invalid input data or parameters.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),

    /// Degenerate parameter combination (zero denominator).
    #[error("Singular configuration: {0}")]
    SingularConfiguration(String),

    /// Basket pricing requested with an empty asset list.
    #[error("No assets have been added to the basket")]
    NoAssets,

    /// Calibration terminated abnormally.
    #[error(
        "Calibration failed (termination code {termination_code}, mean squared error {mean_squared_error:.6e})"
    )]
    CalibrationFailed {
        /// Termination code reported by the minimiser.
        termination_code: i32,
        /// Objective value at the last point the minimiser visited.
        mean_squared_error: f64,
    },
}

impl PricingError {
    /// Shorthand for an [`PricingError::InvalidArgument`] with a formatted message.
    pub fn invalid(message: impl Into<String>) -> Self {
        PricingError::InvalidArgument(message.into())
    }

    /// Returns `true` for errors caused by the caller's input rather than by arithmetic.
    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, PricingError::InvalidArgument(_) | PricingError::NoAssets)
    }
}

/// Minimiser errors.
///
/// Raised when a minimiser cannot start: a bad configuration, an empty
/// parameter vector, or an objective that is not finite at the initial point.
/// Iteration caps and stalled line searches are *not* errors; they are reported
/// through the termination reason of a completed run.
///
/// # Examples
/// ```
/// use pricer_core::types::SolverError;
///
/// let err = SolverError::InvalidConfig { name: "max_step", value: -1.0 };
/// assert!(format!("{}", err).contains("max_step"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// A configuration value is outside its valid domain.
    #[error("Invalid solver configuration: {name} = {value}")]
    InvalidConfig {
        /// Name of the offending field.
        name: &'static str,
        /// Value supplied.
        value: f64,
    },

    /// The parameter vector is empty.
    #[error("Cannot minimise over an empty parameter vector")]
    EmptyParameters,

    /// The objective is not finite at the starting point.
    #[error("Objective is not finite at the initial point: {value}")]
    NonFiniteInitialValue {
        /// Objective value at the initial point.
        value: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<SolverError> for PricingError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::InvalidConfig { .. } | SolverError::EmptyParameters => {
                PricingError::InvalidArgument(err.to_string())
            }
            SolverError::NonFiniteInitialValue { .. } | SolverError::NumericalInstability(_) => {
                PricingError::NumericalInstability(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // PricingError Tests
    // ========================================

    #[test]
    fn test_pricing_error_display() {
        let err = PricingError::NumericalInstability("beta * dt == 1".to_string());
        assert_eq!(format!("{}", err), "Numerical instability: beta * dt == 1");

        let err = PricingError::SingularConfiguration("1 - g == 0".to_string());
        assert!(format!("{}", err).starts_with("Singular configuration"));

        let err = PricingError::NoAssets;
        assert!(format!("{}", err).contains("No assets"));
    }

    #[test]
    fn test_calibration_failed_display() {
        let err = PricingError::CalibrationFailed {
            termination_code: -8,
            mean_squared_error: 12.5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("-8"));
        assert!(msg.contains("1.25"));
    }

    #[test]
    fn test_invalid_shorthand() {
        let err = PricingError::invalid("paths must be positive");
        assert_eq!(
            err,
            PricingError::InvalidArgument("paths must be positive".to_string())
        );
        assert!(err.is_invalid_argument());
        assert!(PricingError::NoAssets.is_invalid_argument());
        assert!(!PricingError::NumericalInstability(String::new()).is_invalid_argument());
    }

    // ========================================
    // SolverError Tests
    // ========================================

    #[test]
    fn test_solver_error_conversion() {
        let err: PricingError = SolverError::EmptyParameters.into();
        assert!(matches!(err, PricingError::InvalidArgument(_)));

        let err: PricingError = SolverError::NonFiniteInitialValue { value: f64::NAN }.into();
        assert!(matches!(err, PricingError::NumericalInstability(_)));
    }

    #[test]
    fn test_solver_error_display() {
        let err = SolverError::InvalidConfig {
            name: "diff_step",
            value: 0.0,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid solver configuration: diff_step = 0"
        );
    }
}
