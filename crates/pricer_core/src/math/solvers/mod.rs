//! Unconstrained minimisers for model calibration.
//!
//! This module separates the *contract* of a minimiser from its
//! implementation so calibration code depends only on the protocol:
//! an objective, a starting vector, tolerances, and a termination reason.
//!
//! ## Available Minimisers
//!
//! - [`LbfgsMinimiser`]: limited-memory BFGS with central finite-difference
//!   gradients and a capped step length
//!
//! ## Configuration
//!
//! [`LbfgsConfig`] controls:
//! - `gradient_tolerance`, `function_tolerance`, `step_tolerance`: stopping tests
//! - `max_iterations`: iteration cap (reported, not an error)
//! - `max_step`: largest trial step, useful when the objective is steep
//! - `diff_step`: finite-difference step for the gradient
//!
//! ## Example
//!
//! ```
//! use pricer_core::math::solvers::{LbfgsConfig, LbfgsMinimiser, Minimiser};
//!
//! // Minimise (p[0] - 2)² + (p[1] - 3)²
//! let objective = |p: &[f64]| (p[0] - 2.0).powi(2) + (p[1] - 3.0).powi(2);
//!
//! let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 500));
//! let report = minimiser.minimise(objective, &[0.0, 0.0]).unwrap();
//!
//! assert!(report.termination.is_converged());
//! assert!((report.params[0] - 2.0).abs() < 1e-6);
//! assert!((report.params[1] - 3.0).abs() < 1e-6);
//! ```

mod config;
mod lbfgs;
mod minimiser;

// Re-export public types at module level
pub use config::LbfgsConfig;
pub use lbfgs::LbfgsMinimiser;
pub use minimiser::{Minimiser, MinimiserReport, TerminationReason};
