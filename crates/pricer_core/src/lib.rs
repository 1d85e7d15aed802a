//! # pricer_core: Numerical Foundation for Heston Pricing
//!
//! ## Layer 1 (Foundation) Role
//!
//! pricer_core serves as the bottom layer of the pricing workspace, providing:
//! - Error taxonomy shared by every pricing call: `PricingError`, `SolverError` (`types`)
//! - Composite Simpson quadrature over truncated domains (`math::quadrature`)
//! - The minimiser contract and an L-BFGS implementation (`math::solvers`)
//! - The calibration contract: `Calibrator`, `CalibrationResult` (`traits::calibration`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other pricer_* crates, with minimal external dependencies:
//! - thiserror: Error derivation
//! - tracing: Structured diagnostics from the minimisers
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use pricer_core::math::quadrature::QuadratureConfig;
//! use pricer_core::math::solvers::{LbfgsConfig, LbfgsMinimiser, Minimiser};
//!
//! // ∫₀^π sin x dx = 2
//! let area = QuadratureConfig::new(0.0, std::f64::consts::PI, 100).integrate(f64::sin);
//! assert!((area - 2.0).abs() < 1e-6);
//!
//! // Minimise a shifted paraboloid
//! let minimiser = LbfgsMinimiser::new(LbfgsConfig::new(1e-10, 200).with_max_step(1.0));
//! let report = minimiser.minimise(|p: &[f64]| (p[0] - 0.5).powi(2), &[0.0]).unwrap();
//! assert!((report.params[0] - 0.5).abs() < 1e-6);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for configurations and calibration outcomes

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod traits;
pub mod types;
