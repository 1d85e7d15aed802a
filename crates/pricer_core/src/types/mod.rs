//! Core error types.
//!
//! This module provides:
//! - `error`: Structured error types for pricing, calibration and solver operations
//!
//! # Re-exports
//!
//! For convenience, [`PricingError`] and [`SolverError`] are re-exported at this
//! module level.

pub mod error;

pub use error::{PricingError, SolverError};
