//! Analytical pricing formulas.
//!
//! This module provides closed-form and semi-closed-form pricers:
//! - [`HestonFormula`]: European options under Heston via the characteristic function
//! - [`CliquetOption`]: three-date Cliquet options under Black-Scholes
//! - [`distributions`]: normal CDF/PDF and multivariate normal integrals

pub mod cliquet;
pub mod distributions;
pub mod heston_formula;

// Re-export main types at module level
pub use cliquet::CliquetOption;
pub use distributions::{norm_cdf, norm_pdf, NormalIntegralConfig};
pub use heston_formula::HestonFormula;
