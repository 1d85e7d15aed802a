//! # Pricer Models (L2: Business Logic)
//!
//! Contracts, Heston model parameters, closed-form pricers and calibration.
//!
//! This crate provides:
//! - Contract definitions (European, Asian and lookback options)
//! - Heston stochastic volatility model parameters
//! - Analytical formulas: the Heston characteristic-function call price and
//!   the three-period forward-start Cliquet under Black-Scholes
//! - Normal distribution integrals (univariate, bivariate, trivariate)
//! - Heston calibration to market quotes
//!
//! ## Design Principles
//!
//! - **Enum-based contracts** for static dispatch
//! - **Validated constructors**: invalid inputs fail at construction with
//!   [`pricer_core::types::PricingError::InvalidArgument`]
//! - **Builder pattern** for numerical settings with sensible defaults

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod calibration;
pub mod instruments;
pub mod models;
