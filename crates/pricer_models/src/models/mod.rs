//! Stochastic model parameters.
//!
//! - [`HestonParams`]: validated Heston parameter set with Feller helpers and
//!   the calibration vector layout

pub mod heston;

pub use heston::{HestonError, HestonParams};
