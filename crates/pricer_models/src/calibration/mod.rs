//! Model calibration module.
//!
//! This module fits model parameters to observed option prices:
//! - [`HestonCalibrator`]: Heston stochastic volatility model calibration
//!   against European call quotes
//! - [`MarketQuote`]: Observed `(maturity, strike, price)` triple
//!
//! Calibrators implement [`pricer_core::traits::calibration::Calibrator`] and
//! depend on the minimiser only through
//! [`pricer_core::math::solvers::Minimiser`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Calibration Flow                         │
//! │                                                             │
//! │  MarketQuote → HestonCalibrator → Minimiser → Result        │
//! │      │               │                │          │          │
//! │      ▼               ▼                ▼          ▼          │
//! │  (T, K, C)     MSE objective       L-BFGS    HestonParams   │
//! │                (HestonFormula)               + Outcome      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod heston;

pub use heston::{HestonCalibrator, MarketQuote};
