//! Heston stochastic volatility model parameters.
//!
//! The Heston model is described by the SDE system:
//! ```text
//! dS = r * S * dt + sqrt(V) * S * dW_S
//! dV = kappa * (theta - V) * dt + xi * sqrt(V) * dW_V
//! E[dW_S * dW_V] = rho * dt
//! ```
//! where:
//! - S = asset price
//! - V = instantaneous variance
//! - r = risk-free rate
//! - kappa = mean reversion speed
//! - theta = long-run variance
//! - xi = volatility of variance (vol-of-vol)
//! - rho = correlation between asset and variance
//!
//! ## Feller Condition
//!
//! Sufficient condition for the variance to stay strictly positive:
//! ```text
//! 2 * kappa * theta > xi^2
//! ```
//!
//! Path simulation requires it; the characteristic formula and the
//! calibrator do not.
//!
//! ## Example
//!
//! ```
//! use pricer_models::models::heston::HestonParams;
//!
//! let params = HestonParams::new(
//!     0.1,   // risk-free rate
//!     100.0, // spot
//!     2.0,   // kappa
//!     0.06,  // theta
//!     0.4,   // xi
//!     0.5,   // rho
//!     0.04,  // v0
//! )
//! .unwrap();
//! assert!(params.satisfies_feller());
//! ```

use pricer_core::types::PricingError;
use thiserror::Error;

/// Heston model error type.
///
/// Raised by parameter validation. Every variant converts into
/// [`PricingError::InvalidArgument`].
///
/// # Examples
///
/// ```
/// use pricer_models::models::heston::HestonError;
///
/// let err = HestonError::InvalidSpot(-100.0);
/// assert!(format!("{}", err).contains("-100"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HestonError {
    /// Spot price must be positive and finite.
    #[error("Invalid spot price: S0 = {0} (must be positive)")]
    InvalidSpot(f64),

    /// Initial variance must be non-negative.
    #[error("Invalid initial variance: v0 = {0} (must be non-negative)")]
    InvalidV0(f64),

    /// Vol-of-vol must be non-negative.
    #[error("Invalid vol-of-vol: xi = {0} (must be non-negative)")]
    InvalidXi(f64),

    /// Correlation must lie in [-1, 1].
    #[error("Invalid correlation: rho = {0} (must lie in [-1, 1])")]
    InvalidRho(f64),

    /// NaN or infinity in a parameter.
    #[error("Non-finite parameter: {0}")]
    NonFinite(&'static str),

    /// Feller condition `2 kappa theta > xi^2` violated.
    #[error("Feller condition violated: 2 * {kappa} * {theta} <= {xi}^2")]
    FellerViolated {
        /// Mean reversion speed.
        kappa: f64,
        /// Long-run variance.
        theta: f64,
        /// Vol-of-vol.
        xi: f64,
    },
}

impl From<HestonError> for PricingError {
    fn from(err: HestonError) -> Self {
        PricingError::InvalidArgument(err.to_string())
    }
}

/// Heston model parameters.
///
/// Immutable value type; fields are public for reading, construction goes
/// through [`HestonParams::new`] which validates them.
///
/// The calibration vector order is `[kappa, theta, xi, rho, v0]`; rate and
/// spot are market inputs and never calibrated.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HestonParams {
    /// Risk-free rate (continuously compounded)
    pub rate: f64,
    /// Spot price (S0)
    pub spot: f64,
    /// Mean reversion speed (kappa)
    pub kappa: f64,
    /// Long-run variance (theta)
    pub theta: f64,
    /// Volatility of variance (xi)
    pub xi: f64,
    /// Correlation (rho)
    pub rho: f64,
    /// Initial variance (v0)
    pub v0: f64,
}

impl HestonParams {
    /// Number of calibrated parameters.
    pub const CALIBRATION_DIM: usize = 5;

    /// Creates validated Heston parameters.
    ///
    /// # Errors
    ///
    /// Returns `HestonError` if any value is non-finite, `spot <= 0`,
    /// `v0 < 0`, `xi < 0` or `|rho| > 1`. The Feller condition is *not*
    /// checked here; see [`HestonParams::ensure_feller`].
    pub fn new(
        rate: f64,
        spot: f64,
        kappa: f64,
        theta: f64,
        xi: f64,
        rho: f64,
        v0: f64,
    ) -> Result<Self, HestonError> {
        let params = Self {
            rate,
            spot,
            kappa,
            theta,
            xi,
            rho,
            v0,
        };
        params.validate()?;
        Ok(params)
    }

    /// Re-checks the invariants enforced by [`HestonParams::new`].
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), HestonError> {
        let named = [
            ("rate", self.rate),
            ("spot", self.spot),
            ("kappa", self.kappa),
            ("theta", self.theta),
            ("xi", self.xi),
            ("rho", self.rho),
            ("v0", self.v0),
        ];
        for (name, value) in named {
            if !value.is_finite() {
                return Err(HestonError::NonFinite(name));
            }
        }
        if self.spot <= 0.0 {
            return Err(HestonError::InvalidSpot(self.spot));
        }
        if self.v0 < 0.0 {
            return Err(HestonError::InvalidV0(self.v0));
        }
        if self.xi < 0.0 {
            return Err(HestonError::InvalidXi(self.xi));
        }
        if self.rho.abs() > 1.0 {
            return Err(HestonError::InvalidRho(self.rho));
        }
        Ok(())
    }

    /// Returns `true` if `2 kappa theta > xi^2`.
    #[inline]
    pub fn satisfies_feller(&self) -> bool {
        2.0 * self.kappa * self.theta > self.xi * self.xi
    }

    /// Requires the Feller condition.
    ///
    /// # Errors
    ///
    /// Returns `HestonError::FellerViolated` otherwise.
    pub fn ensure_feller(&self) -> Result<(), HestonError> {
        if self.satisfies_feller() {
            Ok(())
        } else {
            Err(HestonError::FellerViolated {
                kappa: self.kappa,
                theta: self.theta,
                xi: self.xi,
            })
        }
    }

    /// Calibrated parameters as `[kappa, theta, xi, rho, v0]`.
    #[inline]
    pub fn to_calibration_vector(&self) -> [f64; Self::CALIBRATION_DIM] {
        [self.kappa, self.theta, self.xi, self.rho, self.v0]
    }

    /// Copy with the calibrated parameters replaced by `vector`.
    ///
    /// Rate and spot are carried over. The result is deliberately not
    /// validated: minimisers explore the unconstrained space and the
    /// characteristic formula accepts any finite vector.
    #[inline]
    pub fn with_calibration_vector(&self, vector: &[f64; Self::CALIBRATION_DIM]) -> Self {
        Self {
            rate: self.rate,
            spot: self.spot,
            kappa: vector[0],
            theta: vector[1],
            xi: vector[2],
            rho: vector[3],
            v0: vector[4],
        }
    }

    /// Copy with a different risk-free rate.
    #[inline]
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> HestonParams {
        HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap()
    }

    // ========================================
    // Validation Tests
    // ========================================

    #[test]
    fn test_new_valid() {
        let p = reference();
        assert_eq!(p.spot, 100.0);
        assert_eq!(p.xi, 0.4);
    }

    #[test]
    fn test_new_rejects_bad_values() {
        assert_eq!(
            HestonParams::new(0.1, 0.0, 2.0, 0.06, 0.4, 0.5, 0.04),
            Err(HestonError::InvalidSpot(0.0))
        );
        assert_eq!(
            HestonParams::new(0.1, 100.0, 2.0, 0.06, -0.4, 0.5, 0.04),
            Err(HestonError::InvalidXi(-0.4))
        );
        assert_eq!(
            HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 1.5, 0.04),
            Err(HestonError::InvalidRho(1.5))
        );
        assert_eq!(
            HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, -0.01),
            Err(HestonError::InvalidV0(-0.01))
        );
        assert_eq!(
            HestonParams::new(f64::NAN, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04),
            Err(HestonError::NonFinite("rate"))
        );
    }

    #[test]
    fn test_boundary_correlation_allowed() {
        assert!(HestonParams::new(0.0, 100.0, 2.0, 0.06, 0.4, -1.0, 0.04).is_ok());
        assert!(HestonParams::new(0.0, 100.0, 2.0, 0.06, 0.4, 1.0, 0.04).is_ok());
    }

    // ========================================
    // Feller Condition Tests
    // ========================================

    #[test]
    fn test_feller() {
        let p = reference();
        // 2 * 2 * 0.06 = 0.24 > 0.16
        assert!(p.satisfies_feller());
        assert!(p.ensure_feller().is_ok());

        // Calibration default guess: 2 * 0.5 * 0.01 = 0.01 < 0.04
        let guess = HestonParams::new(0.025, 100.0, 0.5, 0.01, 0.2, 0.1, 0.4).unwrap();
        assert!(!guess.satisfies_feller());
        let err: PricingError = guess.ensure_feller().unwrap_err().into();
        assert!(err.is_invalid_argument());
    }

    // ========================================
    // Calibration Vector Tests
    // ========================================

    #[test]
    fn test_calibration_vector_layout() {
        let p = reference();
        assert_eq!(p.to_calibration_vector(), [2.0, 0.06, 0.4, 0.5, 0.04]);

        let q = p.with_calibration_vector(&[1.5, 0.04, 0.3, -0.6, 0.05]);
        assert_eq!(q.rate, 0.1);
        assert_eq!(q.spot, 100.0);
        assert_eq!(q.kappa, 1.5);
        assert_eq!(q.rho, -0.6);
        assert_eq!(q.v0, 0.05);
    }
}
