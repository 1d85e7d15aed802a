//! Semi-closed-form Heston prices via the characteristic function.
//!
//! The call price is written as
//!
//! ```text
//! C = S₀ P₀ − K e^{−rT} P₁
//! Pⱼ = ½ + (1/π) ∫₀^∞ Re[ e^{−iφ ln K} fⱼ(φ) / (iφ) ] dφ
//! ```
//!
//! with the characteristic functions
//!
//! ```text
//! fⱼ(φ) = exp(Cⱼ + Dⱼ v₀ + iφ ln S₀)
//! d  = √((ρσφi − bⱼ)² − σ²(2uⱼφi − φ²))
//! g  = (bⱼ − ρσφi − d) / (bⱼ − ρσφi + d)
//! Cⱼ = rφiT + (κθ/σ²)((bⱼ − ρσφi − d)T − 2 ln((1 − g e^{−dT}) / (1 − g)))
//! Dⱼ = ((bⱼ − ρσφi − d)/σ²)(1 − e^{−dT}) / (1 − g e^{−dT})
//! ```
//!
//! where `b₀ = κ − σρ`, `b₁ = κ`, `u₀ = ½`, `u₁ = −½`. The integral is
//! truncated to `[lower, upper]` and evaluated with composite Simpson.
//!
//! The formula accepts parameter sets that violate the Feller condition.

use std::f64::consts::PI;

use num_complex::Complex64;
use num_traits::Zero;
use pricer_core::math::quadrature::QuadratureConfig;
use pricer_core::types::PricingError;
use tracing::trace;

use crate::instruments::OptionType;
use crate::models::HestonParams;

/// `uⱼ` for the share (0) and money-market (1) measures.
const U: [f64; 2] = [0.5, -0.5];

/// Characteristic-function pricer for European options under Heston.
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::HestonFormula;
/// use pricer_models::models::HestonParams;
///
/// let params = HestonParams::new(0.05, 100.0, 2.0, 0.04, 0.3, -0.7, 0.04).unwrap();
/// let formula = HestonFormula::new(&params).unwrap();
///
/// let call = formula.call_price(100.0, 1.0).unwrap();
/// assert!((call - 10.3942).abs() < 1e-3);
///
/// // Put-call parity holds exactly
/// let put = formula.put_price(100.0, 1.0).unwrap();
/// let forward_gap = 100.0 - 100.0 * (-0.05_f64).exp();
/// assert!((call - put - forward_gap).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonFormula {
    params: HestonParams,
    quadrature: QuadratureConfig,
}

impl HestonFormula {
    /// Integration domain `[1e-5, 100]` with 1000 Simpson partitions.
    ///
    /// Long maturities need the fine panel width: at T = 15 a hundred
    /// partitions misprice an at-the-money call by several units.
    pub const DEFAULT_QUADRATURE: QuadratureConfig = QuadratureConfig {
        lower: 1e-5,
        upper: 100.0,
        partitions: 1000,
    };

    /// Creates a formula pricer with [`DEFAULT_QUADRATURE`](Self::DEFAULT_QUADRATURE).
    ///
    /// Only the properties the formula itself needs are checked, so
    /// unconstrained calibration vectors can be priced.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a non-finite parameter or a non-positive spot
    /// - `SingularConfiguration` for zero vol-of-vol
    pub fn new(params: &HestonParams) -> Result<Self, PricingError> {
        let values = [
            params.rate,
            params.spot,
            params.kappa,
            params.theta,
            params.xi,
            params.rho,
            params.v0,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PricingError::invalid(format!(
                "Heston parameters must be finite: {:?}",
                params
            )));
        }
        if params.spot <= 0.0 {
            return Err(PricingError::invalid(format!(
                "spot must be positive, got {}",
                params.spot
            )));
        }
        if params.xi == 0.0 {
            return Err(PricingError::SingularConfiguration(
                "vol-of-vol is zero".to_string(),
            ));
        }

        Ok(Self {
            params: *params,
            quadrature: Self::DEFAULT_QUADRATURE,
        })
    }

    /// Replaces the integration domain and partition count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration is invalid or the lower
    /// bound is not positive (the integrand is singular at zero).
    pub fn with_quadrature(mut self, quadrature: QuadratureConfig) -> Result<Self, PricingError> {
        quadrature.validate()?;
        if quadrature.lower <= 0.0 {
            return Err(PricingError::invalid(format!(
                "Fourier integration must start above zero, got {}",
                quadrature.lower
            )));
        }
        self.quadrature = quadrature;
        Ok(self)
    }

    /// Model parameters.
    #[inline]
    pub fn params(&self) -> &HestonParams {
        &self.params
    }

    /// Integration settings.
    #[inline]
    pub fn quadrature(&self) -> &QuadratureConfig {
        &self.quadrature
    }

    /// European call price.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for non-positive strike or maturity
    /// - `SingularConfiguration` if a denominator of the characteristic
    ///   function vanishes on the integration grid
    /// - `NumericalInstability` if the result is not finite
    pub fn call_price(&self, strike: f64, maturity: f64) -> Result<f64, PricingError> {
        validate_contract(strike, maturity)?;

        let p0 = self.probability(0, strike, maturity)?;
        let p1 = self.probability(1, strike, maturity)?;
        let discount = (-self.params.rate * maturity).exp();
        let price = self.params.spot * p0 - strike * discount * p1;

        trace!(strike, maturity, p0, p1, price, "Heston formula call");
        if !price.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "non-finite call price for K = {}, T = {}",
                strike, maturity
            )));
        }
        Ok(price)
    }

    /// European put price by put-call parity.
    ///
    /// # Errors
    ///
    /// See [`HestonFormula::call_price`].
    pub fn put_price(&self, strike: f64, maturity: f64) -> Result<f64, PricingError> {
        let call = self.call_price(strike, maturity)?;
        Ok(call + strike * (-self.params.rate * maturity).exp() - self.params.spot)
    }

    /// European price for either option type.
    ///
    /// # Errors
    ///
    /// See [`HestonFormula::call_price`].
    pub fn price(
        &self,
        option_type: OptionType,
        strike: f64,
        maturity: f64,
    ) -> Result<f64, PricingError> {
        if option_type.is_call() {
            self.call_price(strike, maturity)
        } else {
            self.put_price(strike, maturity)
        }
    }

    /// Exercise probability `Pⱼ` under measure `j` (0: share, 1: money market).
    fn probability(&self, j: usize, strike: f64, maturity: f64) -> Result<f64, PricingError> {
        let ln_strike = strike.ln();
        let integral = self.quadrature.try_integrate(|phi| {
            let f = self.characteristic(j, phi, maturity)?;
            let kernel = Complex64::new(0.0, -phi * ln_strike).exp() * f / Complex64::new(0.0, phi);
            Ok::<f64, PricingError>(kernel.re)
        })?;
        Ok(0.5 + integral / PI)
    }

    /// Characteristic function `fⱼ(φ)` of `ln S_T`.
    fn characteristic(&self, j: usize, phi: f64, tau: f64) -> Result<Complex64, PricingError> {
        let p = &self.params;
        let sigma2 = p.xi * p.xi;
        let a = p.kappa * p.theta;
        let b = if j == 0 { p.kappa - p.xi * p.rho } else { p.kappa };
        let u = U[j];

        let i = Complex64::i();
        let rho_sigma_phi_i = Complex64::new(0.0, p.rho * p.xi * phi);
        let shifted = rho_sigma_phi_i - b;
        let d = (shifted * shifted - sigma2 * Complex64::new(-phi * phi, 2.0 * u * phi)).sqrt();

        let minus = -shifted - d;
        let plus = -shifted + d;
        if plus.is_zero() {
            return Err(singular("b - ρσφi + d", phi));
        }
        let g = minus / plus;

        let one = Complex64::new(1.0, 0.0);
        let one_minus_g = one - g;
        if one_minus_g.is_zero() {
            return Err(singular("1 - g", phi));
        }
        let e = (-d * tau).exp();
        let one_minus_ge = one - g * e;
        if one_minus_ge.is_zero() {
            return Err(singular("1 - g exp(-dτ)", phi));
        }

        let c = i * (p.rate * phi * tau)
            + (a / sigma2) * (minus * tau - 2.0 * (one_minus_ge / one_minus_g).ln());
        let d_term = (minus / sigma2) * ((one - e) / one_minus_ge);

        Ok((c + d_term * p.v0 + i * (phi * p.spot.ln())).exp())
    }
}

fn validate_contract(strike: f64, maturity: f64) -> Result<(), PricingError> {
    if !strike.is_finite() || strike <= 0.0 {
        return Err(PricingError::invalid(format!(
            "strike must be positive, got {}",
            strike
        )));
    }
    if !maturity.is_finite() || maturity <= 0.0 {
        return Err(PricingError::invalid(format!(
            "maturity must be positive, got {}",
            maturity
        )));
    }
    Ok(())
}

fn singular(term: &str, phi: f64) -> PricingError {
    PricingError::SingularConfiguration(format!("{} vanishes at φ = {}", term, phi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn long_dated() -> HestonParams {
        HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.4, 0.5, 0.04).unwrap()
    }

    fn black_scholes_call(spot: f64, strike: f64, rate: f64, vol: f64, maturity: f64) -> f64 {
        use crate::analytical::distributions::norm_cdf;
        let sqrt_t = maturity.sqrt();
        let d1 = ((spot / strike).ln() + (rate + 0.5 * vol * vol) * maturity) / (vol * sqrt_t);
        let d2 = d1 - vol * sqrt_t;
        spot * norm_cdf(d1) - strike * (-rate * maturity).exp() * norm_cdf(d2)
    }

    // ========================================
    // Reference Values
    // ========================================

    #[test]
    fn test_long_maturity_reference() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        let call = formula.call_price(100.0, 15.0).unwrap();
        assert_relative_eq!(call, 78.4300, epsilon = 1e-3);
    }

    #[test]
    fn test_standard_reference() {
        let params = HestonParams::new(0.05, 100.0, 2.0, 0.04, 0.3, -0.7, 0.04).unwrap();
        let formula = HestonFormula::new(&params).unwrap();
        assert_relative_eq!(formula.call_price(100.0, 1.0).unwrap(), 10.3942, epsilon = 1e-3);
    }

    #[test]
    fn test_calibration_grid_reference() {
        let params = HestonParams::new(0.025, 100.0, 1.5, 0.04, 0.3, -0.6, 0.05).unwrap();
        let formula = HestonFormula::new(&params).unwrap();
        assert_relative_eq!(formula.call_price(100.0, 1.0).unwrap(), 9.39437, epsilon = 1e-4);
        assert_relative_eq!(formula.call_price(80.0, 0.5).unwrap(), 21.64897, epsilon = 1e-4);
        assert_relative_eq!(formula.call_price(120.0, 2.0).unwrap(), 5.43259, epsilon = 1e-4);
    }

    #[test]
    fn test_coarse_partitions_misprice_long_maturity() {
        let formula = HestonFormula::new(&long_dated())
            .unwrap()
            .with_quadrature(HestonFormula::DEFAULT_QUADRATURE.with_partitions(100))
            .unwrap();
        let coarse = formula.call_price(100.0, 15.0).unwrap();
        assert!((coarse - 78.43).abs() > 1.0);
    }

    #[test]
    fn test_small_vol_of_vol_matches_black_scholes() {
        // v0 = θ and ξ → 0 collapse Heston to Black-Scholes with σ = √θ
        let params = HestonParams::new(0.05, 100.0, 1.0, 0.04, 0.01, 0.0, 0.04).unwrap();
        let formula = HestonFormula::new(&params).unwrap();
        for (strike, maturity) in [(100.0, 1.0), (90.0, 0.5)] {
            let heston = formula.call_price(strike, maturity).unwrap();
            let bs = black_scholes_call(100.0, strike, 0.05, 0.2, maturity);
            assert_relative_eq!(heston, bs, epsilon = 5e-3);
        }
    }

    // ========================================
    // Parity and Monotonicity
    // ========================================

    #[test]
    fn test_put_call_parity_exact() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        for (strike, maturity) in [(80.0, 0.5), (100.0, 2.0), (130.0, 5.0)] {
            let call = formula.call_price(strike, maturity).unwrap();
            let put = formula.put_price(strike, maturity).unwrap();
            let forward_gap = 100.0 - strike * (-0.1 * maturity).exp();
            assert_relative_eq!(call - put, forward_gap, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_call_decreases_in_strike() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        let prices: Vec<f64> = [80.0, 90.0, 100.0, 110.0, 120.0]
            .iter()
            .map(|&k| formula.call_price(k, 1.0).unwrap())
            .collect();
        assert!(prices.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_price_dispatch() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        assert_eq!(
            formula.price(OptionType::Put, 100.0, 1.0).unwrap(),
            formula.put_price(100.0, 1.0).unwrap()
        );
    }

    // ========================================
    // Error Handling
    // ========================================

    #[test]
    fn test_invalid_contract() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        assert!(formula.call_price(0.0, 1.0).unwrap_err().is_invalid_argument());
        assert!(formula.call_price(100.0, 0.0).unwrap_err().is_invalid_argument());
        assert!(formula.put_price(100.0, -1.0).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_zero_vol_of_vol_is_singular() {
        let params = HestonParams::new(0.1, 100.0, 2.0, 0.06, 0.0, 0.5, 0.04).unwrap();
        assert!(matches!(
            HestonFormula::new(&params),
            Err(PricingError::SingularConfiguration(_))
        ));
    }

    #[test]
    fn test_accepts_feller_violation_and_unconstrained_vectors() {
        let guess = HestonParams::new(0.025, 100.0, 0.5, 0.01, 0.2, 0.1, 0.4).unwrap();
        assert!(!guess.satisfies_feller());
        let formula = HestonFormula::new(&guess).unwrap();
        assert!(formula.call_price(100.0, 1.0).unwrap() > 0.0);

        let wandering = guess.with_calibration_vector(&[0.4, 0.02, 0.25, 1.02, 0.3]);
        assert!(HestonFormula::new(&wandering).is_ok());
    }

    #[test]
    fn test_with_quadrature_rejects_zero_lower_bound() {
        let formula = HestonFormula::new(&long_dated()).unwrap();
        assert!(formula
            .with_quadrature(QuadratureConfig::new(0.0, 100.0, 1000))
            .is_err());
        assert!(formula
            .with_quadrature(QuadratureConfig::new(1e-5, 100.0, 0))
            .is_err());
    }
}
