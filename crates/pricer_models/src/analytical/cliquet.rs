//! Three-date Cliquet option in the Black-Scholes world.
//!
//! Closed form after T. Guillaume, *A few insights into cliquet options*,
//! for fixing dates `t₀ < t₁ < t₂`, constant volatility `σ` and a
//! continuous payout rate `q`. The price is a sum of six products of
//! discount factors with uni-, bi- and trivariate normal probabilities,
//! which are evaluated through [`NormalIntegralConfig`].
//!
//! This pricer is independent of the Heston model.

use pricer_core::types::PricingError;

use super::distributions::NormalIntegralConfig;
use crate::instruments::OptionType;

/// Cliquet option with three fixing dates.
///
/// # Examples
///
/// ```
/// use pricer_models::analytical::CliquetOption;
/// use pricer_models::instruments::OptionType;
///
/// let cliquet = CliquetOption::new(
///     0.05,            // risk-free rate
///     [1.0, 2.0, 3.0], // fixing dates
///     OptionType::Call,
///     0.2,             // volatility
///     100.0,           // strike
///     100.0,           // spot
///     0.0,             // payout rate
/// )
/// .unwrap();
///
/// let price = cliquet.price().unwrap();
/// assert!((price - 25.4821).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CliquetOption {
    rate: f64,
    dates: [f64; 3],
    option_type: OptionType,
    sigma: f64,
    strike: f64,
    spot: f64,
    payout_rate: f64,
    normals: NormalIntegralConfig,
}

impl CliquetOption {
    /// Creates a Cliquet option.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidArgument` if any input is non-finite,
    /// a fixing date is not positive, the dates are not strictly increasing,
    /// or spot, strike or volatility is not positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rate: f64,
        fixing_dates: [f64; 3],
        option_type: OptionType,
        sigma: f64,
        strike: f64,
        spot: f64,
        payout_rate: f64,
    ) -> Result<Self, PricingError> {
        let scalars = [rate, sigma, strike, spot, payout_rate];
        if scalars.iter().chain(fixing_dates.iter()).any(|v| !v.is_finite()) {
            return Err(PricingError::invalid("Cliquet inputs must be finite"));
        }
        if let Some(date) = fixing_dates.iter().find(|&&d| d <= 0.0) {
            return Err(PricingError::invalid(format!(
                "fixing dates must be positive, got {}",
                date
            )));
        }
        if fixing_dates.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PricingError::invalid(format!(
                "fixing dates must be strictly increasing, got {:?}",
                fixing_dates
            )));
        }
        if spot <= 0.0 {
            return Err(PricingError::invalid(format!(
                "spot must be positive, got {}",
                spot
            )));
        }
        if strike <= 0.0 {
            return Err(PricingError::invalid(format!(
                "strike must be positive, got {}",
                strike
            )));
        }
        if sigma <= 0.0 {
            return Err(PricingError::invalid(format!(
                "volatility must be positive, got {}",
                sigma
            )));
        }

        Ok(Self {
            rate,
            dates: fixing_dates,
            option_type,
            sigma,
            strike,
            spot,
            payout_rate,
            normals: NormalIntegralConfig::default(),
        })
    }

    /// Replaces the normal integral settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the configuration is invalid.
    pub fn with_normal_integrals(
        mut self,
        normals: NormalIntegralConfig,
    ) -> Result<Self, PricingError> {
        normals.validate()?;
        self.normals = normals;
        Ok(self)
    }

    /// Fixing dates.
    #[inline]
    pub fn fixing_dates(&self) -> [f64; 3] {
        self.dates
    }

    /// Call or put.
    #[inline]
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// Closed-form price.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::NumericalInstability` if the result is not finite.
    pub fn price(&self) -> Result<f64, PricingError> {
        let lambda = self.option_type.sign();
        let n = &self.normals;
        let [t0, _, t2] = self.dates;
        let (r, q, k) = (self.rate, self.payout_rate, self.log_moneyness());
        let strike_discount = (-r * t2).exp() * self.strike;

        let corr_01_02 = self.rho_span(0, 1, 0, 2);
        let corr_12_02 = self.rho_span(1, 2, 0, 2);

        // Fixing at t₀ against the running returns to t₁ and t₂
        let first_share = lambda
            * (-r * (t2 - t0) - q * t0).exp()
            * self.spot
            * n.univariate(lambda * (-k + self.mu_hat(0)) / self.vol(0))
            * n.bivariate(
                -lambda * self.mu_between(0, 1) / self.vol_between(0, 1),
                -lambda * self.mu_between(0, 2) / self.vol_between(0, 2),
                corr_01_02,
            );
        let first_cash = -lambda
            * strike_discount
            * n.univariate(lambda * (-k + self.mu(0)) / self.vol(0))
            * n.bivariate(
                -lambda * self.mu_between(0, 1) / self.vol_between(0, 1),
                -lambda * self.mu_between(0, 2) / self.vol_between(0, 2),
                corr_01_02,
            );

        // Fixing at t₁
        let second_share = lambda
            * (-r * (t2 - self.dates[1]) - q * self.dates[1]).exp()
            * self.spot
            * n.univariate(-lambda * self.mu_between(1, 2) / self.vol_between(1, 2))
            * (n.bivariate(
                lambda * (k - self.mu_hat(0)) / self.vol(0),
                lambda * (-k + self.mu_hat(1)) / self.vol(1),
                -self.beta(0, 1),
            ) + n.univariate(lambda * (-k + self.mu_hat(0)) / self.vol(0))
                * n.univariate(lambda * self.mu_hat_between(0, 1) / self.vol_between(0, 1)));
        let second_cash = -lambda
            * strike_discount
            * n.univariate(-lambda * self.mu_between(1, 2) / self.vol_between(1, 2))
            * (n.bivariate(
                lambda * (k - self.mu(0)) / self.vol(0),
                lambda * (-k + self.mu(1)) / self.vol(1),
                -self.beta(0, 1),
            ) + n.univariate(lambda * (-k + self.mu(0)) / self.vol(0))
                * n.univariate(lambda * self.mu_between(0, 1) / self.vol_between(0, 1)));

        // Fixing at t₂
        let third_share = lambda
            * (-q * t2).exp()
            * self.spot
            * n.trivariate(
                lambda * (-k + self.mu_hat(2)) / self.vol(2),
                lambda * self.mu_hat_between(0, 2) / self.vol_between(0, 2),
                lambda * self.mu_hat_between(1, 2) / self.vol_between(1, 2),
                self.rho(0, 2),
                corr_12_02,
            );
        let third_cash = -lambda
            * strike_discount
            * n.trivariate(
                lambda * (-k + self.mu(2)) / self.vol(2),
                lambda * self.mu_between(0, 2) / self.vol_between(0, 2),
                lambda * self.mu_between(1, 2) / self.vol_between(1, 2),
                self.rho(0, 2),
                corr_12_02,
            );

        let price =
            first_share + first_cash + second_share + second_cash + third_share + third_cash;
        if !price.is_finite() {
            return Err(PricingError::NumericalInstability(format!(
                "non-finite Cliquet price for fixing dates {:?}",
                self.dates
            )));
        }
        Ok(price)
    }

    /// `k = ln(K / S₀)`
    #[inline]
    fn log_moneyness(&self) -> f64 {
        (self.strike / self.spot).ln()
    }

    /// `μ(i) = (r − σ²/2) tᵢ`
    #[inline]
    fn mu(&self, i: usize) -> f64 {
        (self.rate - 0.5 * self.sigma * self.sigma) * self.dates[i]
    }

    /// `μ̂(i) = (r + σ²/2) tᵢ`
    #[inline]
    fn mu_hat(&self, i: usize) -> f64 {
        (self.rate + 0.5 * self.sigma * self.sigma) * self.dates[i]
    }

    #[inline]
    fn mu_between(&self, i: usize, j: usize) -> f64 {
        (self.rate - 0.5 * self.sigma * self.sigma) * (self.dates[j] - self.dates[i])
    }

    #[inline]
    fn mu_hat_between(&self, i: usize, j: usize) -> f64 {
        (self.rate + 0.5 * self.sigma * self.sigma) * (self.dates[j] - self.dates[i])
    }

    /// `Σ(i) = σ √tᵢ`
    #[inline]
    fn vol(&self, i: usize) -> f64 {
        self.sigma * self.dates[i].sqrt()
    }

    #[inline]
    fn vol_between(&self, i: usize, j: usize) -> f64 {
        self.sigma * (self.dates[j] - self.dates[i]).sqrt()
    }

    /// `β(i, j) = √(tᵢ / tⱼ)`
    #[inline]
    fn beta(&self, i: usize, j: usize) -> f64 {
        (self.dates[i] / self.dates[j]).sqrt()
    }

    /// `ρ(i, j) = √(1 − tᵢ / tⱼ)`
    #[inline]
    fn rho(&self, i: usize, j: usize) -> f64 {
        (1.0 - self.dates[i] / self.dates[j]).sqrt()
    }

    /// `ρ(i, j, m, n) = √((tⱼ − tᵢ) / (tₙ − tₘ))`
    #[inline]
    fn rho_span(&self, i: usize, j: usize, m: usize, n: usize) -> f64 {
        ((self.dates[j] - self.dates[i]) / (self.dates[n] - self.dates[m])).sqrt()
    }
}
