//! Heston model calibration.
//!
//! ## Calibration Approach
//!
//! The five model parameters `[kappa, theta, xi, rho, v0]` are fitted to
//! observed European call prices by minimising the mean squared pricing error
//!
//! ```text
//! MSE(p) = (1/N) Σᵢ (C_Heston(p; Kᵢ, Tᵢ) − Cᵢ)²
//! ```
//!
//! with model prices from [`HestonFormula`]. Risk-free rate and spot are
//! market inputs and stay fixed. The search is unconstrained: parameter sets
//! the formula cannot price evaluate to NaN and are rejected by the line
//! search of the minimiser.
//!
//! ## Outcomes
//!
//! | Minimiser termination | Outcome | Stored parameters |
//! |-----------------------|---------|-------------------|
//! | function, step or gradient tolerance | `Converged` | updated |
//! | iteration cap | `MaxIterationsReached` | updated |
//! | anything else | `Failed` (error returned) | unchanged |

use pricer_core::math::quadrature::QuadratureConfig;
use pricer_core::math::solvers::{LbfgsMinimiser, Minimiser, TerminationReason};
use pricer_core::traits::calibration::{
    CalibrationConfig, CalibrationOutcome, CalibrationResult, Calibrator,
};
use pricer_core::types::{PricingError, SolverError};
use tracing::{debug, info, warn};

use crate::analytical::HestonFormula;
use crate::models::HestonParams;

/// Observed European call price.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketQuote {
    /// Time to maturity (years).
    pub maturity: f64,
    /// Strike price.
    pub strike: f64,
    /// Observed call price.
    pub price: f64,
}

impl MarketQuote {
    /// Create a new quote.
    pub fn new(maturity: f64, strike: f64, price: f64) -> Self {
        Self {
            maturity,
            strike,
            price,
        }
    }

    fn validate(&self, index: usize) -> Result<(), PricingError> {
        if !self.maturity.is_finite() || self.maturity <= 0.0 {
            return Err(PricingError::invalid(format!(
                "quote {}: maturity must be positive, got {}",
                index, self.maturity
            )));
        }
        if !self.strike.is_finite() || self.strike <= 0.0 {
            return Err(PricingError::invalid(format!(
                "quote {}: strike must be positive, got {}",
                index, self.strike
            )));
        }
        if !self.price.is_finite() {
            return Err(PricingError::invalid(format!(
                "quote {}: price must be finite",
                index
            )));
        }
        Ok(())
    }
}

/// Heston model calibrator.
///
/// Owns the market quotes, the initial guess and the parameters of the last
/// usable run.
///
/// # Examples
///
/// ```
/// use pricer_core::traits::calibration::{CalibrationConfig, CalibrationOutcome, Calibrator};
/// use pricer_models::analytical::HestonFormula;
/// use pricer_models::calibration::{HestonCalibrator, MarketQuote};
/// use pricer_models::models::HestonParams;
///
/// let truth = HestonParams::new(0.025, 100.0, 1.5, 0.04, 0.3, -0.6, 0.05).unwrap();
/// let formula = HestonFormula::new(&truth).unwrap();
///
/// let mut calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
/// calibrator.set_guess(truth).unwrap();
/// for (strike, maturity) in [(90.0, 1.0), (100.0, 1.0), (110.0, 1.0)] {
///     let price = formula.call_price(strike, maturity).unwrap();
///     calibrator.add_quote(MarketQuote::new(maturity, strike, price));
/// }
///
/// // Starting at the optimum converges immediately
/// let result = calibrator.calibrate(&CalibrationConfig::new(1e-6, 100)).unwrap();
/// assert_eq!(result.outcome, CalibrationOutcome::Converged);
/// assert!(result.mean_squared_error < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct HestonCalibrator {
    rate: f64,
    spot: f64,
    quotes: Vec<MarketQuote>,
    guess: HestonParams,
    params: HestonParams,
    outcome: CalibrationOutcome,
    quadrature: QuadratureConfig,
}

impl HestonCalibrator {
    /// Default initial guess `[kappa, theta, xi, rho, v0]`.
    pub const DEFAULT_GUESS: [f64; HestonParams::CALIBRATION_DIM] = [0.5, 0.01, 0.2, 0.1, 0.4];

    /// Create a calibrator for a market with the given rate and spot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the rate is not finite or the spot is not
    /// positive and finite.
    pub fn new(rate: f64, spot: f64) -> Result<Self, PricingError> {
        let [kappa, theta, xi, rho, v0] = Self::DEFAULT_GUESS;
        let guess = HestonParams::new(rate, spot, kappa, theta, xi, rho, v0)?;
        Ok(Self {
            rate,
            spot,
            quotes: Vec::new(),
            guess,
            params: guess,
            outcome: CalibrationOutcome::NotStarted,
            quadrature: HestonFormula::DEFAULT_QUADRATURE,
        })
    }

    /// Use a different Fourier quadrature for model prices.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` under the same rules as
    /// [`HestonFormula::with_quadrature`].
    pub fn with_quadrature(mut self, quadrature: QuadratureConfig) -> Result<Self, PricingError> {
        HestonFormula::new(&self.guess)?.with_quadrature(quadrature)?;
        self.quadrature = quadrature;
        Ok(self)
    }

    /// Replace the initial guess. Rate and spot are taken from the calibrator.
    ///
    /// Resets the stored parameters to the guess and the outcome to
    /// `NotStarted`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the guess fails [`HestonParams::validate`].
    pub fn set_guess(&mut self, guess: HestonParams) -> Result<(), PricingError> {
        let guess = guess.with_rate(self.rate);
        let guess = HestonParams {
            spot: self.spot,
            ..guess
        };
        guess.validate()?;
        self.guess = guess;
        self.params = guess;
        self.outcome = CalibrationOutcome::NotStarted;
        Ok(())
    }

    /// Quotes in insertion order.
    #[inline]
    pub fn quotes(&self) -> &[MarketQuote] {
        &self.quotes
    }

    /// Initial guess.
    #[inline]
    pub fn guess(&self) -> &HestonParams {
        &self.guess
    }

    /// Parameters of the last usable run, or the guess before any.
    #[inline]
    pub fn calibrated_params(&self) -> &HestonParams {
        &self.params
    }

    /// Mean squared pricing error of `params` against the stored quotes.
    ///
    /// NaN if the quote list is empty or any model price cannot be computed.
    pub fn mean_squared_error(&self, params: &HestonParams) -> f64 {
        if self.quotes.is_empty() {
            return f64::NAN;
        }
        let formula = match HestonFormula::new(params)
            .and_then(|f| f.with_quadrature(self.quadrature))
        {
            Ok(formula) => formula,
            Err(_) => return f64::NAN,
        };

        let mut sum = 0.0;
        for quote in &self.quotes {
            match formula.call_price(quote.strike, quote.maturity) {
                Ok(model) => sum += (model - quote.price).powi(2),
                Err(_) => return f64::NAN,
            }
        }
        sum / self.quotes.len() as f64
    }

    /// Run the calibration with an explicit minimiser.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty quote list, an invalid quote or an
    ///   invalid minimiser configuration
    /// - `CalibrationFailed` if the minimiser stops abnormally; the outcome
    ///   is recorded as `Failed` and the stored parameters are kept
    pub fn calibrate_with<M: Minimiser>(
        &mut self,
        minimiser: &M,
    ) -> Result<CalibrationResult<HestonParams>, PricingError> {
        if self.quotes.is_empty() {
            return Err(PricingError::invalid("no market quotes to calibrate to"));
        }
        for (index, quote) in self.quotes.iter().enumerate() {
            quote.validate(index)?;
        }

        let base = self.guess;
        let objective = |x: &[f64]| match <&[f64; HestonParams::CALIBRATION_DIM]>::try_from(x) {
            Ok(vector) => self.mean_squared_error(&base.with_calibration_vector(vector)),
            Err(_) => f64::NAN,
        };

        debug!(
            n_quotes = self.quotes.len(),
            guess = ?base.to_calibration_vector(),
            "starting Heston calibration"
        );

        let report = match minimiser.minimise(objective, &base.to_calibration_vector()) {
            Ok(report) => report,
            Err(SolverError::NonFiniteInitialValue { value }) => {
                self.outcome = CalibrationOutcome::Failed;
                warn!(mse = value, "objective not finite at the initial guess");
                return Err(PricingError::CalibrationFailed {
                    termination_code: TerminationReason::NonFiniteObjective.code(),
                    mean_squared_error: value,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let outcome = CalibrationOutcome::from_termination(report.termination);
        self.outcome = outcome;
        let code = report.termination.code();

        if outcome == CalibrationOutcome::Failed {
            warn!(
                termination_code = code,
                mse = report.value,
                iterations = report.iterations,
                "Heston calibration failed"
            );
            return Err(PricingError::CalibrationFailed {
                termination_code: code,
                mean_squared_error: report.value,
            });
        }

        let mut vector = [0.0; HestonParams::CALIBRATION_DIM];
        vector.copy_from_slice(&report.params);
        self.params = base.with_calibration_vector(&vector);

        info!(
            %outcome,
            termination_code = code,
            mse = report.value,
            iterations = report.iterations,
            "Heston calibration finished"
        );

        Ok(
            CalibrationResult::new(self.params, outcome, report.value, report.iterations)
                .with_termination_code(code),
        )
    }
}

impl Calibrator for HestonCalibrator {
    type Quote = MarketQuote;
    type ModelParams = HestonParams;

    fn add_quote(&mut self, quote: MarketQuote) {
        self.quotes.push(quote);
    }

    fn objective_function(&self, params: &HestonParams) -> f64 {
        self.mean_squared_error(params)
    }

    /// Calibrate with L-BFGS: all tolerances equal `config.accuracy`, trial
    /// steps capped at `config.max_step`, central differences with
    /// `config.diff_step`.
    fn calibrate(
        &mut self,
        config: &CalibrationConfig,
    ) -> Result<CalibrationResult<HestonParams>, PricingError> {
        config.validate()?;
        let minimiser = LbfgsMinimiser::new(config.minimiser_config());
        self.calibrate_with(&minimiser)
    }

    fn status(&self) -> (CalibrationOutcome, f64) {
        (self.outcome, self.mean_squared_error(&self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricer_core::math::solvers::MinimiserReport;

    fn truth() -> HestonParams {
        HestonParams::new(0.025, 100.0, 1.5, 0.04, 0.3, -0.6, 0.05).unwrap()
    }

    fn calibrator_with_formula_quotes(params: &HestonParams) -> HestonCalibrator {
        let formula = HestonFormula::new(params).unwrap();
        let mut calibrator = HestonCalibrator::new(params.rate, params.spot).unwrap();
        for maturity in [0.5, 1.0, 2.0] {
            for strike in [80.0, 90.0, 100.0, 110.0, 120.0] {
                let price = formula.call_price(strike, maturity).unwrap();
                calibrator.add_quote(MarketQuote::new(maturity, strike, price));
            }
        }
        calibrator
    }

    /// Minimiser that always reports a stalled line search.
    struct Stalling;

    impl Minimiser for Stalling {
        fn minimise<F>(&self, objective: F, initial: &[f64]) -> Result<MinimiserReport, SolverError>
        where
            F: Fn(&[f64]) -> f64,
        {
            Ok(MinimiserReport {
                params: initial.iter().map(|x| x * 2.0).collect(),
                value: objective(initial),
                iterations: 3,
                termination: TerminationReason::LineSearchStalled,
            })
        }
    }

    /// Minimiser that stops at its first iterate as if capped.
    struct Capped;

    impl Minimiser for Capped {
        fn minimise<F>(&self, objective: F, initial: &[f64]) -> Result<MinimiserReport, SolverError>
        where
            F: Fn(&[f64]) -> f64,
        {
            let mut params = initial.to_vec();
            params[0] += 0.1;
            Ok(MinimiserReport {
                value: objective(&params),
                params,
                iterations: 1,
                termination: TerminationReason::MaxIterations,
            })
        }
    }

    // ========================================
    // Construction and Quotes
    // ========================================

    #[test]
    fn test_default_guess() {
        let calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
        assert_eq!(
            calibrator.guess().to_calibration_vector(),
            HestonCalibrator::DEFAULT_GUESS
        );
        assert_eq!(calibrator.calibrated_params(), calibrator.guess());
        assert!(calibrator.quotes().is_empty());
        let (outcome, mse) = calibrator.status();
        assert_eq!(outcome, CalibrationOutcome::NotStarted);
        assert!(mse.is_nan());
    }

    #[test]
    fn test_new_rejects_bad_market() {
        assert!(HestonCalibrator::new(0.025, 0.0).is_err());
        assert!(HestonCalibrator::new(f64::NAN, 100.0).is_err());
    }

    #[test]
    fn test_with_quadrature_rejects_zero_lower_bound() {
        let calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
        assert!(calibrator
            .clone()
            .with_quadrature(QuadratureConfig::new(0.0, 100.0, 1000))
            .is_err());
        assert!(calibrator
            .with_quadrature(QuadratureConfig::new(1e-5, 100.0, 500))
            .is_ok());
    }

    #[test]
    fn test_quotes_kept_in_order() {
        let mut calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
        calibrator.add_quote(MarketQuote::new(1.0, 80.0, 25.72));
        calibrator.add_quote(MarketQuote::new(2.0, 100.0, 19.36));
        assert_eq!(calibrator.quotes()[0].strike, 80.0);
        assert_eq!(calibrator.quotes()[1].maturity, 2.0);
    }

    #[test]
    fn test_set_guess_uses_market_rate_and_spot() {
        let mut calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
        let other_market = HestonParams::new(0.1, 50.0, 1.0, 0.05, 0.2, 0.0, 0.05).unwrap();
        calibrator.set_guess(other_market).unwrap();
        assert_eq!(calibrator.guess().rate, 0.025);
        assert_eq!(calibrator.guess().spot, 100.0);
        assert_eq!(calibrator.guess().kappa, 1.0);
    }

    // ========================================
    // Objective
    // ========================================

    #[test]
    fn test_objective_zero_at_truth() {
        let calibrator = calibrator_with_formula_quotes(&truth());
        assert!(calibrator.objective_function(&truth()) < 1e-20);
        let shifted = truth().with_calibration_vector(&[1.2, 0.05, 0.25, -0.4, 0.06]);
        assert!(calibrator.objective_function(&shifted) > 1e-4);
    }

    #[test]
    fn test_objective_nan_when_formula_fails() {
        let calibrator = calibrator_with_formula_quotes(&truth());
        let degenerate = truth().with_calibration_vector(&[1.5, 0.04, 0.0, -0.6, 0.05]);
        assert!(calibrator.objective_function(&degenerate).is_nan());
    }

    // ========================================
    // Calibration Runs
    // ========================================

    #[test]
    fn test_calibrate_requires_quotes() {
        let mut calibrator = HestonCalibrator::new(0.025, 100.0).unwrap();
        let err = calibrator.calibrate_default().unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_calibrate_rejects_invalid_config_and_quotes() {
        let mut calibrator = calibrator_with_formula_quotes(&truth());
        assert!(calibrator
            .calibrate(&CalibrationConfig::new(0.0, 100))
            .unwrap_err()
            .is_invalid_argument());
        assert!(calibrator
            .calibrate(&CalibrationConfig::new(1e-3, 0))
            .unwrap_err()
            .is_invalid_argument());

        calibrator.add_quote(MarketQuote::new(-1.0, 100.0, 5.0));
        assert!(calibrator
            .calibrate_default()
            .unwrap_err()
            .is_invalid_argument());
    }

    #[test]
    fn test_idempotent_from_truth() {
        let mut calibrator = calibrator_with_formula_quotes(&truth());
        calibrator.set_guess(truth()).unwrap();

        let result = calibrator
            .calibrate(&CalibrationConfig::new(1e-6, 100))
            .unwrap();

        assert_eq!(result.outcome, CalibrationOutcome::Converged);
        assert_eq!(result.termination_code, Some(4));
        assert_eq!(result.iterations, 0);
        assert_eq!(result.params, truth());
    }

    #[test]
    fn test_recovers_perturbed_parameters() {
        let mut calibrator = calibrator_with_formula_quotes(&truth());
        let guess = truth().with_calibration_vector(&[1.2, 0.05, 0.25, -0.4, 0.06]);
        calibrator.set_guess(guess).unwrap();
        let start = calibrator.objective_function(&guess);

        let result = calibrator
            .calibrate(&CalibrationConfig::new(1e-6, 200))
            .unwrap();

        assert!(result.is_usable());
        assert!(result.mean_squared_error < 0.01);
        assert!(result.mean_squared_error < start);
        let (outcome, mse) = calibrator.status();
        assert_eq!(outcome, result.outcome);
        assert!((mse - result.mean_squared_error).abs() < 1e-12);
    }

    #[test]
    fn test_failed_run_keeps_parameters() {
        let mut calibrator = calibrator_with_formula_quotes(&truth());
        let before = *calibrator.calibrated_params();

        let err = calibrator.calibrate_with(&Stalling).unwrap_err();
        assert!(matches!(
            err,
            PricingError::CalibrationFailed {
                termination_code: 7,
                ..
            }
        ));
        assert_eq!(calibrator.status().0, CalibrationOutcome::Failed);
        assert_eq!(*calibrator.calibrated_params(), before);
    }

    #[test]
    fn test_iteration_cap_stores_parameters() {
        let mut calibrator = calibrator_with_formula_quotes(&truth());
        let result = calibrator.calibrate_with(&Capped).unwrap();
        assert_eq!(result.outcome, CalibrationOutcome::MaxIterationsReached);
        assert_eq!(result.termination_code, Some(5));
        assert!((calibrator.calibrated_params().kappa - 0.6).abs() < 1e-15);
    }
}
