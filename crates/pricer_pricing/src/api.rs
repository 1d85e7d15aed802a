//! Pricing and calibration entry points.
//!
//! Free functions use built-in numerical defaults. [`HestonFacade`] carries
//! defaults loaded through [`infra_config::Settings`] and exposes the same
//! operations.
//!
//! # Examples
//!
//! ```rust
//! use pricer_models::instruments::{ContractSpec, OptionType};
//! use pricer_models::models::HestonParams;
//! use pricer_pricing::api::{price, PricingMethod};
//! use pricer_pricing::mc::SimulationSettings;
//!
//! let params = HestonParams::new(0.05, 100.0, 2.0, 0.04, 0.3, -0.7, 0.04).unwrap();
//! let call = ContractSpec::european(OptionType::Call, 100.0, 1.0).unwrap();
//!
//! let formula = price(&params, &call, PricingMethod::Formula).unwrap();
//!
//! let settings = SimulationSettings::new(4_000, 50).unwrap().with_seed(3);
//! let mc = price(&params, &call, PricingMethod::MonteCarlo(settings)).unwrap();
//!
//! assert!((formula - mc).abs() < 1.5);
//! ```

use infra_config::Settings;
use pricer_core::math::quadrature::QuadratureConfig;
use pricer_core::traits::calibration::{CalibrationConfig, CalibrationResult, Calibrator};
use pricer_core::types::PricingError;
use pricer_models::analytical::{CliquetOption, HestonFormula, NormalIntegralConfig};
use pricer_models::calibration::{HestonCalibrator, MarketQuote};
use pricer_models::instruments::ContractSpec;
use pricer_models::models::HestonParams;
use tracing::debug;

use crate::mc::{EverestBasket, MonteCarloEngine, PricingResult, SimulationSettings};

/// Pricing method for [`price`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PricingMethod {
    /// Characteristic-function formula; European contracts only.
    Formula,
    /// Monte Carlo simulation with the given settings.
    MonteCarlo(SimulationSettings),
}

/// Prices a single-asset contract.
///
/// # Errors
///
/// - `InvalidArgument` for a non-European contract with
///   [`PricingMethod::Formula`], or for Monte Carlo with parameters violating
///   the Feller condition (checked before any simulation)
/// - any error of [`HestonFormula`] or [`MonteCarloEngine`]
pub fn price(
    params: &HestonParams,
    contract: &ContractSpec,
    method: PricingMethod,
) -> Result<f64, PricingError> {
    match method {
        PricingMethod::Formula => formula_price(params, contract, HestonFormula::DEFAULT_QUADRATURE),
        PricingMethod::MonteCarlo(settings) => {
            Ok(monte_carlo_price(params, contract, settings)?.price)
        }
    }
}

/// Prices an Everest basket over `assets`.
///
/// # Errors
///
/// `NoAssets` for an empty slice, otherwise see [`EverestBasket`].
pub fn price_basket(
    risk_free_rate: f64,
    assets: &[HestonParams],
    maturity: f64,
    settings: SimulationSettings,
) -> Result<f64, PricingError> {
    let mut basket = EverestBasket::new(risk_free_rate, settings)?;
    for asset in assets {
        basket.add_asset(*asset)?;
    }
    basket.price(maturity)
}

/// Calibrates Heston parameters to call quotes, starting from `guess`.
///
/// Rate and spot of `guess` define the market and are not fitted.
///
/// # Errors
///
/// See [`HestonCalibrator::calibrate_with`].
pub fn calibrate(
    guess: &HestonParams,
    quotes: &[MarketQuote],
    accuracy: f64,
    max_iterations: usize,
) -> Result<CalibrationResult<HestonParams>, PricingError> {
    calibrate_with_config(
        guess,
        quotes,
        &CalibrationConfig::new(accuracy, max_iterations),
        HestonFormula::DEFAULT_QUADRATURE,
    )
}

fn formula_price(
    params: &HestonParams,
    contract: &ContractSpec,
    quadrature: QuadratureConfig,
) -> Result<f64, PricingError> {
    if contract.style().is_path_dependent() {
        return Err(PricingError::invalid(format!(
            "the characteristic formula prices European contracts only, got {}",
            contract.style().name()
        )));
    }
    debug!(
        strike = contract.strike(),
        maturity = contract.maturity(),
        "formula price"
    );
    HestonFormula::new(params)?
        .with_quadrature(quadrature)?
        .price(contract.option_type(), contract.strike(), contract.maturity())
}

fn monte_carlo_price(
    params: &HestonParams,
    contract: &ContractSpec,
    settings: SimulationSettings,
) -> Result<PricingResult, PricingError> {
    params.ensure_feller()?;
    MonteCarloEngine::new(*params, settings)?.price_with_statistics(contract)
}

fn calibrate_with_config(
    guess: &HestonParams,
    quotes: &[MarketQuote],
    config: &CalibrationConfig,
    quadrature: QuadratureConfig,
) -> Result<CalibrationResult<HestonParams>, PricingError> {
    let mut calibrator =
        HestonCalibrator::new(guess.rate, guess.spot)?.with_quadrature(quadrature)?;
    calibrator.set_guess(*guess)?;
    for quote in quotes {
        calibrator.add_quote(*quote);
    }
    calibrator.calibrate(config)
}

/// Entry points bound to configured numerical defaults.
///
/// # Examples
///
/// ```rust
/// use infra_config::Settings;
/// use pricer_models::instruments::{ContractSpec, OptionType};
/// use pricer_models::models::HestonParams;
/// use pricer_pricing::api::HestonFacade;
///
/// let settings = Settings::from_toml_str(
///     r#"
///     [simulation]
///     paths = 2000
///     steps_per_year = 50
///     seed = 11
///     "#,
/// )
/// .unwrap();
/// let facade = HestonFacade::from_settings(&settings).unwrap();
/// assert_eq!(facade.simulation().n_paths(), 2_000);
///
/// let params = HestonParams::new(0.05, 100.0, 2.0, 0.04, 0.3, -0.7, 0.04).unwrap();
/// let lookback = ContractSpec::lookback(OptionType::Call, 100.0, 1.0).unwrap();
/// let result = facade.price_monte_carlo(&params, &lookback).unwrap();
/// assert!(result.price > 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HestonFacade {
    quadrature: QuadratureConfig,
    simulation: SimulationSettings,
    calibration: CalibrationConfig,
    normals: NormalIntegralConfig,
}

impl HestonFacade {
    /// Builds the facade from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any section is invalid.
    pub fn from_settings(settings: &Settings) -> Result<Self, PricingError> {
        settings
            .validate()
            .map_err(|err| PricingError::invalid(err.to_string()))?;

        let q = &settings.quadrature;
        let quadrature = QuadratureConfig::new(q.lower, q.upper, q.partitions);
        quadrature.validate()?;

        let s = &settings.simulation;
        let simulation = SimulationSettings::builder()
            .n_paths(s.paths)
            .steps_per_year(s.steps_per_year)
            .maybe_seed(s.seed)
            .build()?;

        let c = &settings.calibration;
        let calibration = CalibrationConfig {
            accuracy: c.accuracy,
            max_iterations: c.max_iterations,
            max_step: c.max_step,
            diff_step: c.diff_step,
        };
        calibration.validate()?;

        let normals =
            NormalIntegralConfig::new(settings.cliquet.lower_bound, settings.cliquet.partitions);
        normals.validate()?;

        debug!(?quadrature, ?simulation, ?calibration, ?normals, "facade configured");
        Ok(Self {
            quadrature,
            simulation,
            calibration,
            normals,
        })
    }

    /// Loads settings from `config/heston.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if loading or validation fails.
    pub fn load() -> Result<Self, PricingError> {
        let settings = Settings::load().map_err(|err| PricingError::invalid(err.to_string()))?;
        Self::from_settings(&settings)
    }

    /// Fourier quadrature for the formula.
    #[inline]
    pub fn quadrature(&self) -> &QuadratureConfig {
        &self.quadrature
    }

    /// Monte Carlo settings.
    #[inline]
    pub fn simulation(&self) -> &SimulationSettings {
        &self.simulation
    }

    /// Calibration settings.
    #[inline]
    pub fn calibration(&self) -> &CalibrationConfig {
        &self.calibration
    }

    /// Normal integral settings for the Cliquet closed form.
    #[inline]
    pub fn normal_integrals(&self) -> &NormalIntegralConfig {
        &self.normals
    }

    /// Formula price of a European contract.
    ///
    /// # Errors
    ///
    /// See [`price`].
    pub fn price_formula(
        &self,
        params: &HestonParams,
        contract: &ContractSpec,
    ) -> Result<f64, PricingError> {
        formula_price(params, contract, self.quadrature)
    }

    /// Monte Carlo price with statistics.
    ///
    /// # Errors
    ///
    /// See [`price`].
    pub fn price_monte_carlo(
        &self,
        params: &HestonParams,
        contract: &ContractSpec,
    ) -> Result<PricingResult, PricingError> {
        monte_carlo_price(params, contract, self.simulation)
    }

    /// Everest basket price.
    ///
    /// # Errors
    ///
    /// See [`price_basket`].
    pub fn price_basket(
        &self,
        risk_free_rate: f64,
        assets: &[HestonParams],
        maturity: f64,
    ) -> Result<f64, PricingError> {
        price_basket(risk_free_rate, assets, maturity, self.simulation)
    }

    /// Cliquet price with the configured normal integrals.
    ///
    /// # Errors
    ///
    /// See [`CliquetOption::price`].
    pub fn price_cliquet(&self, option: CliquetOption) -> Result<f64, PricingError> {
        option.with_normal_integrals(self.normals)?.price()
    }

    /// Calibration with the configured minimiser settings and quadrature.
    ///
    /// # Errors
    ///
    /// See [`calibrate`].
    pub fn calibrate(
        &self,
        guess: &HestonParams,
        quotes: &[MarketQuote],
    ) -> Result<CalibrationResult<HestonParams>, PricingError> {
        calibrate_with_config(guess, quotes, &self.calibration, self.quadrature)
    }
}
